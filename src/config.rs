// src/config.rs
//! Configuration file parsing
//!
//! Supports TOML configuration files with the following sections:
//! - [database] - Backend selection and SQLite file location
//! - [database.postgres] - Server connection and pool sizing
//! - [logging] - Log level and optional log file
//!
//! Environment variables are applied on top of the file (see
//! [`Config::apply_env`]).

use crate::db::paths;
use crate::error::{Error, Result};
use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

/// Config file looked up in the working directory
pub const LOCAL_CONFIG: &str = "supercash.toml";

/// TOML configuration file structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub database: DatabaseSection,

    #[serde(default)]
    pub logging: LoggingSection,

    /// File the configuration was read from, `None` for built-in defaults
    #[serde(skip)]
    pub source: Option<PathBuf>,
}

/// Which store implementation to use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    #[default]
    Sqlite,
    Postgres,
}

impl Backend {
    pub fn as_str(&self) -> &str {
        match self {
            Backend::Sqlite => "sqlite",
            Backend::Postgres => "postgres",
        }
    }
}

impl FromStr for Backend {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "sqlite" => Ok(Backend::Sqlite),
            "postgres" | "postgresql" => Ok(Backend::Postgres),
            _ => Err(format!("Unknown database backend: {s}")),
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Database configuration section
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DatabaseSection {
    #[serde(default)]
    pub backend: Backend,

    /// SQLite database file (defaults to the per-user data directory)
    #[serde(default)]
    pub path: Option<PathBuf>,

    #[serde(default)]
    pub postgres: PostgresSection,
}

/// Postgres connection settings
#[derive(Clone, Deserialize)]
pub struct PostgresSection {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_user")]
    pub user: String,

    #[serde(default)]
    pub password: String,

    #[serde(default = "default_dbname")]
    pub dbname: String,

    /// Idle connections the pool keeps open
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,

    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,
}

impl Default for PostgresSection {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            user: default_user(),
            password: String::new(),
            dbname: default_dbname(),
            min_connections: default_min_connections(),
            max_connections: default_max_connections(),
            connect_timeout_ms: default_connect_timeout_ms(),
        }
    }
}

impl fmt::Debug for PostgresSection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PostgresSection")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("dbname", &self.dbname)
            .field("min_connections", &self.min_connections)
            .field("max_connections", &self.max_connections)
            .field("connect_timeout_ms", &self.connect_timeout_ms)
            .finish()
    }
}

impl PostgresSection {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    /// `user@host:port/dbname`, safe for logs
    pub fn describe(&self) -> String {
        format!("{}@{}:{}/{}", self.user, self.host, self.port, self.dbname)
    }
}

fn default_host() -> String {
    "localhost".to_string()
}

fn default_port() -> u16 {
    5432
}

fn default_user() -> String {
    "postgres".to_string()
}

fn default_dbname() -> String {
    "petshop_db".to_string()
}

fn default_min_connections() -> u32 {
    1
}

fn default_max_connections() -> u32 {
    20
}

fn default_connect_timeout_ms() -> u64 {
    5000
}

/// Logging configuration section
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSection {
    /// Filter directive used when `RUST_LOG` is unset
    #[serde(default = "default_level")]
    pub level: String,

    /// Also append log lines to this file
    #[serde(default)]
    pub file: Option<PathBuf>,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: default_level(),
            file: None,
        }
    }
}

fn default_level() -> String {
    "info".to_string()
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::ConfigError(format!(
                "Failed to read config file {}: {e}",
                path.display()
            ))
        })?;

        let mut config: Config = toml::from_str(&content).map_err(|e| {
            Error::ConfigError(format!(
                "Failed to parse config file {}: {e}",
                path.display()
            ))
        })?;
        config.source = Some(path.to_path_buf());

        config.validate()?;
        Ok(config)
    }

    /// Find and load the configuration, then apply environment overrides
    ///
    /// An explicit path must exist; otherwise `./supercash.toml` and the
    /// per-user config file are tried before falling back to defaults.
    pub fn discover(explicit: Option<&Path>) -> Result<Self> {
        let mut config = match explicit {
            Some(path) => {
                if !path.exists() {
                    return Err(Error::ConfigError(format!(
                        "config file {} does not exist",
                        path.display()
                    )));
                }
                Self::load(path)?
            }
            None => {
                let candidates = [Some(PathBuf::from(LOCAL_CONFIG)), paths::default_config_path()];
                match candidates.into_iter().flatten().find(|p| p.is_file()) {
                    Some(path) => Self::load(&path)?,
                    None => Self::default(),
                }
            }
        };

        config.apply_env()?;
        config.validate()?;
        Ok(config)
    }

    /// Apply overrides from the process environment
    pub fn apply_env(&mut self) -> Result<()> {
        self.apply_env_from(|key| std::env::var(key).ok())
    }

    /// Apply overrides using `lookup` to read variables
    pub fn apply_env_from<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(backend) = lookup("SUPERCASH_BACKEND") {
            self.database.backend = backend.parse().map_err(Error::ConfigError)?;
        }
        if let Some(path) = lookup("SUPERCASH_DB_PATH") {
            self.database.path = Some(PathBuf::from(path));
        }

        let pg = &mut self.database.postgres;
        if let Some(host) = lookup("DB_HOST") {
            pg.host = host;
        }
        if let Some(port) = lookup("DB_PORT") {
            pg.port = port
                .trim()
                .parse()
                .map_err(|_| Error::ConfigError(format!("Invalid DB_PORT: {port}")))?;
        }
        if let Some(user) = lookup("DB_USER") {
            pg.user = user;
        }
        if let Some(password) = lookup("DB_PASSWORD") {
            pg.password = password;
        }
        if let Some(dbname) = lookup("DB_NAME") {
            pg.dbname = dbname;
        }
        Ok(())
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        let pg = &self.database.postgres;
        if pg.port == 0 {
            return Err(Error::ConfigError(
                "database.postgres.port must be positive".to_string(),
            ));
        }
        if pg.min_connections == 0 || pg.max_connections == 0 {
            return Err(Error::ConfigError(
                "database.postgres pool sizes must be positive".to_string(),
            ));
        }
        if pg.min_connections > pg.max_connections {
            return Err(Error::ConfigError(format!(
                "database.postgres.min_connections ({}) exceeds max_connections ({})",
                pg.min_connections, pg.max_connections
            )));
        }
        if self.database.backend == Backend::Postgres && pg.dbname.trim().is_empty() {
            return Err(Error::ConfigError(
                "database.postgres.dbname is required".to_string(),
            ));
        }
        Ok(())
    }

    /// SQLite file to use
    pub fn db_path(&self) -> PathBuf {
        self.database
            .path
            .clone()
            .unwrap_or_else(paths::default_db_path)
    }
}
