// src/db/models/user.rs

//! User model - staff accounts with access levels

use super::parse_enum;
use crate::auth::password;
use crate::error::{Error, Result};
use rusqlite::{Connection, OptionalExtension, Row, params};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

const COLUMNS: &str = "id, username, password_hash, name, access_level, created_at";

/// Access level of a staff account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AccessLevel {
    /// Full control, including user management
    Admin,
    /// Store owner; same management rights as admin
    Owner,
    /// Cashier: sales, catalog and reports
    #[default]
    User,
}

impl AccessLevel {
    pub fn as_str(&self) -> &str {
        match self {
            AccessLevel::Admin => "admin",
            AccessLevel::Owner => "owner",
            AccessLevel::User => "user",
        }
    }

    /// Admins and owners may manage users and void sales
    pub fn is_manager(&self) -> bool {
        matches!(self, AccessLevel::Admin | AccessLevel::Owner)
    }
}

impl FromStr for AccessLevel {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "admin" => Ok(AccessLevel::Admin),
            "owner" => Ok(AccessLevel::Owner),
            "user" | "" => Ok(AccessLevel::User),
            _ => Err(format!("Invalid access level: {s}")),
        }
    }
}

impl fmt::Display for AccessLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A staff account
#[derive(Clone, PartialEq)]
pub struct User {
    pub id: Option<i64>,
    pub username: String,
    pub password_hash: String,
    pub name: String,
    pub access_level: AccessLevel,
    pub created_at: Option<String>,
}

impl fmt::Debug for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("username", &self.username)
            .field("password_hash", &"<redacted>")
            .field("name", &self.name)
            .field("access_level", &self.access_level)
            .field("created_at", &self.created_at)
            .finish()
    }
}

impl User {
    /// Create a new User, hashing `password`
    pub fn new(
        username: String,
        password: &str,
        name: String,
        access_level: AccessLevel,
    ) -> Result<Self> {
        let mut user = Self {
            id: None,
            username,
            password_hash: String::new(),
            name,
            access_level,
            created_at: None,
        };
        user.validate()?;
        user.set_password(password)?;
        Ok(user)
    }

    pub fn validate(&self) -> Result<()> {
        if self.username.trim().is_empty() {
            return Err(Error::InvalidInput("username is required".to_string()));
        }
        if self.name.trim().is_empty() {
            return Err(Error::InvalidInput("user name is required".to_string()));
        }
        Ok(())
    }

    /// Replace the stored hash with one for `password`
    pub fn set_password(&mut self, password: &str) -> Result<()> {
        if password.is_empty() {
            return Err(Error::InvalidInput("password is required".to_string()));
        }
        self.password_hash = password::hash_password(password)?;
        Ok(())
    }

    pub fn verify_password(&self, password: &str) -> Result<bool> {
        password::verify_password(password, &self.password_hash)
    }

    /// Insert when new, update otherwise; returns the id
    pub fn save(&mut self, conn: &Connection) -> Result<i64> {
        self.validate()?;
        match self.id {
            None => self.insert(conn),
            Some(id) => {
                self.update(conn)?;
                Ok(id)
            }
        }
    }

    /// Insert this user into the database
    pub fn insert(&mut self, conn: &Connection) -> Result<i64> {
        if Self::find_by_username(conn, &self.username)?.is_some() {
            return Err(Error::ConflictError(format!(
                "username '{}' is already taken",
                self.username
            )));
        }

        conn.execute(
            "INSERT INTO users (username, password_hash, name, access_level)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                &self.username,
                &self.password_hash,
                &self.name,
                self.access_level.as_str(),
            ],
        )?;

        let id = conn.last_insert_rowid();
        self.id = Some(id);
        Ok(id)
    }

    /// Update an existing user
    pub fn update(&self, conn: &Connection) -> Result<()> {
        let id = self
            .id
            .ok_or_else(|| Error::InvalidInput("cannot update user without ID".to_string()))?;

        if let Some(other) = Self::find_by_username(conn, &self.username)?
            && other.id != Some(id)
        {
            return Err(Error::ConflictError(format!(
                "username '{}' is already taken",
                self.username
            )));
        }

        let changed = conn.execute(
            "UPDATE users
             SET username = ?1, password_hash = ?2, name = ?3, access_level = ?4
             WHERE id = ?5",
            params![
                &self.username,
                &self.password_hash,
                &self.name,
                self.access_level.as_str(),
                id,
            ],
        )?;

        if changed == 0 {
            return Err(Error::NotFound(format!("user {id}")));
        }
        Ok(())
    }

    /// Look up `username` and check `password`
    ///
    /// Unknown users and wrong passwords both return `None`.
    pub fn authenticate(conn: &Connection, username: &str, password: &str) -> Result<Option<Self>> {
        let Some(user) = Self::find_by_username(conn, username)? else {
            debug!("Authentication failed: unknown user '{}'", username);
            return Ok(None);
        };
        if user.verify_password(password)? {
            Ok(Some(user))
        } else {
            debug!("Authentication failed: bad password for '{}'", username);
            Ok(None)
        }
    }

    pub fn find_by_id(conn: &Connection, id: i64) -> Result<Option<Self>> {
        let mut stmt = conn.prepare(&format!("SELECT {COLUMNS} FROM users WHERE id = ?1"))?;
        Ok(stmt.query_row([id], Self::from_row).optional()?)
    }

    pub fn find_by_username(conn: &Connection, username: &str) -> Result<Option<Self>> {
        let mut stmt =
            conn.prepare(&format!("SELECT {COLUMNS} FROM users WHERE username = ?1"))?;
        Ok(stmt.query_row([username], Self::from_row).optional()?)
    }

    /// List all users ordered by display name
    pub fn list_all(conn: &Connection) -> Result<Vec<Self>> {
        let mut stmt = conn.prepare(&format!("SELECT {COLUMNS} FROM users ORDER BY name, id"))?;
        let users = stmt
            .query_map([], Self::from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(users)
    }

    /// Delete a user by ID; returns whether a row was removed
    pub fn delete(conn: &Connection, id: i64) -> Result<bool> {
        let removed = conn.execute("DELETE FROM users WHERE id = ?1", [id])?;
        Ok(removed > 0)
    }

    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: Some(row.get(0)?),
            username: row.get(1)?,
            password_hash: row.get(2)?,
            name: row.get(3)?,
            access_level: parse_enum(row, 4)?,
            created_at: row.get(5)?,
        })
    }
}
