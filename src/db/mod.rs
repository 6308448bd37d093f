// src/db/mod.rs

//! Embedded SQLite database plumbing
//!
//! Connections are opened with foreign keys enforced, and every
//! multi-statement write (recording or voiding a sale) goes through
//! [`transaction`] so it either fully applies or leaves no trace.

pub mod migrations;
pub mod models;
pub mod paths;
pub mod schema;

use crate::error::{Error, Result};
use rusqlite::{Connection, Transaction};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info};

/// How long a writer waits on a locked database before failing
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Open an existing database and apply connection settings
pub fn open(db_path: impl AsRef<Path>) -> Result<Connection> {
    let path = db_path.as_ref();
    if !path.exists() {
        return Err(Error::NotFound(format!(
            "database {} does not exist (run 'supercash init' first)",
            path.display()
        )));
    }

    let conn = Connection::open(path)?;
    configure(&conn)?;
    debug!("Opened database at {}", path.display());
    Ok(conn)
}

/// Create (if needed) and migrate the database at `db_path`
pub fn init(db_path: impl AsRef<Path>) -> Result<()> {
    let path = db_path.as_ref();
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }

    let conn = Connection::open(path)?;
    configure(&conn)?;
    schema::migrate(&conn)?;
    info!("Database ready at {}", path.display());
    Ok(())
}

/// Open an in-memory database with the full schema (used by tests)
pub fn open_in_memory() -> Result<Connection> {
    let conn = Connection::open_in_memory()?;
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    schema::migrate(&conn)?;
    Ok(conn)
}

fn configure(conn: &Connection) -> Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON; PRAGMA journal_mode = WAL;")?;
    conn.busy_timeout(BUSY_TIMEOUT)?;
    Ok(())
}

/// Run `f` inside a transaction, committing on success
///
/// The transaction rolls back when `f` returns an error (the
/// `rusqlite::Transaction` is dropped without commit).
pub fn transaction<F, T>(conn: &mut Connection, f: F) -> Result<T>
where
    F: FnOnce(&Transaction) -> Result<T>,
{
    let tx = conn.transaction()?;
    let value = f(&tx)?;
    tx.commit()?;
    Ok(value)
}
