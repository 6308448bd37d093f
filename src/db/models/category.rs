// src/db/models/category.rs

//! Category model - product groupings

use crate::error::{Error, Result};
use rusqlite::{Connection, OptionalExtension, Row, params};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    pub id: Option<i64>,
    pub name: String,
}

impl Category {
    pub fn new(name: String) -> Self {
        Self { id: None, name }
    }

    /// Insert this category into the database
    pub fn insert(&mut self, conn: &Connection) -> Result<i64> {
        if self.name.trim().is_empty() {
            return Err(Error::InvalidInput("category name is required".to_string()));
        }
        if Self::find_by_name(conn, &self.name)?.is_some() {
            return Err(Error::ConflictError(format!(
                "category '{}' already exists",
                self.name
            )));
        }

        conn.execute("INSERT INTO categories (name) VALUES (?1)", params![&self.name])?;

        let id = conn.last_insert_rowid();
        self.id = Some(id);
        Ok(id)
    }

    pub fn find_by_name(conn: &Connection, name: &str) -> Result<Option<Self>> {
        let mut stmt = conn.prepare("SELECT id, name FROM categories WHERE name = ?1")?;
        Ok(stmt.query_row([name], Self::from_row).optional()?)
    }

    pub fn list_all(conn: &Connection) -> Result<Vec<Self>> {
        let mut stmt = conn.prepare("SELECT id, name FROM categories ORDER BY name")?;
        let categories = stmt
            .query_map([], Self::from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(categories)
    }

    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: Some(row.get(0)?),
            name: row.get(1)?,
        })
    }
}
