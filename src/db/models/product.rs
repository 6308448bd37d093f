// src/db/models/product.rs

//! Product model - inventory items with pricing and stock levels

use crate::Money;
use crate::error::{Error, Result};
use rusqlite::{Connection, OptionalExtension, Row, params};
use std::fmt;

const SELECT_PRODUCT: &str = "SELECT p.id, p.name, p.barcode, p.category_id, c.name,
        p.cost_price, p.sale_price, p.stock, p.min_stock, p.supplier
     FROM products p
     LEFT JOIN categories c ON p.category_id = c.id";

/// Where a product's stock sits relative to its minimum
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StockLevel {
    /// Above the minimum
    Ok,
    /// At or below the minimum but not empty
    Low,
    /// Nothing left
    Out,
}

impl StockLevel {
    pub fn as_str(&self) -> &str {
        match self {
            StockLevel::Ok => "ok",
            StockLevel::Low => "low",
            StockLevel::Out => "out",
        }
    }
}

impl fmt::Display for StockLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A product in the shop's inventory
#[derive(Debug, Clone, PartialEq)]
pub struct Product {
    pub id: Option<i64>,
    pub name: String,
    pub barcode: Option<String>,
    pub category_id: Option<i64>,
    /// Filled in when read back from the database
    pub category_name: Option<String>,
    pub cost_price: Money,
    pub sale_price: Money,
    pub stock: i64,
    pub min_stock: i64,
    pub supplier: Option<String>,
}

impl Product {
    /// Create a new Product
    pub fn new(name: String, sale_price: Money) -> Self {
        Self {
            id: None,
            name,
            barcode: None,
            category_id: None,
            category_name: None,
            cost_price: Money::ZERO,
            sale_price,
            stock: 0,
            min_stock: 0,
            supplier: None,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::InvalidInput("product name is required".to_string()));
        }
        if let Some(barcode) = &self.barcode
            && barcode.trim().is_empty()
        {
            return Err(Error::InvalidInput(
                "product barcode must not be blank".to_string(),
            ));
        }
        if self.cost_price.is_negative() || self.sale_price.is_negative() {
            return Err(Error::InvalidInput(
                "product prices must not be negative".to_string(),
            ));
        }
        if self.stock < 0 || self.min_stock < 0 {
            return Err(Error::InvalidInput(
                "stock quantities must not be negative".to_string(),
            ));
        }
        Ok(())
    }

    pub fn stock_level(&self) -> StockLevel {
        if self.stock == 0 {
            StockLevel::Out
        } else if self.stock <= self.min_stock {
            StockLevel::Low
        } else {
            StockLevel::Ok
        }
    }

    /// Case-insensitive match on name, barcode or supplier (`needle` lowercased)
    pub fn matches(&self, needle: &str) -> bool {
        let hit = |field: Option<&str>| field.is_some_and(|f| f.to_lowercase().contains(needle));
        self.name.to_lowercase().contains(needle)
            || hit(self.barcode.as_deref())
            || hit(self.supplier.as_deref())
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

    /// Insert this product into the database
    pub fn insert(&mut self, conn: &Connection) -> Result<i64> {
        conn.execute(
            "INSERT INTO products (name, barcode, category_id, cost_price, sale_price,
                                   stock, min_stock, supplier)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                &self.name,
                &self.barcode,
                &self.category_id,
                self.cost_price,
                self.sale_price,
                self.stock,
                self.min_stock,
                &self.supplier,
            ],
        )
        .map_err(|e| barcode_conflict(e, self.barcode.as_deref()))?;

        let id = conn.last_insert_rowid();
        self.id = Some(id);
        Ok(id)
    }

    /// Update an existing product
    pub fn update(&self, conn: &Connection) -> Result<()> {
        let id = self
            .id
            .ok_or_else(|| Error::InvalidInput("cannot update product without ID".to_string()))?;

        let changed = conn
            .execute(
                "UPDATE products
                 SET name = ?1, barcode = ?2, category_id = ?3, cost_price = ?4,
                     sale_price = ?5, stock = ?6, min_stock = ?7, supplier = ?8
                 WHERE id = ?9",
                params![
                    &self.name,
                    &self.barcode,
                    &self.category_id,
                    self.cost_price,
                    self.sale_price,
                    self.stock,
                    self.min_stock,
                    &self.supplier,
                    id,
                ],
            )
            .map_err(|e| barcode_conflict(e, self.barcode.as_deref()))?;

        if changed == 0 {
            return Err(Error::NotFound(format!("product {id}")));
        }
        Ok(())
    }

    /// Find a product by ID
    pub fn find_by_id(conn: &Connection, id: i64) -> Result<Option<Self>> {
        let mut stmt = conn.prepare(&format!("{SELECT_PRODUCT} WHERE p.id = ?1"))?;
        Ok(stmt.query_row([id], Self::from_row).optional()?)
    }

    /// Find a product by barcode
    pub fn find_by_barcode(conn: &Connection, barcode: &str) -> Result<Option<Self>> {
        let mut stmt = conn.prepare(&format!("{SELECT_PRODUCT} WHERE p.barcode = ?1"))?;
        Ok(stmt.query_row([barcode], Self::from_row).optional()?)
    }

    /// List all products ordered by name
    pub fn list_all(conn: &Connection) -> Result<Vec<Self>> {
        let mut stmt = conn.prepare(&format!("{SELECT_PRODUCT} ORDER BY p.name, p.id"))?;
        let products = stmt
            .query_map([], Self::from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(products)
    }

    /// Products at or below their minimum stock, emptiest first
    pub fn low_stock(conn: &Connection) -> Result<Vec<Self>> {
        let mut stmt = conn.prepare(&format!(
            "{SELECT_PRODUCT} WHERE p.stock <= p.min_stock ORDER BY p.stock, p.name"
        ))?;
        let products = stmt
            .query_map([], Self::from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(products)
    }

    /// Add `delta` units (negative to subtract); returns the new stock
    ///
    /// A change that would leave the stock below zero is rejected and
    /// nothing is written.
    pub fn update_stock(conn: &Connection, id: i64, delta: i64) -> Result<i64> {
        let updated: Option<i64> = conn
            .query_row(
                "UPDATE products SET stock = stock + ?1
                 WHERE id = ?2 AND stock + ?1 >= 0
                 RETURNING stock",
                params![delta, id],
                |row| row.get(0),
            )
            .optional()?;

        match updated {
            Some(stock) => Ok(stock),
            None => Err(Self::stock_failure(conn, id, -delta)?),
        }
    }

    /// Explain why a stock decrement of `requested` units matched no row
    pub(crate) fn stock_failure(conn: &Connection, id: i64, requested: i64) -> Result<Error> {
        let available: Option<i64> = conn
            .query_row("SELECT stock FROM products WHERE id = ?1", [id], |row| {
                row.get(0)
            })
            .optional()?;

        Ok(match available {
            Some(available) => Error::InsufficientStock {
                product_id: id,
                requested,
                available,
            },
            None => Error::NotFound(format!("product {id}")),
        })
    }

    /// Delete a product by ID; returns whether a row was removed
    ///
    /// Products that appear in recorded sales cannot be deleted.
    pub fn delete(conn: &Connection, id: i64) -> Result<bool> {
        let sold: i64 = conn.query_row(
            "SELECT COUNT(*) FROM sale_items WHERE product_id = ?1",
            [id],
            |row| row.get(0),
        )?;
        if sold > 0 {
            return Err(Error::ConflictError(format!(
                "product {id} appears in {sold} sale line(s) and cannot be deleted"
            )));
        }

        let removed = conn.execute("DELETE FROM products WHERE id = ?1", [id])?;
        Ok(removed > 0)
    }

    /// Convert a database row to a Product
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: Some(row.get(0)?),
            name: row.get(1)?,
            barcode: row.get(2)?,
            category_id: row.get(3)?,
            category_name: row.get(4)?,
            cost_price: row.get(5)?,
            sale_price: row.get(6)?,
            stock: row.get(7)?,
            min_stock: row.get(8)?,
            supplier: row.get(9)?,
        })
    }
}

fn barcode_conflict(err: rusqlite::Error, barcode: Option<&str>) -> Error {
    match (&err, barcode) {
        (rusqlite::Error::SqliteFailure(e, msg), Some(code))
            if e.code == rusqlite::ErrorCode::ConstraintViolation
                && msg.as_deref().is_some_and(|m| m.contains("UNIQUE")) =>
        {
            Error::ConflictError(format!("a product with barcode '{code}' already exists"))
        }
        _ => Error::Database(err),
    }
}
