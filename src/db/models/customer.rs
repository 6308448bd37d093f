// src/db/models/customer.rs

//! Customer model - shop customers and their pets

use super::{PaymentMethod, parse_enum};
use crate::Money;
use crate::error::{Error, Result};
use chrono::{NaiveDate, NaiveDateTime};
use rusqlite::{Connection, OptionalExtension, Row, params};

const COLUMNS: &str =
    "id, name, document, email, phone, address, pet_name, pet_birth, created_at";

/// A customer record
///
/// `document` holds the CPF (individual) or CNPJ (company) number and is
/// the key used at the till to look a customer up.
#[derive(Debug, Clone, PartialEq)]
pub struct Customer {
    pub id: Option<i64>,
    pub name: String,
    pub document: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub pet_name: Option<String>,
    pub pet_birth: Option<NaiveDate>,
    pub created_at: Option<String>,
}

/// One product line from a customer's purchase history
#[derive(Debug, Clone, PartialEq)]
pub struct PurchaseLine {
    pub sale_id: i64,
    pub sale_date: NaiveDateTime,
    pub sale_total: Money,
    pub payment_method: PaymentMethod,
    pub product_name: String,
    pub quantity: i64,
    pub unit_price: Money,
}

impl Customer {
    /// Create a new Customer
    pub fn new(name: String) -> Self {
        Self {
            id: None,
            name,
            document: None,
            email: None,
            phone: None,
            address: None,
            pet_name: None,
            pet_birth: None,
            created_at: None,
        }
    }

    /// Check required fields before writing
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::InvalidInput("customer name is required".to_string()));
        }
        if let Some(doc) = &self.document
            && doc.trim().is_empty()
        {
            return Err(Error::InvalidInput(
                "customer document must not be blank".to_string(),
            ));
        }
        Ok(())
    }

    /// Case-insensitive match on name or document (`needle` already lowercased)
    pub fn matches(&self, needle: &str) -> bool {
        self.name.to_lowercase().contains(needle)
            || self
                .document
                .as_deref()
                .is_some_and(|d| d.to_lowercase().contains(needle))
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

    /// Insert this customer into the database
    pub fn insert(&mut self, conn: &Connection) -> Result<i64> {
        conn.execute(
            "INSERT INTO customers (name, document, email, phone, address, pet_name, pet_birth)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                &self.name,
                &self.document,
                &self.email,
                &self.phone,
                &self.address,
                &self.pet_name,
                &self.pet_birth,
            ],
        )
        .map_err(|e| unique_violation(e, self.document.as_deref()))?;

        let id = conn.last_insert_rowid();
        self.id = Some(id);
        Ok(id)
    }

    /// Update an existing customer
    pub fn update(&self, conn: &Connection) -> Result<()> {
        let id = self
            .id
            .ok_or_else(|| Error::InvalidInput("cannot update customer without ID".to_string()))?;

        let changed = conn
            .execute(
                "UPDATE customers
                 SET name = ?1, document = ?2, email = ?3, phone = ?4,
                     address = ?5, pet_name = ?6, pet_birth = ?7
                 WHERE id = ?8",
                params![
                    &self.name,
                    &self.document,
                    &self.email,
                    &self.phone,
                    &self.address,
                    &self.pet_name,
                    &self.pet_birth,
                    id,
                ],
            )
            .map_err(|e| unique_violation(e, self.document.as_deref()))?;

        if changed == 0 {
            return Err(Error::NotFound(format!("customer {id}")));
        }
        Ok(())
    }

    /// Find a customer by ID
    pub fn find_by_id(conn: &Connection, id: i64) -> Result<Option<Self>> {
        let mut stmt = conn.prepare(&format!("SELECT {COLUMNS} FROM customers WHERE id = ?1"))?;
        let customer = stmt.query_row([id], Self::from_row).optional()?;
        Ok(customer)
    }

    /// Find a customer by CPF/CNPJ
    pub fn find_by_document(conn: &Connection, document: &str) -> Result<Option<Self>> {
        let mut stmt =
            conn.prepare(&format!("SELECT {COLUMNS} FROM customers WHERE document = ?1"))?;
        let customer = stmt.query_row([document], Self::from_row).optional()?;
        Ok(customer)
    }

    /// List all customers ordered by name
    pub fn list_all(conn: &Connection) -> Result<Vec<Self>> {
        let mut stmt =
            conn.prepare(&format!("SELECT {COLUMNS} FROM customers ORDER BY name, id"))?;
        let customers = stmt
            .query_map([], Self::from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(customers)
    }

    /// Every product line the customer bought, newest sale first
    pub fn purchase_history(conn: &Connection, customer_id: i64) -> Result<Vec<PurchaseLine>> {
        let mut stmt = conn.prepare(
            "SELECT s.id, s.sale_date, s.total, s.payment_method,
                    p.name, si.quantity, si.unit_price
             FROM sales s
             JOIN sale_items si ON s.id = si.sale_id
             JOIN products p ON si.product_id = p.id
             WHERE s.customer_id = ?1
             ORDER BY s.sale_date DESC, s.id DESC, si.id",
        )?;

        let lines = stmt
            .query_map([customer_id], |row| {
                Ok(PurchaseLine {
                    sale_id: row.get(0)?,
                    sale_date: row.get(1)?,
                    sale_total: row.get(2)?,
                    payment_method: parse_enum(row, 3)?,
                    product_name: row.get(4)?,
                    quantity: row.get(5)?,
                    unit_price: row.get(6)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(lines)
    }

    /// Delete a customer by ID; returns whether a row was removed
    ///
    /// Past sales keep their history with the customer cleared.
    pub fn delete(conn: &Connection, id: i64) -> Result<bool> {
        let removed = conn.execute("DELETE FROM customers WHERE id = ?1", [id])?;
        Ok(removed > 0)
    }

    /// Convert a database row to a Customer
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: Some(row.get(0)?),
            name: row.get(1)?,
            document: row.get(2)?,
            email: row.get(3)?,
            phone: row.get(4)?,
            address: row.get(5)?,
            pet_name: row.get(6)?,
            pet_birth: row.get(7)?,
            created_at: row.get(8)?,
        })
    }
}

fn unique_violation(err: rusqlite::Error, document: Option<&str>) -> Error {
    match (&err, document) {
        (rusqlite::Error::SqliteFailure(e, _), Some(doc))
            if e.code == rusqlite::ErrorCode::ConstraintViolation =>
        {
            Error::ConflictError(format!("a customer with document '{doc}' already exists"))
        }
        _ => Error::Database(err),
    }
}
