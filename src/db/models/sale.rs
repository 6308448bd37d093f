// src/db/models/sale.rs

//! Sale model - sale headers, line items and the stock bookkeeping around them
//!
//! A sale is built up in memory like a till cart (`add_item`,
//! `remove_item`, `apply_discount`) and then written in one transaction:
//! header, items, and a stock decrement per item. Voiding a sale reverses
//! the stock movement in one transaction as well.

use super::{Period, Product, parse_enum};
use crate::Money;
use crate::db;
use crate::error::{Error, Result};
use chrono::{Local, NaiveDateTime, SubsecRound};
use rusqlite::{Connection, OptionalExtension, Row, params};
use std::fmt;
use std::str::FromStr;
use tracing::{debug, info};

const SELECT_SUMMARY: &str = "SELECT s.id, s.sale_date, s.customer_id, c.name, u.name,
        s.total, s.discount, s.payment_method
     FROM sales s
     LEFT JOIN customers c ON s.customer_id = c.id
     LEFT JOIN users u ON s.user_id = u.id";

/// How the customer paid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PaymentMethod {
    Cash,
    CreditCard,
    DebitCard,
    Pix,
}

impl PaymentMethod {
    pub const ALL: [PaymentMethod; 4] = [
        PaymentMethod::Cash,
        PaymentMethod::CreditCard,
        PaymentMethod::DebitCard,
        PaymentMethod::Pix,
    ];

    pub fn as_str(&self) -> &str {
        match self {
            PaymentMethod::Cash => "cash",
            PaymentMethod::CreditCard => "credit_card",
            PaymentMethod::DebitCard => "debit_card",
            PaymentMethod::Pix => "pix",
        }
    }

    /// Label shown on receipts and reports
    pub fn label(&self) -> &str {
        match self {
            PaymentMethod::Cash => "Dinheiro",
            PaymentMethod::CreditCard => "Cartão de Crédito",
            PaymentMethod::DebitCard => "Cartão de Débito",
            PaymentMethod::Pix => "PIX",
        }
    }
}

impl FromStr for PaymentMethod {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace(['-', ' '], "_").as_str() {
            "cash" | "dinheiro" => Ok(PaymentMethod::Cash),
            "credit_card" | "credit" | "cartão_de_crédito" | "cartao_de_credito" => {
                Ok(PaymentMethod::CreditCard)
            }
            "debit_card" | "debit" | "cartão_de_débito" | "cartao_de_debito" => {
                Ok(PaymentMethod::DebitCard)
            }
            "pix" => Ok(PaymentMethod::Pix),
            _ => Err(format!("Invalid payment method: {s}")),
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One line of a sale
#[derive(Debug, Clone, PartialEq)]
pub struct SaleItem {
    pub product_id: i64,
    pub quantity: i64,
    /// Price actually charged per unit (may differ from the catalog price)
    pub unit_price: Money,
    pub subtotal: Money,
    /// Filled in when read back from the database
    pub product_name: Option<String>,
}

/// A sale with its line items
#[derive(Debug, Clone, PartialEq)]
pub struct Sale {
    pub id: Option<i64>,
    pub customer_id: Option<i64>,
    pub user_id: Option<i64>,
    pub sale_date: NaiveDateTime,
    /// Gross total: sum of item subtotals
    pub total: Money,
    pub discount: Money,
    pub payment_method: PaymentMethod,
    pub items: Vec<SaleItem>,
}

/// A sale header joined with customer and seller names
#[derive(Debug, Clone, PartialEq)]
pub struct SaleSummary {
    pub id: i64,
    pub sale_date: NaiveDateTime,
    pub customer_id: Option<i64>,
    pub customer_name: Option<String>,
    pub seller_name: Option<String>,
    pub total: Money,
    pub discount: Money,
    pub payment_method: PaymentMethod,
}

impl SaleSummary {
    pub fn net_total(&self) -> Money {
        self.total - self.discount
    }

    pub(crate) fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            sale_date: row.get(1)?,
            customer_id: row.get(2)?,
            customer_name: row.get(3)?,
            seller_name: row.get(4)?,
            total: row.get(5)?,
            discount: row.get(6)?,
            payment_method: parse_enum(row, 7)?,
        })
    }
}

impl Sale {
    /// Start an empty sale dated now
    pub fn new(payment_method: PaymentMethod) -> Self {
        Self {
            id: None,
            customer_id: None,
            user_id: None,
            sale_date: Local::now().naive_local().trunc_subsecs(0),
            total: Money::ZERO,
            discount: Money::ZERO,
            payment_method,
            items: Vec::new(),
        }
    }

    /// Add a line to the cart; returns the line subtotal
    pub fn add_item(&mut self, product_id: i64, quantity: i64, unit_price: Money) -> Result<Money> {
        if quantity <= 0 {
            return Err(Error::InvalidInput(format!(
                "quantity must be positive (got {quantity})"
            )));
        }
        if unit_price.is_negative() {
            return Err(Error::InvalidInput(
                "unit price must not be negative".to_string(),
            ));
        }

        let subtotal = unit_price
            .times(quantity)
            .ok_or_else(|| Error::InvalidInput(format!("{quantity} x {unit_price} is too large")))?;
        let total = self
            .total
            .checked_add(subtotal)
            .ok_or_else(|| Error::InvalidInput("sale total is too large".to_string()))?;
        self.items.push(SaleItem {
            product_id,
            quantity,
            unit_price,
            subtotal,
            product_name: None,
        });
        self.total = total;
        Ok(subtotal)
    }

    /// Drop a cart line by position
    pub fn remove_item(&mut self, index: usize) -> Option<SaleItem> {
        if index >= self.items.len() {
            return None;
        }
        let item = self.items.remove(index);
        self.total -= item.subtotal;
        Some(item)
    }

    /// Set the discount; it may not exceed the current total
    pub fn apply_discount(&mut self, discount: Money) -> Result<()> {
        if discount.is_negative() {
            return Err(Error::InvalidInput(
                "discount must not be negative".to_string(),
            ));
        }
        if discount > self.total {
            return Err(Error::DiscountExceedsTotal {
                discount,
                total: self.total,
            });
        }
        self.discount = discount;
        Ok(())
    }

    pub fn net_total(&self) -> Money {
        self.total - self.discount
    }

    /// Checks shared by every backend before a sale is written
    pub fn validate_for_save(&self) -> Result<()> {
        if self.id.is_some() {
            return Err(Error::ConflictError(
                "sale has already been recorded".to_string(),
            ));
        }
        if self.items.is_empty() {
            return Err(Error::InvalidInput(
                "add products before finishing the sale".to_string(),
            ));
        }
        if self.discount > self.total {
            return Err(Error::DiscountExceedsTotal {
                discount: self.discount,
                total: self.total,
            });
        }
        Ok(())
    }

    /// Record the sale, its items and the stock decrements atomically
    pub fn save(&mut self, conn: &mut Connection) -> Result<i64> {
        self.validate_for_save()?;

        let id = db::transaction(conn, |tx| self.insert_with_items(tx))?;
        self.id = Some(id);

        info!(
            "Recorded sale {} ({} items, net {})",
            id,
            self.items.len(),
            self.net_total()
        );
        Ok(id)
    }

    fn insert_with_items(&self, tx: &Connection) -> Result<i64> {
        if let Some(customer_id) = self.customer_id {
            let exists = tx
                .query_row("SELECT 1 FROM customers WHERE id = ?1", [customer_id], |_| {
                    Ok(())
                })
                .optional()?
                .is_some();
            if !exists {
                return Err(Error::NotFound(format!("customer {customer_id}")));
            }
        }

        tx.execute(
            "INSERT INTO sales (customer_id, user_id, sale_date, total, discount, payment_method)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                self.customer_id,
                self.user_id,
                self.sale_date,
                self.total,
                self.discount,
                self.payment_method.as_str(),
            ],
        )?;
        let sale_id = tx.last_insert_rowid();

        for item in &self.items {
            let updated = tx.execute(
                "UPDATE products SET stock = stock - ?1 WHERE id = ?2 AND stock >= ?1",
                params![item.quantity, item.product_id],
            )?;
            if updated == 0 {
                return Err(Product::stock_failure(tx, item.product_id, item.quantity)?);
            }

            tx.execute(
                "INSERT INTO sale_items (sale_id, product_id, quantity, unit_price, subtotal)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    sale_id,
                    item.product_id,
                    item.quantity,
                    item.unit_price,
                    item.subtotal,
                ],
            )?;
            debug!(
                "Sale {}: product {} x{}",
                sale_id, item.product_id, item.quantity
            );
        }

        Ok(sale_id)
    }

    /// Find a sale with its items
    pub fn find_by_id(conn: &Connection, id: i64) -> Result<Option<Self>> {
        let header = conn
            .query_row(
                "SELECT id, customer_id, user_id, sale_date, total, discount, payment_method
                 FROM sales WHERE id = ?1",
                [id],
                |row| {
                    Ok(Self {
                        id: Some(row.get(0)?),
                        customer_id: row.get(1)?,
                        user_id: row.get(2)?,
                        sale_date: row.get(3)?,
                        total: row.get(4)?,
                        discount: row.get(5)?,
                        payment_method: parse_enum(row, 6)?,
                        items: Vec::new(),
                    })
                },
            )
            .optional()?;

        let Some(mut sale) = header else {
            return Ok(None);
        };

        let mut stmt = conn.prepare(
            "SELECT si.product_id, si.quantity, si.unit_price, si.subtotal, p.name
             FROM sale_items si
             LEFT JOIN products p ON si.product_id = p.id
             WHERE si.sale_id = ?1
             ORDER BY si.id",
        )?;
        sale.items = stmt
            .query_map([id], |row| {
                Ok(SaleItem {
                    product_id: row.get(0)?,
                    quantity: row.get(1)?,
                    unit_price: row.get(2)?,
                    subtotal: row.get(3)?,
                    product_name: row.get(4)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(Some(sale))
    }

    /// Sales dated within `period` (inclusive), newest first
    pub fn in_period(conn: &Connection, period: &Period) -> Result<Vec<SaleSummary>> {
        let mut stmt = conn.prepare(&format!(
            "{SELECT_SUMMARY}
             WHERE DATE(s.sale_date) BETWEEN ?1 AND ?2
             ORDER BY s.sale_date DESC, s.id DESC"
        ))?;
        let sales = stmt
            .query_map(params![period.start, period.end], SaleSummary::from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(sales)
    }

    /// The `limit` most recent sales
    pub fn recent(conn: &Connection, limit: usize) -> Result<Vec<SaleSummary>> {
        let mut stmt = conn.prepare(&format!(
            "{SELECT_SUMMARY} ORDER BY s.sale_date DESC, s.id DESC LIMIT ?1"
        ))?;
        let sales = stmt
            .query_map([limit as i64], SaleSummary::from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(sales)
    }

    /// Void a sale: restore stock, remove items and header atomically
    ///
    /// Returns `false` when no such sale exists.
    pub fn delete(conn: &mut Connection, id: i64) -> Result<bool> {
        let removed = db::transaction(conn, |tx| {
            let exists = tx
                .query_row("SELECT 1 FROM sales WHERE id = ?1", [id], |_| Ok(()))
                .optional()?
                .is_some();
            if !exists {
                return Ok(false);
            }

            let items: Vec<(i64, i64)> = tx
                .prepare("SELECT product_id, quantity FROM sale_items WHERE sale_id = ?1")?
                .query_map([id], |row| Ok((row.get(0)?, row.get(1)?)))?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            for (product_id, quantity) in &items {
                tx.execute(
                    "UPDATE products SET stock = stock + ?1 WHERE id = ?2",
                    params![quantity, product_id],
                )?;
            }

            tx.execute("DELETE FROM sale_items WHERE sale_id = ?1", [id])?;
            tx.execute("DELETE FROM sales WHERE id = ?1", [id])?;
            Ok(true)
        })?;

        if removed {
            info!("Voided sale {}", id);
        }
        Ok(removed)
    }
}
