// src/db/migrations.rs
//! Database migration implementations
//!
//! Each function brings the embedded database from the previous schema
//! version to the next. The Postgres backend carries the equivalent DDL in
//! `store::postgres`.

use crate::error::Result;
use rusqlite::Connection;
use tracing::{debug, info};

/// Initial schema - Version 1
///
/// Creates all core tables:
/// - categories: Product groupings
/// - customers: Shop customers and their pets
/// - products: Inventory with pricing and stock levels
/// - users: Staff accounts with access levels
/// - sales: Sale headers (gross total, discount, payment)
/// - sale_items: Line items of each sale
pub fn migrate_v1(conn: &Connection) -> Result<()> {
    debug!("Creating schema version 1");

    conn.execute_batch(
        "
        CREATE TABLE categories (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL UNIQUE
        );

        -- Customers: document is a CPF (person) or CNPJ (company) number
        CREATE TABLE customers (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            document TEXT UNIQUE,
            email TEXT,
            phone TEXT,
            address TEXT,
            pet_name TEXT,
            pet_birth TEXT,
            created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
        );

        CREATE INDEX idx_customers_name ON customers(name);

        -- Products: prices in cents
        CREATE TABLE products (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            barcode TEXT UNIQUE,
            category_id INTEGER,
            cost_price INTEGER NOT NULL DEFAULT 0 CHECK(cost_price >= 0),
            sale_price INTEGER NOT NULL DEFAULT 0 CHECK(sale_price >= 0),
            stock INTEGER NOT NULL DEFAULT 0 CHECK(stock >= 0),
            min_stock INTEGER NOT NULL DEFAULT 0 CHECK(min_stock >= 0),
            supplier TEXT,
            FOREIGN KEY (category_id) REFERENCES categories(id) ON DELETE SET NULL
        );

        CREATE INDEX idx_products_name ON products(name);

        CREATE TABLE users (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            username TEXT NOT NULL UNIQUE,
            password_hash TEXT NOT NULL,
            name TEXT NOT NULL,
            access_level TEXT NOT NULL DEFAULT 'user'
                CHECK(access_level IN ('admin', 'owner', 'user')),
            created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
        );

        -- Sales: total is the gross sum of item subtotals
        CREATE TABLE sales (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            customer_id INTEGER,
            user_id INTEGER,
            sale_date TEXT NOT NULL,
            total INTEGER NOT NULL DEFAULT 0,
            discount INTEGER NOT NULL DEFAULT 0 CHECK(discount >= 0),
            payment_method TEXT NOT NULL
                CHECK(payment_method IN ('cash', 'credit_card', 'debit_card', 'pix')),
            FOREIGN KEY (customer_id) REFERENCES customers(id) ON DELETE SET NULL,
            FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE SET NULL
        );

        CREATE INDEX idx_sales_date ON sales(sale_date);
        CREATE INDEX idx_sales_customer ON sales(customer_id);

        CREATE TABLE sale_items (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            sale_id INTEGER NOT NULL,
            product_id INTEGER NOT NULL,
            quantity INTEGER NOT NULL CHECK(quantity > 0),
            unit_price INTEGER NOT NULL CHECK(unit_price >= 0),
            subtotal INTEGER NOT NULL,
            FOREIGN KEY (sale_id) REFERENCES sales(id) ON DELETE CASCADE,
            FOREIGN KEY (product_id) REFERENCES products(id) ON DELETE RESTRICT
        );

        CREATE INDEX idx_sale_items_sale ON sale_items(sale_id);
        CREATE INDEX idx_sale_items_product ON sale_items(product_id);
        ",
    )?;

    info!("Schema version 1 created successfully");
    Ok(())
}
