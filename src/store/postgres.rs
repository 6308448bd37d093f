// src/store/postgres.rs

//! Postgres store backed by an r2d2 connection pool
//!
//! Mirrors the SQLite models query for query. Money columns are BIGINT
//! cents, dates use native DATE/TIMESTAMP types, and aggregates are cast
//! back to BIGINT because Postgres widens `SUM(bigint)` to NUMERIC.

use super::Store;
use crate::Money;
use crate::config::{Backend, PostgresSection};
use crate::db::models::{
    AccessLevel, ActiveCustomer, BestSeller, Category, Customer, DailySales, Overview,
    PaymentMethod, Period, Product, ProfitSummary, PurchaseLine, Sale, SaleItem, SaleSummary,
    SalesReportRow, User, report,
};
use crate::error::{Error, Result};
use chrono::NaiveDate;
use postgres::error::SqlState;
use postgres::{GenericClient, NoTls, Row};
use r2d2::{Pool, PooledConnection};
use r2d2_postgres::PostgresConnectionManager;
use tracing::{debug, info};

type Manager = PostgresConnectionManager<NoTls>;

/// Database holding the catalog, used to create the shop database
const MAINTENANCE_DB: &str = "postgres";

const SCHEMA_VERSION: i32 = 1;

const SCHEMA_V1: &str = "
    CREATE TABLE IF NOT EXISTS categories (
        id BIGSERIAL PRIMARY KEY,
        name TEXT NOT NULL UNIQUE
    );

    CREATE TABLE IF NOT EXISTS customers (
        id BIGSERIAL PRIMARY KEY,
        name TEXT NOT NULL,
        document TEXT UNIQUE,
        email TEXT,
        phone TEXT,
        address TEXT,
        pet_name TEXT,
        pet_birth DATE,
        created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
    );
    CREATE INDEX IF NOT EXISTS idx_customers_name ON customers(name);

    CREATE TABLE IF NOT EXISTS products (
        id BIGSERIAL PRIMARY KEY,
        name TEXT NOT NULL,
        barcode TEXT UNIQUE,
        category_id BIGINT REFERENCES categories(id) ON DELETE SET NULL,
        cost_price BIGINT NOT NULL DEFAULT 0 CHECK (cost_price >= 0),
        sale_price BIGINT NOT NULL DEFAULT 0 CHECK (sale_price >= 0),
        stock BIGINT NOT NULL DEFAULT 0 CHECK (stock >= 0),
        min_stock BIGINT NOT NULL DEFAULT 0 CHECK (min_stock >= 0),
        supplier TEXT
    );
    CREATE INDEX IF NOT EXISTS idx_products_name ON products(name);

    CREATE TABLE IF NOT EXISTS users (
        id BIGSERIAL PRIMARY KEY,
        username TEXT NOT NULL UNIQUE,
        password_hash TEXT NOT NULL,
        name TEXT NOT NULL,
        access_level TEXT NOT NULL DEFAULT 'user'
            CHECK (access_level IN ('admin', 'owner', 'user')),
        created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
    );

    CREATE TABLE IF NOT EXISTS sales (
        id BIGSERIAL PRIMARY KEY,
        customer_id BIGINT REFERENCES customers(id) ON DELETE SET NULL,
        user_id BIGINT REFERENCES users(id) ON DELETE SET NULL,
        sale_date TIMESTAMP NOT NULL,
        total BIGINT NOT NULL DEFAULT 0,
        discount BIGINT NOT NULL DEFAULT 0 CHECK (discount >= 0),
        payment_method TEXT NOT NULL
            CHECK (payment_method IN ('cash', 'credit_card', 'debit_card', 'pix'))
    );
    CREATE INDEX IF NOT EXISTS idx_sales_date ON sales(sale_date);
    CREATE INDEX IF NOT EXISTS idx_sales_customer ON sales(customer_id);

    CREATE TABLE IF NOT EXISTS sale_items (
        id BIGSERIAL PRIMARY KEY,
        sale_id BIGINT NOT NULL REFERENCES sales(id) ON DELETE CASCADE,
        product_id BIGINT NOT NULL REFERENCES products(id) ON DELETE RESTRICT,
        quantity BIGINT NOT NULL CHECK (quantity > 0),
        unit_price BIGINT NOT NULL CHECK (unit_price >= 0),
        subtotal BIGINT NOT NULL
    );
    CREATE INDEX IF NOT EXISTS idx_sale_items_sale ON sale_items(sale_id);
    CREATE INDEX IF NOT EXISTS idx_sale_items_product ON sale_items(product_id);
";

const CUSTOMER_COLUMNS: &str = "id, name, document, email, phone, address, pet_name, pet_birth, \
                                created_at::TEXT";

const USER_COLUMNS: &str = "id, username, password_hash, name, access_level, created_at::TEXT";

const SELECT_PRODUCT: &str = "SELECT p.id, p.name, p.barcode, p.category_id, c.name, \
                              p.cost_price, p.sale_price, p.stock, p.min_stock, p.supplier \
                              FROM products p LEFT JOIN categories c ON p.category_id = c.id";

const SELECT_SUMMARY: &str = "SELECT s.id, s.sale_date, s.customer_id, c.name, u.name, \
                              s.total, s.discount, s.payment_method \
                              FROM sales s \
                              LEFT JOIN customers c ON s.customer_id = c.id \
                              LEFT JOIN users u ON s.user_id = u.id";

/// Postgres-backed store
pub struct PostgresStore {
    pool: Pool<Manager>,
}

impl PostgresStore {
    /// Connect to an existing database and bring its schema up to date
    pub fn open(settings: &PostgresSection) -> Result<Self> {
        let manager = PostgresConnectionManager::new(client_config(settings), NoTls);
        let pool = Pool::builder()
            .max_size(settings.max_connections)
            .min_idle(Some(settings.min_connections))
            .connection_timeout(settings.connect_timeout())
            .build(manager)?;

        let store = Self { pool };
        store.migrate()?;
        debug!("Connected to postgres at {}", settings.describe());
        Ok(store)
    }

    /// Create the database when missing, then open it
    pub fn initialize(settings: &PostgresSection) -> Result<Self> {
        let mut maintenance = client_config(settings);
        maintenance.dbname(MAINTENANCE_DB);
        let mut client = maintenance.connect(NoTls)?;

        let exists = client
            .query_opt(
                "SELECT 1 FROM pg_database WHERE datname = $1",
                &[&settings.dbname],
            )?
            .is_some();
        if !exists {
            client.batch_execute(&format!(
                "CREATE DATABASE {}",
                quote_ident(&settings.dbname)
            ))?;
            info!("Created database {}", settings.dbname);
        }
        drop(client);

        Self::open(settings)
    }

    fn conn(&self) -> Result<PooledConnection<Manager>> {
        Ok(self.pool.get()?)
    }

    fn migrate(&self) -> Result<()> {
        let mut conn = self.conn()?;
        conn.batch_execute(
            "CREATE TABLE IF NOT EXISTS schema_version (
                version INTEGER PRIMARY KEY,
                applied_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
            )",
        )?;

        let current: i32 = conn
            .query_one("SELECT COALESCE(MAX(version), 0) FROM schema_version", &[])?
            .try_get(0)?;
        if current >= SCHEMA_VERSION {
            debug!("Postgres schema is up to date (version {})", current);
            return Ok(());
        }

        let mut tx = conn.transaction()?;
        tx.batch_execute(SCHEMA_V1)?;
        tx.execute(
            "INSERT INTO schema_version (version) VALUES ($1)",
            &[&SCHEMA_VERSION],
        )?;
        tx.commit()?;
        info!("Postgres schema migrated to version {}", SCHEMA_VERSION);
        Ok(())
    }
}

/// Client settings for the configured server
pub(crate) fn client_config(settings: &PostgresSection) -> postgres::Config {
    let mut config = postgres::Config::new();
    config
        .host(&settings.host)
        .port(settings.port)
        .user(&settings.user)
        .dbname(&settings.dbname)
        .connect_timeout(settings.connect_timeout());
    if !settings.password.is_empty() {
        config.password(&settings.password);
    }
    config
}

/// Quote an SQL identifier
fn quote_ident(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

fn is_unique_violation(err: &postgres::Error) -> bool {
    err.code() == Some(&SqlState::UNIQUE_VIOLATION)
}

fn money(row: &Row, idx: usize) -> Result<Money> {
    Ok(Money::from_cents(row.try_get(idx)?))
}

fn parse_column<T>(row: &Row, idx: usize) -> Result<T>
where
    T: std::str::FromStr<Err = String>,
{
    let raw: String = row.try_get(idx)?;
    raw.parse().map_err(Error::InvalidInput)
}

fn customer_from_row(row: &Row) -> Result<Customer> {
    Ok(Customer {
        id: Some(row.try_get(0)?),
        name: row.try_get(1)?,
        document: row.try_get(2)?,
        email: row.try_get(3)?,
        phone: row.try_get(4)?,
        address: row.try_get(5)?,
        pet_name: row.try_get(6)?,
        pet_birth: row.try_get(7)?,
        created_at: row.try_get(8)?,
    })
}

fn product_from_row(row: &Row) -> Result<Product> {
    Ok(Product {
        id: Some(row.try_get(0)?),
        name: row.try_get(1)?,
        barcode: row.try_get(2)?,
        category_id: row.try_get(3)?,
        category_name: row.try_get(4)?,
        cost_price: money(row, 5)?,
        sale_price: money(row, 6)?,
        stock: row.try_get(7)?,
        min_stock: row.try_get(8)?,
        supplier: row.try_get(9)?,
    })
}

fn user_from_row(row: &Row) -> Result<User> {
    Ok(User {
        id: Some(row.try_get(0)?),
        username: row.try_get(1)?,
        password_hash: row.try_get(2)?,
        name: row.try_get(3)?,
        access_level: parse_column::<AccessLevel>(row, 4)?,
        created_at: row.try_get(5)?,
    })
}

fn summary_from_row(row: &Row) -> Result<SaleSummary> {
    Ok(SaleSummary {
        id: row.try_get(0)?,
        sale_date: row.try_get(1)?,
        customer_id: row.try_get(2)?,
        customer_name: row.try_get(3)?,
        seller_name: row.try_get(4)?,
        total: money(row, 5)?,
        discount: money(row, 6)?,
        payment_method: parse_column::<PaymentMethod>(row, 7)?,
    })
}

fn stock_failure(client: &mut impl GenericClient, id: i64, requested: i64) -> Result<Error> {
    let available = client.query_opt("SELECT stock FROM products WHERE id = $1", &[&id])?;
    Ok(match available {
        Some(row) => Error::InsufficientStock {
            product_id: id,
            requested,
            available: row.try_get(0)?,
        },
        None => Error::NotFound(format!("product {id}")),
    })
}

fn net_in(client: &mut impl GenericClient, period: &Period) -> Result<Money> {
    let row = client.query_one(
        "SELECT COALESCE(SUM(total - discount), 0)::BIGINT FROM sales \
         WHERE sale_date::DATE BETWEEN $1 AND $2",
        &[&period.start, &period.end],
    )?;
    money(&row, 0)
}

fn summaries(rows: Vec<Row>) -> Result<Vec<SaleSummary>> {
    rows.iter().map(summary_from_row).collect()
}

impl Store for PostgresStore {
    fn backend(&self) -> Backend {
        Backend::Postgres
    }

    fn save_customer(&self, customer: &mut Customer) -> Result<i64> {
        customer.validate()?;
        let mut conn = self.conn()?;
        let params: [&(dyn postgres::types::ToSql + Sync); 7] = [
            &customer.name,
            &customer.document,
            &customer.email,
            &customer.phone,
            &customer.address,
            &customer.pet_name,
            &customer.pet_birth,
        ];

        let result = match customer.id {
            None => conn
                .query_one(
                    "INSERT INTO customers (name, document, email, phone, address, pet_name, \
                     pet_birth) VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING id",
                    &params,
                )
                .and_then(|row| row.try_get::<_, i64>(0))
                .map(Some),
            Some(id) => {
                let mut all = params.to_vec();
                all.push(&id);
                conn.execute(
                    "UPDATE customers SET name = $1, document = $2, email = $3, phone = $4, \
                     address = $5, pet_name = $6, pet_birth = $7 WHERE id = $8",
                    &all,
                )
                .map(|changed| (changed > 0).then_some(id))
            }
        };

        match result {
            Ok(Some(id)) => {
                customer.id = Some(id);
                Ok(id)
            }
            Ok(None) => Err(Error::NotFound(format!(
                "customer {}",
                customer.id.unwrap_or_default()
            ))),
            Err(e) if is_unique_violation(&e) => Err(Error::ConflictError(format!(
                "a customer with document '{}' already exists",
                customer.document.as_deref().unwrap_or_default()
            ))),
            Err(e) => Err(e.into()),
        }
    }

    fn customer_by_id(&self, id: i64) -> Result<Option<Customer>> {
        let row = self.conn()?.query_opt(
            &format!("SELECT {CUSTOMER_COLUMNS} FROM customers WHERE id = $1"),
            &[&id],
        )?;
        row.as_ref().map(customer_from_row).transpose()
    }

    fn customer_by_document(&self, document: &str) -> Result<Option<Customer>> {
        let row = self.conn()?.query_opt(
            &format!("SELECT {CUSTOMER_COLUMNS} FROM customers WHERE document = $1"),
            &[&document],
        )?;
        row.as_ref().map(customer_from_row).transpose()
    }

    fn list_customers(&self) -> Result<Vec<Customer>> {
        let rows = self.conn()?.query(
            &format!("SELECT {CUSTOMER_COLUMNS} FROM customers ORDER BY name, id"),
            &[],
        )?;
        rows.iter().map(customer_from_row).collect()
    }

    fn purchase_history(&self, customer_id: i64) -> Result<Vec<PurchaseLine>> {
        let rows = self.conn()?.query(
            "SELECT s.id, s.sale_date, s.total, s.payment_method, p.name, si.quantity, \
             si.unit_price \
             FROM sales s \
             JOIN sale_items si ON s.id = si.sale_id \
             JOIN products p ON si.product_id = p.id \
             WHERE s.customer_id = $1 \
             ORDER BY s.sale_date DESC, s.id DESC, si.id",
            &[&customer_id],
        )?;
        rows.iter()
            .map(|row| {
                Ok(PurchaseLine {
                    sale_id: row.try_get(0)?,
                    sale_date: row.try_get(1)?,
                    sale_total: money(row, 2)?,
                    payment_method: parse_column(row, 3)?,
                    product_name: row.try_get(4)?,
                    quantity: row.try_get(5)?,
                    unit_price: money(row, 6)?,
                })
            })
            .collect()
    }

    fn delete_customer(&self, id: i64) -> Result<bool> {
        let removed = self
            .conn()?
            .execute("DELETE FROM customers WHERE id = $1", &[&id])?;
        Ok(removed > 0)
    }

    fn add_category(&self, category: &mut Category) -> Result<i64> {
        if category.name.trim().is_empty() {
            return Err(Error::InvalidInput("category name is required".to_string()));
        }
        let result = self.conn()?.query_one(
            "INSERT INTO categories (name) VALUES ($1) RETURNING id",
            &[&category.name],
        );
        match result {
            Ok(row) => {
                let id: i64 = row.try_get(0)?;
                category.id = Some(id);
                Ok(id)
            }
            Err(e) if is_unique_violation(&e) => Err(Error::ConflictError(format!(
                "category '{}' already exists",
                category.name
            ))),
            Err(e) => Err(e.into()),
        }
    }

    fn category_by_name(&self, name: &str) -> Result<Option<Category>> {
        let row = self
            .conn()?
            .query_opt("SELECT id, name FROM categories WHERE name = $1", &[&name])?;
        row.map(|row| {
            Ok(Category {
                id: Some(row.try_get(0)?),
                name: row.try_get(1)?,
            })
        })
        .transpose()
    }

    fn list_categories(&self) -> Result<Vec<Category>> {
        let rows = self
            .conn()?
            .query("SELECT id, name FROM categories ORDER BY name", &[])?;
        rows.iter()
            .map(|row| {
                Ok(Category {
                    id: Some(row.try_get(0)?),
                    name: row.try_get(1)?,
                })
            })
            .collect()
    }

    fn save_product(&self, product: &mut Product) -> Result<i64> {
        product.validate()?;
        let mut conn = self.conn()?;
        let cost = product.cost_price.cents();
        let price = product.sale_price.cents();
        let params: [&(dyn postgres::types::ToSql + Sync); 8] = [
            &product.name,
            &product.barcode,
            &product.category_id,
            &cost,
            &price,
            &product.stock,
            &product.min_stock,
            &product.supplier,
        ];

        let result = match product.id {
            None => conn
                .query_one(
                    "INSERT INTO products (name, barcode, category_id, cost_price, sale_price, \
                     stock, min_stock, supplier) VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
                     RETURNING id",
                    &params,
                )
                .and_then(|row| row.try_get::<_, i64>(0))
                .map(Some),
            Some(id) => {
                let mut all = params.to_vec();
                all.push(&id);
                conn.execute(
                    "UPDATE products SET name = $1, barcode = $2, category_id = $3, \
                     cost_price = $4, sale_price = $5, stock = $6, min_stock = $7, \
                     supplier = $8 WHERE id = $9",
                    &all,
                )
                .map(|changed| (changed > 0).then_some(id))
            }
        };

        match result {
            Ok(Some(id)) => {
                product.id = Some(id);
                Ok(id)
            }
            Ok(None) => Err(Error::NotFound(format!(
                "product {}",
                product.id.unwrap_or_default()
            ))),
            Err(e) if is_unique_violation(&e) => Err(Error::ConflictError(format!(
                "a product with barcode '{}' already exists",
                product.barcode.as_deref().unwrap_or_default()
            ))),
            Err(e) => Err(e.into()),
        }
    }

    fn product_by_id(&self, id: i64) -> Result<Option<Product>> {
        let row = self
            .conn()?
            .query_opt(&format!("{SELECT_PRODUCT} WHERE p.id = $1"), &[&id])?;
        row.as_ref().map(product_from_row).transpose()
    }

    fn product_by_barcode(&self, barcode: &str) -> Result<Option<Product>> {
        let row = self
            .conn()?
            .query_opt(&format!("{SELECT_PRODUCT} WHERE p.barcode = $1"), &[&barcode])?;
        row.as_ref().map(product_from_row).transpose()
    }

    fn list_products(&self) -> Result<Vec<Product>> {
        let rows = self
            .conn()?
            .query(&format!("{SELECT_PRODUCT} ORDER BY p.name, p.id"), &[])?;
        rows.iter().map(product_from_row).collect()
    }

    fn update_stock(&self, product_id: i64, delta: i64) -> Result<i64> {
        let mut conn = self.conn()?;
        let updated = conn.query_opt(
            "UPDATE products SET stock = stock + $1 WHERE id = $2 AND stock + $1 >= 0 \
             RETURNING stock",
            &[&delta, &product_id],
        )?;
        match updated {
            Some(row) => Ok(row.try_get(0)?),
            None => Err(stock_failure(&mut *conn, product_id, -delta)?),
        }
    }

    fn low_stock(&self) -> Result<Vec<Product>> {
        let rows = self.conn()?.query(
            &format!("{SELECT_PRODUCT} WHERE p.stock <= p.min_stock ORDER BY p.stock, p.name"),
            &[],
        )?;
        rows.iter().map(product_from_row).collect()
    }

    fn delete_product(&self, id: i64) -> Result<bool> {
        let mut conn = self.conn()?;
        let sold: i64 = conn
            .query_one(
                "SELECT COUNT(*) FROM sale_items WHERE product_id = $1",
                &[&id],
            )?
            .try_get(0)?;
        if sold > 0 {
            return Err(Error::ConflictError(format!(
                "product {id} appears in {sold} sale line(s) and cannot be deleted"
            )));
        }
        let removed = conn.execute("DELETE FROM products WHERE id = $1", &[&id])?;
        Ok(removed > 0)
    }

    fn save_user(&self, user: &mut User) -> Result<i64> {
        user.validate()?;
        let mut conn = self.conn()?;
        let level = user.access_level.as_str().to_string();

        let result = match user.id {
            None => conn
                .query_one(
                    "INSERT INTO users (username, password_hash, name, access_level) \
                     VALUES ($1, $2, $3, $4) RETURNING id",
                    &[&user.username, &user.password_hash, &user.name, &level],
                )
                .and_then(|row| row.try_get::<_, i64>(0))
                .map(Some),
            Some(id) => conn
                .execute(
                    "UPDATE users SET username = $1, password_hash = $2, name = $3, \
                     access_level = $4 WHERE id = $5",
                    &[&user.username, &user.password_hash, &user.name, &level, &id],
                )
                .map(|changed| (changed > 0).then_some(id)),
        };

        match result {
            Ok(Some(id)) => {
                user.id = Some(id);
                Ok(id)
            }
            Ok(None) => Err(Error::NotFound(format!(
                "user {}",
                user.id.unwrap_or_default()
            ))),
            Err(e) if is_unique_violation(&e) => Err(Error::ConflictError(format!(
                "username '{}' is already taken",
                user.username
            ))),
            Err(e) => Err(e.into()),
        }
    }

    fn user_by_id(&self, id: i64) -> Result<Option<User>> {
        let row = self.conn()?.query_opt(
            &format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"),
            &[&id],
        )?;
        row.as_ref().map(user_from_row).transpose()
    }

    fn user_by_username(&self, username: &str) -> Result<Option<User>> {
        let row = self.conn()?.query_opt(
            &format!("SELECT {USER_COLUMNS} FROM users WHERE username = $1"),
            &[&username],
        )?;
        row.as_ref().map(user_from_row).transpose()
    }

    fn list_users(&self) -> Result<Vec<User>> {
        let rows = self.conn()?.query(
            &format!("SELECT {USER_COLUMNS} FROM users ORDER BY name, id"),
            &[],
        )?;
        rows.iter().map(user_from_row).collect()
    }

    fn delete_user(&self, id: i64) -> Result<bool> {
        let removed = self
            .conn()?
            .execute("DELETE FROM users WHERE id = $1", &[&id])?;
        Ok(removed > 0)
    }

    fn save_sale(&self, sale: &mut Sale) -> Result<i64> {
        sale.validate_for_save()?;
        let mut conn = self.conn()?;
        let mut tx = conn.transaction()?;

        if let Some(customer_id) = sale.customer_id
            && tx
                .query_opt("SELECT 1 FROM customers WHERE id = $1", &[&customer_id])?
                .is_none()
        {
            return Err(Error::NotFound(format!("customer {customer_id}")));
        }

        let sale_id: i64 = tx
            .query_one(
                "INSERT INTO sales (customer_id, user_id, sale_date, total, discount, \
                 payment_method) VALUES ($1, $2, $3, $4, $5, $6) RETURNING id",
                &[
                    &sale.customer_id,
                    &sale.user_id,
                    &sale.sale_date,
                    &sale.total.cents(),
                    &sale.discount.cents(),
                    &sale.payment_method.as_str(),
                ],
            )?
            .try_get(0)?;

        for item in &sale.items {
            let updated = tx.execute(
                "UPDATE products SET stock = stock - $1 WHERE id = $2 AND stock >= $1",
                &[&item.quantity, &item.product_id],
            )?;
            if updated == 0 {
                return Err(stock_failure(&mut tx, item.product_id, item.quantity)?);
            }
            tx.execute(
                "INSERT INTO sale_items (sale_id, product_id, quantity, unit_price, subtotal) \
                 VALUES ($1, $2, $3, $4, $5)",
                &[
                    &sale_id,
                    &item.product_id,
                    &item.quantity,
                    &item.unit_price.cents(),
                    &item.subtotal.cents(),
                ],
            )?;
        }

        tx.commit()?;
        sale.id = Some(sale_id);
        info!(
            "Recorded sale {} ({} items, net {})",
            sale_id,
            sale.items.len(),
            sale.net_total()
        );
        Ok(sale_id)
    }

    fn sale_by_id(&self, id: i64) -> Result<Option<Sale>> {
        let mut conn = self.conn()?;
        let Some(row) = conn.query_opt(
            "SELECT id, customer_id, user_id, sale_date, total, discount, payment_method \
             FROM sales WHERE id = $1",
            &[&id],
        )?
        else {
            return Ok(None);
        };

        let items = conn
            .query(
                "SELECT si.product_id, si.quantity, si.unit_price, si.subtotal, p.name \
                 FROM sale_items si LEFT JOIN products p ON si.product_id = p.id \
                 WHERE si.sale_id = $1 ORDER BY si.id",
                &[&id],
            )?
            .iter()
            .map(|item| {
                Ok(SaleItem {
                    product_id: item.try_get(0)?,
                    quantity: item.try_get(1)?,
                    unit_price: money(item, 2)?,
                    subtotal: money(item, 3)?,
                    product_name: item.try_get(4)?,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Some(Sale {
            id: Some(row.try_get(0)?),
            customer_id: row.try_get(1)?,
            user_id: row.try_get(2)?,
            sale_date: row.try_get(3)?,
            total: money(&row, 4)?,
            discount: money(&row, 5)?,
            payment_method: parse_column(&row, 6)?,
            items,
        }))
    }

    fn sales_in_period(&self, period: &Period) -> Result<Vec<SaleSummary>> {
        let rows = self.conn()?.query(
            &format!(
                "{SELECT_SUMMARY} WHERE s.sale_date::DATE BETWEEN $1 AND $2 \
                 ORDER BY s.sale_date DESC, s.id DESC"
            ),
            &[&period.start, &period.end],
        )?;
        summaries(rows)
    }

    fn recent_sales(&self, limit: usize) -> Result<Vec<SaleSummary>> {
        let limit = limit as i64;
        let rows = self.conn()?.query(
            &format!("{SELECT_SUMMARY} ORDER BY s.sale_date DESC, s.id DESC LIMIT $1"),
            &[&limit],
        )?;
        summaries(rows)
    }

    fn delete_sale(&self, id: i64) -> Result<bool> {
        let mut conn = self.conn()?;
        let mut tx = conn.transaction()?;

        if tx
            .query_opt("SELECT 1 FROM sales WHERE id = $1", &[&id])?
            .is_none()
        {
            return Ok(false);
        }

        let items = tx.query(
            "SELECT product_id, quantity FROM sale_items WHERE sale_id = $1",
            &[&id],
        )?;
        for item in &items {
            let product_id: i64 = item.try_get(0)?;
            let quantity: i64 = item.try_get(1)?;
            tx.execute(
                "UPDATE products SET stock = stock + $1 WHERE id = $2",
                &[&quantity, &product_id],
            )?;
        }

        tx.execute("DELETE FROM sale_items WHERE sale_id = $1", &[&id])?;
        tx.execute("DELETE FROM sales WHERE id = $1", &[&id])?;
        tx.commit()?;
        info!("Voided sale {}", id);
        Ok(true)
    }

    fn sales_report(&self, period: &Period) -> Result<Vec<SalesReportRow>> {
        let rows = self.conn()?.query(
            "SELECT s.id, s.sale_date, COALESCE(c.name, 'N/A'), \
             COALESCE((SELECT STRING_AGG(p.name, ', ' ORDER BY si.id) \
                       FROM sale_items si JOIN products p ON si.product_id = p.id \
                       WHERE si.sale_id = s.id), ''), \
             s.total, s.discount, s.payment_method \
             FROM sales s LEFT JOIN customers c ON s.customer_id = c.id \
             WHERE s.sale_date::DATE BETWEEN $1 AND $2 \
             ORDER BY s.sale_date DESC, s.id DESC",
            &[&period.start, &period.end],
        )?;
        rows.iter()
            .map(|row| {
                let total = money(row, 4)?;
                let discount = money(row, 5)?;
                Ok(SalesReportRow {
                    sale_id: row.try_get(0)?,
                    sale_date: row.try_get(1)?,
                    customer_name: row.try_get(2)?,
                    products: row.try_get(3)?,
                    total,
                    discount,
                    net: total - discount,
                    payment_method: parse_column(row, 6)?,
                })
            })
            .collect()
    }

    fn best_sellers(&self, period: &Period, limit: usize) -> Result<Vec<BestSeller>> {
        let limit = limit as i64;
        let rows = self.conn()?.query(
            "SELECT p.id, p.name, SUM(si.quantity)::BIGINT, SUM(si.subtotal)::BIGINT, \
             (SUM(si.subtotal) - SUM(si.quantity * p.cost_price))::BIGINT \
             FROM sale_items si \
             JOIN sales s ON si.sale_id = s.id \
             JOIN products p ON si.product_id = p.id \
             WHERE s.sale_date::DATE BETWEEN $1 AND $2 \
             GROUP BY p.id, p.name \
             ORDER BY SUM(si.quantity) DESC, SUM(si.subtotal) DESC, p.name \
             LIMIT $3",
            &[&period.start, &period.end, &limit],
        )?;
        rows.iter()
            .map(|row| {
                Ok(BestSeller {
                    product_id: row.try_get(0)?,
                    name: row.try_get(1)?,
                    quantity: row.try_get(2)?,
                    revenue: money(row, 3)?,
                    profit: money(row, 4)?,
                })
            })
            .collect()
    }

    fn active_customers(&self, period: &Period, limit: usize) -> Result<Vec<ActiveCustomer>> {
        let limit = limit as i64;
        let rows = self.conn()?.query(
            "SELECT c.id, c.name, COUNT(s.id), SUM(s.total - s.discount)::BIGINT, \
             MAX(s.sale_date) \
             FROM sales s JOIN customers c ON s.customer_id = c.id \
             WHERE s.sale_date::DATE BETWEEN $1 AND $2 \
             GROUP BY c.id, c.name \
             ORDER BY COUNT(s.id) DESC, SUM(s.total - s.discount) DESC, c.name \
             LIMIT $3",
            &[&period.start, &period.end, &limit],
        )?;
        rows.iter()
            .map(|row| {
                Ok(ActiveCustomer {
                    customer_id: row.try_get(0)?,
                    name: row.try_get(1)?,
                    purchases: row.try_get(2)?,
                    total_spent: money(row, 3)?,
                    last_purchase: row.try_get(4)?,
                })
            })
            .collect()
    }

    fn profit_summary(&self, period: &Period) -> Result<ProfitSummary> {
        let mut conn = self.conn()?;
        let header = conn.query_one(
            "SELECT COUNT(*), COALESCE(SUM(total), 0)::BIGINT, \
             COALESCE(SUM(discount), 0)::BIGINT \
             FROM sales WHERE sale_date::DATE BETWEEN $1 AND $2",
            &[&period.start, &period.end],
        )?;
        let cost = conn.query_one(
            "SELECT COALESCE(SUM(si.quantity * p.cost_price), 0)::BIGINT \
             FROM sale_items si \
             JOIN sales s ON si.sale_id = s.id \
             JOIN products p ON si.product_id = p.id \
             WHERE s.sale_date::DATE BETWEEN $1 AND $2",
            &[&period.start, &period.end],
        )?;

        let gross_revenue = money(&header, 1)?;
        let discounts = money(&header, 2)?;
        let cost_of_goods = money(&cost, 0)?;
        let net_revenue = gross_revenue - discounts;
        Ok(ProfitSummary {
            sale_count: header.try_get(0)?,
            gross_revenue,
            discounts,
            net_revenue,
            cost_of_goods,
            profit: net_revenue - cost_of_goods,
        })
    }

    fn daily_sales(&self, period: &Period) -> Result<Vec<DailySales>> {
        let rows = self.conn()?.query(
            "SELECT sale_date::DATE, COUNT(*), SUM(total - discount)::BIGINT \
             FROM sales WHERE sale_date::DATE BETWEEN $1 AND $2 \
             GROUP BY sale_date::DATE ORDER BY sale_date::DATE",
            &[&period.start, &period.end],
        )?;
        rows.iter()
            .map(|row| {
                Ok(DailySales {
                    date: row.try_get(0)?,
                    sale_count: row.try_get(1)?,
                    net: money(row, 2)?,
                })
            })
            .collect()
    }

    fn overview(&self, today: NaiveDate) -> Result<Overview> {
        let month = Period::month_to_date(today);
        let (today_net, month_net, products_in_stock, active_customers) = {
            let mut conn = self.conn()?;
            let today_net = net_in(&mut *conn, &Period::single_day(today))?;
            let month_net = net_in(&mut *conn, &month)?;
            let products_in_stock: i64 = conn
                .query_one("SELECT COUNT(*) FROM products WHERE stock > 0", &[])?
                .try_get(0)?;
            let active_customers: i64 = conn
                .query_one(
                    "SELECT COUNT(DISTINCT customer_id) FROM sales \
                     WHERE customer_id IS NOT NULL AND sale_date::DATE BETWEEN $1 AND $2",
                    &[&month.start, &month.end],
                )?
                .try_get(0)?;
            (today_net, month_net, products_in_stock, active_customers)
        };

        Ok(Overview {
            today_net,
            products_in_stock,
            active_customers,
            month_net,
            recent_sales: self.recent_sales(report::RECENT_SALES)?,
        })
    }
}
