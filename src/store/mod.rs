// src/store/mod.rs

//! Storage backends
//!
//! Every persistence operation the application performs goes through the
//! [`Store`] trait. [`SqliteStore`] keeps everything in a single file;
//! `PostgresStore` (feature `postgres`) talks to a server through a
//! connection pool. Both apply the same validation and transaction
//! boundaries, so callers never branch on the backend.

mod sqlite;
#[cfg(feature = "postgres")]
mod postgres;

pub use sqlite::SqliteStore;
#[cfg(feature = "postgres")]
pub use self::postgres::PostgresStore;

use crate::config::{Backend, Config};
use crate::db::models::{
    ActiveCustomer, BestSeller, Category, Customer, DailySales, Overview, Period, Product,
    ProfitSummary, PurchaseLine, Sale, SaleSummary, SalesReportRow, User,
};
use crate::error::{Error, Result};
use chrono::NaiveDate;
use tracing::info;

/// Persistence operations shared by all backends
pub trait Store: Send + Sync {
    fn backend(&self) -> Backend;

    // Customers

    /// Insert or update; returns the id
    fn save_customer(&self, customer: &mut Customer) -> Result<i64>;
    fn customer_by_id(&self, id: i64) -> Result<Option<Customer>>;
    fn customer_by_document(&self, document: &str) -> Result<Option<Customer>>;
    /// All customers ordered by name
    fn list_customers(&self) -> Result<Vec<Customer>>;
    fn purchase_history(&self, customer_id: i64) -> Result<Vec<PurchaseLine>>;
    fn delete_customer(&self, id: i64) -> Result<bool>;

    /// Case-insensitive substring search on name and document
    fn search_customers(&self, query: &str) -> Result<Vec<Customer>> {
        let needle = query.trim().to_lowercase();
        Ok(self
            .list_customers()?
            .into_iter()
            .filter(|c| c.matches(&needle))
            .collect())
    }

    // Categories

    fn add_category(&self, category: &mut Category) -> Result<i64>;
    fn category_by_name(&self, name: &str) -> Result<Option<Category>>;
    fn list_categories(&self) -> Result<Vec<Category>>;

    // Products

    fn save_product(&self, product: &mut Product) -> Result<i64>;
    fn product_by_id(&self, id: i64) -> Result<Option<Product>>;
    fn product_by_barcode(&self, barcode: &str) -> Result<Option<Product>>;
    fn list_products(&self) -> Result<Vec<Product>>;
    /// Add `delta` units (negative to subtract); never leaves stock below zero
    fn update_stock(&self, product_id: i64, delta: i64) -> Result<i64>;
    fn low_stock(&self) -> Result<Vec<Product>>;
    /// Refused with a conflict when the product appears in a sale
    fn delete_product(&self, id: i64) -> Result<bool>;

    /// Case-insensitive substring search on name, barcode and supplier
    fn search_products(&self, query: &str) -> Result<Vec<Product>> {
        let needle = query.trim().to_lowercase();
        Ok(self
            .list_products()?
            .into_iter()
            .filter(|p| p.matches(&needle))
            .collect())
    }

    // Users

    fn save_user(&self, user: &mut User) -> Result<i64>;
    fn user_by_id(&self, id: i64) -> Result<Option<User>>;
    fn user_by_username(&self, username: &str) -> Result<Option<User>>;
    fn list_users(&self) -> Result<Vec<User>>;
    fn delete_user(&self, id: i64) -> Result<bool>;

    /// Look up `username` and verify `password`
    fn authenticate(&self, username: &str, password: &str) -> Result<Option<User>> {
        match self.user_by_username(username)? {
            Some(user) if user.verify_password(password)? => Ok(Some(user)),
            _ => Ok(None),
        }
    }

    // Sales

    /// Record header, items and stock decrements in one transaction
    fn save_sale(&self, sale: &mut Sale) -> Result<i64>;
    fn sale_by_id(&self, id: i64) -> Result<Option<Sale>>;
    fn sales_in_period(&self, period: &Period) -> Result<Vec<SaleSummary>>;
    fn recent_sales(&self, limit: usize) -> Result<Vec<SaleSummary>>;
    /// Restore stock and remove the sale in one transaction
    fn delete_sale(&self, id: i64) -> Result<bool>;

    // Reports

    fn sales_report(&self, period: &Period) -> Result<Vec<SalesReportRow>>;
    fn best_sellers(&self, period: &Period, limit: usize) -> Result<Vec<BestSeller>>;
    fn active_customers(&self, period: &Period, limit: usize) -> Result<Vec<ActiveCustomer>>;
    fn profit_summary(&self, period: &Period) -> Result<ProfitSummary>;
    fn daily_sales(&self, period: &Period) -> Result<Vec<DailySales>>;
    fn overview(&self, today: NaiveDate) -> Result<Overview>;
}

/// Open the configured backend; the database must already exist
pub fn open(config: &Config) -> Result<Box<dyn Store>> {
    match config.database.backend {
        Backend::Sqlite => Ok(Box::new(SqliteStore::open(config.db_path())?)),
        Backend::Postgres => open_postgres(config, false),
    }
}

/// Create the configured database if needed and bring its schema up to date
pub fn initialize(config: &Config) -> Result<Box<dyn Store>> {
    let store: Box<dyn Store> = match config.database.backend {
        Backend::Sqlite => Box::new(SqliteStore::initialize(config.db_path())?),
        Backend::Postgres => open_postgres(config, true)?,
    };
    info!("Initialized {} store", store.backend());
    Ok(store)
}

#[cfg(feature = "postgres")]
fn open_postgres(config: &Config, initialize: bool) -> Result<Box<dyn Store>> {
    let pg = &config.database.postgres;
    let store = if initialize {
        PostgresStore::initialize(pg)?
    } else {
        PostgresStore::open(pg)?
    };
    Ok(Box::new(store))
}

#[cfg(not(feature = "postgres"))]
fn open_postgres(_config: &Config, _initialize: bool) -> Result<Box<dyn Store>> {
    Err(Error::ConfigError(
        "postgres backend requested but supercash was built without the 'postgres' feature"
            .to_string(),
    ))
}

/// Fail with `NotFound` when `value` is `None`
pub fn require<T>(value: Option<T>, what: impl FnOnce() -> String) -> Result<T> {
    value.ok_or_else(|| Error::NotFound(what()))
}
