// src/store/sqlite.rs

//! Single-file SQLite store
//!
//! Thin wrapper that serializes access to one connection and delegates to
//! the model methods in `db::models`.

use super::Store;
use crate::config::Backend;
use crate::db;
use crate::db::models::{
    self, ActiveCustomer, BestSeller, Category, Customer, DailySales, Overview, Period, Product,
    ProfitSummary, PurchaseLine, Sale, SaleSummary, SalesReportRow, User,
};
use crate::error::Result;
use chrono::NaiveDate;
use rusqlite::Connection;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

pub struct SqliteStore {
    conn: Mutex<Connection>,
    path: Option<PathBuf>,
}

impl SqliteStore {
    /// Open an existing database file
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let conn = db::open(path)?;
        db::schema::migrate(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
            path: Some(path.to_path_buf()),
        })
    }

    /// Create and migrate the database file, then open it
    pub fn initialize(path: impl AsRef<Path>) -> Result<Self> {
        db::init(path.as_ref())?;
        Self::open(path)
    }

    /// Fresh in-memory database with the full schema
    pub fn in_memory() -> Result<Self> {
        Ok(Self {
            conn: Mutex::new(db::open_in_memory()?),
            path: None,
        })
    }

    /// Database file, `None` for in-memory stores
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Store for SqliteStore {
    fn backend(&self) -> Backend {
        Backend::Sqlite
    }

    fn save_customer(&self, customer: &mut Customer) -> Result<i64> {
        customer.save(&self.conn())
    }

    fn customer_by_id(&self, id: i64) -> Result<Option<Customer>> {
        Customer::find_by_id(&self.conn(), id)
    }

    fn customer_by_document(&self, document: &str) -> Result<Option<Customer>> {
        Customer::find_by_document(&self.conn(), document)
    }

    fn list_customers(&self) -> Result<Vec<Customer>> {
        Customer::list_all(&self.conn())
    }

    fn purchase_history(&self, customer_id: i64) -> Result<Vec<PurchaseLine>> {
        Customer::purchase_history(&self.conn(), customer_id)
    }

    fn delete_customer(&self, id: i64) -> Result<bool> {
        Customer::delete(&self.conn(), id)
    }

    fn add_category(&self, category: &mut Category) -> Result<i64> {
        category.insert(&self.conn())
    }

    fn category_by_name(&self, name: &str) -> Result<Option<Category>> {
        Category::find_by_name(&self.conn(), name)
    }

    fn list_categories(&self) -> Result<Vec<Category>> {
        Category::list_all(&self.conn())
    }

    fn save_product(&self, product: &mut Product) -> Result<i64> {
        product.save(&self.conn())
    }

    fn product_by_id(&self, id: i64) -> Result<Option<Product>> {
        Product::find_by_id(&self.conn(), id)
    }

    fn product_by_barcode(&self, barcode: &str) -> Result<Option<Product>> {
        Product::find_by_barcode(&self.conn(), barcode)
    }

    fn list_products(&self) -> Result<Vec<Product>> {
        Product::list_all(&self.conn())
    }

    fn update_stock(&self, product_id: i64, delta: i64) -> Result<i64> {
        Product::update_stock(&self.conn(), product_id, delta)
    }

    fn low_stock(&self) -> Result<Vec<Product>> {
        Product::low_stock(&self.conn())
    }

    fn delete_product(&self, id: i64) -> Result<bool> {
        Product::delete(&self.conn(), id)
    }

    fn save_user(&self, user: &mut User) -> Result<i64> {
        user.save(&self.conn())
    }

    fn user_by_id(&self, id: i64) -> Result<Option<User>> {
        User::find_by_id(&self.conn(), id)
    }

    fn user_by_username(&self, username: &str) -> Result<Option<User>> {
        User::find_by_username(&self.conn(), username)
    }

    fn list_users(&self) -> Result<Vec<User>> {
        User::list_all(&self.conn())
    }

    fn delete_user(&self, id: i64) -> Result<bool> {
        User::delete(&self.conn(), id)
    }

    fn authenticate(&self, username: &str, password: &str) -> Result<Option<User>> {
        User::authenticate(&self.conn(), username, password)
    }

    fn save_sale(&self, sale: &mut Sale) -> Result<i64> {
        sale.save(&mut self.conn())
    }

    fn sale_by_id(&self, id: i64) -> Result<Option<Sale>> {
        Sale::find_by_id(&self.conn(), id)
    }

    fn sales_in_period(&self, period: &Period) -> Result<Vec<SaleSummary>> {
        Sale::in_period(&self.conn(), period)
    }

    fn recent_sales(&self, limit: usize) -> Result<Vec<SaleSummary>> {
        Sale::recent(&self.conn(), limit)
    }

    fn delete_sale(&self, id: i64) -> Result<bool> {
        Sale::delete(&mut self.conn(), id)
    }

    fn sales_report(&self, period: &Period) -> Result<Vec<SalesReportRow>> {
        models::report::sales_report(&self.conn(), period)
    }

    fn best_sellers(&self, period: &Period, limit: usize) -> Result<Vec<BestSeller>> {
        models::report::best_sellers(&self.conn(), period, limit)
    }

    fn active_customers(&self, period: &Period, limit: usize) -> Result<Vec<ActiveCustomer>> {
        models::report::active_customers(&self.conn(), period, limit)
    }

    fn profit_summary(&self, period: &Period) -> Result<ProfitSummary> {
        models::report::profit_summary(&self.conn(), period)
    }

    fn daily_sales(&self, period: &Period) -> Result<Vec<DailySales>> {
        models::report::daily_sales(&self.conn(), period)
    }

    fn overview(&self, today: NaiveDate) -> Result<Overview> {
        models::report::overview(&self.conn(), today)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Money;
    use crate::db::models::PaymentMethod;

    #[test]
    fn test_initialize_then_open() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data").join("shop.db");

        let store = SqliteStore::initialize(&path).unwrap();
        assert_eq!(store.path(), Some(path.as_path()));
        let mut cat = Category::new("Higiene".to_string());
        store.add_category(&mut cat).unwrap();
        drop(store);

        let store = SqliteStore::open(&path).unwrap();
        assert!(store.category_by_name("Higiene").unwrap().is_some());
    }

    #[test]
    fn test_sale_through_store() {
        let store = SqliteStore::in_memory().unwrap();
        let mut product = Product::new("Ração".to_string(), Money::from_cents(2000));
        product.stock = 3;
        let pid = store.save_product(&mut product).unwrap();

        let mut sale = Sale::new(PaymentMethod::Cash);
        sale.add_item(pid, 3, product.sale_price).unwrap();
        let id = store.save_sale(&mut sale).unwrap();
        assert_eq!(store.product_by_id(pid).unwrap().unwrap().stock, 0);

        assert!(store.delete_sale(id).unwrap());
        assert_eq!(store.product_by_id(pid).unwrap().unwrap().stock, 3);
    }
}
