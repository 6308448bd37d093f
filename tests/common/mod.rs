// tests/common/mod.rs

//! Shared fixtures for integration tests.

#![allow(dead_code)]

use chrono::{NaiveDate, NaiveDateTime};
use supercash::Money;
use supercash::auth::bootstrap;
use supercash::db::models::{AccessLevel, Category, Customer, PaymentMethod, Product, Sale, User};
use supercash::store::{SqliteStore, Store};
use tempfile::TempDir;

pub const CASHIER: &str = "maria";
pub const CASHIER_PASSWORD: &str = "caixa-123";

/// Ids of the seeded records
pub struct Seed {
    pub dog_food: i64,
    pub cat_toy: i64,
    pub shampoo: i64,
    pub ana: i64,
    pub bruno: i64,
    pub cashier: i64,
}

/// Create a store on disk with a small pet shop catalog.
///
/// Returns (TempDir, store, ids) - keep the TempDir alive to prevent cleanup.
pub fn setup_shop() -> (TempDir, SqliteStore, Seed) {
    let temp_dir = tempfile::tempdir().unwrap();
    let store = SqliteStore::initialize(temp_dir.path().join("shop.db")).unwrap();

    let mut food = Category::new("Alimentos".to_string());
    let food_id = store.add_category(&mut food).unwrap();
    let mut toys = Category::new("Brinquedos".to_string());
    let toys_id = store.add_category(&mut toys).unwrap();

    let mut dog_food = Product::new("Ração Cão Adulto 15kg".to_string(), Money::from_cents(18990));
    dog_food.barcode = Some("7891000000011".to_string());
    dog_food.category_id = Some(food_id);
    dog_food.cost_price = Money::from_cents(12000);
    dog_food.stock = 10;
    dog_food.min_stock = 3;
    dog_food.supplier = Some("PetFoods Ltda".to_string());
    let dog_food_id = store.save_product(&mut dog_food).unwrap();

    let mut cat_toy = Product::new("Ratinho de Pelúcia".to_string(), Money::from_cents(1590));
    cat_toy.barcode = Some("7891000000028".to_string());
    cat_toy.category_id = Some(toys_id);
    cat_toy.cost_price = Money::from_cents(600);
    cat_toy.stock = 4;
    cat_toy.min_stock = 5;
    let cat_toy_id = store.save_product(&mut cat_toy).unwrap();

    let mut shampoo = Product::new("Shampoo Neutro".to_string(), Money::from_cents(2490));
    shampoo.barcode = Some("7891000000035".to_string());
    shampoo.cost_price = Money::from_cents(1100);
    shampoo.stock = 0;
    let shampoo_id = store.save_product(&mut shampoo).unwrap();

    let mut ana = Customer::new("Ana Souza".to_string());
    ana.document = Some("123.456.789-09".to_string());
    ana.pet_name = Some("Thor".to_string());
    let ana_id = store.save_customer(&mut ana).unwrap();

    let mut bruno = Customer::new("Bruno Lima".to_string());
    bruno.document = Some("987.654.321-00".to_string());
    let bruno_id = store.save_customer(&mut bruno).unwrap();

    bootstrap::ensure_admin(&store, bootstrap::DEFAULT_ADMIN_PASSWORD).unwrap();
    let mut cashier = User::new(
        CASHIER.to_string(),
        CASHIER_PASSWORD,
        "Maria Caixa".to_string(),
        AccessLevel::User,
    )
    .unwrap();
    let cashier_id = store.save_user(&mut cashier).unwrap();

    let seed = Seed {
        dog_food: dog_food_id,
        cat_toy: cat_toy_id,
        shampoo: shampoo_id,
        ana: ana_id,
        bruno: bruno_id,
        cashier: cashier_id,
    };
    (temp_dir, store, seed)
}

pub fn at(y: i32, m: u32, d: u32, h: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d)
        .unwrap()
        .and_hms_opt(h, 0, 0)
        .unwrap()
}

/// Record a sale dated `when` with `(product_id, quantity)` lines at catalog price
pub fn record_sale(
    store: &dyn Store,
    when: NaiveDateTime,
    customer_id: Option<i64>,
    lines: &[(i64, i64)],
    discount: Money,
    payment: PaymentMethod,
) -> i64 {
    let mut sale = Sale::new(payment);
    sale.sale_date = when;
    sale.customer_id = customer_id;
    for &(product_id, quantity) in lines {
        let price = store.product_by_id(product_id).unwrap().unwrap().sale_price;
        sale.add_item(product_id, quantity, price).unwrap();
    }
    sale.apply_discount(discount).unwrap();
    store.save_sale(&mut sale).unwrap()
}
