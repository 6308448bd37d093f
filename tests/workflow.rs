// tests/workflow.rs

//! Checkout, void and access-control workflow tests.

mod common;

use common::{CASHIER, CASHIER_PASSWORD, at, record_sale, setup_shop};
use supercash::auth::{Session, bootstrap};
use supercash::db::models::{AccessLevel, PaymentMethod, Sale};
use supercash::store::{SqliteStore, Store};
use supercash::{Error, Money};

#[test]
fn test_checkout_decrements_stock_and_records_items() {
    let (_dir, store, seed) = setup_shop();

    let session = Session::login(&store, CASHIER, CASHIER_PASSWORD).unwrap();
    let mut sale = Sale::new(PaymentMethod::Pix);
    sale.user_id = session.user_id();
    sale.customer_id = Some(seed.ana);
    sale.add_item(seed.dog_food, 2, Money::from_cents(18990)).unwrap();
    sale.add_item(seed.cat_toy, 1, Money::from_cents(1590)).unwrap();
    sale.apply_discount(Money::from_cents(570)).unwrap();
    assert_eq!(sale.total, Money::from_cents(39570));
    assert_eq!(sale.net_total(), Money::from_cents(39000));

    let id = store.save_sale(&mut sale).unwrap();
    assert_eq!(sale.id, Some(id));

    assert_eq!(store.product_by_id(seed.dog_food).unwrap().unwrap().stock, 8);
    assert_eq!(store.product_by_id(seed.cat_toy).unwrap().unwrap().stock, 3);

    let loaded = store.sale_by_id(id).unwrap().unwrap();
    assert_eq!(loaded.items.len(), 2);
    assert_eq!(loaded.payment_method, PaymentMethod::Pix);
    assert_eq!(loaded.user_id, Some(seed.cashier));
    assert_eq!(loaded.discount, Money::from_cents(570));
    assert_eq!(
        loaded.items[0].product_name.as_deref(),
        Some("Ração Cão Adulto 15kg")
    );

    let history = store.purchase_history(seed.ana).unwrap();
    assert_eq!(history.len(), 2);
    assert!(history.iter().all(|line| line.sale_id == id));
}

#[test]
fn test_insufficient_stock_rolls_back_whole_sale() {
    let (_dir, store, seed) = setup_shop();

    let mut sale = Sale::new(PaymentMethod::Cash);
    sale.add_item(seed.dog_food, 1, Money::from_cents(18990)).unwrap();
    sale.add_item(seed.cat_toy, 5, Money::from_cents(1590)).unwrap();

    let err = store.save_sale(&mut sale).unwrap_err();
    assert!(matches!(
        err,
        Error::InsufficientStock {
            requested: 5,
            available: 4,
            ..
        }
    ));
    assert_eq!(sale.id, None);

    // The first line's decrement must not survive
    assert_eq!(store.product_by_id(seed.dog_food).unwrap().unwrap().stock, 10);
    assert_eq!(store.product_by_id(seed.cat_toy).unwrap().unwrap().stock, 4);
    assert!(store.recent_sales(10).unwrap().is_empty());
}

#[test]
fn test_out_of_stock_product_cannot_be_sold() {
    let (_dir, store, seed) = setup_shop();

    let mut sale = Sale::new(PaymentMethod::DebitCard);
    sale.add_item(seed.shampoo, 1, Money::from_cents(2490)).unwrap();
    assert!(matches!(
        store.save_sale(&mut sale),
        Err(Error::InsufficientStock { available: 0, .. })
    ));
}

#[test]
fn test_sale_for_unknown_customer_is_rejected() {
    let (_dir, store, seed) = setup_shop();

    let mut sale = Sale::new(PaymentMethod::Cash);
    sale.customer_id = Some(9999);
    sale.add_item(seed.cat_toy, 1, Money::from_cents(1590)).unwrap();
    assert!(matches!(store.save_sale(&mut sale), Err(Error::NotFound(_))));
    assert_eq!(store.product_by_id(seed.cat_toy).unwrap().unwrap().stock, 4);
}

#[test]
fn test_void_restores_stock() {
    let (_dir, store, seed) = setup_shop();

    let id = record_sale(
        &store,
        at(2024, 5, 10, 14),
        Some(seed.bruno),
        &[(seed.dog_food, 3), (seed.cat_toy, 2)],
        Money::ZERO,
        PaymentMethod::CreditCard,
    );
    assert_eq!(store.product_by_id(seed.dog_food).unwrap().unwrap().stock, 7);

    assert!(store.delete_sale(id).unwrap());
    assert_eq!(store.product_by_id(seed.dog_food).unwrap().unwrap().stock, 10);
    assert_eq!(store.product_by_id(seed.cat_toy).unwrap().unwrap().stock, 4);
    assert!(store.sale_by_id(id).unwrap().is_none());

    // Voiding twice finds nothing
    assert!(!store.delete_sale(id).unwrap());
}

#[test]
fn test_sold_product_cannot_be_deleted() {
    let (_dir, store, seed) = setup_shop();
    record_sale(
        &store,
        at(2024, 5, 10, 9),
        None,
        &[(seed.cat_toy, 1)],
        Money::ZERO,
        PaymentMethod::Cash,
    );

    assert!(matches!(
        store.delete_product(seed.cat_toy),
        Err(Error::ConflictError(_))
    ));
    assert!(store.delete_product(seed.shampoo).unwrap());
}

#[test]
fn test_deleting_customer_keeps_sales() {
    let (_dir, store, seed) = setup_shop();
    let id = record_sale(
        &store,
        at(2024, 5, 11, 10),
        Some(seed.ana),
        &[(seed.cat_toy, 1)],
        Money::ZERO,
        PaymentMethod::Cash,
    );

    assert!(store.delete_customer(seed.ana).unwrap());
    let sale = store.sale_by_id(id).unwrap().unwrap();
    assert_eq!(sale.customer_id, None);
}

#[test]
fn test_sessions_and_permissions() {
    let (_dir, store, seed) = setup_shop();

    assert!(matches!(
        Session::login(&store, CASHIER, "wrong"),
        Err(Error::AuthFailed)
    ));
    assert!(matches!(
        Session::login(&store, "  ", "x"),
        Err(Error::InvalidInput(_))
    ));

    let cashier = Session::login(&store, CASHIER, CASHIER_PASSWORD).unwrap();
    assert_eq!(cashier.level(), AccessLevel::User);
    assert!(matches!(
        cashier.require_manager(),
        Err(Error::PermissionDenied(_))
    ));

    let admin = Session::login(
        &store,
        bootstrap::ADMIN_USERNAME,
        bootstrap::DEFAULT_ADMIN_PASSWORD,
    )
    .unwrap();
    admin.require_manager().unwrap();
    admin.ensure_not_self(seed.cashier).unwrap();
    let admin_id = admin.user_id().unwrap();
    assert!(matches!(
        admin.ensure_not_self(admin_id),
        Err(Error::PermissionDenied(_))
    ));
}

#[test]
fn test_admin_reset_keeps_sales_of_old_admin() {
    let (_dir, store, seed) = setup_shop();
    let admin = store
        .user_by_username(bootstrap::ADMIN_USERNAME)
        .unwrap()
        .unwrap();

    let mut sale = Sale::new(PaymentMethod::Cash);
    sale.user_id = admin.id;
    sale.add_item(seed.cat_toy, 1, Money::from_cents(1590)).unwrap();
    let sale_id = store.save_sale(&mut sale).unwrap();

    let new_admin = bootstrap::reset_admin(&store, "n0v4-senha").unwrap();
    assert_ne!(new_admin.id, admin.id);
    assert_eq!(store.sale_by_id(sale_id).unwrap().unwrap().user_id, None);
    assert!(matches!(
        bootstrap::check_admin(&store, "n0v4-senha").unwrap(),
        bootstrap::AdminCheck::Valid(_)
    ));
}

#[test]
fn test_store_survives_reopen() {
    let (dir, store, seed) = setup_shop();
    record_sale(
        &store,
        at(2024, 5, 12, 16),
        Some(seed.bruno),
        &[(seed.dog_food, 1)],
        Money::from_cents(990),
        PaymentMethod::Cash,
    );
    drop(store);

    let store = SqliteStore::open(dir.path().join("shop.db")).unwrap();
    let recent = store.recent_sales(5).unwrap();
    assert_eq!(recent.len(), 1);
    assert_eq!(recent[0].customer_name.as_deref(), Some("Bruno Lima"));
    assert_eq!(recent[0].net_total(), Money::from_cents(18000));
}
