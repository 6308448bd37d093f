// src/db/models/mod.rs

//! Data models for the shop database
//!
//! This module defines Rust structs that correspond to database tables
//! and provides methods for creating, reading, updating, and deleting records.

mod category;
mod customer;
mod product;
pub mod report;
mod sale;
mod user;

pub use category::Category;
pub use customer::{Customer, PurchaseLine};
pub use product::{Product, StockLevel};
pub use report::{
    ActiveCustomer, BestSeller, DailySales, Overview, Period, ProfitSummary, SalesReportRow,
};
pub use sale::{PaymentMethod, Sale, SaleItem, SaleSummary};
pub use user::{AccessLevel, User};

use rusqlite::Row;
use std::str::FromStr;

/// Read a text column and parse it into one of the model enums
pub(crate) fn parse_enum<T>(row: &Row, idx: usize) -> rusqlite::Result<T>
where
    T: FromStr<Err = String>,
{
    let raw: String = row.get(idx)?;
    raw.parse::<T>().map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(
            idx,
            rusqlite::types::Type::Text,
            Box::new(std::io::Error::new(std::io::ErrorKind::InvalidData, e)),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;
    use crate::error::Error;
    use crate::Money;
    use chrono::NaiveDate;
    use rusqlite::Connection;

    fn create_test_db() -> Connection {
        db::open_in_memory().unwrap()
    }

    fn stocked_product(conn: &Connection, name: &str, barcode: &str, stock: i64) -> Product {
        let mut product = Product::new(name.to_string(), Money::from_cents(1500));
        product.barcode = Some(barcode.to_string());
        product.cost_price = Money::from_cents(900);
        product.stock = stock;
        product.min_stock = 2;
        product.save(conn).unwrap();
        product
    }

    fn sale_at(date: &str, payment: PaymentMethod) -> Sale {
        let mut sale = Sale::new(payment);
        sale.sale_date = NaiveDate::parse_from_str(date, "%Y-%m-%d")
            .unwrap()
            .and_hms_opt(10, 30, 0)
            .unwrap();
        sale
    }

    #[test]
    fn test_customer_crud() {
        let conn = create_test_db();

        let mut customer = Customer::new("Ana Souza".to_string());
        customer.document = Some("123.456.789-00".to_string());
        customer.pet_name = Some("Rex".to_string());
        customer.pet_birth = NaiveDate::from_ymd_opt(2020, 5, 17);

        let id = customer.save(&conn).unwrap();
        assert!(id > 0);
        assert_eq!(customer.id, Some(id));

        let found = Customer::find_by_id(&conn, id).unwrap().unwrap();
        assert_eq!(found.name, "Ana Souza");
        assert_eq!(found.pet_birth, NaiveDate::from_ymd_opt(2020, 5, 17));
        assert!(found.created_at.is_some());

        let by_doc = Customer::find_by_document(&conn, "123.456.789-00")
            .unwrap()
            .unwrap();
        assert_eq!(by_doc.id, Some(id));

        customer.phone = Some("11 99999-0000".to_string());
        customer.save(&conn).unwrap();
        let updated = Customer::find_by_id(&conn, id).unwrap().unwrap();
        assert_eq!(updated.phone.as_deref(), Some("11 99999-0000"));

        assert!(Customer::delete(&conn, id).unwrap());
        assert!(Customer::find_by_id(&conn, id).unwrap().is_none());
        assert!(!Customer::delete(&conn, id).unwrap());
    }

    #[test]
    fn test_customer_duplicate_document() {
        let conn = create_test_db();

        let mut first = Customer::new("Ana".to_string());
        first.document = Some("111".to_string());
        first.save(&conn).unwrap();

        let mut second = Customer::new("Bruno".to_string());
        second.document = Some("111".to_string());
        let err = second.save(&conn).unwrap_err();
        assert!(matches!(err, Error::ConflictError(_)));
    }

    #[test]
    fn test_customer_requires_name() {
        let conn = create_test_db();
        let mut customer = Customer::new("   ".to_string());
        assert!(matches!(
            customer.save(&conn).unwrap_err(),
            Error::InvalidInput(_)
        ));
    }

    #[test]
    fn test_category_unique_name() {
        let conn = create_test_db();

        let mut food = Category::new("Ração".to_string());
        food.insert(&conn).unwrap();
        Category::new("Brinquedos".to_string()).insert(&conn).unwrap();

        let dup = Category::new("Ração".to_string()).insert(&conn);
        assert!(matches!(dup, Err(Error::ConflictError(_))));

        let names: Vec<_> = Category::list_all(&conn)
            .unwrap()
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names, vec!["Brinquedos", "Ração"]);
    }

    #[test]
    fn test_product_crud_with_category() {
        let conn = create_test_db();

        let mut category = Category::new("Ração".to_string());
        let category_id = category.insert(&conn).unwrap();

        let mut product = Product::new("Ração Premium 10kg".to_string(), Money::from_cents(15990));
        product.barcode = Some("7891000100103".to_string());
        product.category_id = Some(category_id);
        product.stock = 5;
        let id = product.save(&conn).unwrap();

        let found = Product::find_by_barcode(&conn, "7891000100103")
            .unwrap()
            .unwrap();
        assert_eq!(found.id, Some(id));
        assert_eq!(found.category_name.as_deref(), Some("Ração"));
        assert_eq!(found.sale_price, Money::from_cents(15990));

        let mut dup = Product::new("Other".to_string(), Money::ZERO);
        dup.barcode = Some("7891000100103".to_string());
        assert!(matches!(dup.save(&conn), Err(Error::ConflictError(_))));

        assert!(Product::delete(&conn, id).unwrap());
        assert!(Product::find_by_id(&conn, id).unwrap().is_none());
    }

    #[test]
    fn test_blank_barcode_is_rejected() {
        let conn = create_test_db();

        let mut product = Product::new("Comedouro".to_string(), Money::from_cents(2500));
        product.barcode = Some("  ".to_string());
        assert!(matches!(product.save(&conn), Err(Error::InvalidInput(_))));
        assert!(Product::list_all(&conn).unwrap().is_empty());

        product.barcode = None;
        product.save(&conn).unwrap();
        let mut other = Product::new("Bebedouro".to_string(), Money::from_cents(2200));
        other.save(&conn).unwrap();
        assert_eq!(Product::list_all(&conn).unwrap().len(), 2);
    }

    #[test]
    fn test_product_stock_levels() {
        let conn = create_test_db();

        let empty = stocked_product(&conn, "Coleira", "1", 0);
        let low = stocked_product(&conn, "Shampoo", "2", 2);
        let fine = stocked_product(&conn, "Petisco", "3", 40);

        assert_eq!(empty.stock_level(), StockLevel::Out);
        assert_eq!(low.stock_level(), StockLevel::Low);
        assert_eq!(fine.stock_level(), StockLevel::Ok);

        let names: Vec<_> = Product::low_stock(&conn)
            .unwrap()
            .into_iter()
            .map(|p| p.name)
            .collect();
        assert_eq!(names, vec!["Coleira", "Shampoo"]);
    }

    #[test]
    fn test_update_stock_never_negative() {
        let conn = create_test_db();
        let product = stocked_product(&conn, "Areia", "10", 3);
        let id = product.id.unwrap();

        assert_eq!(Product::update_stock(&conn, id, 4).unwrap(), 7);
        assert_eq!(Product::update_stock(&conn, id, -7).unwrap(), 0);

        let err = Product::update_stock(&conn, id, -1).unwrap_err();
        assert!(matches!(
            err,
            Error::InsufficientStock {
                requested: 1,
                available: 0,
                ..
            }
        ));

        let missing = Product::update_stock(&conn, 9999, 1).unwrap_err();
        assert!(matches!(missing, Error::NotFound(_)));
    }

    #[test]
    fn test_user_crud_and_authenticate() {
        let conn = create_test_db();

        let mut user = User::new(
            "maria".to_string(),
            "s3cret",
            "Maria Lima".to_string(),
            AccessLevel::User,
        )
        .unwrap();
        assert!(user.password_hash.starts_with("$pbkdf2-sha256$"));
        let id = user.save(&conn).unwrap();

        let ok = User::authenticate(&conn, "maria", "s3cret").unwrap();
        assert_eq!(ok.map(|u| u.id), Some(Some(id)));
        assert!(User::authenticate(&conn, "maria", "wrong").unwrap().is_none());
        assert!(User::authenticate(&conn, "nobody", "s3cret").unwrap().is_none());

        let dup = User::new(
            "maria".to_string(),
            "x",
            "Other".to_string(),
            AccessLevel::Admin,
        )
        .unwrap()
        .save(&conn);
        assert!(matches!(dup, Err(Error::ConflictError(_))));

        user.set_password("n3w").unwrap();
        user.access_level = AccessLevel::Owner;
        user.save(&conn).unwrap();
        let reloaded = User::find_by_id(&conn, id).unwrap().unwrap();
        assert_eq!(reloaded.access_level, AccessLevel::Owner);
        assert!(reloaded.verify_password("n3w").unwrap());

        assert!(User::delete(&conn, id).unwrap());
        assert!(User::find_by_username(&conn, "maria").unwrap().is_none());
    }

    #[test]
    fn test_user_rejects_empty_password() {
        let err = User::new(
            "joao".to_string(),
            "",
            "João".to_string(),
            AccessLevel::User,
        )
        .unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[test]
    fn test_user_debug_hides_hash() {
        let user = User::new(
            "ana".to_string(),
            "pw",
            "Ana".to_string(),
            AccessLevel::User,
        )
        .unwrap();
        let debug = format!("{user:?}");
        assert!(!debug.contains(&user.password_hash));
        assert!(debug.contains("<redacted>"));
    }

    #[test]
    fn test_access_level_parse() {
        assert_eq!("ADMIN".parse::<AccessLevel>().unwrap(), AccessLevel::Admin);
        assert_eq!("".parse::<AccessLevel>().unwrap(), AccessLevel::User);
        assert!("root".parse::<AccessLevel>().is_err());
        assert!(AccessLevel::Owner.is_manager());
        assert!(!AccessLevel::User.is_manager());
    }

    #[test]
    fn test_payment_method_parse() {
        assert_eq!("pix".parse::<PaymentMethod>().unwrap(), PaymentMethod::Pix);
        assert_eq!(
            "Cartão de Crédito".parse::<PaymentMethod>().unwrap(),
            PaymentMethod::CreditCard
        );
        assert_eq!(
            "debit-card".parse::<PaymentMethod>().unwrap(),
            PaymentMethod::DebitCard
        );
        assert_eq!("Dinheiro".parse::<PaymentMethod>().unwrap(), PaymentMethod::Cash);
        assert!("cheque".parse::<PaymentMethod>().is_err());
        assert_eq!(PaymentMethod::CreditCard.to_string(), "Cartão de Crédito");
    }

    #[test]
    fn test_sale_rejects_overflowing_lines() {
        let mut sale = Sale::new(PaymentMethod::Cash);
        assert!(matches!(
            sale.add_item(1, i64::MAX / 2, Money::from_cents(300)),
            Err(Error::InvalidInput(_))
        ));
        assert!(sale.items.is_empty());
        assert_eq!(sale.total, Money::ZERO);

        sale.add_item(1, 1, Money::from_cents(i64::MAX - 10)).unwrap();
        assert!(matches!(
            sale.add_item(2, 1, Money::from_cents(11)),
            Err(Error::InvalidInput(_))
        ));
        assert_eq!(sale.items.len(), 1);
        assert_eq!(sale.total, Money::from_cents(i64::MAX - 10));
    }

    #[test]
    fn test_sale_cart_arithmetic() {
        let mut sale = Sale::new(PaymentMethod::Cash);
        assert_eq!(
            sale.add_item(1, 3, Money::from_cents(250)).unwrap(),
            Money::from_cents(750)
        );
        sale.add_item(2, 1, Money::from_cents(1000)).unwrap();
        assert_eq!(sale.total, Money::from_cents(1750));

        assert!(sale.add_item(3, 0, Money::from_cents(100)).is_err());
        assert!(sale.add_item(3, 1, Money::from_cents(-1)).is_err());

        let removed = sale.remove_item(0).unwrap();
        assert_eq!(removed.product_id, 1);
        assert_eq!(sale.total, Money::from_cents(1000));
        assert!(sale.remove_item(5).is_none());

        sale.apply_discount(Money::from_cents(200)).unwrap();
        assert_eq!(sale.net_total(), Money::from_cents(800));
        assert!(matches!(
            sale.apply_discount(Money::from_cents(1001)),
            Err(Error::DiscountExceedsTotal { .. })
        ));
        assert!(sale.apply_discount(Money::from_cents(-5)).is_err());
        assert_eq!(sale.discount, Money::from_cents(200));
    }

    #[test]
    fn test_sale_save_and_find() {
        let mut conn = create_test_db();
        let product = stocked_product(&conn, "Ração", "100", 10);
        let pid = product.id.unwrap();

        let mut customer = Customer::new("Ana".to_string());
        let cid = customer.save(&conn).unwrap();

        let mut sale = Sale::new(PaymentMethod::Pix);
        sale.customer_id = Some(cid);
        sale.add_item(pid, 4, product.sale_price).unwrap();
        sale.apply_discount(Money::from_cents(500)).unwrap();
        let id = sale.save(&mut conn).unwrap();
        assert_eq!(sale.id, Some(id));

        let stored = Sale::find_by_id(&conn, id).unwrap().unwrap();
        assert_eq!(stored.total, Money::from_cents(6000));
        assert_eq!(stored.discount, Money::from_cents(500));
        assert_eq!(stored.payment_method, PaymentMethod::Pix);
        assert_eq!(stored.items.len(), 1);
        assert_eq!(stored.items[0].product_name.as_deref(), Some("Ração"));
        assert_eq!(stored.sale_date, sale.sale_date);

        let remaining = Product::find_by_id(&conn, pid).unwrap().unwrap().stock;
        assert_eq!(remaining, 6);

        let history = Customer::purchase_history(&conn, cid).unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].quantity, 4);

        // Already recorded
        assert!(matches!(sale.save(&mut conn), Err(Error::ConflictError(_))));
    }

    #[test]
    fn test_sale_rolls_back_on_insufficient_stock() {
        let mut conn = create_test_db();
        let plenty = stocked_product(&conn, "Osso", "1", 10);
        let scarce = stocked_product(&conn, "Cama", "2", 1);

        let mut sale = Sale::new(PaymentMethod::Cash);
        sale.add_item(plenty.id.unwrap(), 2, plenty.sale_price).unwrap();
        sale.add_item(scarce.id.unwrap(), 3, scarce.sale_price).unwrap();

        let err = sale.save(&mut conn).unwrap_err();
        assert!(matches!(
            err,
            Error::InsufficientStock {
                requested: 3,
                available: 1,
                ..
            }
        ));
        assert!(sale.id.is_none());

        let stock = Product::find_by_id(&conn, plenty.id.unwrap())
            .unwrap()
            .unwrap()
            .stock;
        assert_eq!(stock, 10);
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM sales", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 0);
    }

    #[test]
    fn test_sale_rejects_empty_cart_and_unknown_product() {
        let mut conn = create_test_db();

        let mut empty = Sale::new(PaymentMethod::Cash);
        assert!(matches!(empty.save(&mut conn), Err(Error::InvalidInput(_))));

        let mut ghost = Sale::new(PaymentMethod::Cash);
        ghost.add_item(4242, 1, Money::from_cents(100)).unwrap();
        assert!(matches!(ghost.save(&mut conn), Err(Error::NotFound(_))));
    }

    #[test]
    fn test_sale_delete_restores_stock() {
        let mut conn = create_test_db();
        let product = stocked_product(&conn, "Ração", "100", 10);
        let pid = product.id.unwrap();

        let mut sale = Sale::new(PaymentMethod::DebitCard);
        sale.add_item(pid, 3, product.sale_price).unwrap();
        sale.add_item(pid, 2, Money::from_cents(1000)).unwrap();
        let id = sale.save(&mut conn).unwrap();
        assert_eq!(Product::find_by_id(&conn, pid).unwrap().unwrap().stock, 5);

        // Sold products cannot be removed from the catalog
        assert!(matches!(
            Product::delete(&conn, pid),
            Err(Error::ConflictError(_))
        ));

        assert!(Sale::delete(&mut conn, id).unwrap());
        assert_eq!(Product::find_by_id(&conn, pid).unwrap().unwrap().stock, 10);
        assert!(Sale::find_by_id(&conn, id).unwrap().is_none());
        assert!(!Sale::delete(&mut conn, id).unwrap());
    }

    #[test]
    fn test_customer_delete_keeps_sales() {
        let mut conn = create_test_db();
        let product = stocked_product(&conn, "Ração", "100", 10);
        let mut customer = Customer::new("Ana".to_string());
        let cid = customer.save(&conn).unwrap();

        let mut sale = Sale::new(PaymentMethod::Cash);
        sale.customer_id = Some(cid);
        sale.add_item(product.id.unwrap(), 1, product.sale_price).unwrap();
        let id = sale.save(&mut conn).unwrap();

        assert!(Customer::delete(&conn, cid).unwrap());
        let stored = Sale::find_by_id(&conn, id).unwrap().unwrap();
        assert_eq!(stored.customer_id, None);
    }

    #[test]
    fn test_sales_in_period() {
        let mut conn = create_test_db();
        let product = stocked_product(&conn, "Ração", "100", 50);
        let pid = product.id.unwrap();

        for date in ["2024-03-01", "2024-03-15", "2024-03-31", "2024-04-01"] {
            let mut sale = sale_at(date, PaymentMethod::Cash);
            sale.add_item(pid, 1, product.sale_price).unwrap();
            sale.save(&mut conn).unwrap();
        }

        let march = Period::new(
            NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 3, 31).unwrap(),
        )
        .unwrap();
        let sales = Sale::in_period(&conn, &march).unwrap();
        assert_eq!(sales.len(), 3);
        assert_eq!(sales[0].sale_date.date(), march.end);
        assert_eq!(sales[2].sale_date.date(), march.start);
        assert!(sales.iter().all(|s| s.customer_name.is_none()));
    }
}
