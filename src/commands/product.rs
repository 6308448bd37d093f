// src/commands/product.rs
//! Product inventory commands

use super::{Context, or_dash};
use crate::cli::ProductFields;
use anyhow::{Context as _, Result};
use supercash::Money;
use supercash::db::models::{Product, StockLevel};
use supercash::store::{Store, require};
use tracing::info;

fn apply_fields(store: &dyn Store, product: &mut Product, fields: ProductFields) -> Result<()> {
    if let Some(barcode) = fields.barcode {
        product.barcode = Some(barcode);
    }
    if let Some(name) = fields.category {
        let category = store.category_by_name(&name)?.with_context(|| {
            format!("category '{name}' does not exist (create it with 'supercash category add')")
        })?;
        product.category_id = category.id;
    }
    if let Some(cost) = fields.cost {
        product.cost_price = cost;
    }
    if let Some(stock) = fields.stock {
        product.stock = stock;
    }
    if let Some(min_stock) = fields.min_stock {
        product.min_stock = min_stock;
    }
    if let Some(supplier) = fields.supplier {
        product.supplier = Some(supplier);
    }
    Ok(())
}

fn print_product(product: &Product) {
    println!("Product {}: {}", product.id.unwrap_or_default(), product.name);
    println!("  Barcode: {}", or_dash(product.barcode.as_deref()));
    println!("  Category: {}", or_dash(product.category_name.as_deref()));
    println!("  Sale price: {}", product.sale_price);
    println!("  Cost price: {}", product.cost_price);
    println!(
        "  Stock: {} (minimum {}, {})",
        product.stock,
        product.min_stock,
        product.stock_level()
    );
    println!("  Supplier: {}", or_dash(product.supplier.as_deref()));
}

fn print_rows(products: &[Product]) {
    for p in products {
        let mark = match p.stock_level() {
            StockLevel::Ok => " ",
            StockLevel::Low => "!",
            StockLevel::Out => "x",
        };
        println!(
            "  {} [{}] {:<30} {:>12} stock {:>4}  {}",
            mark,
            p.id.unwrap_or_default(),
            p.name,
            p.sale_price.to_string(),
            p.stock,
            or_dash(p.barcode.as_deref())
        );
    }
}

pub fn cmd_product_add(
    ctx: &Context,
    name: &str,
    price: Money,
    fields: ProductFields,
) -> Result<()> {
    info!("Adding product: {}", name);
    let store = ctx.open_store()?;
    let mut product = Product::new(name.trim().to_string(), price);
    apply_fields(store.as_ref(), &mut product, fields)?;
    let id = store.save_product(&mut product)?;
    println!("Added product: {} (ID {})", product.name, id);
    Ok(())
}

pub fn cmd_product_update(
    ctx: &Context,
    id: i64,
    name: Option<String>,
    price: Option<Money>,
    fields: ProductFields,
) -> Result<()> {
    let store = ctx.open_store()?;
    let mut product = require(store.product_by_id(id)?, || format!("product {id}"))?;
    if let Some(name) = name {
        product.name = name;
    }
    if let Some(price) = price {
        product.sale_price = price;
    }
    apply_fields(store.as_ref(), &mut product, fields)?;
    store.save_product(&mut product)?;
    println!("Updated product: {}", product.name);
    Ok(())
}

pub fn cmd_product_show(ctx: &Context, id: Option<i64>, barcode: Option<&str>) -> Result<()> {
    let store = ctx.open_store()?;
    let product = match (id, barcode) {
        (Some(id), _) => require(store.product_by_id(id)?, || format!("product {id}"))?,
        (None, Some(code)) => require(store.product_by_barcode(code)?, || {
            format!("product with barcode {code}")
        })?,
        (None, None) => anyhow::bail!("give a product ID or --barcode"),
    };
    print_product(&product);
    Ok(())
}

pub fn cmd_product_list(ctx: &Context) -> Result<()> {
    let store = ctx.open_store()?;
    let products = store.list_products()?;
    if products.is_empty() {
        println!("No products");
        return Ok(());
    }
    println!("Products ({}):", products.len());
    print_rows(&products);
    Ok(())
}

pub fn cmd_product_search(ctx: &Context, query: &str) -> Result<()> {
    let store = ctx.open_store()?;
    let found = store.search_products(query)?;
    if found.is_empty() {
        println!("No products match '{}'", query);
        return Ok(());
    }
    println!("Products matching '{}':", query);
    print_rows(&found);
    Ok(())
}

pub fn cmd_product_stock(ctx: &Context, id: i64, delta: i64) -> Result<()> {
    info!("Adjusting stock of product {} by {}", id, delta);
    let store = ctx.open_store()?;
    let stock = store.update_stock(id, delta)?;
    println!("Product {} stock is now {}", id, stock);
    Ok(())
}

pub fn cmd_product_low_stock(ctx: &Context) -> Result<()> {
    let store = ctx.open_store()?;
    let products = store.low_stock()?;
    if products.is_empty() {
        println!("All products are above their minimum stock");
        return Ok(());
    }
    println!("Low stock ({}):", products.len());
    for p in &products {
        println!(
            "  [{}] {:<30} stock {:>4} / minimum {:>4}  {}",
            p.id.unwrap_or_default(),
            p.name,
            p.stock,
            p.min_stock,
            p.stock_level()
        );
    }
    Ok(())
}

pub fn cmd_product_delete(ctx: &Context, id: i64) -> Result<()> {
    info!("Deleting product {}", id);
    let store = ctx.open_store()?;
    if store.delete_product(id)? {
        println!("Deleted product {}", id);
        Ok(())
    } else {
        anyhow::bail!("product {} not found", id)
    }
}
