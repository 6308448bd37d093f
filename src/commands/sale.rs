// src/commands/sale.rs
//! Point-of-sale commands

use super::{Context, customer::customer_id_for_document, or_dash};
use crate::cli::{ItemSpec, PeriodArgs};
use anyhow::{Context as _, Result};
use supercash::Money;
use supercash::db::models::{PaymentMethod, Sale, SaleSummary};
use supercash::store::require;
use tracing::info;

pub(crate) fn print_summaries(sales: &[SaleSummary]) {
    for s in sales {
        println!(
            "  [{}] {}  {:<24} {:>12}  {}",
            s.id,
            s.sale_date.format("%d/%m/%Y %H:%M"),
            s.customer_name.as_deref().unwrap_or("N/A"),
            s.net_total().to_string(),
            s.payment_method
        );
    }
}

fn print_receipt(sale: &Sale) {
    println!(
        "Sale {} - {}",
        sale.id.unwrap_or_default(),
        sale.sale_date.format("%d/%m/%Y %H:%M")
    );
    for item in &sale.items {
        let name = item
            .product_name
            .clone()
            .unwrap_or_else(|| format!("product {}", item.product_id));
        println!(
            "  {:<30} {:>4} x {:>10} = {:>12}",
            name,
            item.quantity,
            item.unit_price.to_string(),
            item.subtotal.to_string()
        );
    }
    println!("  Total:    {}", sale.total);
    if sale.discount != Money::ZERO {
        println!("  Discount: {}", sale.discount);
    }
    println!("  Net:      {}", sale.net_total());
    println!("  Payment:  {}", sale.payment_method);
}

pub fn cmd_sale_new(
    ctx: &Context,
    items: Vec<ItemSpec>,
    customer: Option<&str>,
    discount: Option<Money>,
    payment: PaymentMethod,
) -> Result<()> {
    let store = ctx.open_store()?;
    let session = ctx.login(store.as_ref())?;

    let mut sale = Sale::new(payment);
    sale.user_id = session.user_id();
    if let Some(document) = customer {
        sale.customer_id = Some(customer_id_for_document(store.as_ref(), document)?);
    }

    for spec in items {
        let product = require(store.product_by_barcode(&spec.barcode)?, || {
            format!("product with barcode {}", spec.barcode)
        })?;
        let product_id = product
            .id
            .with_context(|| format!("product {} has no ID", product.name))?;
        let price = spec.price.unwrap_or(product.sale_price);
        sale.add_item(product_id, spec.quantity, price)?;
        if let Some(line) = sale.items.last_mut() {
            line.product_name = Some(product.name);
        }
    }

    if let Some(discount) = discount {
        sale.apply_discount(discount)?;
    }

    let id = store.save_sale(&mut sale)?;
    info!(
        "Sale {} recorded by '{}': {}",
        id,
        session.user().username,
        sale.net_total()
    );
    print_receipt(&sale);
    Ok(())
}

pub fn cmd_sale_show(ctx: &Context, id: i64) -> Result<()> {
    let store = ctx.open_store()?;
    let sale = require(store.sale_by_id(id)?, || format!("sale {id}"))?;
    print_receipt(&sale);

    if let Some(customer_id) = sale.customer_id {
        let name = store.customer_by_id(customer_id)?.map(|c| c.name);
        println!("  Customer: {}", or_dash(name.as_deref()));
    }
    if let Some(user_id) = sale.user_id {
        let seller = store.user_by_id(user_id)?.map(|u| u.name);
        println!("  Seller:   {}", or_dash(seller.as_deref()));
    }
    Ok(())
}

pub fn cmd_sale_list(ctx: &Context, period: &PeriodArgs) -> Result<()> {
    let period = period.resolve()?;
    let store = ctx.open_store()?;
    let sales = store.sales_in_period(&period)?;
    if sales.is_empty() {
        println!("No sales from {}", period);
        return Ok(());
    }

    let net: Money = sales.iter().map(SaleSummary::net_total).sum();
    println!("Sales from {} ({}, net {}):", period, sales.len(), net);
    print_summaries(&sales);
    Ok(())
}

pub fn cmd_sale_void(ctx: &Context, id: i64) -> Result<()> {
    let store = ctx.open_store()?;
    let session = ctx.login(store.as_ref())?;
    session.require_manager()?;

    if store.delete_sale(id)? {
        info!("Sale {} voided by '{}'", id, session.user().username);
        println!("Voided sale {}; items returned to stock", id);
        Ok(())
    } else {
        anyhow::bail!("sale {} not found", id)
    }
}
