// src/commands/customer.rs
//! Customer record commands

use super::{Context, or_dash};
use crate::cli::CustomerFields;
use anyhow::Result;
use supercash::db::models::Customer;
use supercash::store::{Store, require};
use tracing::info;

fn apply_fields(customer: &mut Customer, fields: CustomerFields) {
    if let Some(document) = fields.document {
        customer.document = Some(document);
    }
    if let Some(email) = fields.email {
        customer.email = Some(email);
    }
    if let Some(phone) = fields.phone {
        customer.phone = Some(phone);
    }
    if let Some(address) = fields.address {
        customer.address = Some(address);
    }
    if let Some(pet_name) = fields.pet_name {
        customer.pet_name = Some(pet_name);
    }
    if let Some(pet_birth) = fields.pet_birth {
        customer.pet_birth = Some(pet_birth);
    }
}

fn print_customer(customer: &Customer) {
    println!("Customer {}: {}", customer.id.unwrap_or_default(), customer.name);
    println!("  Document: {}", or_dash(customer.document.as_deref()));
    println!("  Email: {}", or_dash(customer.email.as_deref()));
    println!("  Phone: {}", or_dash(customer.phone.as_deref()));
    println!("  Address: {}", or_dash(customer.address.as_deref()));
    println!("  Pet: {}", or_dash(customer.pet_name.as_deref()));
    if let Some(birth) = customer.pet_birth {
        println!("  Pet birth: {}", birth.format("%d/%m/%Y"));
    }
    if let Some(created) = &customer.created_at {
        println!("  Since: {}", created);
    }
}

fn print_rows(customers: &[Customer]) {
    for c in customers {
        println!(
            "  [{}] {} ({}) {}",
            c.id.unwrap_or_default(),
            c.name,
            or_dash(c.document.as_deref()),
            or_dash(c.phone.as_deref())
        );
    }
}

pub fn cmd_customer_add(ctx: &Context, name: &str, fields: CustomerFields) -> Result<()> {
    info!("Adding customer: {}", name);
    let store = ctx.open_store()?;
    let mut customer = Customer::new(name.trim().to_string());
    apply_fields(&mut customer, fields);
    let id = store.save_customer(&mut customer)?;
    println!("Added customer: {} (ID {})", customer.name, id);
    Ok(())
}

pub fn cmd_customer_update(
    ctx: &Context,
    id: i64,
    name: Option<String>,
    fields: CustomerFields,
) -> Result<()> {
    let store = ctx.open_store()?;
    let mut customer = require(store.customer_by_id(id)?, || format!("customer {id}"))?;
    if let Some(name) = name {
        customer.name = name;
    }
    apply_fields(&mut customer, fields);
    store.save_customer(&mut customer)?;
    println!("Updated customer: {}", customer.name);
    Ok(())
}

pub fn cmd_customer_show(ctx: &Context, id: Option<i64>, document: Option<&str>) -> Result<()> {
    let store = ctx.open_store()?;
    let customer = match (id, document) {
        (Some(id), _) => require(store.customer_by_id(id)?, || format!("customer {id}"))?,
        (None, Some(doc)) => require(store.customer_by_document(doc)?, || {
            format!("customer with document {doc}")
        })?,
        (None, None) => anyhow::bail!("give a customer ID or --document"),
    };
    print_customer(&customer);
    Ok(())
}

pub fn cmd_customer_list(ctx: &Context) -> Result<()> {
    let store = ctx.open_store()?;
    let customers = store.list_customers()?;
    if customers.is_empty() {
        println!("No customers");
        return Ok(());
    }
    println!("Customers ({}):", customers.len());
    print_rows(&customers);
    Ok(())
}

pub fn cmd_customer_search(ctx: &Context, query: &str) -> Result<()> {
    let store = ctx.open_store()?;
    let found = store.search_customers(query)?;
    if found.is_empty() {
        println!("No customers match '{}'", query);
        return Ok(());
    }
    println!("Customers matching '{}':", query);
    print_rows(&found);
    Ok(())
}

pub fn cmd_customer_history(ctx: &Context, id: i64) -> Result<()> {
    let store = ctx.open_store()?;
    let customer = require(store.customer_by_id(id)?, || format!("customer {id}"))?;
    let lines = store.purchase_history(id)?;
    if lines.is_empty() {
        println!("{} has no purchases", customer.name);
        return Ok(());
    }

    println!("Purchase history for {}:", customer.name);
    let mut current_sale = None;
    for line in &lines {
        if current_sale != Some(line.sale_id) {
            current_sale = Some(line.sale_id);
            println!(
                "  Sale {} on {} - {} ({})",
                line.sale_id,
                line.sale_date.format("%d/%m/%Y %H:%M"),
                line.sale_total,
                line.payment_method
            );
        }
        println!(
            "      {} x{} @ {}",
            line.product_name, line.quantity, line.unit_price
        );
    }
    Ok(())
}

pub fn cmd_customer_delete(ctx: &Context, id: i64) -> Result<()> {
    info!("Deleting customer {}", id);
    let store = ctx.open_store()?;
    if store.delete_customer(id)? {
        println!("Deleted customer {}", id);
        Ok(())
    } else {
        anyhow::bail!("customer {} not found", id)
    }
}

/// Resolve a customer by document, for use at the till
pub(crate) fn customer_id_for_document(store: &dyn Store, document: &str) -> Result<i64> {
    let customer = require(store.customer_by_document(document)?, || {
        format!("customer with document {document}")
    })?;
    customer
        .id
        .ok_or_else(|| anyhow::anyhow!("customer {} has no ID", customer.name))
}
