// src/commands/category.rs
//! Product category commands

use super::Context;
use anyhow::Result;
use supercash::db::models::Category;
use tracing::info;

pub fn cmd_category_add(ctx: &Context, name: &str) -> Result<()> {
    info!("Adding category: {}", name);
    let store = ctx.open_store()?;
    let mut category = Category::new(name.trim().to_string());
    let id = store.add_category(&mut category)?;
    println!("Added category: {} (ID {})", category.name, id);
    Ok(())
}

pub fn cmd_category_list(ctx: &Context) -> Result<()> {
    let store = ctx.open_store()?;
    let categories = store.list_categories()?;
    if categories.is_empty() {
        println!("No categories");
        return Ok(());
    }
    println!("Categories:");
    for category in categories {
        println!("  [{}] {}", category.id.unwrap_or_default(), category.name);
    }
    Ok(())
}
