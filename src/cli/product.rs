// src/cli/product.rs
//! Product inventory commands

use clap::{Args, Subcommand};
use supercash::Money;

/// Optional product fields shared by `add` and `update`
#[derive(Args, Debug, Clone, Default)]
pub struct ProductFields {
    /// Barcode (unique)
    #[arg(long)]
    pub barcode: Option<String>,

    /// Category name (see `category add`)
    #[arg(long)]
    pub category: Option<String>,

    /// Purchase cost per unit, e.g. 12,50
    #[arg(long, value_name = "AMOUNT")]
    pub cost: Option<Money>,

    /// Units in stock
    #[arg(long)]
    pub stock: Option<i64>,

    /// Stock level that triggers a low-stock warning
    #[arg(long)]
    pub min_stock: Option<i64>,

    #[arg(long)]
    pub supplier: Option<String>,
}

#[derive(Subcommand)]
pub enum ProductCommands {
    /// Add a product
    Add {
        name: String,

        /// Sale price per unit, e.g. 19,90
        #[arg(long, value_name = "AMOUNT")]
        price: Money,

        #[command(flatten)]
        fields: ProductFields,
    },

    /// Change a product's details
    Update {
        /// Product ID
        id: i64,

        #[arg(long)]
        name: Option<String>,

        /// Sale price per unit
        #[arg(long, value_name = "AMOUNT")]
        price: Option<Money>,

        #[command(flatten)]
        fields: ProductFields,
    },

    /// Show one product
    Show {
        /// Product ID
        #[arg(required_unless_present = "barcode")]
        id: Option<i64>,

        /// Look up by barcode instead
        #[arg(long, conflicts_with = "id")]
        barcode: Option<String>,
    },

    /// List all products
    List,

    /// Search by name, barcode or supplier
    Search {
        query: String,
    },

    /// Adjust stock by a number of units (negative to remove)
    Stock {
        /// Product ID
        id: i64,

        /// Units to add, or remove when negative
        #[arg(allow_negative_numbers = true)]
        delta: i64,
    },

    /// List products at or below their minimum stock
    LowStock,

    /// Delete a product that has never been sold
    Delete {
        /// Product ID
        id: i64,
    },
}
