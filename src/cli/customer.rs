// src/cli/customer.rs
//! Customer record commands

use chrono::NaiveDate;
use clap::{Args, Subcommand};

/// Optional customer fields shared by `add` and `update`
#[derive(Args, Debug, Clone, Default)]
pub struct CustomerFields {
    /// CPF or CNPJ
    #[arg(long)]
    pub document: Option<String>,

    #[arg(long)]
    pub email: Option<String>,

    #[arg(long)]
    pub phone: Option<String>,

    #[arg(long)]
    pub address: Option<String>,

    /// Name of the customer's pet
    #[arg(long)]
    pub pet_name: Option<String>,

    /// Pet's birth date (YYYY-MM-DD)
    #[arg(long, value_name = "DATE")]
    pub pet_birth: Option<NaiveDate>,
}

#[derive(Subcommand)]
pub enum CustomerCommands {
    /// Register a customer
    Add {
        /// Full name
        name: String,

        #[command(flatten)]
        fields: CustomerFields,
    },

    /// Change a customer's details
    Update {
        /// Customer ID
        id: i64,

        /// New name
        #[arg(long)]
        name: Option<String>,

        #[command(flatten)]
        fields: CustomerFields,
    },

    /// Show one customer
    Show {
        /// Customer ID
        #[arg(required_unless_present = "document")]
        id: Option<i64>,

        /// Look up by CPF/CNPJ instead
        #[arg(long, conflicts_with = "id")]
        document: Option<String>,
    },

    /// List all customers
    List,

    /// Search customers by name or document
    Search {
        query: String,
    },

    /// Show everything a customer has bought
    History {
        /// Customer ID
        id: i64,
    },

    /// Delete a customer (past sales are kept)
    Delete {
        /// Customer ID
        id: i64,
    },
}
