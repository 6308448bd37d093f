// src/cli/category.rs
//! Product category commands

use clap::Subcommand;

#[derive(Subcommand)]
pub enum CategoryCommands {
    /// Create a category
    Add {
        name: String,
    },

    /// List categories
    List,
}
