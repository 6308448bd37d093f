// src/cli/user.rs
//! Staff account commands (admin or owner session required)

use clap::Subcommand;
use supercash::db::models::AccessLevel;

#[derive(Subcommand)]
pub enum UserCommands {
    /// Create an account
    Add {
        username: String,

        /// Display name
        #[arg(long)]
        name: String,

        /// Initial password
        #[arg(long = "new-password", value_name = "PASSWORD")]
        new_password: String,

        /// admin, owner or user
        #[arg(long, default_value = "user")]
        level: AccessLevel,
    },

    /// Change an account
    Update {
        /// User ID
        id: i64,

        #[arg(long)]
        username: Option<String>,

        #[arg(long)]
        name: Option<String>,

        /// Replace the password
        #[arg(long = "new-password", value_name = "PASSWORD")]
        new_password: Option<String>,

        /// admin, owner or user
        #[arg(long)]
        level: Option<AccessLevel>,
    },

    /// List accounts
    List,

    /// Delete an account (not your own)
    Delete {
        /// User ID
        id: i64,
    },
}
