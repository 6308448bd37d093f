// src/cli/admin.rs
//! Built-in account maintenance

use clap::Subcommand;
use supercash::auth::bootstrap::{DEFAULT_ADMIN_PASSWORD, DEFAULT_OWNER_PASSWORD};

#[derive(Subcommand)]
pub enum AdminCommands {
    /// Create the `admin` account if it does not exist
    Ensure {
        #[arg(long = "admin-password", default_value = DEFAULT_ADMIN_PASSWORD)]
        admin_password: String,
    },

    /// Create the `owner` account if it does not exist
    EnsureOwner {
        #[arg(long = "owner-password", default_value = DEFAULT_OWNER_PASSWORD)]
        owner_password: String,
    },

    /// Delete and recreate the `admin` account
    Reset {
        #[arg(long = "admin-password", default_value = DEFAULT_ADMIN_PASSWORD)]
        admin_password: String,
    },

    /// Check that `admin` can log in
    Check {
        #[arg(long = "admin-password", default_value = DEFAULT_ADMIN_PASSWORD)]
        admin_password: String,
    },
}
