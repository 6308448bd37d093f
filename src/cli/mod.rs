// src/cli/mod.rs
//! CLI definitions for the Supercash point of sale
//!
//! This module contains all command-line interface definitions using clap.
//! The actual command implementations are in the `commands` module.
//!
//! Setup:
//! - `init` - Create the database and the default admin account
//! - `login` - Check credentials
//! - `admin` - Built-in account maintenance
//!
//! Records:
//! - `customer`, `category`, `product`, `user`
//!
//! Till and back office:
//! - `sale` - Record, inspect and void sales
//! - `report` - Sales, profit and stock reports

use chrono::{Local, NaiveDate};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use supercash::db::models::Period;
use supercash::db::models::report::DEFAULT_PERIOD_DAYS;

mod admin;
mod category;
mod customer;
mod product;
mod report;
mod sale;
mod user;

pub use admin::AdminCommands;
pub use category::CategoryCommands;
pub use customer::{CustomerCommands, CustomerFields};
pub use product::{ProductCommands, ProductFields};
pub use report::ReportCommands;
pub use sale::{ItemSpec, SaleCommands};
pub use user::UserCommands;

#[derive(Parser)]
#[command(name = "supercash")]
#[command(author = "Supercash Contributors")]
#[command(version)]
#[command(about = "Point of sale and inventory for small pet shops", long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Options accepted by every command
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Configuration file (default: ./supercash.toml, then the user config dir)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// SQLite database file (overrides the configuration)
    #[arg(long, global = true, value_name = "PATH")]
    pub db_path: Option<PathBuf>,

    /// Username for commands that need a logged-in user
    #[arg(long, global = true, env = "SUPERCASH_USER")]
    pub user: Option<String>,

    /// Password for --user
    #[arg(long, global = true, env = "SUPERCASH_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create the database (and the default admin account)
    Init {
        /// Do not create the default admin account
        #[arg(long)]
        no_admin: bool,
    },

    /// Verify credentials given with --user/--password
    Login,

    /// Customer records
    #[command(subcommand)]
    Customer(CustomerCommands),

    /// Product categories
    #[command(subcommand)]
    Category(CategoryCommands),

    /// Product inventory
    #[command(subcommand)]
    Product(ProductCommands),

    /// Staff accounts (admin or owner only)
    #[command(subcommand)]
    User(UserCommands),

    /// Sales
    #[command(subcommand)]
    Sale(SaleCommands),

    /// Reports
    #[command(subcommand)]
    Report(ReportCommands),

    /// Built-in account maintenance
    #[command(subcommand)]
    Admin(AdminCommands),
}

/// Date range selection shared by listing and report commands
#[derive(Args, Debug, Clone, Default)]
pub struct PeriodArgs {
    /// First day (YYYY-MM-DD)
    #[arg(long, value_name = "DATE")]
    pub from: Option<NaiveDate>,

    /// Last day (YYYY-MM-DD, default: today)
    #[arg(long, value_name = "DATE")]
    pub to: Option<NaiveDate>,

    /// Days before --to when --from is not given
    #[arg(long, default_value_t = DEFAULT_PERIOD_DAYS)]
    pub days: u64,
}

impl PeriodArgs {
    /// Resolve against `today`
    pub fn resolve_at(&self, today: NaiveDate) -> supercash::Result<Period> {
        let end = self.to.unwrap_or(today);
        let start = match self.from {
            Some(from) => from,
            None => Period::last_days(end, self.days).start,
        };
        Period::new(start, end)
    }

    pub fn resolve(&self) -> supercash::Result<Period> {
        self.resolve_at(Local::now().date_naive())
    }
}
