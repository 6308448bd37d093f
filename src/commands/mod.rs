// src/commands/mod.rs
//! Command handlers for the Supercash CLI

mod admin;
mod category;
mod customer;
mod product;
mod report;
mod sale;
mod setup;
mod user;

pub use admin::{cmd_admin_check, cmd_admin_ensure, cmd_admin_ensure_owner, cmd_admin_reset};
pub use category::{cmd_category_add, cmd_category_list};
pub use customer::{
    cmd_customer_add, cmd_customer_delete, cmd_customer_history, cmd_customer_list,
    cmd_customer_search, cmd_customer_show, cmd_customer_update,
};
pub use product::{
    cmd_product_add, cmd_product_delete, cmd_product_list, cmd_product_low_stock,
    cmd_product_search, cmd_product_show, cmd_product_stock, cmd_product_update,
};
pub use report::{
    cmd_report_best_sellers, cmd_report_customers, cmd_report_low_stock, cmd_report_overview,
    cmd_report_profit, cmd_report_sales, cmd_report_trend,
};
pub use sale::{cmd_sale_list, cmd_sale_new, cmd_sale_show, cmd_sale_void};
pub use setup::{cmd_init, cmd_login};
pub use user::{cmd_user_add, cmd_user_delete, cmd_user_list, cmd_user_update};

use crate::cli::GlobalArgs;
use anyhow::{Context as _, Result};
use supercash::auth::Session;
use supercash::config::Config;
use supercash::store::{self, Store};

/// Resolved configuration plus the global command-line options
pub struct Context {
    pub config: Config,
    pub global: GlobalArgs,
}

impl Context {
    /// Load the configuration and apply command-line overrides
    pub fn load(global: GlobalArgs) -> Result<Self> {
        let mut config = Config::discover(global.config.as_deref())?;
        if let Some(path) = &global.db_path {
            config.database.path = Some(path.clone());
        }
        Ok(Self { config, global })
    }

    /// Open the configured store (it must already be initialized)
    pub fn open_store(&self) -> Result<Box<dyn Store>> {
        Ok(store::open(&self.config)?)
    }

    /// Log in with --user/--password
    pub fn login(&self, store: &dyn Store) -> Result<Session> {
        let username = self
            .global
            .user
            .as_deref()
            .context("this command needs --user (or SUPERCASH_USER)")?;
        let password = self
            .global
            .password
            .as_deref()
            .context("this command needs --password (or SUPERCASH_PASSWORD)")?;
        Ok(Session::login(store, username, password)?)
    }
}

/// Placeholder for empty optional fields in listings
pub(crate) fn or_dash(value: Option<&str>) -> &str {
    value.filter(|v| !v.is_empty()).unwrap_or("-")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_or_dash() {
        assert_eq!(or_dash(None), "-");
        assert_eq!(or_dash(Some("")), "-");
        assert_eq!(or_dash(Some("Rex")), "Rex");
    }
}
