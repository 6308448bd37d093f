// src/commands/setup.rs
//! Database setup and login check

use super::Context;
use anyhow::Result;
use supercash::auth::bootstrap::{self, DEFAULT_ADMIN_PASSWORD};
use supercash::config::Backend;
use supercash::store;
use tracing::info;

/// Create the database, optionally with the default admin account
pub fn cmd_init(ctx: &Context, no_admin: bool) -> Result<()> {
    let backend = ctx.config.database.backend;
    info!("Initializing {} store", backend);
    let store = store::initialize(&ctx.config)?;

    match backend {
        Backend::Sqlite => println!(
            "Database initialized at: {}",
            ctx.config.db_path().display()
        ),
        Backend::Postgres => println!(
            "Database initialized at: {}",
            ctx.config.database.postgres.describe()
        ),
    }

    if !no_admin {
        let admin = bootstrap::ensure_admin(store.as_ref(), DEFAULT_ADMIN_PASSWORD)?;
        if admin.was_created() {
            println!(
                "Created user 'admin' with password '{}'; change it with 'supercash user update'",
                DEFAULT_ADMIN_PASSWORD
            );
        }
    }
    Ok(())
}

/// Check the --user/--password credentials
pub fn cmd_login(ctx: &Context) -> Result<()> {
    let store = ctx.open_store()?;
    let session = ctx.login(store.as_ref())?;
    let user = session.user();
    println!("Welcome {}!", user.name);
    println!("  Username: {}", user.username);
    println!("  Access level: {}", user.access_level);
    Ok(())
}
