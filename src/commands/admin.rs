// src/commands/admin.rs
//! Built-in account maintenance

use super::Context;
use anyhow::{Result, bail};
use supercash::auth::bootstrap::{self, AdminCheck};

pub fn cmd_admin_ensure(ctx: &Context, password: &str) -> Result<()> {
    let store = ctx.open_store()?;
    let outcome = bootstrap::ensure_admin(store.as_ref(), password)?;
    if outcome.was_created() {
        println!("Admin user created successfully!");
    } else {
        println!("Admin user already exists");
    }
    Ok(())
}

pub fn cmd_admin_ensure_owner(ctx: &Context, password: &str) -> Result<()> {
    let store = ctx.open_store()?;
    let outcome = bootstrap::ensure_owner(store.as_ref(), password)?;
    if outcome.was_created() {
        println!("Owner user created successfully!");
    } else {
        println!("Owner user already exists");
    }
    Ok(())
}

pub fn cmd_admin_reset(ctx: &Context, password: &str) -> Result<()> {
    let store = ctx.open_store()?;
    let admin = bootstrap::reset_admin(store.as_ref(), password)?;
    println!("Admin user successfully recreated and verified!");
    println!("  ID: {}", admin.id.unwrap_or_default());
    Ok(())
}

/// Exits with an error unless admin authenticates
pub fn cmd_admin_check(ctx: &Context, password: &str) -> Result<()> {
    let store = ctx.open_store()?;
    match bootstrap::check_admin(store.as_ref(), password)? {
        AdminCheck::Valid(user) => {
            println!("Admin authentication successful!");
            println!("  Username: {}", user.username);
            println!("  Access level: {}", user.access_level);
            Ok(())
        }
        AdminCheck::WrongPassword => bail!("Admin authentication failed: wrong password"),
        AdminCheck::Missing => {
            bail!("Admin user does not exist (run 'supercash admin ensure')")
        }
    }
}
