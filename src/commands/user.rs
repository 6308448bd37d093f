// src/commands/user.rs
//! Staff account commands

use super::Context;
use anyhow::Result;
use supercash::db::models::{AccessLevel, User};
use supercash::store::require;
use tracing::info;

pub fn cmd_user_add(
    ctx: &Context,
    username: &str,
    name: &str,
    password: &str,
    level: AccessLevel,
) -> Result<()> {
    let store = ctx.open_store()?;
    let session = ctx.login(store.as_ref())?;
    session.require_manager()?;

    let mut user = User::new(
        username.trim().to_string(),
        password,
        name.trim().to_string(),
        level,
    )?;
    let id = store.save_user(&mut user)?;
    info!(
        "User '{}' created by '{}'",
        user.username,
        session.user().username
    );
    println!("Added user: {} ({}, ID {})", user.username, level, id);
    Ok(())
}

pub fn cmd_user_update(
    ctx: &Context,
    id: i64,
    username: Option<String>,
    name: Option<String>,
    password: Option<&str>,
    level: Option<AccessLevel>,
) -> Result<()> {
    let store = ctx.open_store()?;
    let session = ctx.login(store.as_ref())?;
    session.require_manager()?;

    let mut user = require(store.user_by_id(id)?, || format!("user {id}"))?;
    if let Some(username) = username {
        user.username = username;
    }
    if let Some(name) = name {
        user.name = name;
    }
    if let Some(level) = level {
        user.access_level = level;
    }
    if let Some(password) = password {
        user.set_password(password)?;
    }
    store.save_user(&mut user)?;
    println!("Updated user: {}", user.username);
    Ok(())
}

pub fn cmd_user_list(ctx: &Context) -> Result<()> {
    let store = ctx.open_store()?;
    let session = ctx.login(store.as_ref())?;
    session.require_manager()?;

    let users = store.list_users()?;
    println!("Users ({}):", users.len());
    for u in &users {
        println!(
            "  [{}] {:<16} {:<24} {}",
            u.id.unwrap_or_default(),
            u.username,
            u.name,
            u.access_level
        );
    }
    Ok(())
}

pub fn cmd_user_delete(ctx: &Context, id: i64) -> Result<()> {
    let store = ctx.open_store()?;
    let session = ctx.login(store.as_ref())?;
    session.require_manager()?;
    session.ensure_not_self(id)?;

    if store.delete_user(id)? {
        info!("User {} deleted by '{}'", id, session.user().username);
        println!("Deleted user {}", id);
        Ok(())
    } else {
        anyhow::bail!("user {} not found", id)
    }
}
