// src/auth/bootstrap.rs

//! Built-in accounts
//!
//! A fresh installation has no users, so nobody could log in to create
//! one. These helpers provision the `admin` and `owner` accounts and
//! repair the admin account when its password no longer verifies.

use crate::db::models::{AccessLevel, User};
use crate::error::{Error, Result};
use crate::store::Store;
use tracing::{info, warn};

pub const ADMIN_USERNAME: &str = "admin";
pub const ADMIN_NAME: &str = "Administrator";
pub const DEFAULT_ADMIN_PASSWORD: &str = "admin123";

pub const OWNER_USERNAME: &str = "owner";
pub const OWNER_NAME: &str = "Store Owner";
pub const DEFAULT_OWNER_PASSWORD: &str = "owner123";

/// Result of provisioning a built-in account
#[derive(Debug, Clone)]
pub enum Provisioned {
    Created(User),
    AlreadyExists(User),
}

impl Provisioned {
    pub fn user(&self) -> &User {
        match self {
            Provisioned::Created(user) | Provisioned::AlreadyExists(user) => user,
        }
    }

    pub fn was_created(&self) -> bool {
        matches!(self, Provisioned::Created(_))
    }
}

/// Outcome of [`check_admin`]
#[derive(Debug, Clone)]
pub enum AdminCheck {
    Valid(User),
    WrongPassword,
    Missing,
}

fn ensure_user(
    store: &dyn Store,
    username: &str,
    name: &str,
    level: AccessLevel,
    password: &str,
) -> Result<Provisioned> {
    if let Some(existing) = store.user_by_username(username)? {
        return Ok(Provisioned::AlreadyExists(existing));
    }

    let mut user = User::new(username.to_string(), password, name.to_string(), level)?;
    store.save_user(&mut user)?;
    info!("Created built-in user '{}' ({})", username, level);
    Ok(Provisioned::Created(user))
}

/// Create the `admin` account when missing
pub fn ensure_admin(store: &dyn Store, password: &str) -> Result<Provisioned> {
    ensure_user(
        store,
        ADMIN_USERNAME,
        ADMIN_NAME,
        AccessLevel::Admin,
        password,
    )
}

/// Create the `owner` account when missing
pub fn ensure_owner(store: &dyn Store, password: &str) -> Result<Provisioned> {
    ensure_user(
        store,
        OWNER_USERNAME,
        OWNER_NAME,
        AccessLevel::Owner,
        password,
    )
}

/// Delete and recreate the admin account, then confirm it authenticates
///
/// The replacement is built and validated before the old account is
/// removed, so a rejected password leaves the existing admin in place.
pub fn reset_admin(store: &dyn Store, password: &str) -> Result<User> {
    let mut admin = User::new(
        ADMIN_USERNAME.to_string(),
        password,
        ADMIN_NAME.to_string(),
        AccessLevel::Admin,
    )?;

    if let Some(existing) = store.user_by_username(ADMIN_USERNAME)?
        && let Some(id) = existing.id
    {
        store.delete_user(id)?;
        warn!("Deleted existing admin user {}", id);
    }
    store.save_user(&mut admin)?;

    match store.authenticate(ADMIN_USERNAME, password)? {
        Some(verified) => {
            info!("Admin user recreated and verified");
            Ok(verified)
        }
        None => Err(Error::InitError(
            "admin user was recreated but does not authenticate".to_string(),
        )),
    }
}

/// Check whether `admin` authenticates with `password`
pub fn check_admin(store: &dyn Store, password: &str) -> Result<AdminCheck> {
    if store.user_by_username(ADMIN_USERNAME)?.is_none() {
        return Ok(AdminCheck::Missing);
    }
    Ok(match store.authenticate(ADMIN_USERNAME, password)? {
        Some(user) => AdminCheck::Valid(user),
        None => AdminCheck::WrongPassword,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::SqliteStore;

    #[test]
    fn test_ensure_admin_is_idempotent() {
        let store = SqliteStore::in_memory().unwrap();

        let first = ensure_admin(&store, DEFAULT_ADMIN_PASSWORD).unwrap();
        assert!(first.was_created());
        assert_eq!(first.user().access_level, AccessLevel::Admin);
        assert_eq!(first.user().name, ADMIN_NAME);

        let second = ensure_admin(&store, "other").unwrap();
        assert!(!second.was_created());
        assert_eq!(second.user().id, first.user().id);

        // Password from the first call is kept
        assert!(matches!(
            check_admin(&store, DEFAULT_ADMIN_PASSWORD).unwrap(),
            AdminCheck::Valid(_)
        ));
    }

    #[test]
    fn test_ensure_owner() {
        let store = SqliteStore::in_memory().unwrap();
        let owner = ensure_owner(&store, DEFAULT_OWNER_PASSWORD).unwrap();
        assert!(owner.was_created());
        assert_eq!(owner.user().username, OWNER_USERNAME);
        assert_eq!(owner.user().access_level, AccessLevel::Owner);
        assert!(store.authenticate(OWNER_USERNAME, DEFAULT_OWNER_PASSWORD).unwrap().is_some());
    }

    #[test]
    fn test_check_and_reset_admin() {
        let store = SqliteStore::in_memory().unwrap();
        assert!(matches!(
            check_admin(&store, DEFAULT_ADMIN_PASSWORD).unwrap(),
            AdminCheck::Missing
        ));

        ensure_admin(&store, "forgotten").unwrap();
        assert!(matches!(
            check_admin(&store, DEFAULT_ADMIN_PASSWORD).unwrap(),
            AdminCheck::WrongPassword
        ));

        let admin = reset_admin(&store, DEFAULT_ADMIN_PASSWORD).unwrap();
        assert_eq!(admin.username, ADMIN_USERNAME);
        assert!(matches!(
            check_admin(&store, DEFAULT_ADMIN_PASSWORD).unwrap(),
            AdminCheck::Valid(_)
        ));
        assert_eq!(store.list_users().unwrap().len(), 1);
    }

    #[test]
    fn test_rejected_reset_keeps_admin() {
        let store = SqliteStore::in_memory().unwrap();
        let original = ensure_admin(&store, DEFAULT_ADMIN_PASSWORD).unwrap();

        assert!(matches!(
            reset_admin(&store, ""),
            Err(Error::InvalidInput(_))
        ));

        let admin = store.user_by_username(ADMIN_USERNAME).unwrap().unwrap();
        assert_eq!(admin.id, original.user().id);
        assert!(matches!(
            check_admin(&store, DEFAULT_ADMIN_PASSWORD).unwrap(),
            AdminCheck::Valid(_)
        ));
    }
}
