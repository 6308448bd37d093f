// src/auth/session.rs

use crate::db::models::{AccessLevel, User};
use crate::error::{Error, Result};
use crate::store::Store;
use tracing::{info, warn};

/// Levels allowed to manage users and void sales
pub const MANAGERS: [AccessLevel; 2] = [AccessLevel::Admin, AccessLevel::Owner];

/// An authenticated staff member
#[derive(Debug, Clone)]
pub struct Session {
    user: User,
}

impl Session {
    /// Authenticate against the store
    pub fn login(store: &dyn Store, username: &str, password: &str) -> Result<Self> {
        let username = username.trim();
        if username.is_empty() || password.is_empty() {
            return Err(Error::InvalidInput(
                "please enter both username and password".to_string(),
            ));
        }

        match store.authenticate(username, password)? {
            Some(user) => {
                info!("User '{}' logged in ({})", user.username, user.access_level);
                Ok(Self { user })
            }
            None => {
                warn!("Failed login for '{}'", username);
                Err(Error::AuthFailed)
            }
        }
    }

    pub fn user(&self) -> &User {
        &self.user
    }

    pub fn user_id(&self) -> Option<i64> {
        self.user.id
    }

    pub fn level(&self) -> AccessLevel {
        self.user.access_level
    }

    /// Fail with `PermissionDenied` unless the session's level is in `allowed`
    pub fn require(&self, allowed: &[AccessLevel]) -> Result<()> {
        if allowed.contains(&self.user.access_level) {
            return Ok(());
        }
        let names: Vec<&str> = allowed.iter().map(AccessLevel::as_str).collect();
        Err(Error::PermissionDenied(format!(
            "'{}' has access level '{}', this requires {}",
            self.user.username,
            self.user.access_level,
            names.join(" or ")
        )))
    }

    pub fn require_manager(&self) -> Result<()> {
        if self.user.access_level.is_manager() {
            return Ok(());
        }
        self.require(&MANAGERS)
    }

    /// Refuse operations that would remove the logged-in account
    pub fn ensure_not_self(&self, user_id: i64) -> Result<()> {
        if self.user.id == Some(user_id) {
            return Err(Error::PermissionDenied(
                "you cannot delete your own account".to_string(),
            ));
        }
        Ok(())
    }
}
