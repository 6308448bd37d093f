// src/auth/mod.rs

//! Staff authentication
//!
//! - `password`: PBKDF2-SHA256 hashing in the passlib modular format
//! - `session`: logged-in user and permission checks
//! - `bootstrap`: provisioning of the built-in admin and owner accounts

pub mod bootstrap;
pub mod password;
mod session;

pub use session::{MANAGERS, Session};
