// src/error.rs

//! Error types for the Supercash library

use thiserror::Error;

/// Errors produced by the store, models and configuration layers
#[derive(Error, Debug)]
pub enum Error {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[cfg(feature = "postgres")]
    #[error("Postgres error: {0}")]
    Postgres(#[from] postgres::Error),

    #[cfg(feature = "postgres")]
    #[error("Connection pool error: {0}")]
    Pool(#[from] r2d2::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Initialization error: {0}")]
    InitError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    ConflictError(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error(
        "Insufficient stock for product {product_id}: requested {requested}, available {available}"
    )]
    InsufficientStock {
        product_id: i64,
        requested: i64,
        available: i64,
    },

    #[error("Discount {discount} exceeds sale total {total}")]
    DiscountExceedsTotal {
        discount: crate::Money,
        total: crate::Money,
    },

    #[error("Invalid username or password")]
    AuthFailed,

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Malformed password hash: {0}")]
    HashFormat(String),
}

/// Result alias used across the library
pub type Result<T> = std::result::Result<T, Error>;
