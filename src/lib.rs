// src/lib.rs

//! Supercash
//!
//! Point of sale and inventory for small pet shops: customers and their
//! pets, a product catalog with stock control, staff accounts with access
//! levels, sales with discounts and payment methods, and sales reports.
//!
//! # Architecture
//!
//! - Stores: every operation goes through [`store::Store`], backed by a
//!   single SQLite file or, with the `postgres` feature, a PostgreSQL pool
//! - Models: records and their SQL live in [`db::models`]
//! - Money: amounts are whole centavos ([`Money`]), never floats
//! - Sales: header, items and stock decrements commit together or not at all

pub mod auth;
pub mod config;
pub mod db;
mod error;
pub mod money;
pub mod store;

pub use error::{Error, Result};
pub use money::Money;
