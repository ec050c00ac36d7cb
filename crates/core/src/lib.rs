//! Papelería Core - Shared domain types.
//!
//! This crate provides the types used across the Papelería components:
//! - `storefront` - Public shop, cart, checkout and the admin panel
//! - `cli` - Command-line tools for migrations, users and seed data
//!
//! # Architecture
//!
//! The core crate contains only types and pure rules - no I/O, no database
//! access, no HTTP. Database encoding for IDs and emails is available behind
//! the `postgres` feature.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, emails, money, statuses, cart and discount rules

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
