//! Order Desk Core - Shared domain types.
//!
//! This crate provides the types used across all Order Desk components:
//! - `web` - The server-rendered order management site
//! - `cli` - Command-line tools for migrations, role groups and users
//!
//! # Architecture
//!
//! The core crate contains only types and traits - no I/O, no database access,
//! no HTTP. Database encoding is available behind the `postgres` feature.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, emails, prices, order statuses and roles

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
