//! BakeAPI Core - Shared types library.
//!
//! This crate provides common types used across all BakeAPI components:
//! - `api` - HTTP API for the bakery marketplace
//! - `cli` - Command-line tools for migrations, fixtures and users
//!
//! # Architecture
//!
//! The core crate contains only types and validation - no I/O, no database
//! access, no HTTP. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, prices, discount rates,
//!   emails, and product statuses

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
