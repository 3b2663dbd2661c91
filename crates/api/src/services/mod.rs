//! Business logic services for the API.
//!
//! # Services
//!
//! - `auth` - Password login and bearer tokens
//! - `ownership` - Owner checks for product mutations
//! - `discount` - Bulk markdown of stale products

pub mod auth;
pub mod discount;
pub mod ownership;
