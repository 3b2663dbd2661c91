//! Core types for BakeAPI.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod email;
pub mod id;
pub mod price;
pub mod status;

pub use email::{Email, EmailError};
pub use id::*;
pub use price::{DiscountRate, DiscountRateError, Price, PriceError};
pub use status::{ProductStatus, StatusError};
