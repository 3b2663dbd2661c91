//! Domain models for the API.
//!
//! These are validated domain objects, separate from database row types.

pub mod identity;
pub mod product;
pub mod user;

pub use identity::CurrentUser;
pub use product::{NewProduct, Product, ProductChanges, ProductValidationError};
pub use user::User;
