//! Product ownership checks.

use thiserror::Error;

use bakeapi_core::ProductId;

use crate::db::{ProductStore, RepositoryError};
use crate::models::{CurrentUser, Product};

/// Why a caller may not act on a product.
#[derive(Debug, Error)]
pub enum OwnershipError {
    /// The product does not exist.
    #[error("product not found")]
    NotFound,

    /// The product belongs to someone else.
    #[error("caller does not own this product")]
    Forbidden,

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Load a product and confirm that `caller` owns it.
///
/// # Errors
///
/// Returns `OwnershipError::NotFound` if the product does not exist,
/// `OwnershipError::Forbidden` if another user owns it.
pub async fn check_ownership(
    products: &dyn ProductStore,
    id: ProductId,
    caller: &CurrentUser,
) -> Result<Product, OwnershipError> {
    let product = products.get(id).await?.ok_or(OwnershipError::NotFound)?;

    if product.user_id != caller.user_id {
        tracing::info!(
            product_id = %id,
            owner_id = %product.user_id,
            caller_id = %caller.user_id,
            "Ownership check denied"
        );
        return Err(OwnershipError::Forbidden);
    }

    Ok(product)
}
