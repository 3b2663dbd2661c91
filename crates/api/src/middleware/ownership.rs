//! Path and ownership extractors for product routes.

use axum::{
    extract::{FromRequestParts, Path},
    http::request::Parts,
};

use bakeapi_core::{ProductId, UserId};

use super::RequireAuth;
use crate::error::{AppError, PRODUCT_NOT_FOUND, USER_NOT_FOUND};
use crate::models::{CurrentUser, Product};
use crate::services::ownership::check_ownership;
use crate::state::AppState;

/// Product ID taken from the `{id}` path segment.
///
/// A segment that is not a number names no product, so it is rejected as 404.
pub struct ProductPath(pub ProductId);

impl<S> FromRequestParts<S> for ProductPath
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|_| AppError::NotFound(PRODUCT_NOT_FOUND.to_string()))?;

        raw.parse()
            .map(Self)
            .map_err(|_| AppError::NotFound(PRODUCT_NOT_FOUND.to_string()))
    }
}

/// User ID taken from the `{user_id}` path segment.
pub struct UserPath(pub UserId);

impl<S> FromRequestParts<S> for UserPath
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|_| AppError::NotFound(USER_NOT_FOUND.to_string()))?;

        raw.parse()
            .map(Self)
            .map_err(|_| AppError::NotFound(USER_NOT_FOUND.to_string()))
    }
}

/// Extractor that requires the caller to own the product named in the path.
///
/// Authenticates first, then loads the product fresh from the store. Used by
/// every product mutation so the check cannot be skipped.
///
/// # Example
///
/// ```rust,ignore
/// async fn delete(OwnedProduct { product, .. }: OwnedProduct) -> impl IntoResponse {
///     format!("deleting {}", product.id)
/// }
/// ```
pub struct OwnedProduct {
    /// The product as currently stored.
    pub product: Product,
    /// The authenticated owner.
    pub caller: CurrentUser,
}

impl FromRequestParts<AppState> for OwnedProduct {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let RequireAuth(caller) = RequireAuth::from_request_parts(parts, state).await?;
        let ProductPath(id) = ProductPath::from_request_parts(parts, state).await?;

        let product = check_ownership(state.products(), id, &caller).await?;

        Ok(Self { product, caller })
    }
}
