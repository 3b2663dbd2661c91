//! Product route handlers.

use axum::{
    Json,
    extract::State,
    http::StatusCode,
};
use chrono::Utc;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use bakeapi_core::{DiscountRate, DiscountRateError, Price, ProductStatus};

use crate::error::{ApiJson, AppError, PRODUCT_NOT_FOUND, Result};
use crate::middleware::{OwnedProduct, ProductPath, RequireAuth, UserPath};
use crate::models::{NewProduct, Product, ProductChanges};
use crate::services::discount::apply_discount;
use crate::state::AppState;

/// Body of create and update requests.
///
/// Every field is optional here; creation enforces `name` and `price`.
/// Unknown fields (including `userId`) are ignored.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductRequest {
    pub name: Option<String>,
    pub price: Option<Price>,
    pub status: Option<ProductStatus>,
}

/// Body of the bulk markdown request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscountRequest {
    /// Percentage, as a JSON number or numeric string.
    pub reduction_rate: Option<serde_json::Value>,
}

/// Plain confirmation message.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// List every product.
///
/// GET /api/products
///
/// # Errors
///
/// Returns `AppError::Database` if the store fails.
pub async fn index(State(state): State<AppState>) -> Result<Json<Vec<Product>>> {
    let products = state.products().list().await?;
    Ok(Json(products))
}

/// Show a single product.
///
/// GET /api/products/{id}
///
/// # Errors
///
/// Returns 404 if the product does not exist.
pub async fn show(
    State(state): State<AppState>,
    ProductPath(id): ProductPath,
) -> Result<Json<Product>> {
    let product = state
        .products()
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound(PRODUCT_NOT_FOUND.to_string()))?;

    Ok(Json(product))
}

/// List the products of one bakery.
///
/// GET /api/products/user/{user_id}
///
/// # Errors
///
/// Returns 404 if the user does not exist.
pub async fn by_user(
    State(state): State<AppState>,
    UserPath(user_id): UserPath,
) -> Result<Json<Vec<Product>>> {
    let products = state.products().list_by_owner(user_id).await?;
    Ok(Json(products))
}

/// Create a product owned by the caller.
///
/// POST /api/products
///
/// # Errors
///
/// Returns 400 for missing or invalid fields, 404 if the caller's account no
/// longer exists.
pub async fn create(
    State(state): State<AppState>,
    RequireAuth(caller): RequireAuth,
    ApiJson(body): ApiJson<ProductRequest>,
) -> Result<(StatusCode, Json<Product>)> {
    let input = NewProduct::new(body.name, body.price, body.status)?;
    let product = state.products().create(caller.user_id, &input).await?;

    tracing::info!(
        product_id = %product.id,
        user_id = %caller.user_id,
        "Product created"
    );

    Ok((StatusCode::CREATED, Json(product)))
}

/// Update fields of a product the caller owns.
///
/// PUT /api/products/{id}
///
/// # Errors
///
/// Returns 403 if the caller is not the owner, 404 if the product does not
/// exist, 400 for invalid fields.
pub async fn update(
    State(state): State<AppState>,
    OwnedProduct { product, .. }: OwnedProduct,
    ApiJson(body): ApiJson<ProductRequest>,
) -> Result<Json<Product>> {
    let changes = ProductChanges::new(body.name, body.price, body.status)?;
    if changes.is_empty() {
        return Ok(Json(product));
    }

    let updated = state
        .products()
        .update(product.id, &changes)
        .await?
        .ok_or_else(|| AppError::NotFound(PRODUCT_NOT_FOUND.to_string()))?;

    Ok(Json(updated))
}

/// Delete a product the caller owns.
///
/// DELETE /api/products/{id}
///
/// # Errors
///
/// Returns 403 if the caller is not the owner, 404 if the product does not
/// exist.
pub async fn delete(
    State(state): State<AppState>,
    OwnedProduct { product, caller }: OwnedProduct,
) -> Result<Json<MessageResponse>> {
    if !state.products().delete(product.id).await? {
        return Err(AppError::NotFound(PRODUCT_NOT_FOUND.to_string()));
    }

    tracing::info!(product_id = %product.id, user_id = %caller.user_id, "Product deleted");

    Ok(Json(MessageResponse {
        message: "Product successfully deleted".to_string(),
    }))
}

/// Mark down the caller's stale products and flag them unsold.
///
/// PUT /api/products/user/status
///
/// # Errors
///
/// Returns 400 if `reductionRate` is not a number strictly between 0 and
/// 100, 404 if no product qualifies.
pub async fn discount(
    State(state): State<AppState>,
    RequireAuth(caller): RequireAuth,
    ApiJson(body): ApiJson<DiscountRequest>,
) -> Result<Json<MessageResponse>> {
    let rate = parse_reduction_rate(body.reduction_rate.as_ref())
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let updated = apply_discount(state.products(), caller.user_id, rate, Utc::now()).await?;

    Ok(Json(MessageResponse {
        message: format!("{updated} Product(s) status and price successfully updated"),
    }))
}

/// Accept a rate given as a JSON number or a numeric string.
fn parse_reduction_rate(
    value: Option<&serde_json::Value>,
) -> std::result::Result<DiscountRate, DiscountRateError> {
    let amount = match value {
        Some(serde_json::Value::Number(n)) => n.to_string().parse::<Decimal>().ok(),
        Some(serde_json::Value::String(s)) => s.trim().parse::<Decimal>().ok(),
        _ => None,
    };

    amount
        .ok_or(DiscountRateError::OutOfRange)
        .and_then(DiscountRate::new)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_parse_reduction_rate() {
        let rate = parse_reduction_rate(Some(&json!(25))).unwrap();
        assert_eq!(rate.percent(), Decimal::new(25, 0));

        let rate = parse_reduction_rate(Some(&json!("12.5"))).unwrap();
        assert_eq!(rate.percent(), Decimal::new(125, 1));

        for bad in [json!(0), json!(100), json!(-5), json!("abc"), json!(null), json!([10])] {
            assert!(parse_reduction_rate(Some(&bad)).is_err(), "{bad} accepted");
        }
        assert!(parse_reduction_rate(None).is_err());
    }

    #[test]
    fn test_product_request_ignores_owner() {
        let body: ProductRequest =
            serde_json::from_value(json!({"name": "Pain", "price": 2.5, "userId": 99})).unwrap();
        assert_eq!(body.name.as_deref(), Some("Pain"));
        assert_eq!(body.price.unwrap().to_string(), "2.50");
        assert!(body.status.is_none());
    }
}
