//! API index and token probe.

use axum::Json;
use serde::Serialize;

use crate::middleware::RequireAuth;
use crate::models::CurrentUser;

/// Welcome payload.
#[derive(Debug, Serialize)]
pub struct IndexResponse {
    pub message: &'static str,
    pub documentation: &'static str,
}

/// Identity echoed back to an authenticated caller.
#[derive(Debug, Serialize)]
pub struct ProtectedResponse {
    pub message: &'static str,
    pub user: CurrentUser,
}

/// API welcome message.
///
/// GET /api
pub async fn index() -> Json<IndexResponse> {
    Json(IndexResponse {
        message: "Welcome to BakeAPI!",
        documentation: "/api-docs",
    })
}

/// Confirm that the bearer token is valid.
///
/// GET /api/protected
pub async fn protected(RequireAuth(user): RequireAuth) -> Json<ProtectedResponse> {
    Json(ProtectedResponse {
        message: "Access granted",
        user,
    })
}
