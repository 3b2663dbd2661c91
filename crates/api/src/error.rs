//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures server errors to Sentry
//! before responding to the client. Every error response is a JSON object of
//! the form `{"error": "..."}`. All route handlers return `Result<T, AppError>`.

use axum::{
    Json,
    extract::{FromRequest, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::db::RepositoryError;
use crate::models::ProductValidationError;
use crate::services::auth::AuthError;
use crate::services::discount::DiscountError;
use crate::services::ownership::OwnershipError;

/// Message returned when a product does not exist.
pub const PRODUCT_NOT_FOUND: &str = "Product not found";

/// Message returned when a user does not exist.
pub const USER_NOT_FOUND: &str = "User not found";

/// Message returned when a non-owner tries to change a product.
pub const NOT_PRODUCT_OWNER: &str = "You are not authorized to perform this action on this product";

/// Application-level error type for the API.
#[derive(Debug, Error)]
pub enum AppError {
    /// Store operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Authentication operation failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Ownership check failed.
    #[error("Ownership error: {0}")]
    Ownership(#[from] OwnershipError),

    /// Bulk markdown failed.
    #[error("Discount error: {0}")]
    Discount(#[from] DiscountError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// No bearer token supplied.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// The path exists but not for this method.
    #[error("Method not allowed")]
    MethodNotAllowed,
}

/// JSON body of every error response.
#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            Self::Database(err) => repository_status(err),
            Self::Auth(err) => match err {
                AuthError::UserNotFound => StatusCode::NOT_FOUND,
                AuthError::InvalidCredentials => StatusCode::UNAUTHORIZED,
                AuthError::InvalidToken => StatusCode::FORBIDDEN,
                AuthError::UserAlreadyExists => StatusCode::CONFLICT,
                AuthError::WeakPassword(_) | AuthError::InvalidEmail(_) => StatusCode::BAD_REQUEST,
                AuthError::Repository(err) => repository_status(err),
                AuthError::TokenSigning(_) | AuthError::PasswordHash => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            Self::Ownership(err) => match err {
                OwnershipError::NotFound => StatusCode::NOT_FOUND,
                OwnershipError::Forbidden => StatusCode::FORBIDDEN,
                OwnershipError::Repository(err) => repository_status(err),
            },
            Self::Discount(err) => match err {
                DiscountError::NoneEligible => StatusCode::NOT_FOUND,
                DiscountError::Repository(err) => repository_status(err),
            },
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
        }
    }

    fn message(&self) -> String {
        match self {
            Self::Database(err) => repository_message(err),
            Self::Auth(err) => match err {
                AuthError::UserNotFound => USER_NOT_FOUND.to_string(),
                AuthError::InvalidCredentials => "Authentication failed".to_string(),
                AuthError::InvalidToken => "Invalid token".to_string(),
                AuthError::UserAlreadyExists => {
                    "An account with this email already exists".to_string()
                }
                AuthError::WeakPassword(msg) => msg.clone(),
                AuthError::InvalidEmail(_) => "Invalid email address".to_string(),
                AuthError::Repository(err) => repository_message(err),
                AuthError::TokenSigning(_) | AuthError::PasswordHash => err.to_string(),
            },
            Self::Ownership(err) => match err {
                OwnershipError::NotFound => PRODUCT_NOT_FOUND.to_string(),
                OwnershipError::Forbidden => NOT_PRODUCT_OWNER.to_string(),
                OwnershipError::Repository(err) => repository_message(err),
            },
            Self::Discount(err) => match err {
                DiscountError::NoneEligible => "No product to update".to_string(),
                DiscountError::Repository(err) => repository_message(err),
            },
            Self::NotFound(msg) | Self::Unauthorized(msg) | Self::BadRequest(msg) => msg.clone(),
            Self::MethodNotAllowed => "Method not allowed".to_string(),
        }
    }
}

const fn repository_status(err: &RepositoryError) -> StatusCode {
    match err {
        RepositoryError::OwnerNotFound(_) => StatusCode::NOT_FOUND,
        RepositoryError::Conflict(_) => StatusCode::CONFLICT,
        RepositoryError::Database(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

// Store faults are reported verbatim so clients see the underlying cause
fn repository_message(err: &RepositoryError) -> String {
    match err {
        RepositoryError::OwnerNotFound(_) => USER_NOT_FOUND.to_string(),
        RepositoryError::Database(inner) => inner.to_string(),
        RepositoryError::Conflict(msg) => msg.clone(),
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Capture server errors to Sentry
        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        } else {
            tracing::debug!(error = %self, status = %status, "Request rejected");
        }

        let body = ErrorBody {
            error: self.message(),
        };

        (status, Json(body)).into_response()
    }
}

impl From<ProductValidationError> for AppError {
    fn from(err: ProductValidationError) -> Self {
        Self::BadRequest(err.to_string())
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

/// JSON body extractor whose rejections use the `{"error": "..."}` shape.
#[derive(Debug, FromRequest)]
#[from_request(via(Json), rejection(AppError))]
pub struct ApiJson<T>(pub T);

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context for the authenticated caller.
pub fn set_sentry_user(user_id: &impl ToString, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            email: email.map(String::from),
            ..Default::default()
        }));
    });
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use bakeapi_core::UserId;
    use http_body_util::BodyExt;

    use super::*;

    fn get_status(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    async fn get_body(err: AppError) -> serde_json::Value {
        let bytes = err.into_response().into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn test_app_error_display() {
        let err = AppError::NotFound("product-123".to_string());
        assert_eq!(err.to_string(), "Not found: product-123");

        let err = AppError::BadRequest("invalid input".to_string());
        assert_eq!(err.to_string(), "Bad request: invalid input");
    }

    #[test]
    fn test_app_error_status_codes() {
        assert_eq!(
            get_status(AppError::NotFound("test".to_string())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(AppError::Unauthorized("test".to_string())),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            get_status(AppError::BadRequest("test".to_string())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AppError::MethodNotAllowed),
            StatusCode::METHOD_NOT_ALLOWED
        );
        assert_eq!(
            get_status(AppError::Auth(AuthError::InvalidToken)),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            get_status(AppError::Ownership(OwnershipError::Forbidden)),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            get_status(AppError::Discount(DiscountError::NoneEligible)),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(AppError::Database(RepositoryError::OwnerNotFound(UserId::new(3)))),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(AppError::Database(RepositoryError::Database(
                sqlx::Error::PoolClosed
            ))),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn test_error_bodies_are_json() {
        let body = get_body(AppError::Ownership(OwnershipError::Forbidden)).await;
        assert_eq!(body["error"], NOT_PRODUCT_OWNER);

        let body = get_body(AppError::Discount(DiscountError::NoneEligible)).await;
        assert_eq!(body["error"], "No product to update");

        let body = get_body(AppError::Auth(AuthError::InvalidCredentials)).await;
        assert_eq!(body["error"], "Authentication failed");

        let body = get_body(AppError::MethodNotAllowed).await;
        assert_eq!(body["error"], "Method not allowed");
    }

    #[tokio::test]
    async fn test_store_fault_message_is_verbatim() {
        let err = sqlx::Error::PoolClosed;
        let expected = err.to_string();
        let body = get_body(AppError::Database(RepositoryError::Database(err))).await;
        assert_eq!(body["error"], expected);
    }
}
