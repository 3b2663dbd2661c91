//! Bearer token authentication.
//!
//! Provides the `RequireAuth` extractor, which verifies the
//! `Authorization: Bearer <token>` header and yields the caller's identity.

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
    response::{IntoResponse, Response},
};
use tracing::Span;

use crate::error::{AppError, set_sentry_user};
use crate::models::CurrentUser;
use crate::services::auth::AuthError;
use crate::state::AppState;

/// Extractor that requires a valid bearer token.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(
///     RequireAuth(user): RequireAuth,
/// ) -> impl IntoResponse {
///     format!("Hello, {}!", user.email)
/// }
/// ```
pub struct RequireAuth(pub CurrentUser);

/// Error returned when a request cannot be authenticated.
#[derive(Debug)]
pub enum AuthRejection {
    /// No bearer token was supplied.
    MissingToken,
    /// A token was supplied but did not verify.
    InvalidToken,
}

impl From<AuthRejection> for AppError {
    fn from(rejection: AuthRejection) -> Self {
        match rejection {
            AuthRejection::MissingToken => Self::Unauthorized("No token provided".to_string()),
            AuthRejection::InvalidToken => Self::Auth(AuthError::InvalidToken),
        }
    }
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        AppError::from(self).into_response()
    }
}

/// Pull the token out of an `Authorization: Bearer <token>` header.
fn bearer_token(parts: &Parts) -> Option<&str> {
    let value = parts.headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

impl FromRequestParts<AppState> for RequireAuth {
    type Rejection = AuthRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts).ok_or(AuthRejection::MissingToken)?;

        let user = state
            .tokens()
            .verify(token)
            .map_err(|_| AuthRejection::InvalidToken)?;

        Span::current().record("user_id", user.user_id.as_i32());
        set_sentry_user(&user.user_id, Some(&user.email));

        Ok(Self(user))
    }
}
