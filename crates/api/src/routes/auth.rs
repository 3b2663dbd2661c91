//! Authentication route handlers.

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};

use crate::error::{ApiJson, AppError, Result};
use crate::models::CurrentUser;
use crate::services::auth::AuthService;
use crate::state::AppState;

/// Login request body.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Issued bearer token.
#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: String,
}

/// Exchange email and password for a bearer token.
///
/// POST /api/auth/login
///
/// # Errors
///
/// Returns 400 if a field is missing, 404 if no user has the email, 401 if
/// the password is wrong.
pub async fn login(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<LoginRequest>,
) -> Result<Json<TokenResponse>> {
    let (Some(email), Some(password)) = (body.email, body.password) else {
        return Err(AppError::BadRequest(
            "email and password are required".to_string(),
        ));
    };

    let auth = AuthService::new(state.users());
    let user = auth.login(&email, &password).await?;

    let token = state.tokens().issue(&CurrentUser::from(&user))?;

    tracing::info!(user_id = %user.id, "User logged in");

    Ok(Json(TokenResponse { token }))
}
