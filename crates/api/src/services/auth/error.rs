//! Authentication error types.

use thiserror::Error;

use crate::db::RepositoryError;

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Invalid email format.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] bakeapi_core::EmailError),

    /// No user has this email.
    #[error("user not found")]
    UserNotFound,

    /// Wrong password.
    #[error("authentication failed")]
    InvalidCredentials,

    /// User already exists.
    #[error("user already exists")]
    UserAlreadyExists,

    /// Password too weak or invalid.
    #[error("password validation failed: {0}")]
    WeakPassword(String),

    /// Bearer token is malformed, expired or signed with another key.
    #[error("invalid token")]
    InvalidToken,

    /// Token could not be signed.
    #[error("token signing error: {0}")]
    TokenSigning(#[from] jsonwebtoken::errors::Error),

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),

    /// Password hashing error.
    #[error("password hashing error")]
    PasswordHash,
}
