//! Signed bearer tokens.
//!
//! Tokens are HS256 JWTs whose claims are the caller's identity plus the
//! standard `iat`/`exp` timestamps. Verification never touches the store.

use std::fmt;

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use super::AuthError;
use crate::models::CurrentUser;

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    #[serde(flatten)]
    user: CurrentUser,
    iat: i64,
    exp: i64,
}

/// Issues and verifies bearer tokens with a shared secret.
#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl fmt::Debug for TokenService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenService")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

impl TokenService {
    /// Create a token service signing with `secret`; tokens live `ttl_hours`.
    #[must_use]
    pub fn new(secret: &SecretString, ttl_hours: i64) -> Self {
        let key = secret.expose_secret().as_bytes();
        Self {
            encoding: EncodingKey::from_secret(key),
            decoding: DecodingKey::from_secret(key),
            ttl: Duration::hours(ttl_hours),
        }
    }

    /// Issue a token for `user`, valid from now.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::TokenSigning` if the claims cannot be encoded.
    pub fn issue(&self, user: &CurrentUser) -> Result<String, AuthError> {
        self.issue_at(user, Utc::now())
    }

    /// Issue a token for `user` as if signed at `issued_at`.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::TokenSigning` if the claims cannot be encoded.
    pub fn issue_at(&self, user: &CurrentUser, issued_at: DateTime<Utc>) -> Result<String, AuthError> {
        let claims = Claims {
            user: user.clone(),
            iat: issued_at.timestamp(),
            exp: (issued_at + self.ttl).timestamp(),
        };

        Ok(jsonwebtoken::encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &self.encoding,
        )?)
    }

    /// Verify a token and return the identity it carries.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidToken` if the signature, expiry or claims
    /// do not check out.
    pub fn verify(&self, token: &str) -> Result<CurrentUser, AuthError> {
        let validation = Validation::new(Algorithm::HS256);
        let data = jsonwebtoken::decode::<Claims>(token, &self.decoding, &validation).map_err(
            |e| {
                tracing::debug!(error = %e, "Rejected bearer token");
                AuthError::InvalidToken
            },
        )?;

        Ok(data.claims.user)
    }
}
