//! Authentication service.
//!
//! Password login backed by Argon2id hashes, and bearer token issuance.

mod error;
mod token;

pub use error::AuthError;
pub use token::TokenService;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};

use bakeapi_core::Email;

use crate::db::{RepositoryError, UserStore};
use crate::models::User;

/// Minimum password length.
const MIN_PASSWORD_LENGTH: usize = 8;

/// Authentication service.
///
/// Handles user registration and password login.
pub struct AuthService<'a> {
    users: &'a dyn UserStore,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(users: &'a dyn UserStore) -> Self {
        Self { users }
    }

    /// Register a new user with email and password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidEmail` if the email format is invalid.
    /// Returns `AuthError::WeakPassword` if the password doesn't meet requirements.
    /// Returns `AuthError::UserAlreadyExists` if the email is already registered.
    pub async fn register(
        &self,
        email: &str,
        password: &str,
        bakery_name: Option<&str>,
    ) -> Result<User, AuthError> {
        let email = Email::parse(email)?;
        validate_password(password)?;
        let password_hash = hash_password(password)?;

        let user = self
            .users
            .create_user(&email, &password_hash, bakery_name)
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => AuthError::UserAlreadyExists,
                other => AuthError::Repository(other),
            })?;

        Ok(user)
    }

    /// Login with email and password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::UserNotFound` if no user has this email.
    /// Returns `AuthError::InvalidCredentials` if the password is wrong.
    pub async fn login(&self, email: &str, password: &str) -> Result<User, AuthError> {
        // A malformed address cannot belong to anyone
        let email = Email::parse(email).map_err(|_| AuthError::UserNotFound)?;

        let (user, password_hash) = self
            .users
            .get_credentials(&email)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        verify_password(password, &password_hash)?;

        Ok(user)
    }
}

/// Validate password meets requirements.
fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }

    Ok(())
}

/// Hash a password using Argon2id.
///
/// # Errors
///
/// Returns `AuthError::PasswordHash` if hashing fails.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a hash.
fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;
    let argon2 = Argon2::default();

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;

    #[test]
    fn test_hash_and_verify() {
        let hash = hash_password("croissant123").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("croissant123", &hash).is_ok());
        assert!(matches!(
            verify_password("baguette123", &hash),
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_garbage_hash_fails_closed() {
        assert!(matches!(
            verify_password("croissant123", "plaintext"),
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[tokio::test]
    async fn test_register_then_login() {
        let store = MemoryStore::new();
        let auth = AuthService::new(&store);

        let user = auth
            .register("Baker@Example.com", "croissant123", Some("Chez Paul"))
            .await
            .unwrap();
        assert_eq!(user.email.as_str(), "baker@example.com");

        let logged_in = auth.login("baker@example.com", "croissant123").await.unwrap();
        assert_eq!(logged_in, user);
    }

    #[tokio::test]
    async fn test_login_failures() {
        let store = MemoryStore::new();
        let auth = AuthService::new(&store);
        auth.register("baker@example.com", "croissant123", None)
            .await
            .unwrap();

        assert!(matches!(
            auth.login("nobody@example.com", "croissant123").await,
            Err(AuthError::UserNotFound)
        ));
        assert!(matches!(
            auth.login("not-an-email", "croissant123").await,
            Err(AuthError::UserNotFound)
        ));
        assert!(matches!(
            auth.login("baker@example.com", "wrong-password").await,
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[tokio::test]
    async fn test_register_rejects_weak_and_duplicate() {
        let store = MemoryStore::new();
        let auth = AuthService::new(&store);

        assert!(matches!(
            auth.register("baker@example.com", "short", None).await,
            Err(AuthError::WeakPassword(_))
        ));

        auth.register("baker@example.com", "croissant123", None)
            .await
            .unwrap();
        assert!(matches!(
            auth.register("baker@example.com", "croissant456", None).await,
            Err(AuthError::UserAlreadyExists)
        ));
    }
}
