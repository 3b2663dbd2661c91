//! User management commands.
//!
//! # Usage
//!
//! ```bash
//! bakeapi-cli user create -e paul@example.com -p 'croissant123' -b "Chez Paul"
//! ```

use bakeapi_api::services::auth::AuthService;

use super::{CommandError, open_store};

/// Create a new user with a hashed password.
///
/// # Arguments
///
/// * `email` - Login email address
/// * `password` - Plaintext password (hashed with Argon2id)
/// * `bakery_name` - Optional bakery display name
///
/// # Returns
///
/// The ID of the created user.
///
/// # Errors
///
/// Returns `CommandError` if the email is invalid or taken, the password is
/// too short, or the database is unreachable.
pub async fn create(
    email: &str,
    password: &str,
    bakery_name: Option<&str>,
) -> Result<i32, CommandError> {
    let store = open_store().await?;

    tracing::info!("Creating user: {}", email);
    let user = AuthService::new(&store)
        .register(email, password, bakery_name)
        .await?;

    tracing::info!(user_id = %user.id, "User created");
    Ok(user.id.as_i32())
}
