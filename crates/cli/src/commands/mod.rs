//! CLI command implementations.

pub mod migrate;
pub mod seed;
pub mod user;

use secrecy::SecretString;
use sqlx::PgPool;
use thiserror::Error;

use bakeapi_api::db::{self, PgStore, RepositoryError};
use bakeapi_api::fixtures::FixtureError;
use bakeapi_api::services::auth::AuthError;

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CommandError {
    /// Required environment variable is missing.
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    /// Database connection error.
    #[error("Database connection error: {0}")]
    Database(#[from] sqlx::Error),

    /// Migration failed.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Fixture file could not be loaded.
    #[error("Fixture error: {0}")]
    Fixture(#[from] FixtureError),

    /// User could not be created.
    #[error("User error: {0}")]
    Auth(#[from] AuthError),

    /// Store operation failed.
    #[error("Store error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Read the database URL (`BAKEAPI_DATABASE_URL`, falling back to `DATABASE_URL`).
fn database_url() -> Result<SecretString, CommandError> {
    dotenvy::dotenv().ok();

    std::env::var("BAKEAPI_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map(SecretString::from)
        .map_err(|_| CommandError::MissingEnvVar("BAKEAPI_DATABASE_URL"))
}

/// Connect to the configured database.
async fn connect() -> Result<PgPool, CommandError> {
    let database_url = database_url()?;

    tracing::info!("Connecting to database...");
    Ok(db::create_pool(&database_url).await?)
}

/// Connect and wrap the pool in a store.
async fn open_store() -> Result<PgStore, CommandError> {
    Ok(PgStore::new(connect().await?))
}
