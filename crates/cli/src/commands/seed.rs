//! Load fixture users and products into the database.
//!
//! See `bakeapi_api::fixtures` for the YAML format.

use std::path::Path;

use chrono::Utc;
use tracing::{error, info};

use bakeapi_api::fixtures::{self, FixtureError};

use super::{CommandError, open_store};

/// Seed the database from a YAML fixture file.
///
/// # Arguments
///
/// * `file_path` - Path to the YAML fixture file
/// * `clear_existing` - If true, delete all users and products first
///
/// # Errors
///
/// Returns an error if the file cannot be read or is invalid, or if
/// database operations fail.
pub async fn run(file_path: &str, clear_existing: bool) -> Result<(), CommandError> {
    let path = Path::new(file_path);
    info!(path = %file_path, "Loading fixtures from file");

    // Read and validate YAML before connecting to database
    let parsed = fixtures::read_file(path).await?;
    let errors = fixtures::validate(&parsed);
    if !errors.is_empty() {
        error!("Fixture validation failed:");
        for err in &errors {
            error!("  - {err}");
        }
        return Err(FixtureError::Invalid(errors).into());
    }

    let store = open_store().await?;
    info!("Connected to database");

    if clear_existing {
        store.clear().await?;
        info!("Cleared existing users and products");
    }

    let result = fixtures::load(&store, &store, &parsed, Utc::now()).await?;

    info!("Seeding complete!");
    info!("  Users inserted: {}", result.users);
    info!("  Products inserted: {}", result.products);

    Ok(())
}

