//! Database migration command.
//!
//! # Usage
//!
//! ```bash
//! bakeapi-cli migrate
//! ```
//!
//! # Environment Variables
//!
//! - `BAKEAPI_DATABASE_URL` (or `DATABASE_URL`) - `PostgreSQL` connection string
//!
//! # Migration Files
//!
//! Migrations live in `crates/api/migrations/`:
//! ```text
//! migrations/
//! ├── 20260301000001_create_users.sql
//! └── 20260301000002_create_products.sql
//! ```

use super::{CommandError, connect};

/// Run the API database migrations.
///
/// # Errors
///
/// Returns `CommandError` if the database is unreachable or a migration fails.
pub async fn run() -> Result<(), CommandError> {
    let pool = connect().await?;

    tracing::info!("Running migrations...");
    sqlx::migrate!("../api/migrations").run(&pool).await?;

    tracing::info!("Migrations complete!");
    Ok(())
}
