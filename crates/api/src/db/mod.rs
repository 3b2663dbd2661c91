//! Product and user persistence.
//!
//! Handlers never talk to a database directly. They go through the
//! [`ProductStore`] and [`UserStore`] traits, which have two implementations:
//!
//! - [`PgStore`] - relational store over `PostgreSQL` (`users`, `products`)
//! - [`MemoryStore`] - in-process document store, used for tests and demos
//!
//! # Migrations
//!
//! Migrations are stored in `crates/api/migrations/` and run via:
//! ```bash
//! cargo run -p bakeapi-cli -- migrate
//! ```

pub mod memory;
pub mod products;
pub mod users;

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

use bakeapi_core::{Email, Price, ProductId, UserId};

use crate::models::{NewProduct, Product, ProductChanges, User};

pub use memory::MemoryStore;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// The referenced owner does not exist.
    #[error("user {0} not found")]
    OwnerNotFound(UserId),

    /// Constraint violation (e.g., unique email).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// Lookup and creation of marketplace users.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Get a user together with their password hash, by email.
    async fn get_credentials(
        &self,
        email: &Email,
    ) -> Result<Option<(User, String)>, RepositoryError>;

    /// Create a user. Fails with `Conflict` if the email is taken.
    async fn create_user(
        &self,
        email: &Email,
        password_hash: &str,
        bakery_name: Option<&str>,
    ) -> Result<User, RepositoryError>;
}

/// Durable table of products keyed by [`ProductId`].
#[async_trait]
pub trait ProductStore: Send + Sync {
    /// All products, ordered by ID.
    async fn list(&self) -> Result<Vec<Product>, RepositoryError>;

    /// A single product, or `None` if it does not exist.
    async fn get(&self, id: ProductId) -> Result<Option<Product>, RepositoryError>;

    /// Products owned by `owner`, ordered by ID.
    ///
    /// Fails with `OwnerNotFound` when the user does not exist, so callers can
    /// tell a missing user from one with no products.
    async fn list_by_owner(&self, owner: UserId) -> Result<Vec<Product>, RepositoryError>;

    /// Insert a product with an explicit creation time.
    ///
    /// Fails with `OwnerNotFound` when `owner` does not resolve.
    async fn insert(
        &self,
        owner: UserId,
        product: &NewProduct,
        created_at: DateTime<Utc>,
    ) -> Result<Product, RepositoryError>;

    /// Create a product stamped with the current time.
    async fn create(&self, owner: UserId, product: &NewProduct) -> Result<Product, RepositoryError> {
        self.insert(owner, product, Utc::now()).await
    }

    /// Merge `changes` into a product. Returns `None` if it does not exist.
    async fn update(
        &self,
        id: ProductId,
        changes: &ProductChanges,
    ) -> Result<Option<Product>, RepositoryError>;

    /// Delete a product. Returns `false` if it did not exist.
    async fn delete(&self, id: ProductId) -> Result<bool, RepositoryError>;

    /// Products of `owner` that are on sale and were created at or before `cutoff`.
    async fn list_discount_eligible(
        &self,
        owner: UserId,
        cutoff: DateTime<Utc>,
    ) -> Result<Vec<Product>, RepositoryError>;

    /// Set a new price and mark the product unsold, only if it is still on sale.
    ///
    /// Returns `false` if the product vanished or was already marked down.
    async fn mark_unsold(&self, id: ProductId, price: Price) -> Result<bool, RepositoryError>;

    /// Check that the store is reachable.
    async fn ping(&self) -> Result<(), RepositoryError> {
        Ok(())
    }
}

/// Relational store backed by a `PostgreSQL` pool.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Wrap an existing pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Get a reference to the underlying pool.
    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
