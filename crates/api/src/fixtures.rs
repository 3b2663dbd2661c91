//! Load users and products from a YAML fixture file.
//!
//! Used by `bakeapi-cli seed` against `PostgreSQL`, and at startup to
//! populate the in-memory store.
//!
//! ## YAML Format
//!
//! ```yaml
//! users:
//!   - email: paul@example.com
//!     password: croissant123
//!     bakeryName: Chez Paul
//!
//! products:
//!   - name: Baguette
//!     price: 1.20
//!     user: 1          # 1-based position in `users`
//!   - name: Tarte aux pommes
//!     price: "20.00"
//!     status: En vente
//!     user: 1
//!     ageHours: 5      # backdate creation
//! ```

use std::path::Path;

use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;
use thiserror::Error;
use tracing::{info, instrument};

use bakeapi_core::{Price, ProductStatus, UserId};

use crate::db::{ProductStore, RepositoryError, UserStore};
use crate::models::NewProduct;
use crate::services::auth::{AuthError, AuthService};

/// Largest accepted `ageHours` (ten years).
pub const MAX_AGE_HOURS: i64 = 24 * 365 * 10;

/// A user to create.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserFixture {
    /// Login email.
    pub email: String,
    /// Plaintext password, hashed before storage.
    pub password: String,
    /// Display name of the bakery.
    #[serde(default)]
    pub bakery_name: Option<String>,
}

/// A product to create.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductFixture {
    /// Display name.
    pub name: String,
    /// List price.
    pub price: Price,
    /// Initial status (defaults to on sale).
    #[serde(default)]
    pub status: Option<ProductStatus>,
    /// Owner, as a 1-based position in the file's `users` list.
    pub user: usize,
    /// How many hours ago the product was listed.
    #[serde(default)]
    pub age_hours: Option<i64>,
}

/// Full fixture file structure.
#[derive(Debug, Default, Deserialize)]
pub struct Fixtures {
    /// Users, in insertion order.
    #[serde(default)]
    pub users: Vec<UserFixture>,
    /// Products, in insertion order.
    #[serde(default)]
    pub products: Vec<ProductFixture>,
}

/// Result of a fixture load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeedResult {
    /// Number of users inserted.
    pub users: usize,
    /// Number of products inserted.
    pub products: usize,
}

/// Errors raised while loading fixtures.
#[derive(Debug, Error)]
pub enum FixtureError {
    /// The file could not be read.
    #[error("failed to read {path}: {message}")]
    Io {
        /// File path.
        path: String,
        /// Underlying error.
        message: String,
    },

    /// The file is not valid fixture YAML.
    #[error("failed to parse YAML: {0}")]
    Parse(#[from] serde_yaml::Error),

    /// The file parsed but describes invalid data.
    #[error("{} validation errors found", .0.len())]
    Invalid(Vec<String>),

    /// A user could not be created.
    #[error("user fixture failed: {0}")]
    Auth(#[from] AuthError),

    /// A product could not be stored.
    #[error("product fixture failed: {0}")]
    Repository(#[from] RepositoryError),
}

/// Parse fixtures from a YAML file.
///
/// # Errors
///
/// Returns `FixtureError::Io` or `FixtureError::Parse` if the file cannot be
/// read or parsed.
pub async fn read_file(path: &Path) -> Result<Fixtures, FixtureError> {
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| FixtureError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;

    Ok(serde_yaml::from_str(&content)?)
}

/// Check fixtures for problems that would only surface part way through a load.
#[must_use]
pub fn validate(fixtures: &Fixtures) -> Vec<String> {
    let mut errors = Vec::new();

    for (i, product) in fixtures.products.iter().enumerate() {
        if product.user == 0 || product.user > fixtures.users.len() {
            errors.push(format!(
                "product {} ({}) refers to user {} but only {} users are defined",
                i + 1,
                product.name,
                product.user,
                fixtures.users.len()
            ));
        }
        if product.name.trim().is_empty() {
            errors.push(format!("product {} has an empty name", i + 1));
        }
        match product.age_hours {
            Some(h) if h < 0 => {
                errors.push(format!("product {} has a negative ageHours", i + 1));
            }
            Some(h) if h > MAX_AGE_HOURS => {
                errors.push(format!(
                    "product {} has ageHours above {MAX_AGE_HOURS}",
                    i + 1
                ));
            }
            _ => {}
        }
    }

    errors
}

/// Load fixtures from a file into the given stores.
///
/// # Errors
///
/// Returns `FixtureError` if the file is unreadable or invalid, or if a
/// store operation fails.
#[instrument(skip(users, products, path), fields(path = %path.display()))]
pub async fn load_file(
    users: &dyn UserStore,
    products: &dyn ProductStore,
    path: &Path,
) -> Result<SeedResult, FixtureError> {
    let fixtures = read_file(path).await?;
    load(users, products, &fixtures, Utc::now()).await
}

/// Insert users then products, resolving owners by position.
///
/// # Errors
///
/// Returns `FixtureError::Invalid` before touching the stores if validation
/// fails, otherwise the first store error encountered.
pub async fn load(
    users: &dyn UserStore,
    products: &dyn ProductStore,
    fixtures: &Fixtures,
    now: DateTime<Utc>,
) -> Result<SeedResult, FixtureError> {
    let errors = validate(fixtures);
    if !errors.is_empty() {
        return Err(FixtureError::Invalid(errors));
    }

    let auth = AuthService::new(users);
    let mut user_ids: Vec<UserId> = Vec::with_capacity(fixtures.users.len());
    for user in &fixtures.users {
        let created = auth
            .register(&user.email, &user.password, user.bakery_name.as_deref())
            .await?;
        user_ids.push(created.id);
    }

    let mut inserted = 0;
    for (i, product) in fixtures.products.iter().enumerate() {
        let Some(owner) = product.user.checked_sub(1).and_then(|idx| user_ids.get(idx)) else {
            return Err(FixtureError::Invalid(vec![format!(
                "product {} has no owner",
                i + 1
            )]));
        };

        let input = NewProduct::new(Some(product.name.clone()), Some(product.price), product.status)
            .map_err(|e| FixtureError::Invalid(vec![format!("product {}: {e}", i + 1)]))?;
        let created_at = Duration::try_hours(product.age_hours.unwrap_or(0))
            .and_then(|age| now.checked_sub_signed(age))
            .ok_or_else(|| {
                FixtureError::Invalid(vec![format!("product {} is too old", i + 1)])
            })?;

        products.insert(*owner, &input, created_at).await?;
        inserted += 1;
    }

    let result = SeedResult {
        users: user_ids.len(),
        products: inserted,
    };
    info!(users = result.users, products = result.products, "Fixtures loaded");

    Ok(result)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;
    use bakeapi_core::Email;

    const YAML: &str = r#"
users:
  - email: paul@example.com
    password: croissant123
    bakeryName: Chez Paul
  - email: marie@example.com
    password: brioche456

products:
  - name: Baguette
    price: 1.2
    user: 1
  - name: Tarte aux pommes
    price: "20.00"
    status: En vente
    user: 2
    ageHours: 5
"#;

    #[test]
    fn test_parse_yaml_fixtures() {
        let fixtures: Fixtures = serde_yaml::from_str(YAML).unwrap();
        assert_eq!(fixtures.users.len(), 2);
        assert_eq!(fixtures.users[0].bakery_name.as_deref(), Some("Chez Paul"));
        assert_eq!(fixtures.products[0].price.to_string(), "1.20");
        assert_eq!(fixtures.products[1].age_hours, Some(5));
        assert!(validate(&fixtures).is_empty());
    }

    #[test]
    fn test_validate_rejects_bad_owner() {
        let yaml = r"
products:
  - name: Orphan
    price: 2
    user: 1
";
        let fixtures: Fixtures = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(validate(&fixtures).len(), 1);
    }

    #[test]
    fn test_validate_rejects_out_of_range_age() {
        let yaml = format!(
            r"
users:
  - email: paul@example.com
    password: croissant123
products:
  - name: Ancient
    price: 2
    user: 1
    ageHours: {}
  - name: Future
    price: 2
    user: 1
    ageHours: -1
  - name: Decade
    price: 2
    user: 1
    ageHours: {MAX_AGE_HOURS}
",
            i64::MAX
        );
        let fixtures: Fixtures = serde_yaml::from_str(&yaml).unwrap();

        let errors = validate(&fixtures);
        assert_eq!(errors.len(), 2);
        assert!(errors[0].contains("product 1"));
        assert!(errors[1].contains("product 2"));
    }

    #[tokio::test]
    async fn test_load_rejects_huge_age_without_panicking() {
        let store = MemoryStore::new();
        let yaml = format!(
            r"
users:
  - email: paul@example.com
    password: croissant123
products:
  - name: Ancient
    price: 2
    user: 1
    ageHours: {}
",
            i64::MAX
        );
        let fixtures: Fixtures = serde_yaml::from_str(&yaml).unwrap();

        let result = load(&store, &store, &fixtures, Utc::now()).await;
        assert!(matches!(result, Err(FixtureError::Invalid(_))));
        assert!(store.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_load_into_memory_store() {
        let store = MemoryStore::new();
        let fixtures: Fixtures = serde_yaml::from_str(YAML).unwrap();
        let now = Utc::now();

        let result = load(&store, &store, &fixtures, now).await.unwrap();
        assert_eq!(result, SeedResult { users: 2, products: 2 });

        let all = store.list().await.unwrap();
        assert_eq!(all[0].user_id, UserId::new(1));
        assert_eq!(all[1].user_id, UserId::new(2));
        assert_eq!(all[1].created_at, now - Duration::hours(5));
    }

    #[tokio::test]
    async fn test_invalid_fixtures_touch_nothing() {
        let store = MemoryStore::new();
        let fixtures: Fixtures = serde_yaml::from_str(
            r"
users:
  - email: paul@example.com
    password: croissant123
products:
  - name: Pain
    price: 1
    user: 3
",
        )
        .unwrap();

        let result = load(&store, &store, &fixtures, Utc::now()).await;
        assert!(matches!(result, Err(FixtureError::Invalid(_))));
        let paul = Email::parse("paul@example.com").unwrap();
        assert!(store.get_credentials(&paul).await.unwrap().is_none());
    }
}
