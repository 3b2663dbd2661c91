//! Bulk markdown of a bakery's stale products.
//!
//! Products that are still on sale and were listed at least
//! [`DISCOUNT_AGE_HOURS`] ago get their price reduced by a percentage and are
//! flagged as unsold. Each product is updated independently; a failure part
//! way through leaves earlier markdowns in place.

use chrono::{DateTime, Duration, Utc};
use thiserror::Error;

use bakeapi_core::{DiscountRate, UserId};

use crate::db::{ProductStore, RepositoryError};

/// Minimum age, in hours, before a product can be marked down.
pub const DISCOUNT_AGE_HOURS: i64 = 4;

/// Errors from a bulk markdown.
#[derive(Debug, Error)]
pub enum DiscountError {
    /// The caller has no product old enough and still on sale.
    #[error("no product to update")]
    NoneEligible,

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Oldest creation time that still qualifies at `now`.
#[must_use]
pub fn eligibility_cutoff(now: DateTime<Utc>) -> DateTime<Utc> {
    now - Duration::hours(DISCOUNT_AGE_HOURS)
}

/// Mark down every eligible product owned by `owner`.
///
/// Returns the number of products updated. A product that stopped being on
/// sale between selection and update is skipped rather than discounted twice.
///
/// # Errors
///
/// Returns `DiscountError::NoneEligible` if nothing qualifies, or
/// `DiscountError::Repository` if the store fails.
pub async fn apply_discount(
    products: &dyn ProductStore,
    owner: UserId,
    rate: DiscountRate,
    now: DateTime<Utc>,
) -> Result<usize, DiscountError> {
    let eligible = products
        .list_discount_eligible(owner, eligibility_cutoff(now))
        .await?;

    if eligible.is_empty() {
        return Err(DiscountError::NoneEligible);
    }

    let mut updated = 0;
    for product in &eligible {
        let price = product.price.discounted(rate);
        if products.mark_unsold(product.id, price).await? {
            updated += 1;
        } else {
            tracing::debug!(product_id = %product.id, "Skipped markdown, product changed");
        }
    }

    tracing::info!(
        user_id = %owner,
        rate = %rate,
        eligible = eligible.len(),
        updated,
        "Applied unsold markdown"
    );

    Ok(updated)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal::Decimal;

    use bakeapi_core::{Email, Price, ProductStatus};

    use super::*;
    use crate::db::{MemoryStore, UserStore};
    use crate::models::NewProduct;

    fn price(cents: i64) -> Price {
        Price::new(Decimal::new(cents, 2)).unwrap()
    }

    fn rate(percent: i64) -> DiscountRate {
        DiscountRate::new(Decimal::new(percent, 0)).unwrap()
    }

    fn product(name: &str, cents: i64, status: ProductStatus) -> NewProduct {
        NewProduct::new(Some(name.to_owned()), Some(price(cents)), Some(status)).unwrap()
    }

    async fn baker(store: &MemoryStore, email: &str) -> UserId {
        store
            .create_user(&Email::parse(email).unwrap(), "h", None)
            .await
            .unwrap()
            .id
    }

    #[tokio::test]
    async fn test_only_old_on_sale_products_of_owner() {
        let store = MemoryStore::new();
        let owner = baker(&store, "a@example.com").await;
        let other = baker(&store, "b@example.com").await;
        let now = Utc::now();

        let old = store
            .insert(owner, &product("Tarte", 2000, ProductStatus::OnSale), now - Duration::hours(5))
            .await
            .unwrap();
        let fresh = store
            .insert(owner, &product("Pain", 1000, ProductStatus::OnSale), now - Duration::hours(3))
            .await
            .unwrap();
        let unsold = store
            .insert(owner, &product("Flan", 800, ProductStatus::Unsold), now - Duration::hours(6))
            .await
            .unwrap();
        let foreign = store
            .insert(other, &product("Cake", 1200, ProductStatus::OnSale), now - Duration::hours(6))
            .await
            .unwrap();

        let count = apply_discount(&store, owner, rate(25), now).await.unwrap();
        assert_eq!(count, 1);

        let old = store.get(old.id).await.unwrap().unwrap();
        assert_eq!(old.price, price(1500));
        assert_eq!(old.status, ProductStatus::Unsold);

        for untouched in [fresh, unsold, foreign] {
            assert_eq!(store.get(untouched.id).await.unwrap().unwrap(), untouched);
        }
    }

    #[tokio::test]
    async fn test_exact_cutoff_qualifies() {
        let store = MemoryStore::new();
        let owner = baker(&store, "a@example.com").await;
        let now = Utc::now();
        store
            .insert(owner, &product("Tarte", 1000, ProductStatus::OnSale), eligibility_cutoff(now))
            .await
            .unwrap();

        assert_eq!(apply_discount(&store, owner, rate(10), now).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_none_eligible() {
        let store = MemoryStore::new();
        let owner = baker(&store, "a@example.com").await;
        let now = Utc::now();
        store
            .insert(owner, &product("Pain", 1000, ProductStatus::OnSale), now)
            .await
            .unwrap();

        assert!(matches!(
            apply_discount(&store, owner, rate(10), now).await,
            Err(DiscountError::NoneEligible)
        ));
    }

    #[tokio::test]
    async fn test_second_run_finds_nothing() {
        let store = MemoryStore::new();
        let owner = baker(&store, "a@example.com").await;
        let now = Utc::now();
        store
            .insert(owner, &product("Tarte", 2000, ProductStatus::OnSale), now - Duration::hours(5))
            .await
            .unwrap();

        assert_eq!(apply_discount(&store, owner, rate(50), now).await.unwrap(), 1);
        assert!(matches!(
            apply_discount(&store, owner, rate(50), now).await,
            Err(DiscountError::NoneEligible)
        ));
    }
}
