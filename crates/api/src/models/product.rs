//! Product domain types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use bakeapi_core::{Price, ProductId, ProductStatus, UserId};

/// Maximum length of a product name.
pub const MAX_NAME_LENGTH: usize = 255;

/// Errors raised while validating product input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProductValidationError {
    /// A required field was not supplied.
    #[error("{0} is required")]
    MissingField(&'static str),
    /// The name is blank.
    #[error("name cannot be empty")]
    EmptyName,
    /// The name is too long.
    #[error("name must be at most {max} characters")]
    NameTooLong {
        /// Maximum allowed length.
        max: usize,
    },
}

/// A product listed by a bakery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Store-assigned identifier.
    pub id: ProductId,
    /// Display name.
    pub name: String,
    /// Current price.
    pub price: Price,
    /// Sale status.
    pub status: ProductStatus,
    /// Owning user. Never changes after creation.
    pub user_id: UserId,
    /// Creation time. Sole input to discount eligibility.
    pub created_at: DateTime<Utc>,
    /// Last modification time.
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Whether the product qualifies for the unsold markdown at `cutoff`.
    #[must_use]
    pub fn is_discount_eligible(&self, owner: UserId, cutoff: DateTime<Utc>) -> bool {
        self.user_id == owner
            && self.created_at <= cutoff
            && self.status == ProductStatus::OnSale
    }
}

/// Validated input for creating a product.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProduct {
    /// Display name (trimmed, non-empty).
    pub name: String,
    /// List price.
    pub price: Price,
    /// Initial status.
    pub status: ProductStatus,
}

impl NewProduct {
    /// Build a new product from request fields.
    ///
    /// `status` defaults to [`ProductStatus::OnSale`].
    ///
    /// # Errors
    ///
    /// Returns `ProductValidationError` if the name or price is missing or the
    /// name is blank or too long.
    pub fn new(
        name: Option<String>,
        price: Option<Price>,
        status: Option<ProductStatus>,
    ) -> Result<Self, ProductValidationError> {
        let name = name.ok_or(ProductValidationError::MissingField("name"))?;
        let price = price.ok_or(ProductValidationError::MissingField("price"))?;

        Ok(Self {
            name: validate_name(&name)?,
            price,
            status: status.unwrap_or_default(),
        })
    }
}

/// Partial update for a product. `None` fields keep their current value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductChanges {
    /// New name.
    pub name: Option<String>,
    /// New price.
    pub price: Option<Price>,
    /// New status.
    pub status: Option<ProductStatus>,
}

impl ProductChanges {
    /// Build a validated change set.
    ///
    /// # Errors
    ///
    /// Returns `ProductValidationError` if a supplied name is blank or too long.
    pub fn new(
        name: Option<String>,
        price: Option<Price>,
        status: Option<ProductStatus>,
    ) -> Result<Self, ProductValidationError> {
        let name = name.as_deref().map(validate_name).transpose()?;
        Ok(Self {
            name,
            price,
            status,
        })
    }

    /// Whether no field would change.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.name.is_none() && self.price.is_none() && self.status.is_none()
    }

    /// Merge the supplied fields into `product` and bump `updated_at`.
    pub fn apply(&self, product: &mut Product, now: DateTime<Utc>) {
        if let Some(name) = &self.name {
            product.name.clone_from(name);
        }
        if let Some(price) = self.price {
            product.price = price;
        }
        if let Some(status) = self.status {
            product.status = status;
        }
        product.updated_at = now;
    }
}

fn validate_name(name: &str) -> Result<String, ProductValidationError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ProductValidationError::EmptyName);
    }
    if name.chars().count() > MAX_NAME_LENGTH {
        return Err(ProductValidationError::NameTooLong {
            max: MAX_NAME_LENGTH,
        });
    }
    Ok(name.to_owned())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Duration;
    use rust_decimal::Decimal;

    use super::*;

    fn price(cents: i64) -> Price {
        Price::new(Decimal::new(cents, 2)).unwrap()
    }

    fn sample(now: DateTime<Utc>) -> Product {
        Product {
            id: ProductId::new(1),
            name: "Baguette".to_owned(),
            price: price(125),
            status: ProductStatus::OnSale,
            user_id: UserId::new(1),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_new_product_defaults_status() {
        let product = NewProduct::new(Some(" Croissant ".to_owned()), Some(price(110)), None).unwrap();
        assert_eq!(product.name, "Croissant");
        assert_eq!(product.status, ProductStatus::OnSale);
    }

    #[test]
    fn test_new_product_missing_fields() {
        assert_eq!(
            NewProduct::new(None, Some(price(100)), None),
            Err(ProductValidationError::MissingField("name"))
        );
        assert_eq!(
            NewProduct::new(Some("Pain".to_owned()), None, None),
            Err(ProductValidationError::MissingField("price"))
        );
    }

    #[test]
    fn test_new_product_rejects_blank_and_long_names() {
        assert_eq!(
            NewProduct::new(Some("   ".to_owned()), Some(price(100)), None),
            Err(ProductValidationError::EmptyName)
        );
        let long = "b".repeat(MAX_NAME_LENGTH + 1);
        assert!(matches!(
            NewProduct::new(Some(long), Some(price(100)), None),
            Err(ProductValidationError::NameTooLong { .. })
        ));
    }

    #[test]
    fn test_changes_apply_only_supplied_fields() {
        let created = Utc::now() - Duration::hours(1);
        let mut product = sample(created);
        let later = Utc::now();

        let changes = ProductChanges::new(None, Some(price(250)), None).unwrap();
        changes.apply(&mut product, later);

        assert_eq!(product.name, "Baguette");
        assert_eq!(product.price, price(250));
        assert_eq!(product.status, ProductStatus::OnSale);
        assert_eq!(product.created_at, created);
        assert_eq!(product.updated_at, later);
    }

    #[test]
    fn test_changes_validate_name() {
        assert_eq!(
            ProductChanges::new(Some(String::new()), None, None),
            Err(ProductValidationError::EmptyName)
        );
        assert!(ProductChanges::default().is_empty());
    }

    #[test]
    fn test_discount_eligibility() {
        let now = Utc::now();
        let cutoff = now - Duration::hours(4);
        let owner = UserId::new(1);

        let old = sample(now - Duration::hours(5));
        assert!(old.is_discount_eligible(owner, cutoff));
        assert!(!old.is_discount_eligible(UserId::new(2), cutoff));

        let fresh = sample(now - Duration::hours(3));
        assert!(!fresh.is_discount_eligible(owner, cutoff));

        let boundary = sample(cutoff);
        assert!(boundary.is_discount_eligible(owner, cutoff));

        let mut unsold = sample(now - Duration::hours(5));
        unsold.status = ProductStatus::Unsold;
        assert!(!unsold.is_discount_eligible(owner, cutoff));
    }

    #[test]
    fn test_product_json_shape() {
        let now = Utc::now();
        let json = serde_json::to_value(sample(now)).unwrap();
        assert_eq!(json["price"], "1.25");
        assert_eq!(json["status"], "En vente");
        assert_eq!(json["userId"], 1);
        assert!(json.get("createdAt").is_some());
    }
}
