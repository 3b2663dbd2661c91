//! Product status.
//!
//! Statuses travel over the wire and into the database using the
//! marketplace's French labels, `"En vente"` and `"Invendu"`.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Error returned when a status label is not recognised.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid product status: {0:?} (expected \"En vente\" or \"Invendu\")")]
pub struct StatusError(pub String);

/// Sale status of a product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ProductStatus {
    /// Listed and available at its list price.
    #[default]
    #[serde(rename = "En vente")]
    OnSale,
    /// Marked down after going unsold.
    #[serde(rename = "Invendu")]
    Unsold,
}

impl ProductStatus {
    /// Wire and storage label for this status.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::OnSale => "En vente",
            Self::Unsold => "Invendu",
        }
    }
}

impl fmt::Display for ProductStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ProductStatus {
    type Err = StatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "En vente" => Ok(Self::OnSale),
            "Invendu" => Ok(Self::Unsold),
            _ => Err(StatusError(s.to_owned())),
        }
    }
}

// SQLx support (with postgres feature)
#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for ProductStatus {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <String as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for ProductStatus {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <&str as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        Ok(s.parse()?)
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for ProductStatus {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <&str as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.as_str(), buf)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_on_sale() {
        assert_eq!(ProductStatus::default(), ProductStatus::OnSale);
    }

    #[test]
    fn test_from_str() {
        assert_eq!(
            "En vente".parse::<ProductStatus>().unwrap(),
            ProductStatus::OnSale
        );
        assert_eq!(
            "Invendu".parse::<ProductStatus>().unwrap(),
            ProductStatus::Unsold
        );
        assert!("Sold".parse::<ProductStatus>().is_err());
        assert!("en vente".parse::<ProductStatus>().is_err());
    }

    #[test]
    fn test_serde_uses_labels() {
        let json = serde_json::to_string(&ProductStatus::Unsold).unwrap();
        assert_eq!(json, "\"Invendu\"");

        let parsed: ProductStatus = serde_json::from_str("\"En vente\"").unwrap();
        assert_eq!(parsed, ProductStatus::OnSale);

        assert!(serde_json::from_str::<ProductStatus>("\"OnSale\"").is_err());
    }

    #[test]
    fn test_display_matches_label() {
        assert_eq!(ProductStatus::OnSale.to_string(), "En vente");
    }
}
