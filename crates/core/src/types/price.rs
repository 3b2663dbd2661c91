//! Fixed-point price and discount-rate types.
//!
//! Prices are stored as `numeric(10,2)`, so every [`Price`] is normalized to
//! exactly two decimal places and all arithmetic stays in [`Decimal`].

use core::fmt;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Number of decimal places kept for every price.
pub const PRICE_SCALE: u32 = 2;

/// Errors that can occur when constructing a [`Price`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PriceError {
    /// The amount is zero or negative.
    #[error("price must be greater than 0")]
    NotPositive,
    /// The amount does not fit the storage column.
    #[error("price must be less than {max}")]
    TooLarge {
        /// Exclusive upper bound.
        max: Decimal,
    },
}

/// A product price.
///
/// ## Constraints
///
/// - Strictly greater than zero
/// - Less than 100 000 000 (`numeric(10,2)`)
/// - Rounded half away from zero to two decimal places
///
/// Serialized as a decimal string (`"15.00"`); deserializes from a JSON
/// number or string.
///
/// ## Examples
///
/// ```
/// use bakeapi_core::Price;
/// use rust_decimal::Decimal;
///
/// let price = Price::new(Decimal::new(125, 2)).unwrap();
/// assert_eq!(price.to_string(), "1.25");
/// assert!(Price::new(Decimal::ZERO).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Price(Decimal);

impl Price {
    /// Create a validated price, normalized to two decimal places.
    ///
    /// # Errors
    ///
    /// Returns `PriceError::NotPositive` for zero or negative amounts and
    /// `PriceError::TooLarge` for amounts that overflow the storage column.
    pub fn new(amount: Decimal) -> Result<Self, PriceError> {
        let amount = normalize(amount);
        if amount <= Decimal::ZERO {
            return Err(PriceError::NotPositive);
        }
        let max = Self::max();
        if amount >= max {
            return Err(PriceError::TooLarge { max });
        }
        Ok(Self(amount))
    }

    /// Exclusive upper bound for a price.
    #[must_use]
    pub fn max() -> Decimal {
        Decimal::new(100_000_000, 0)
    }

    /// The amount as a decimal.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Apply a percentage reduction.
    ///
    /// Computes `amount - amount * rate / 100` in decimal arithmetic and rounds
    /// the result to the storage precision. The result can round down to
    /// `0.00` for the smallest prices.
    #[must_use]
    pub fn discounted(&self, rate: DiscountRate) -> Self {
        let reduction = self.0 * rate.as_fraction();
        Self(normalize(self.0 - reduction))
    }
}

fn normalize(amount: Decimal) -> Decimal {
    let mut rounded =
        amount.round_dp_with_strategy(PRICE_SCALE, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(PRICE_SCALE);
    rounded
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<Decimal> for Price {
    type Error = PriceError;

    fn try_from(amount: Decimal) -> Result<Self, Self::Error> {
        Self::new(amount)
    }
}

impl From<Price> for Decimal {
    fn from(price: Price) -> Self {
        price.0
    }
}

// SQLx support (with postgres feature)
#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for Price {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <Decimal as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <Decimal as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for Price {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let amount = <Decimal as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        // Discounts may legitimately reach 0.00, so stored values skip validation
        Ok(Self(normalize(amount)))
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for Price {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <Decimal as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}

/// Errors that can occur when constructing a [`DiscountRate`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum DiscountRateError {
    /// The rate is not strictly between 0 and 100.
    #[error("reductionRate must be a number greater than 0 and less than 100")]
    OutOfRange,
}

/// A percentage reduction, strictly between 0 and 100.
///
/// ```
/// use bakeapi_core::DiscountRate;
/// use rust_decimal::Decimal;
///
/// assert!(DiscountRate::new(Decimal::new(25, 0)).is_ok());
/// assert!(DiscountRate::new(Decimal::new(100, 0)).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct DiscountRate(Decimal);

impl DiscountRate {
    /// Create a validated discount rate.
    ///
    /// # Errors
    ///
    /// Returns `DiscountRateError::OutOfRange` unless `0 < rate < 100`.
    pub fn new(rate: Decimal) -> Result<Self, DiscountRateError> {
        if rate <= Decimal::ZERO || rate >= Decimal::ONE_HUNDRED {
            return Err(DiscountRateError::OutOfRange);
        }
        Ok(Self(rate))
    }

    /// The rate as a percentage (e.g. `25`).
    #[must_use]
    pub const fn percent(&self) -> Decimal {
        self.0
    }

    /// The rate as a fraction of one (e.g. `0.25`).
    #[must_use]
    pub fn as_fraction(&self) -> Decimal {
        self.0 / Decimal::ONE_HUNDRED
    }
}

impl TryFrom<Decimal> for DiscountRate {
    type Error = DiscountRateError;

    fn try_from(rate: Decimal) -> Result<Self, Self::Error> {
        Self::new(rate)
    }
}

impl From<DiscountRate> for Decimal {
    fn from(rate: DiscountRate) -> Self {
        rate.0
    }
}

impl fmt::Display for DiscountRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0)
    }
}
