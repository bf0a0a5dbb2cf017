//! Exact product prices backed by decimal arithmetic.
//!
//! Prices never pass through floating point. They map to a `NUMERIC(10, 2)`
//! column, so at most two fractional digits and eight integral digits are
//! accepted.

use core::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Errors that can occur when constructing a [`Price`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PriceError {
    /// The amount is below zero.
    #[error("price cannot be negative")]
    Negative,
    /// The amount has more fractional digits than the column stores.
    #[error("price can have at most {max} decimal places")]
    TooPrecise {
        /// Maximum allowed scale.
        max: u32,
    },
    /// The amount does not fit the column.
    #[error("price must be below {max}")]
    TooLarge {
        /// Exclusive upper bound.
        max: Decimal,
    },
}

/// A non-negative amount in the store's single currency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Price(Decimal);

impl Price {
    /// Maximum number of fractional digits.
    pub const MAX_SCALE: u32 = 2;

    /// Zero.
    pub const ZERO: Self = Self(Decimal::from_parts(0, 0, 0, false, 2));

    /// Exclusive upper bound (`10^8`).
    #[must_use]
    pub fn upper_bound() -> Decimal {
        Decimal::new(100_000_000, 0)
    }

    /// Validate and wrap an amount.
    ///
    /// The stored amount always has two decimal places (`150` is `150.00`).
    /// Trailing zeros beyond that are accepted (`1.500` is `1.50`), other
    /// extra digits are not.
    ///
    /// # Errors
    ///
    /// Returns a [`PriceError`] if the amount is negative, too precise or too
    /// large.
    pub fn new(amount: Decimal) -> Result<Self, PriceError> {
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(PriceError::Negative);
        }
        let normalized = amount.normalize();
        if normalized.scale() > Self::MAX_SCALE {
            return Err(PriceError::TooPrecise {
                max: Self::MAX_SCALE,
            });
        }
        if amount >= Self::upper_bound() {
            return Err(PriceError::TooLarge {
                max: Self::upper_bound(),
            });
        }
        let mut stored = amount;
        stored.rescale(Self::MAX_SCALE);
        Ok(Self(stored))
    }

    /// The wrapped decimal.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

impl TryFrom<Decimal> for Price {
    type Error = PriceError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Price> for Decimal {
    fn from(price: Price) -> Self {
        price.0
    }
}
