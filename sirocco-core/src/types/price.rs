//! Price type for representing asset prices.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Sub};
use std::str::FromStr;

use super::ValidationError;

/// Price type - a non-negative asset price.
///
/// Wraps a `Decimal` value so prices cannot be confused with lot sizes
/// or money amounts. Spread and slippage adjustments are expressed as
/// `Decimal` offsets; the result is clamped at zero.
///
/// # Examples
///
/// ```
/// use sirocco_core::types::Price;
/// use rust_decimal_macros::dec;
///
/// let open = Price::new(dec!(1.1000)).unwrap();
/// let ask = open + dec!(0.0004);
/// assert_eq!(ask.as_decimal(), dec!(1.1004));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(transparent)]
#[serde(transparent)]
pub struct Price(Decimal);

impl Price {
    /// Zero price constant.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Creates a new `Price` from a `Decimal` value.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::NegativePrice` if the value is negative.
    pub fn new(value: Decimal) -> Result<Self, ValidationError> {
        if value < Decimal::ZERO {
            return Err(ValidationError::NegativePrice(value));
        }
        Ok(Self(value))
    }

    /// Creates a new `Price` without validation.
    ///
    /// The caller must ensure the value is non-negative.
    #[must_use]
    pub const fn new_unchecked(value: Decimal) -> Self {
        Self(value)
    }

    /// Returns the underlying `Decimal` value.
    #[must_use]
    pub const fn as_decimal(&self) -> Decimal {
        self.0
    }

    /// Returns true if the price is zero.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Price {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let decimal =
            Decimal::from_str(s).map_err(|_| ValidationError::NegativePrice(Decimal::ZERO))?;
        Self::new(decimal)
    }
}

impl Add<Decimal> for Price {
    type Output = Self;

    /// Applies a price offset, clamping the result at zero.
    fn add(self, rhs: Decimal) -> Self::Output {
        Self((self.0 + rhs).max(Decimal::ZERO))
    }
}

impl Sub<Decimal> for Price {
    type Output = Self;

    /// Applies a negative price offset, clamping the result at zero.
    fn sub(self, rhs: Decimal) -> Self::Output {
        Self((self.0 - rhs).max(Decimal::ZERO))
    }
}

impl Sub for Price {
    type Output = Decimal;

    fn sub(self, rhs: Self) -> Self::Output {
        self.0 - rhs.0
    }
}

impl From<Price> for Decimal {
    fn from(price: Price) -> Self {
        price.0
    }
}
