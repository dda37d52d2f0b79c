//! Lot size type for order and position volumes.

use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::Add;
use std::str::FromStr;

use super::ValidationError;

/// Non-negative fractional lot size.
///
/// Arithmetic is closed under addition; subtraction is deliberately not
/// provided because partial closes are out of scope for the bar-level
/// simulator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(transparent)]
#[serde(transparent)]
pub struct Lots(Decimal);

impl Lots {
    /// Zero lots constant.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// The broker-wide minimum lot step (0.01).
    pub const MIN_STEP: Self = Self(Decimal::from_parts(1, 0, 0, false, 2));

    /// Creates a new `Lots` from a `Decimal` value.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::NegativeLots` if the value is negative.
    pub fn new(value: Decimal) -> Result<Self, ValidationError> {
        if value < Decimal::ZERO {
            return Err(ValidationError::NegativeLots(value));
        }
        Ok(Self(value))
    }

    /// Creates a new `Lots` without validation.
    #[must_use]
    pub const fn new_unchecked(value: Decimal) -> Self {
        Self(value)
    }

    /// Creates a `Lots` from an `f64`, for parameter decoding.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::NegativeLots` if the value is negative
    /// or not representable.
    pub fn from_f64(value: f64) -> Result<Self, ValidationError> {
        let decimal = Decimal::from_f64(value)
            .ok_or(ValidationError::NegativeLots(Decimal::MIN))?;
        Self::new(decimal)
    }

    /// Returns the underlying `Decimal` value.
    #[must_use]
    pub const fn as_decimal(&self) -> Decimal {
        self.0
    }

    /// Returns true if the lot size is zero.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }
}

impl fmt::Display for Lots {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Lots {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let decimal =
            Decimal::from_str(s).map_err(|_| ValidationError::NegativeLots(Decimal::ZERO))?;
        Self::new(decimal)
    }
}

impl Add for Lots {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl Sum for Lots {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl From<Lots> for Decimal {
    fn from(lots: Lots) -> Self {
        lots.0
    }
}
