//! Currency-tagged monetary amounts.
//!
//! `Money` refuses arithmetic across currency codes; there is no
//! implicit conversion anywhere in the core.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::ValidationError;

/// ISO-style currency code (uppercase ASCII letters).
///
/// # Examples
///
/// ```
/// use sirocco_core::types::Currency;
///
/// let usd = Currency::usd();
/// assert_eq!(usd.as_str(), "USD");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Currency(String);

impl Currency {
    /// Creates a new `Currency` from a code.
    ///
    /// The code is upper-cased; it must be 3-8 ASCII letters.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::InvalidCurrency` for malformed codes.
    pub fn new(code: impl AsRef<str>) -> Result<Self, ValidationError> {
        let code = code.as_ref().trim();
        if !(3..=8).contains(&code.len()) || !code.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(ValidationError::InvalidCurrency(code.to_string()));
        }
        Ok(Self(code.to_ascii_uppercase()))
    }

    /// The US dollar, the default account currency.
    #[must_use]
    pub fn usd() -> Self {
        Self("USD".to_string())
    }

    /// Returns the currency code as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Currency {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

/// Error raised by `Money` arithmetic.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MoneyError {
    /// Arithmetic attempted across differing currency codes
    #[error("currency mismatch: {left} vs {right}")]
    CurrencyMismatch {
        /// Currency of the left operand
        left: Currency,
        /// Currency of the right operand
        right: Currency,
    },
}

/// A monetary amount in a specific currency.
///
/// Addition and subtraction are checked: operands in different
/// currencies fail with [`MoneyError::CurrencyMismatch`].
///
/// # Examples
///
/// ```
/// use sirocco_core::types::{Currency, Money};
/// use rust_decimal_macros::dec;
///
/// let a = Money::new(dec!(100), Currency::usd());
/// let b = Money::new(dec!(25), Currency::usd());
/// assert_eq!(a.checked_add(&b).unwrap().amount(), dec!(125));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Money {
    amount: Decimal,
    currency: Currency,
}

impl Money {
    /// Creates a new `Money` value.
    #[must_use]
    pub fn new(amount: Decimal, currency: Currency) -> Self {
        Self { amount, currency }
    }

    /// Creates a zero amount in the given currency.
    #[must_use]
    pub fn zero(currency: Currency) -> Self {
        Self::new(Decimal::ZERO, currency)
    }

    /// Returns the amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.amount
    }

    /// Returns the currency.
    #[must_use]
    pub fn currency(&self) -> &Currency {
        &self.currency
    }

    /// Returns true if the amount is zero.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.amount.is_zero()
    }

    /// Adds two amounts of the same currency.
    ///
    /// # Errors
    ///
    /// Fails with `MoneyError::CurrencyMismatch` if the codes differ.
    pub fn checked_add(&self, other: &Self) -> Result<Self, MoneyError> {
        self.same_currency(other)?;
        Ok(Self::new(self.amount + other.amount, self.currency.clone()))
    }

    /// Subtracts an amount of the same currency.
    ///
    /// # Errors
    ///
    /// Fails with `MoneyError::CurrencyMismatch` if the codes differ.
    pub fn checked_sub(&self, other: &Self) -> Result<Self, MoneyError> {
        self.same_currency(other)?;
        Ok(Self::new(self.amount - other.amount, self.currency.clone()))
    }

    /// Scales the amount by a dimensionless factor.
    #[must_use]
    pub fn scale(&self, factor: Decimal) -> Self {
        Self::new(self.amount * factor, self.currency.clone())
    }

    fn same_currency(&self, other: &Self) -> Result<(), MoneyError> {
        if self.currency == other.currency {
            Ok(())
        } else {
            Err(MoneyError::CurrencyMismatch {
                left: self.currency.clone(),
                right: other.currency.clone(),
            })
        }
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.amount, self.currency)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_currency_new_normalises() {
        let c = Currency::new("usd").unwrap();
        assert_eq!(c.as_str(), "USD");
    }

    #[test]
    fn test_currency_new_invalid() {
        assert!(Currency::new("$").is_err());
        assert!(Currency::new("US").is_err());
        assert!(Currency::new("U2D").is_err());
    }

    #[test]
    fn test_money_add_same_currency() {
        let a = Money::new(dec!(10_000), Currency::usd());
        let b = Money::new(dec!(-3), Currency::usd());
        let sum = a.checked_add(&b).unwrap();
        assert_eq!(sum.amount(), dec!(9_997));
    }

    #[test]
    fn test_money_mismatch_fails_deterministically() {
        let usd = Money::new(dec!(1), Currency::usd());
        let eur = Money::new(dec!(1), Currency::new("EUR").unwrap());

        for _ in 0..3 {
            let err = usd.checked_add(&eur).unwrap_err();
            assert!(matches!(err, MoneyError::CurrencyMismatch { .. }));
        }
        assert!(usd.checked_sub(&eur).is_err());
    }

    #[test]
    fn test_money_scale() {
        let commission = Money::new(dec!(3), Currency::usd());
        assert_eq!(commission.scale(dec!(0.01)).amount(), dec!(0.03));
    }

    #[test]
    fn test_money_display() {
        let m = Money::new(dec!(10000), Currency::usd());
        assert_eq!(format!("{m}"), "10000 USD");
    }

    #[test]
    fn test_money_serde_roundtrip() {
        let m = Money::new(dec!(123.45), Currency::usd());
        let json = serde_json::to_string(&m).unwrap();
        let parsed: Money = serde_json::from_str(&json).unwrap();
        assert_eq!(m, parsed);
    }
}
