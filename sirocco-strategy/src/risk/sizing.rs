//! Position-sizing policies.

use rust_decimal::Decimal;

use sirocco_core::types::Lots;

use crate::signal::SignalContext;

use super::RiskError;

/// Decides the volume of a new position, in lots.
pub trait PositionSizing: Send + Sync {
    /// Returns the volume for the given context and stop distance.
    fn volume(&self, ctx: &SignalContext, sl_pips: Decimal) -> Result<Lots, RiskError>;
}

/// A constant lot size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedLotPositionSizing {
    lots: Lots,
}

impl FixedLotPositionSizing {
    /// Creates a fixed-lot sizing policy.
    ///
    /// # Errors
    ///
    /// Returns `RiskError::InvalidArgument` if `lots` is not positive.
    pub fn new(lots: Decimal) -> Result<Self, RiskError> {
        if lots <= Decimal::ZERO {
            return Err(RiskError::InvalidArgument(format!(
                "lot size must be positive, got {lots}"
            )));
        }
        Ok(Self {
            lots: Lots::new_unchecked(lots),
        })
    }
}

impl PositionSizing for FixedLotPositionSizing {
    fn volume(&self, _ctx: &SignalContext, _sl_pips: Decimal) -> Result<Lots, RiskError> {
        Ok(self.lots)
    }
}

/// Sizes the position so the stop risks a fixed percentage of the
/// account balance.
///
/// `volume = round2(max(0.01, balance * percent/100 / (sl_pips * pip_value)))`
///
/// Rounding is to two decimals with banker's rounding, after flooring
/// at the 0.01-lot broker minimum.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RiskPercentPositionSizing {
    percent: Decimal,
    pip_value: Decimal,
}

impl RiskPercentPositionSizing {
    /// Per-lot value of one pip in the account currency, when the
    /// definition does not override it.
    pub const DEFAULT_PIP_VALUE: Decimal = Decimal::TEN;

    /// Creates a risk-percent sizing policy.
    ///
    /// # Errors
    ///
    /// Returns `RiskError::InvalidArgument` unless `0 < percent <= 100`
    /// and `pip_value > 0`.
    pub fn new(percent: Decimal, pip_value: Decimal) -> Result<Self, RiskError> {
        if percent <= Decimal::ZERO || percent > Decimal::ONE_HUNDRED {
            return Err(RiskError::InvalidArgument(format!(
                "risk percent must be in (0, 100], got {percent}"
            )));
        }
        if pip_value <= Decimal::ZERO {
            return Err(RiskError::InvalidArgument(format!(
                "pip value must be positive, got {pip_value}"
            )));
        }
        Ok(Self { percent, pip_value })
    }

    /// Creates a policy with the default pip value of 10.
    ///
    /// # Errors
    ///
    /// Returns `RiskError::InvalidArgument` unless `0 < percent <= 100`.
    pub fn with_percent(percent: Decimal) -> Result<Self, RiskError> {
        Self::new(percent, Self::DEFAULT_PIP_VALUE)
    }
}

impl PositionSizing for RiskPercentPositionSizing {
    fn volume(&self, ctx: &SignalContext, sl_pips: Decimal) -> Result<Lots, RiskError> {
        if sl_pips <= Decimal::ZERO {
            return Err(RiskError::InvalidArgument(format!(
                "risk-percent sizing needs a positive stop distance, got {sl_pips}"
            )));
        }

        let risk_amount = ctx.account_balance.amount() * self.percent / Decimal::ONE_HUNDRED;
        let raw = risk_amount / (sl_pips * self.pip_value);
        let floored = raw.max(Lots::MIN_STEP.as_decimal());
        Ok(Lots::new_unchecked(floored.round_dp(2)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use sirocco_core::types::{Currency, Money, SymbolId, Timestamp};
    use std::collections::BTreeMap;

    fn ctx_with_balance(balance: Decimal) -> SignalContext {
        SignalContext {
            symbol_id: SymbolId::new(1),
            symbol: "EURUSD".to_string(),
            market_data: BTreeMap::new(),
            account_balance: Money::new(balance, Currency::usd()),
            timestamp: Timestamp::ZERO,
        }
    }

    #[test]
    fn test_fixed_lot_constant() {
        let policy = FixedLotPositionSizing::new(dec!(0.5)).unwrap();
        let volume = policy.volume(&ctx_with_balance(dec!(10_000)), dec!(30)).unwrap();
        assert_eq!(volume.as_decimal(), dec!(0.5));
    }

    #[test]
    fn test_fixed_lot_rejects_non_positive() {
        assert!(FixedLotPositionSizing::new(dec!(0)).is_err());
        assert!(FixedLotPositionSizing::new(dec!(-0.01)).is_err());
    }

    #[test]
    fn test_risk_percent_basic() {
        // 1% of 10 000 = 100 at risk; 30 pips * 10/pip = 300 per lot.
        // 100 / 300 = 0.333... -> 0.33 lots.
        let policy = RiskPercentPositionSizing::with_percent(dec!(1)).unwrap();
        let volume = policy.volume(&ctx_with_balance(dec!(10_000)), dec!(30)).unwrap();
        assert_eq!(volume.as_decimal(), dec!(0.33));
    }

    #[test]
    fn test_risk_percent_floors_at_minimum_lot() {
        // 0.1% of 1 000 = 1 at risk; 50 pips * 10 = 500 per lot -> 0.002,
        // floored to the 0.01 broker minimum.
        let policy = RiskPercentPositionSizing::with_percent(dec!(0.1)).unwrap();
        let volume = policy.volume(&ctx_with_balance(dec!(1_000)), dec!(50)).unwrap();
        assert_eq!(volume.as_decimal(), dec!(0.01));
    }

    #[test]
    fn test_risk_percent_bankers_rounding() {
        // 2.5% of 10 000 = 250; 100 pips * 10 = 1000 -> 0.25 exactly.
        let policy = RiskPercentPositionSizing::with_percent(dec!(2.5)).unwrap();
        let volume = policy.volume(&ctx_with_balance(dec!(10_000)), dec!(100)).unwrap();
        assert_eq!(volume.as_decimal(), dec!(0.25));
    }

    #[test]
    fn test_risk_percent_custom_pip_value() {
        // 1% of 10 000 = 100; 20 pips * 5 = 100 per lot -> 1.00 lots.
        let policy = RiskPercentPositionSizing::new(dec!(1), dec!(5)).unwrap();
        let volume = policy.volume(&ctx_with_balance(dec!(10_000)), dec!(20)).unwrap();
        assert_eq!(volume.as_decimal(), dec!(1.00));
    }

    #[test]
    fn test_risk_percent_constructor_bounds() {
        assert!(RiskPercentPositionSizing::with_percent(dec!(0)).is_err());
        assert!(RiskPercentPositionSizing::with_percent(dec!(100)).is_ok());
        assert!(RiskPercentPositionSizing::with_percent(dec!(100.01)).is_err());
        assert!(RiskPercentPositionSizing::new(dec!(1), dec!(0)).is_err());
    }

    #[test]
    fn test_risk_percent_rejects_non_positive_stop() {
        let policy = RiskPercentPositionSizing::with_percent(dec!(1)).unwrap();
        let result = policy.volume(&ctx_with_balance(dec!(10_000)), dec!(0));
        assert!(matches!(result, Err(RiskError::InvalidArgument(_))));
    }
}
