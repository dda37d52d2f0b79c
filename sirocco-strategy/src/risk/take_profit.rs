//! Take-profit policies.

use rust_decimal::Decimal;

use crate::signal::SignalContext;

use super::RiskError;

/// Decides where the profit target goes, in pips.
///
/// The stop distance is an input because target placement is commonly
/// expressed relative to risk.
pub trait TakeProfitPolicy: Send + Sync {
    /// Returns the target distance in pips for the given context and
    /// stop distance.
    fn take_profit_pips(&self, ctx: &SignalContext, sl_pips: Decimal) -> Result<Decimal, RiskError>;
}

/// A constant target distance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedPipsTakeProfit {
    pips: Decimal,
}

impl FixedPipsTakeProfit {
    /// Creates a fixed take-profit policy.
    ///
    /// # Errors
    ///
    /// Returns `RiskError::InvalidArgument` if `pips` is not positive.
    pub fn new(pips: Decimal) -> Result<Self, RiskError> {
        if pips <= Decimal::ZERO {
            return Err(RiskError::InvalidArgument(format!(
                "take-profit pips must be positive, got {pips}"
            )));
        }
        Ok(Self { pips })
    }
}

impl TakeProfitPolicy for FixedPipsTakeProfit {
    fn take_profit_pips(
        &self,
        _ctx: &SignalContext,
        _sl_pips: Decimal,
    ) -> Result<Decimal, RiskError> {
        Ok(self.pips)
    }
}

/// A target placed at a multiple of the stop distance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RiskRewardTakeProfit {
    ratio: Decimal,
}

impl RiskRewardTakeProfit {
    /// Creates a risk-reward take-profit policy.
    ///
    /// # Errors
    ///
    /// Returns `RiskError::InvalidArgument` if `ratio` is not positive.
    pub fn new(ratio: Decimal) -> Result<Self, RiskError> {
        if ratio <= Decimal::ZERO {
            return Err(RiskError::InvalidArgument(format!(
                "risk-reward ratio must be positive, got {ratio}"
            )));
        }
        Ok(Self { ratio })
    }
}

impl TakeProfitPolicy for RiskRewardTakeProfit {
    fn take_profit_pips(
        &self,
        _ctx: &SignalContext,
        sl_pips: Decimal,
    ) -> Result<Decimal, RiskError> {
        if sl_pips <= Decimal::ZERO {
            return Err(RiskError::InvalidArgument(format!(
                "risk-reward target needs a positive stop distance, got {sl_pips}"
            )));
        }
        Ok(sl_pips * self.ratio)
    }
}
