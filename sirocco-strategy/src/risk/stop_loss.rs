//! Stop-loss policies.

use rust_decimal::Decimal;

use crate::signal::SignalContext;

use super::RiskError;

/// Decides where the protective stop goes, in pips.
pub trait StopLossPolicy: Send + Sync {
    /// Returns the stop distance in pips for the given context.
    fn stop_loss_pips(&self, ctx: &SignalContext) -> Result<Decimal, RiskError>;
}

/// A constant stop distance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedPipsStopLoss {
    pips: Decimal,
}

impl FixedPipsStopLoss {
    /// Creates a fixed stop-loss policy.
    ///
    /// # Errors
    ///
    /// Returns `RiskError::InvalidArgument` if `pips` is not positive.
    pub fn new(pips: Decimal) -> Result<Self, RiskError> {
        if pips <= Decimal::ZERO {
            return Err(RiskError::InvalidArgument(format!(
                "stop-loss pips must be positive, got {pips}"
            )));
        }
        Ok(Self { pips })
    }
}

impl StopLossPolicy for FixedPipsStopLoss {
    fn stop_loss_pips(&self, _ctx: &SignalContext) -> Result<Decimal, RiskError> {
        Ok(self.pips)
    }
}
