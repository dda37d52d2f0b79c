//! Risk policies composed with signal strategies.
//!
//! Three pluggable concerns, one small trait each: where the stop goes,
//! where the target goes, and how much to trade. Policies are built
//! from the `Risk` block of a strategy definition; all quantities are
//! pips (the strategy-chosen price unit), not raw prices.

mod sizing;
mod stop_loss;
mod take_profit;

pub use sizing::{FixedLotPositionSizing, PositionSizing, RiskPercentPositionSizing};
pub use stop_loss::{FixedPipsStopLoss, StopLossPolicy};
pub use take_profit::{FixedPipsTakeProfit, RiskRewardTakeProfit, TakeProfitPolicy};

use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;

use crate::definition::PolicyDefinition;

/// Error raised by risk policy construction or calculation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RiskError {
    /// A parameter is non-positive or out of range
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The policy type tag is not recognised
    #[error("unknown risk policy type: {0}")]
    UnknownPolicy(String),
}

/// Builds a stop-loss policy from its definition block.
///
/// Recognised type tags (case-insensitive): `FixedPips`.
///
/// # Errors
///
/// Returns `RiskError::UnknownPolicy` for unrecognised tags and
/// `RiskError::InvalidArgument` for out-of-range parameters.
pub fn build_stop_loss(def: &PolicyDefinition) -> Result<Box<dyn StopLossPolicy>, RiskError> {
    match def.type_tag.to_ascii_lowercase().as_str() {
        "fixedpips" | "fixedpipsstoploss" => {
            let pips = decimal_param(def, "pips")?;
            Ok(Box::new(FixedPipsStopLoss::new(pips)?))
        }
        other => Err(RiskError::UnknownPolicy(other.to_string())),
    }
}

/// Builds a take-profit policy from its definition block.
///
/// Recognised type tags (case-insensitive): `FixedPips`, `RiskReward`.
pub fn build_take_profit(def: &PolicyDefinition) -> Result<Box<dyn TakeProfitPolicy>, RiskError> {
    match def.type_tag.to_ascii_lowercase().as_str() {
        "fixedpips" | "fixedpipstakeprofit" => {
            let pips = decimal_param(def, "pips")?;
            Ok(Box::new(FixedPipsTakeProfit::new(pips)?))
        }
        "riskreward" | "riskrewardtakeprofit" => {
            let ratio = decimal_param(def, "ratio")?;
            Ok(Box::new(RiskRewardTakeProfit::new(ratio)?))
        }
        other => Err(RiskError::UnknownPolicy(other.to_string())),
    }
}

/// Builds a position-sizing policy from its definition block.
///
/// Recognised type tags (case-insensitive): `FixedLot`, `RiskPercent`.
pub fn build_position_sizing(def: &PolicyDefinition) -> Result<Box<dyn PositionSizing>, RiskError> {
    match def.type_tag.to_ascii_lowercase().as_str() {
        "fixedlot" | "fixedlotpositionsizing" => {
            let lots = decimal_param(def, "lots")?;
            Ok(Box::new(FixedLotPositionSizing::new(lots)?))
        }
        "riskpercent" | "riskpercentpositionsizing" => {
            let percent = decimal_param(def, "percent")?;
            let pip_value = match optional_decimal_param(def, "pip_value")? {
                Some(v) => v,
                None => RiskPercentPositionSizing::DEFAULT_PIP_VALUE,
            };
            Ok(Box::new(RiskPercentPositionSizing::new(percent, pip_value)?))
        }
        other => Err(RiskError::UnknownPolicy(other.to_string())),
    }
}

fn decimal_param(def: &PolicyDefinition, key: &str) -> Result<Decimal, RiskError> {
    optional_decimal_param(def, key)?.ok_or_else(|| {
        RiskError::InvalidArgument(format!("{}: missing parameter '{key}'", def.type_tag))
    })
}

fn optional_decimal_param(
    def: &PolicyDefinition,
    key: &str,
) -> Result<Option<Decimal>, RiskError> {
    let Some(value) = def.parameters.get(key) else {
        return Ok(None);
    };
    let number = value.as_f64().and_then(Decimal::from_f64).ok_or_else(|| {
        RiskError::InvalidArgument(format!("{}: parameter '{key}' is not numeric", def.type_tag))
    })?;
    Ok(Some(number))
}
