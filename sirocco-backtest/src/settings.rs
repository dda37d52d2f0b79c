//! Simulated broker configuration.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use sirocco_core::types::Currency;

/// Configuration for the simulated broker.
///
/// All price offsets are in raw price units ("points"): the spread is
/// added to buy fills and used to derive bid/ask from the single bar
/// series; slippage is applied only on stop-loss exits, adverse to the
/// position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BacktestSettings {
    /// Ask-over-bid spread in price units
    #[serde(default = "default_spread")]
    pub spread: Decimal,
    /// Adverse offset applied to stop-loss exit prices
    #[serde(default = "default_slippage")]
    pub slippage: Decimal,
    /// Commission per lot, charged on both entry and exit
    #[serde(default = "default_commission_per_lot")]
    pub commission_per_lot: Decimal,
    /// Starting balance of the run ledger
    #[serde(default = "default_initial_balance")]
    pub initial_balance: Decimal,
    /// Account currency
    #[serde(default = "Currency::usd")]
    pub currency: Currency,
}

fn default_spread() -> Decimal {
    Decimal::new(4, 4) // 0.0004
}

fn default_slippage() -> Decimal {
    Decimal::new(1, 4) // 0.0001
}

fn default_commission_per_lot() -> Decimal {
    Decimal::new(3, 0)
}

fn default_initial_balance() -> Decimal {
    Decimal::new(10_000, 0)
}

impl Default for BacktestSettings {
    fn default() -> Self {
        Self {
            spread: default_spread(),
            slippage: default_slippage(),
            commission_per_lot: default_commission_per_lot(),
            initial_balance: default_initial_balance(),
            currency: Currency::usd(),
        }
    }
}
