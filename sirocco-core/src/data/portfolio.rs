//! Aggregated portfolio view.

use serde::{Deserialize, Serialize};

use crate::types::Money;

use super::Position;

/// Aggregated account view.
///
/// Derived, not authoritative: during a backtest the realized P&L is
/// computed from closed positions at the end of the run, and this view
/// only mirrors the executor's running ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Portfolio {
    /// Account identifier
    pub account_id: String,
    /// Cash balance
    pub balance: Money,
    /// Balance plus unrealized P&L of open positions
    pub equity: Money,
    /// Margin in use
    pub margin: Money,
    /// Equity minus margin in use
    pub free_margin: Money,
    /// Currently open positions
    pub open_positions: Vec<Position>,
}
