//! Open position record.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::{Lots, PositionId, Price, SymbolId, Timestamp};

use super::OrderSide;

/// An open position.
///
/// `entry_bar_timestamp` is the close time of the bar whose open filled
/// the entry order. It is the sole input to the T+1 rule: stop-loss and
/// take-profit may only trigger on bars strictly after it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    /// Position identifier (equal to the entry order's id)
    pub position_id: PositionId,
    /// Instrument identifier
    pub symbol_id: SymbolId,
    /// Direction of the position
    pub side: OrderSide,
    /// Position volume in lots
    pub volume: Lots,
    /// Fill price of the entry order
    pub entry_price: Price,
    /// Stop-loss price level
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop_loss: Option<Price>,
    /// Take-profit price level
    #[serde(skip_serializing_if = "Option::is_none")]
    pub take_profit: Option<Price>,
    /// Close time of the bar that filled the entry
    pub entry_bar_timestamp: Timestamp,
    /// Wall/simulation clock instant of the fill
    pub opened_at: Timestamp,
    /// Name of the strategy that opened the position
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strategy_name: Option<String>,
}

impl Position {
    /// Returns the unrealized P&L at the given mark price, in price
    /// units times lots.
    #[must_use]
    pub fn unrealized_pnl(&self, mark: Price) -> Decimal {
        (mark - self.entry_price) * self.side.direction() * self.volume.as_decimal()
    }

    /// Returns true if this is a long position.
    #[must_use]
    pub fn is_long(&self) -> bool {
        self.side == OrderSide::Buy
    }
}
