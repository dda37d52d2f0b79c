//! Immutable trade record.

use serde::{Deserialize, Serialize};

use crate::types::{Lots, Money, OrderId, Price, SymbolId, Timestamp, TradeId};

use super::OrderSide;

/// An immutable record of a fill or a position close.
///
/// Entry trades carry the side of the filled order and its id. Closing
/// trades carry the opposite side of the position and set `order_id` to
/// the position id - which equals the entry order's id, so grouping
/// trades by `order_id` pairs every entry with its exit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trade {
    /// Trade identifier
    pub trade_id: TradeId,
    /// Linking order id (entry order id / position id)
    pub order_id: OrderId,
    /// Instrument identifier
    pub symbol_id: SymbolId,
    /// Executed side
    pub side: OrderSide,
    /// Executed volume in lots
    pub volume: Lots,
    /// Execution price
    pub price: Price,
    /// Commission charged, in the account currency
    pub commission: Money,
    /// Execution instant per the driving clock
    pub executed_at: Timestamp,
}
