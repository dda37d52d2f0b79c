//! Order-execution contract.

use crate::data::{Order, OrderRequest, Position};
use crate::types::{Money, OrderId, PositionId, Price};

/// Error raised by an execution venue.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExecutionError {
    /// The request failed adapter-side validation
    #[error("order rejected: {0}")]
    Rejected(String),

    /// The referenced order does not exist or is no longer pending
    #[error("unknown order: {0}")]
    UnknownOrder(OrderId),

    /// The venue itself failed
    #[error("execution venue error: {0}")]
    Venue(String),
}

/// Order-execution venue consumed by the engine.
///
/// Implemented by the simulated broker for backtests and by live broker
/// adapters. Methods take `&mut self`; callers that share a venue
/// between the engine and an orchestrator wrap it in
/// `Arc<parking_lot::Mutex<_>>` and serialise access per run.
pub trait OrderExecution: Send {
    /// Places an order. The simulated venue accepts it as pending; no
    /// fill happens synchronously.
    fn place_order(&mut self, request: OrderRequest) -> Result<Order, ExecutionError>;

    /// Updates the stop-loss / take-profit of a PENDING order. Omitted
    /// parameters leave the existing values untouched.
    fn modify_order(
        &mut self,
        order_id: &OrderId,
        stop_loss: Option<Price>,
        take_profit: Option<Price>,
    ) -> Result<Order, ExecutionError>;

    /// Cancels a pending order. Idempotent on unknown ids.
    fn cancel_order(&mut self, order_id: &OrderId) -> Result<(), ExecutionError>;

    /// Closes an open position without a synthetic trade record.
    /// Idempotent on unknown ids.
    fn close_position(&mut self, position_id: &PositionId) -> Result<(), ExecutionError>;

    /// Returns the currently open positions.
    fn positions(&self) -> Vec<Position>;

    /// Returns the account balance per the venue's running ledger.
    fn account_balance(&self) -> Money;
}
