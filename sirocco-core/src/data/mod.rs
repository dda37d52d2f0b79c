//! Market and account data records.
//!
//! All records are value-typed and compared by content; everything is
//! serde round-trippable so the same structures serve wire messages,
//! persisted rows and test fixtures.

mod bar;
mod order;
mod portfolio;
mod position;
mod tick;
mod trade;

pub use bar::Bar;
pub use order::{Order, OrderRequest, OrderRequestBuilder, OrderSide, OrderStatus, OrderType};
pub use portfolio::Portfolio;
pub use position::Position;
pub use tick::Tick;
pub use trade::Trade;

/// Validation error for data records.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DataError {
    /// A required field is missing from a builder
    #[error("missing field: {0}")]
    MissingField(&'static str),

    /// OHLC prices violate `low <= open,close <= high`
    #[error("invalid price relation: {0}")]
    InvalidPriceRelation(String),

    /// Volume or timestamp is out of range
    #[error("invalid value: {0}")]
    InvalidValue(String),
}
