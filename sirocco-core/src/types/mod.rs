//! NewType wrappers for financial primitives.
//!
//! Every scalar the engine handles is wrapped so that prices, lot sizes,
//! money amounts and identifiers cannot be mixed up at compile time.
//!
//! # Types
//!
//! - [`SymbolId`] - Opaque 64-bit instrument identifiers
//! - [`Timeframe`] - Named bar durations (M1…W1)
//! - [`Price`] - Non-negative asset prices
//! - [`Lots`] - Non-negative fractional lot sizes
//! - [`Money`] - Currency-tagged amounts with mismatch-safe arithmetic
//! - [`Timestamp`] - Unix millisecond timestamps
//! - [`OrderId`], [`PositionId`], [`TradeId`] - Entity identifiers

mod ids;
mod lots;
mod money;
mod price;
mod symbol_id;
mod timeframe;
mod timestamp;

pub use ids::{OrderId, PositionId, TradeId};
pub use lots::Lots;
pub use money::{Currency, Money, MoneyError};
pub use price::Price;
pub use symbol_id::SymbolId;
pub use timeframe::Timeframe;
pub use timestamp::Timestamp;

/// Validation error for NewType construction.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// Price value is negative
    #[error("price cannot be negative: {0}")]
    NegativePrice(rust_decimal::Decimal),

    /// Lot size is negative
    #[error("lot size cannot be negative: {0}")]
    NegativeLots(rust_decimal::Decimal),

    /// Identifier is empty
    #[error("identifier cannot be empty")]
    EmptyId,

    /// Timestamp is negative
    #[error("invalid timestamp: {0}")]
    InvalidTimestamp(i64),

    /// Timeframe code is not recognised
    #[error("unknown timeframe code: {0}")]
    InvalidTimeframe(String),

    /// Currency code is malformed
    #[error("invalid currency code: {0}")]
    InvalidCurrency(String),

    /// Symbol id string is not a numeric id
    #[error("invalid symbol id: {0}")]
    InvalidSymbolId(String),
}
