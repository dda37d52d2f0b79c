//! Bid/ask tick record.

use serde::{Deserialize, Serialize};

use crate::types::{Price, SymbolId, Timestamp};

/// A top-of-book quote.
///
/// Carried for the live feed contract; the bar-level simulator never
/// consumes ticks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tick {
    /// Quote timestamp
    pub timestamp: Timestamp,
    /// Instrument identifier
    pub symbol_id: SymbolId,
    /// Best bid price
    pub bid: Price,
    /// Best ask price
    pub ask: Price,
}

impl Tick {
    /// Returns the quoted spread (ask - bid).
    #[must_use]
    pub fn spread(&self) -> rust_decimal::Decimal {
        self.ask - self.bid
    }

    /// Returns the mid price.
    #[must_use]
    pub fn mid(&self) -> Price {
        Price::new_unchecked((self.bid.as_decimal() + self.ask.as_decimal()) / rust_decimal::Decimal::TWO)
    }
}
