//! OHLCV bar record.

use serde::{Deserialize, Serialize};

use crate::types::{Lots, Price, SymbolId, Timeframe, Timestamp};

use super::DataError;

/// An OHLCV aggregation over one timeframe period.
///
/// `timestamp` is the bar's CLOSE time. `low <= open,close <= high` is
/// a producer-side invariant: [`Bar::validate`] is available to data
/// producers, but the engine treats violations as upstream data errors
/// and does not police them on ingress.
///
/// # Examples
///
/// ```
/// use sirocco_core::data::Bar;
/// use sirocco_core::types::{SymbolId, Timeframe, Timestamp, Price, Lots};
/// use rust_decimal_macros::dec;
///
/// let bar = Bar {
///     symbol_id: SymbolId::new(1),
///     timeframe: Timeframe::M5,
///     timestamp: Timestamp::from_secs(1_705_315_500).unwrap(),
///     open: Price::new(dec!(1.1000)).unwrap(),
///     high: Price::new(dec!(1.1020)).unwrap(),
///     low: Price::new(dec!(1.0990)).unwrap(),
///     close: Price::new(dec!(1.1010)).unwrap(),
///     volume: Lots::new(dec!(120)).unwrap(),
/// };
/// assert!(bar.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bar {
    /// Instrument identifier
    pub symbol_id: SymbolId,
    /// Aggregation timeframe
    pub timeframe: Timeframe,
    /// Close time of the bar
    pub timestamp: Timestamp,
    /// Opening price
    pub open: Price,
    /// Highest price
    pub high: Price,
    /// Lowest price
    pub low: Price,
    /// Closing price
    pub close: Price,
    /// Traded volume over the period
    pub volume: Lots,
}

impl Bar {
    /// Validates the OHLC price relation.
    ///
    /// # Errors
    ///
    /// Returns an error if high < low, or open/close fall outside the
    /// high-low range.
    pub fn validate(&self) -> Result<(), DataError> {
        if self.high < self.low {
            return Err(DataError::InvalidPriceRelation(format!(
                "high ({}) < low ({})",
                self.high, self.low
            )));
        }
        if self.open > self.high || self.open < self.low {
            return Err(DataError::InvalidPriceRelation(format!(
                "open ({}) outside range {}-{}",
                self.open, self.low, self.high
            )));
        }
        if self.close > self.high || self.close < self.low {
            return Err(DataError::InvalidPriceRelation(format!(
                "close ({}) outside range {}-{}",
                self.close, self.low, self.high
            )));
        }
        Ok(())
    }

    /// Returns the full price range (high - low).
    #[must_use]
    pub fn range(&self) -> rust_decimal::Decimal {
        self.high - self.low
    }
}
