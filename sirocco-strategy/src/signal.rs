//! Signal types for expressing strategy intents.
//!
//! A strategy evaluation produces a [`SignalResult`]: a direction plus
//! optional exit levels and a volume suggestion. The engine translates
//! the result into an order request; the strategy never talks to the
//! execution venue directly.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use sirocco_core::data::Bar;
use sirocco_core::types::{Lots, Money, Price, SymbolId, Timeframe, Timestamp};

/// Direction emitted by a strategy evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Signal {
    /// No action
    #[default]
    None,
    /// Open or extend a long position
    Buy,
    /// Open or extend a short position
    Sell,
}

impl Signal {
    /// Returns true if the signal is actionable (Buy or Sell).
    #[must_use]
    pub const fn is_actionable(&self) -> bool {
        !matches!(self, Self::None)
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => write!(f, "none"),
            Self::Buy => write!(f, "buy"),
            Self::Sell => write!(f, "sell"),
        }
    }
}

/// The outcome of one strategy evaluation.
///
/// The suggested exit fields are ABSOLUTE PRICE LEVELS, passed through
/// to the execution venue unchanged. Strategies working in pips convert
/// to prices themselves using their instrument's pip size (see
/// `SmaCross` for the canonical conversion).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct SignalResult {
    /// Emitted direction
    pub signal: Signal,
    /// Suggested stop-loss price level
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggested_stop_loss: Option<Price>,
    /// Suggested take-profit price level
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggested_take_profit: Option<Price>,
    /// Suggested volume; the engine defaults to 0.01 lots when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggested_volume: Option<Lots>,
    /// Human-readable rationale for logs and dashboards
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl SignalResult {
    /// A no-action result.
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }

    /// A buy result with a rationale.
    #[must_use]
    pub fn buy(reason: impl Into<String>) -> Self {
        Self {
            signal: Signal::Buy,
            reason: Some(reason.into()),
            ..Self::default()
        }
    }

    /// A sell result with a rationale.
    #[must_use]
    pub fn sell(reason: impl Into<String>) -> Self {
        Self {
            signal: Signal::Sell,
            reason: Some(reason.into()),
            ..Self::default()
        }
    }

    /// Attaches a suggested stop-loss level.
    #[must_use]
    pub fn with_stop_loss(mut self, level: Price) -> Self {
        self.suggested_stop_loss = Some(level);
        self
    }

    /// Attaches a suggested take-profit level.
    #[must_use]
    pub fn with_take_profit(mut self, level: Price) -> Self {
        self.suggested_take_profit = Some(level);
        self
    }

    /// Attaches a suggested volume.
    #[must_use]
    pub fn with_volume(mut self, volume: Lots) -> Self {
        self.suggested_volume = Some(volume);
        self
    }
}

/// Evaluation input assembled by the engine for one bar close.
///
/// `market_data` holds, per required timeframe, the last N cached bars
/// in chronological order, where N is the count the strategy declared
/// for that timeframe. The engine only builds a context when every
/// required window is fully populated.
#[derive(Debug, Clone)]
pub struct SignalContext {
    /// Instrument identifier
    pub symbol_id: SymbolId,
    /// Display name of the instrument
    pub symbol: String,
    /// Per-timeframe bar windows, oldest first
    pub market_data: BTreeMap<Timeframe, Vec<Bar>>,
    /// Account balance per the execution venue's ledger
    pub account_balance: Money,
    /// The clock's current instant
    pub timestamp: Timestamp,
}

impl SignalContext {
    /// Returns the bar window for a timeframe, if present.
    #[must_use]
    pub fn bars(&self, timeframe: Timeframe) -> Option<&[Bar]> {
        self.market_data.get(&timeframe).map(Vec::as_slice)
    }

    /// Returns the most recent bar for a timeframe.
    #[must_use]
    pub fn last_bar(&self, timeframe: Timeframe) -> Option<&Bar> {
        self.market_data.get(&timeframe).and_then(|bars| bars.last())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use sirocco_core::types::Currency;

    #[test]
    fn test_signal_default_is_none() {
        assert_eq!(Signal::default(), Signal::None);
        assert!(!Signal::None.is_actionable());
        assert!(Signal::Buy.is_actionable());
        assert!(Signal::Sell.is_actionable());
    }

    #[test]
    fn test_signal_result_builders() {
        let result = SignalResult::buy("breakout")
            .with_stop_loss(Price::new(dec!(1.0950)).unwrap())
            .with_volume(Lots::new(dec!(0.02)).unwrap());

        assert_eq!(result.signal, Signal::Buy);
        assert_eq!(result.suggested_stop_loss.unwrap().as_decimal(), dec!(1.0950));
        assert!(result.suggested_take_profit.is_none());
        assert_eq!(result.reason.as_deref(), Some("breakout"));
    }

    #[test]
    fn test_signal_context_accessors() {
        let bar = Bar {
            symbol_id: SymbolId::new(1),
            timeframe: Timeframe::M5,
            timestamp: Timestamp::from_secs(1_705_315_500).unwrap(),
            open: Price::new(dec!(1.1000)).unwrap(),
            high: Price::new(dec!(1.1010)).unwrap(),
            low: Price::new(dec!(1.0990)).unwrap(),
            close: Price::new(dec!(1.1005)).unwrap(),
            volume: Lots::new(dec!(10)).unwrap(),
        };
        let mut market_data = BTreeMap::new();
        market_data.insert(Timeframe::M5, vec![bar.clone()]);

        let ctx = SignalContext {
            symbol_id: SymbolId::new(1),
            symbol: "EURUSD".to_string(),
            market_data,
            account_balance: Money::new(dec!(10_000), Currency::usd()),
            timestamp: bar.timestamp,
        };

        assert_eq!(ctx.bars(Timeframe::M5).unwrap().len(), 1);
        assert!(ctx.bars(Timeframe::H1).is_none());
        assert_eq!(ctx.last_bar(Timeframe::M5).unwrap(), &bar);
    }
}
