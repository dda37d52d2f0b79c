//! Single-shot smoke-test strategy.

use std::collections::BTreeMap;

use sirocco_core::types::Timeframe;

use crate::definition::StrategyDefinition;
use crate::signal::{SignalContext, SignalResult};
use crate::strategy::SignalStrategy;

/// Emits exactly one Buy: on the first evaluation whose main-timeframe
/// window is non-empty. Nothing more until [`SignalStrategy::reset`].
///
/// Used by integration tests and smoke runs to exercise the full
/// order → fill → position pipeline with a deterministic trigger.
pub struct BuyOnFirstBar {
    name: String,
    version: u32,
    main_timeframe: Timeframe,
    required_timeframes: BTreeMap<Timeframe, usize>,
    fired: bool,
}

impl BuyOnFirstBar {
    /// Creates an instance with defaults for the given main timeframe.
    #[must_use]
    pub fn new(main_timeframe: Timeframe) -> Self {
        Self {
            name: "BuyOnFirstBar".to_string(),
            version: 1,
            main_timeframe,
            required_timeframes: BTreeMap::from([(main_timeframe, 1)]),
            fired: false,
        }
    }

    /// Creates an instance from a definition, keeping the definition's
    /// name, version and window requirements.
    #[must_use]
    pub fn from_definition(definition: &StrategyDefinition) -> Self {
        Self {
            name: definition.name.clone(),
            version: definition.version,
            main_timeframe: definition.main_timeframe,
            required_timeframes: definition.required_timeframes.clone(),
            fired: false,
        }
    }

    /// Returns true once the single Buy has been emitted.
    #[must_use]
    pub fn has_fired(&self) -> bool {
        self.fired
    }
}

impl SignalStrategy for BuyOnFirstBar {
    fn name(&self) -> &str {
        &self.name
    }

    fn version(&self) -> u32 {
        self.version
    }

    fn main_timeframe(&self) -> Timeframe {
        self.main_timeframe
    }

    fn required_timeframes(&self) -> &BTreeMap<Timeframe, usize> {
        &self.required_timeframes
    }

    fn evaluate(&mut self, ctx: &SignalContext) -> SignalResult {
        if self.fired {
            return SignalResult::none();
        }
        let has_bars = ctx
            .bars(self.main_timeframe)
            .is_some_and(|bars| !bars.is_empty());
        if !has_bars {
            return SignalResult::none();
        }
        self.fired = true;
        SignalResult::buy("first bar seen")
    }

    fn reset(&mut self) {
        self.fired = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use sirocco_core::data::Bar;
    use sirocco_core::types::{Currency, Lots, Money, Price, SymbolId, Timestamp};

    use crate::signal::Signal;

    fn ctx_with_bars(count: usize) -> SignalContext {
        let bars: Vec<Bar> = (0..count)
            .map(|i| Bar {
                symbol_id: SymbolId::new(1),
                timeframe: Timeframe::M5,
                timestamp: Timestamp::from_secs(1_705_315_500 + (i as i64) * 300).unwrap(),
                open: Price::new(dec!(1.1)).unwrap(),
                high: Price::new(dec!(1.101)).unwrap(),
                low: Price::new(dec!(1.099)).unwrap(),
                close: Price::new(dec!(1.1005)).unwrap(),
                volume: Lots::new(dec!(10)).unwrap(),
            })
            .collect();

        let mut market_data = BTreeMap::new();
        if !bars.is_empty() {
            market_data.insert(Timeframe::M5, bars);
        }

        SignalContext {
            symbol_id: SymbolId::new(1),
            symbol: "EURUSD".to_string(),
            market_data,
            account_balance: Money::new(dec!(10_000), Currency::usd()),
            timestamp: Timestamp::from_secs(1_705_315_500).unwrap(),
        }
    }

    #[test]
    fn test_fires_once_then_stays_silent() {
        let mut strategy = BuyOnFirstBar::new(Timeframe::M5);

        let first = strategy.evaluate(&ctx_with_bars(1));
        assert_eq!(first.signal, Signal::Buy);
        assert!(strategy.has_fired());

        let second = strategy.evaluate(&ctx_with_bars(2));
        assert_eq!(second.signal, Signal::None);
    }

    #[test]
    fn test_does_not_fire_without_bars() {
        let mut strategy = BuyOnFirstBar::new(Timeframe::M5);
        let result = strategy.evaluate(&ctx_with_bars(0));
        assert_eq!(result.signal, Signal::None);
        assert!(!strategy.has_fired());
    }

    #[test]
    fn test_reset_rearms() {
        let mut strategy = BuyOnFirstBar::new(Timeframe::M5);
        strategy.evaluate(&ctx_with_bars(1));
        assert!(strategy.has_fired());

        strategy.reset();
        assert!(!strategy.has_fired());
        let again = strategy.evaluate(&ctx_with_bars(1));
        assert_eq!(again.signal, Signal::Buy);
    }
}
