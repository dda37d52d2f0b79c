//! SMA crossover strategy.
//!
//! # Strategy logic
//!
//! Two simple moving averages over the main timeframe's closes. A Buy
//! is emitted when the fast average crosses above the slow one, a Sell
//! when it crosses below. Exits and volume come from the definition's
//! risk policies; pip distances are converted to price levels around
//! the latest close using the instrument's pip size.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;
use tracing::warn;

use sirocco_core::data::Bar;
use sirocco_core::types::Timeframe;

use crate::definition::StrategyDefinition;
use crate::risk::{
    self, PositionSizing, StopLossPolicy, TakeProfitPolicy,
};
use crate::signal::{Signal, SignalContext, SignalResult};
use crate::strategy::{SignalStrategy, StrategyError};

const DEFAULT_FAST: usize = 10;
const DEFAULT_SLOW: usize = 30;
/// 0.0001, the conventional pip for 4-decimal FX quotes.
const DEFAULT_PIP_SIZE: Decimal = Decimal::from_parts(1, 0, 0, false, 4);

/// Fast/slow SMA crossover with policy-driven exits and sizing.
pub struct SmaCross {
    name: String,
    version: u32,
    main_timeframe: Timeframe,
    required_timeframes: BTreeMap<Timeframe, usize>,
    fast: usize,
    slow: usize,
    pip_size: Decimal,
    stop_loss: Box<dyn StopLossPolicy>,
    take_profit: Box<dyn TakeProfitPolicy>,
    sizing: Box<dyn PositionSizing>,
}

impl SmaCross {
    /// Creates an instance from a definition.
    ///
    /// Parameters: `fast` (default 10), `slow` (default 30), `pip_size`
    /// (default 0.0001). The main-timeframe window requirement is
    /// raised to `slow + 1` bars so a crossover is always observable.
    ///
    /// # Errors
    ///
    /// Returns `StrategyError::InvalidParameters` when `fast >= slow`
    /// or a window is zero, and propagates risk-policy construction
    /// failures.
    pub fn from_definition(definition: &StrategyDefinition) -> Result<Self, StrategyError> {
        let fast = definition.param_usize("fast").unwrap_or(DEFAULT_FAST);
        let slow = definition.param_usize("slow").unwrap_or(DEFAULT_SLOW);
        if fast == 0 || slow == 0 {
            return Err(StrategyError::InvalidParameters(
                "SMA windows must be positive".to_string(),
            ));
        }
        if fast >= slow {
            return Err(StrategyError::InvalidParameters(format!(
                "fast window ({fast}) must be shorter than slow window ({slow})"
            )));
        }

        let pip_size = match definition.param_f64("pip_size") {
            Some(value) => Decimal::from_f64(value).filter(|p| *p > Decimal::ZERO).ok_or_else(
                || StrategyError::InvalidParameters(format!("pip_size must be positive, got {value}")),
            )?,
            None => DEFAULT_PIP_SIZE,
        };

        let mut required_timeframes = definition.required_timeframes.clone();
        let main_window = required_timeframes
            .entry(definition.main_timeframe)
            .or_insert(0);
        *main_window = (*main_window).max(slow + 1);

        Ok(Self {
            name: definition.name.clone(),
            version: definition.version,
            main_timeframe: definition.main_timeframe,
            required_timeframes,
            fast,
            slow,
            pip_size,
            stop_loss: risk::build_stop_loss(&definition.risk.stop_loss)?,
            take_profit: risk::build_take_profit(&definition.risk.take_profit)?,
            sizing: risk::build_position_sizing(&definition.risk.position_sizing)?,
        })
    }

    fn sma(bars: &[Bar], window: usize) -> Option<Decimal> {
        if bars.len() < window || window == 0 {
            return None;
        }
        let sum: Decimal = bars[bars.len() - window..]
            .iter()
            .map(|bar| bar.close.as_decimal())
            .sum();
        Some(sum / Decimal::from(window as u64))
    }

    fn crossover(&self, bars: &[Bar]) -> Signal {
        let current = bars;
        let previous = &bars[..bars.len() - 1];

        let (Some(prev_fast), Some(prev_slow), Some(curr_fast), Some(curr_slow)) = (
            Self::sma(previous, self.fast),
            Self::sma(previous, self.slow),
            Self::sma(current, self.fast),
            Self::sma(current, self.slow),
        ) else {
            return Signal::None;
        };

        if prev_fast <= prev_slow && curr_fast > curr_slow {
            Signal::Buy
        } else if prev_fast >= prev_slow && curr_fast < curr_slow {
            Signal::Sell
        } else {
            Signal::None
        }
    }
}

impl SignalStrategy for SmaCross {
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
        let Some(bars) = ctx.bars(self.main_timeframe) else {
            return SignalResult::none();
        };
        if bars.len() < self.slow + 1 {
            return SignalResult::none();
        }

        let signal = self.crossover(bars);
        if !signal.is_actionable() {
            return SignalResult::none();
        }

        let (sl_pips, tp_pips, volume) = match self
            .stop_loss
            .stop_loss_pips(ctx)
            .and_then(|sl| Ok((sl, self.take_profit.take_profit_pips(ctx, sl)?)))
            .and_then(|(sl, tp)| Ok((sl, tp, self.sizing.volume(ctx, sl)?)))
        {
            Ok(values) => values,
            Err(e) => {
                warn!(strategy = %self.name, error = %e, "risk policy failed, skipping signal");
                return SignalResult::none();
            }
        };

        // The last close stands in for the expected entry price when
        // converting pip distances to absolute levels.
        let close = bars[bars.len() - 1].close;
        let sl_offset = sl_pips * self.pip_size;
        let tp_offset = tp_pips * self.pip_size;

        let result = if signal == Signal::Buy {
            SignalResult::buy(format!(
                "fast SMA({}) crossed above slow SMA({})",
                self.fast, self.slow
            ))
            .with_stop_loss(close - sl_offset)
            .with_take_profit(close + tp_offset)
        } else {
            SignalResult::sell(format!(
                "fast SMA({}) crossed below slow SMA({})",
                self.fast, self.slow
            ))
            .with_stop_loss(close + sl_offset)
            .with_take_profit(close - tp_offset)
        };
        result.with_volume(volume)
    }
}
