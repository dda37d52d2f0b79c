//! The signal-strategy capability set.

use std::collections::BTreeMap;

use sirocco_core::types::Timeframe;

use crate::risk::RiskError;
use crate::signal::{SignalContext, SignalResult};

/// Error raised while constructing or evaluating a strategy.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StrategyError {
    /// A definition parameter is missing or out of range
    #[error("invalid strategy parameters: {0}")]
    InvalidParameters(String),

    /// A risk policy could not be built
    #[error(transparent)]
    Risk(#[from] RiskError),
}

/// A signal-generating strategy.
///
/// Strategies are evaluated by the engine on every close of their main
/// timeframe, provided the per-timeframe history windows they require
/// are fully populated. Evaluation may mutate the strategy's own state
/// (e.g. a single-shot flag) but never the engine's cache.
pub trait SignalStrategy: Send {
    /// Returns the strategy instance name.
    fn name(&self) -> &str;

    /// Returns the definition version this instance was built from.
    fn version(&self) -> u32;

    /// Returns the timeframe whose bar closes trigger evaluation.
    fn main_timeframe(&self) -> Timeframe;

    /// Returns the history windows this strategy needs: for each
    /// timeframe, the minimum number of cached bars. The engine skips
    /// evaluation until every window is available.
    fn required_timeframes(&self) -> &BTreeMap<Timeframe, usize>;

    /// Evaluates the strategy against one bar-close context.
    fn evaluate(&mut self, ctx: &SignalContext) -> SignalResult;

    /// Resets internal state. Used by single-shot test strategies.
    fn reset(&mut self) {}
}
