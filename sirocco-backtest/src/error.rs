//! Backtest error types.

use thiserror::Error;

use sirocco_core::traits::{ClockError, ExecutionError, FeedError};
use sirocco_strategy::{ProviderError, StrategyError};

/// Backtest error type.
///
/// These never escape the orchestrator's public surface: `run` converts
/// every variant into an unsuccessful [`crate::BacktestResult`].
#[derive(Error, Debug)]
pub enum BacktestError {
    /// Loaded bars are not sorted chronologically
    #[error("bars not sorted chronologically at index {index}: {prev} >= {next}")]
    UnsortedData {
        /// Index of the offending bar
        index: usize,
        /// Preceding timestamp (millis)
        prev: i64,
        /// Offending timestamp (millis)
        next: i64,
    },

    /// The candle catalog failed
    #[error(transparent)]
    Feed(#[from] FeedError),

    /// The simulated clock was driven backwards
    #[error(transparent)]
    Clock(#[from] ClockError),

    /// Strategy construction failed
    #[error(transparent)]
    Strategy(#[from] StrategyError),

    /// The definition store failed
    #[error(transparent)]
    Provider(#[from] ProviderError),

    /// The simulated venue failed
    #[error(transparent)]
    Execution(#[from] ExecutionError),
}
