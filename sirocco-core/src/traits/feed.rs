//! Market-data feed contract.

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::data::{Bar, Tick};
use crate::types::{SymbolId, Timeframe, Timestamp};

/// A stream of closed bars. Finite for replay feeds, unbounded for live
/// ones; dropping the receiver cancels the subscription.
pub type BarStream = mpsc::Receiver<Bar>;

/// A stream of top-of-book ticks.
pub type TickStream = mpsc::Receiver<Tick>;

/// Error raised by feed operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FeedError {
    /// The (symbol, timeframe) pair is not served by this feed
    #[error("unknown series: {symbol_id} {timeframe}")]
    UnknownSeries {
        /// Requested instrument
        symbol_id: SymbolId,
        /// Requested timeframe
        timeframe: Timeframe,
    },

    /// The upstream source failed
    #[error("feed source error: {0}")]
    Source(String),
}

/// Market-data feed consumed by the engine and the orchestrator.
///
/// Replay feeds serve bars loaded from the external candle catalog;
/// live feeds push bars from an exchange connection. Both deliver
/// bars stamped with their close time, sorted ascending.
#[async_trait]
pub trait MarketDataFeed: Send + Sync {
    /// Subscribes to closed bars for a (symbol, timeframe) series.
    async fn subscribe_bars(
        &self,
        symbol_id: SymbolId,
        timeframe: Timeframe,
    ) -> Result<BarStream, FeedError>;

    /// Subscribes to ticks for a symbol. Simulated feeds may return an
    /// immediately-exhausted stream.
    async fn subscribe_ticks(&self, symbol_id: SymbolId) -> Result<TickStream, FeedError>;

    /// Fetches historical bars, ascending by timestamp, inclusive on
    /// both ends. Returns an empty list for unknown pairs.
    async fn get_history(
        &self,
        symbol_id: SymbolId,
        timeframe: Timeframe,
        from: Timestamp,
        to: Timestamp,
    ) -> Result<Vec<Bar>, FeedError>;
}
