//! Replay feed serving bars loaded from the candle catalog.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::mpsc;

use sirocco_core::data::Bar;
use sirocco_core::traits::{BarStream, FeedError, MarketDataFeed, TickStream};
use sirocco_core::types::{SymbolId, Timeframe, Timestamp};

use crate::error::BacktestError;

/// In-memory market-data feed for replay runs.
///
/// Series are loaded once at run start and served back through the
/// same [`MarketDataFeed`] surface a live feed presents; bar
/// subscriptions are finite streams that end when the series is
/// exhausted.
#[derive(Debug, Default)]
pub struct ReplayFeed {
    series: HashMap<(SymbolId, Timeframe), Vec<Bar>>,
}

impl ReplayFeed {
    /// Creates an empty replay feed.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads a bar series, validating ascending chronology.
    ///
    /// # Errors
    ///
    /// Returns `BacktestError::UnsortedData` when a bar does not
    /// strictly follow its predecessor.
    pub fn load_series(
        &mut self,
        symbol_id: SymbolId,
        timeframe: Timeframe,
        bars: Vec<Bar>,
    ) -> Result<(), BacktestError> {
        for (index, pair) in bars.windows(2).enumerate() {
            if pair[1].timestamp <= pair[0].timestamp {
                return Err(BacktestError::UnsortedData {
                    index: index + 1,
                    prev: pair[0].timestamp.as_millis(),
                    next: pair[1].timestamp.as_millis(),
                });
            }
        }
        self.series.insert((symbol_id, timeframe), bars);
        Ok(())
    }

    /// Returns all loaded bars merged chronologically, stable by
    /// timestamp then symbol id.
    #[must_use]
    pub fn merged_bars(&self) -> Vec<Bar> {
        let mut merged: Vec<Bar> = self.series.values().flatten().cloned().collect();
        merged.sort_by(|a, b| {
            a.timestamp
                .cmp(&b.timestamp)
                .then(a.symbol_id.cmp(&b.symbol_id))
        });
        merged
    }

    /// Returns the total number of loaded bars.
    #[must_use]
    pub fn total_bars(&self) -> usize {
        self.series.values().map(Vec::len).sum()
    }
}

#[async_trait]
impl MarketDataFeed for ReplayFeed {
    async fn subscribe_bars(
        &self,
        symbol_id: SymbolId,
        timeframe: Timeframe,
    ) -> Result<BarStream, FeedError> {
        let bars = self
            .series
            .get(&(symbol_id, timeframe))
            .ok_or(FeedError::UnknownSeries {
                symbol_id,
                timeframe,
            })?;

        let (tx, rx) = mpsc::channel(bars.len().max(1));
        for bar in bars {
            // Capacity covers the whole series, so this cannot fail.
            tx.try_send(bar.clone())
                .map_err(|e| FeedError::Source(e.to_string()))?;
        }
        // Dropping the sender ends the stream after the last bar.
        Ok(rx)
    }

    async fn subscribe_ticks(&self, _symbol_id: SymbolId) -> Result<TickStream, FeedError> {
        // Bar-level replay has no ticks: an immediately-exhausted stream.
        let (_tx, rx) = mpsc::channel(1);
        Ok(rx)
    }

    async fn get_history(
        &self,
        symbol_id: SymbolId,
        timeframe: Timeframe,
        from: Timestamp,
        to: Timestamp,
    ) -> Result<Vec<Bar>, FeedError> {
        Ok(self
            .series
            .get(&(symbol_id, timeframe))
            .map(|bars| {
                bars.iter()
                    .filter(|bar| bar.timestamp >= from && bar.timestamp <= to)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use sirocco_core::types::{Lots, Price};

    fn bar(symbol: u64, ts_secs: i64) -> Bar {
        Bar {
            symbol_id: SymbolId::new(symbol),
            timeframe: Timeframe::M5,
            timestamp: Timestamp::from_secs(ts_secs).unwrap(),
            open: Price::new(dec!(1.1)).unwrap(),
            high: Price::new(dec!(1.101)).unwrap(),
            low: Price::new(dec!(1.099)).unwrap(),
            close: Price::new(dec!(1.1005)).unwrap(),
            volume: Lots::new(dec!(10)).unwrap(),
        }
    }

    #[test]
    fn test_load_series_rejects_unsorted() {
        let mut feed = ReplayFeed::new();
        let result = feed.load_series(
            SymbolId::new(1),
            Timeframe::M5,
            vec![bar(1, 600), bar(1, 300)],
        );
        assert!(matches!(result, Err(BacktestError::UnsortedData { .. })));
    }

    #[test]
    fn test_merged_bars_stable_order() {
        let mut feed = ReplayFeed::new();
        feed.load_series(
            SymbolId::new(2),
            Timeframe::M5,
            vec![bar(2, 300), bar(2, 900)],
        )
        .unwrap();
        feed.load_series(
            SymbolId::new(1),
            Timeframe::M5,
            vec![bar(1, 300), bar(1, 600)],
        )
        .unwrap();

        let merged = feed.merged_bars();
        let keys: Vec<(i64, u64)> = merged
            .iter()
            .map(|b| (b.timestamp.as_secs(), b.symbol_id.as_u64()))
            .collect();
        assert_eq!(keys, vec![(300, 1), (300, 2), (600, 1), (900, 2)]);
    }

    #[tokio::test]
    async fn test_subscribe_bars_finite_stream() {
        let mut feed = ReplayFeed::new();
        feed.load_series(
            SymbolId::new(1),
            Timeframe::M5,
            vec![bar(1, 300), bar(1, 600)],
        )
        .unwrap();

        let mut stream = feed.subscribe_bars(SymbolId::new(1), Timeframe::M5).await.unwrap();
        assert_eq!(stream.recv().await.unwrap().timestamp.as_secs(), 300);
        assert_eq!(stream.recv().await.unwrap().timestamp.as_secs(), 600);
        assert!(stream.recv().await.is_none());
    }

    #[tokio::test]
    async fn test_subscribe_unknown_series_errors() {
        let feed = ReplayFeed::new();
        let result = feed.subscribe_bars(SymbolId::new(9), Timeframe::H1).await;
        assert!(matches!(result, Err(FeedError::UnknownSeries { .. })));
    }

    #[tokio::test]
    async fn test_get_history_inclusive_bounds() {
        let mut feed = ReplayFeed::new();
        feed.load_series(
            SymbolId::new(1),
            Timeframe::M5,
            vec![bar(1, 300), bar(1, 600), bar(1, 900), bar(1, 1200)],
        )
        .unwrap();

        let history = feed
            .get_history(
                SymbolId::new(1),
                Timeframe::M5,
                Timestamp::from_secs(600).unwrap(),
                Timestamp::from_secs(900).unwrap(),
            )
            .await
            .unwrap();
        let secs: Vec<i64> = history.iter().map(|b| b.timestamp.as_secs()).collect();
        assert_eq!(secs, vec![600, 900]);
    }

    #[tokio::test]
    async fn test_get_history_unknown_pair_is_empty() {
        let feed = ReplayFeed::new();
        let history = feed
            .get_history(
                SymbolId::new(1),
                Timeframe::M5,
                Timestamp::ZERO,
                Timestamp::from_secs(1_000).unwrap(),
            )
            .await
            .unwrap();
        assert!(history.is_empty());
    }

    #[tokio::test]
    async fn test_subscribe_ticks_empty() {
        let feed = ReplayFeed::new();
        let mut ticks = feed.subscribe_ticks(SymbolId::new(1)).await.unwrap();
        assert!(ticks.recv().await.is_none());
    }
}
