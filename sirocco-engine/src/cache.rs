//! Rolling per-(symbol, timeframe) bar cache.

use std::collections::{HashMap, VecDeque};

use tracing::debug;

use sirocco_core::data::Bar;
use sirocco_core::types::{SymbolId, Timeframe};

/// FIFO retention cap per (symbol, timeframe) series.
pub const MAX_BARS_PER_SERIES: usize = 1000;

/// Rolling bar windows, strictly increasing in timestamp.
///
/// A bar is appended only when its timestamp is strictly greater than
/// the last stored bar's; anything else is silently dropped, which
/// makes double-dispatch of the same bar harmless. When a series
/// exceeds [`MAX_BARS_PER_SERIES`] the oldest bar is evicted.
#[derive(Debug, Default)]
pub struct BarCache {
    series: HashMap<SymbolId, HashMap<Timeframe, VecDeque<Bar>>>,
}

impl BarCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a bar if it advances its series' chronology.
    ///
    /// Returns true if the bar was stored.
    pub fn append(&mut self, bar: &Bar) -> bool {
        let window = self
            .series
            .entry(bar.symbol_id)
            .or_default()
            .entry(bar.timeframe)
            .or_default();

        if let Some(last) = window.back()
            && bar.timestamp <= last.timestamp
        {
            debug!(
                symbol = %bar.symbol_id,
                timeframe = %bar.timeframe,
                timestamp = %bar.timestamp,
                "stale or duplicate bar dropped"
            );
            return false;
        }

        window.push_back(bar.clone());
        if window.len() > MAX_BARS_PER_SERIES {
            window.pop_front();
        }
        true
    }

    /// Returns the number of cached bars for a series.
    #[must_use]
    pub fn bar_count(&self, symbol_id: SymbolId, timeframe: Timeframe) -> usize {
        self.series
            .get(&symbol_id)
            .and_then(|by_tf| by_tf.get(&timeframe))
            .map_or(0, VecDeque::len)
    }

    /// Returns the last `count` bars of a series in chronological
    /// order, or `None` if fewer than `count` are cached.
    #[must_use]
    pub fn last_bars(
        &self,
        symbol_id: SymbolId,
        timeframe: Timeframe,
        count: usize,
    ) -> Option<Vec<Bar>> {
        let window = self.series.get(&symbol_id)?.get(&timeframe)?;
        if window.len() < count {
            return None;
        }
        Some(window.iter().skip(window.len() - count).cloned().collect())
    }
}
