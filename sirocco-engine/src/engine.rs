//! The trading engine: dispatch, evaluation and order translation.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, info, warn};

use sirocco_core::data::{Bar, OrderRequest, OrderSide, OrderType};
use sirocco_core::traits::{Clock, EventSink, MarketDataFeed, OrderExecution};
use sirocco_core::traits::FeedError;
use sirocco_core::types::{Lots, SymbolId, Timeframe};
use sirocco_strategy::{Signal, SignalContext, SignalStrategy};

use crate::cache::BarCache;

/// The bar-driven trading engine.
///
/// One engine instance serves one run (live session or backtest). It is
/// generic over the execution venue so the backtest orchestrator can
/// keep a concrete handle to the simulated broker while the engine sees
/// the same [`OrderExecution`] surface a live adapter would present.
///
/// `on_bar_closed` is the only ingress point and must be driven from a
/// single task; the engine holds no internal synchronisation beyond the
/// mutex guarding the shared execution venue.
pub struct TradingEngine<E> {
    execution: Arc<Mutex<E>>,
    clock: Arc<dyn Clock>,
    sink: Arc<dyn EventSink>,
    strategies: Vec<Box<dyn SignalStrategy>>,
    cache: BarCache,
    symbol_names: HashMap<SymbolId, String>,
}

impl<E: OrderExecution> TradingEngine<E> {
    /// Creates a new engine wiring the three push-side collaborators.
    #[must_use]
    pub fn new(execution: Arc<Mutex<E>>, clock: Arc<dyn Clock>, sink: Arc<dyn EventSink>) -> Self {
        Self {
            execution,
            clock,
            sink,
            strategies: Vec::new(),
            cache: BarCache::new(),
            symbol_names: HashMap::new(),
        }
    }

    /// Registers a display name for a symbol id, used in contexts and
    /// status messages. Unregistered symbols fall back to `sym_{id}`.
    pub fn register_symbol(&mut self, symbol_id: SymbolId, name: impl Into<String>) {
        self.symbol_names.insert(symbol_id, name.into());
    }

    /// Appends a strategy to the active list.
    pub fn register_strategy(&mut self, strategy: Box<dyn SignalStrategy>) {
        info!(
            strategy = %strategy.name(),
            version = strategy.version(),
            main_timeframe = %strategy.main_timeframe(),
            "strategy registered"
        );
        self.strategies.push(strategy);
    }

    /// Returns the number of cached bars for a series. Observability
    /// hook used by tests.
    #[must_use]
    pub fn cached_bar_count(&self, symbol_id: SymbolId, timeframe: Timeframe) -> usize {
        self.cache.bar_count(symbol_id, timeframe)
    }

    /// Processes one closed bar: updates the cache, then evaluates every
    /// registered strategy whose main timeframe matches.
    ///
    /// Never fails: insufficient history is a silent per-bar skip, and
    /// order-placement failures are demoted to engine-status events.
    pub fn on_bar_closed(&mut self, bar: &Bar) {
        self.cache.append(bar);

        let symbol_name = self
            .symbol_names
            .get(&bar.symbol_id)
            .cloned()
            .unwrap_or_else(|| bar.symbol_id.to_string());

        let execution = Arc::clone(&self.execution);
        let clock = Arc::clone(&self.clock);
        let sink = Arc::clone(&self.sink);

        for strategy in &mut self.strategies {
            if strategy.main_timeframe() != bar.timeframe {
                continue;
            }

            let Some(market_data) = collect_windows(
                &self.cache,
                bar.symbol_id,
                strategy.required_timeframes(),
            ) else {
                debug!(
                    strategy = %strategy.name(),
                    symbol = %bar.symbol_id,
                    "insufficient history, skipping evaluation"
                );
                continue;
            };

            let ctx = SignalContext {
                symbol_id: bar.symbol_id,
                symbol: symbol_name.clone(),
                market_data,
                account_balance: execution.lock().account_balance(),
                timestamp: clock.now(),
            };

            let result = strategy.evaluate(&ctx);
            if !result.signal.is_actionable() {
                continue;
            }

            let side = match result.signal {
                Signal::Buy => OrderSide::Buy,
                Signal::Sell => OrderSide::Sell,
                Signal::None => continue,
            };
            let volume = result.suggested_volume.unwrap_or(Lots::MIN_STEP);
            let client_order_id = format!("{}-{}", strategy.name(), clock.unix_seconds());

            let mut builder = OrderRequest::builder()
                .symbol_id(bar.symbol_id)
                .side(side)
                .order_type(OrderType::Market)
                .volume(volume)
                .client_order_id(client_order_id);
            if let Some(stop_loss) = result.suggested_stop_loss {
                builder = builder.stop_loss(stop_loss);
            }
            if let Some(take_profit) = result.suggested_take_profit {
                builder = builder.take_profit(take_profit);
            }

            let placed = builder
                .build()
                .map_err(|e| e.to_string())
                .and_then(|request| {
                    execution
                        .lock()
                        .place_order(request)
                        .map_err(|e| e.to_string())
                });

            match placed {
                Ok(order) => {
                    info!(
                        strategy = %strategy.name(),
                        order_id = %order.order_id,
                        side = %side,
                        volume = %volume,
                        symbol = %symbol_name,
                        "order placed"
                    );
                    sink.publish_order(&order);
                    sink.publish_status(&format!("Order placed: {side} {volume} @ {symbol_name}"));
                }
                Err(error) => {
                    warn!(
                        strategy = %strategy.name(),
                        symbol = %symbol_name,
                        error = %error,
                        "order placement failed"
                    );
                    sink.publish_status(&format!("Order failed: {error}"));
                }
            }
        }
    }

    /// Drives the engine from a push feed until the stream ends.
    ///
    /// Each delivered bar is processed to completion before the next is
    /// accepted; backpressure is inherited from the feed.
    pub async fn run_live(
        &mut self,
        feed: &dyn MarketDataFeed,
        symbol_id: SymbolId,
        timeframe: Timeframe,
    ) -> Result<(), FeedError> {
        let mut stream = feed.subscribe_bars(symbol_id, timeframe).await?;
        info!(symbol = %symbol_id, timeframe = %timeframe, "live bar loop started");
        while let Some(bar) = stream.recv().await {
            self.on_bar_closed(&bar);
        }
        info!(symbol = %symbol_id, timeframe = %timeframe, "live bar loop ended");
        Ok(())
    }
}

/// Collects the per-timeframe windows a strategy requires, or `None`
/// if any window is short.
fn collect_windows(
    cache: &BarCache,
    symbol_id: SymbolId,
    required: &BTreeMap<Timeframe, usize>,
) -> Option<BTreeMap<Timeframe, Vec<Bar>>> {
    let mut market_data = BTreeMap::new();
    for (&timeframe, &count) in required {
        let bars = cache.last_bars(symbol_id, timeframe, count)?;
        market_data.insert(timeframe, bars);
    }
    Some(market_data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use sirocco_core::data::{Order, OrderStatus, Position};
    use sirocco_core::traits::{
        ChannelEventSink, EngineEvent, ExecutionError, NullEventSink, SimulatedClock,
    };
    use sirocco_core::types::{
        Currency, Money, OrderId, PositionId, Price, Timestamp,
    };
    use sirocco_strategy::SignalResult;
    use sirocco_strategy::strategies::BuyOnFirstBar;

    /// Execution stub that records requests and optionally rejects them.
    struct RecordingExecution {
        requests: Vec<OrderRequest>,
        fail: bool,
        counter: u64,
    }

    impl RecordingExecution {
        fn new() -> Self {
            Self {
                requests: Vec::new(),
                fail: false,
                counter: 0,
            }
        }

        fn failing() -> Self {
            Self {
                fail: true,
                ..Self::new()
            }
        }
    }

    impl OrderExecution for RecordingExecution {
        fn place_order(&mut self, request: OrderRequest) -> Result<Order, ExecutionError> {
            if self.fail {
                return Err(ExecutionError::Venue("venue unavailable".to_string()));
            }
            self.counter += 1;
            let order = Order {
                order_id: OrderId::new_unchecked(format!("REC-{}", self.counter)),
                symbol_id: request.symbol_id,
                side: request.side,
                order_type: request.order_type,
                volume: request.volume,
                price: request.price,
                stop_loss: request.stop_loss,
                take_profit: request.take_profit,
                status: OrderStatus::Pending,
                created_at: Timestamp::ZERO,
                client_order_id: request.client_order_id.clone(),
            };
            self.requests.push(request);
            Ok(order)
        }

        fn modify_order(
            &mut self,
            order_id: &OrderId,
            _stop_loss: Option<Price>,
            _take_profit: Option<Price>,
        ) -> Result<Order, ExecutionError> {
            Err(ExecutionError::UnknownOrder(order_id.clone()))
        }

        fn cancel_order(&mut self, _order_id: &OrderId) -> Result<(), ExecutionError> {
            Ok(())
        }

        fn close_position(&mut self, _position_id: &PositionId) -> Result<(), ExecutionError> {
            Ok(())
        }

        fn positions(&self) -> Vec<Position> {
            vec![]
        }

        fn account_balance(&self) -> Money {
            Money::new(dec!(10_000), Currency::usd())
        }
    }

    /// Strategy stub that always emits the same result.
    struct AlwaysSignal {
        required: BTreeMap<Timeframe, usize>,
        result: SignalResult,
    }

    impl AlwaysSignal {
        fn new(required_bars: usize, result: SignalResult) -> Self {
            Self {
                required: BTreeMap::from([(Timeframe::M5, required_bars)]),
                result,
            }
        }
    }

    impl SignalStrategy for AlwaysSignal {
        fn name(&self) -> &str {
            "AlwaysSignal"
        }

        fn version(&self) -> u32 {
            1
        }

        fn main_timeframe(&self) -> Timeframe {
            Timeframe::M5
        }

        fn required_timeframes(&self) -> &BTreeMap<Timeframe, usize> {
            &self.required
        }

        fn evaluate(&mut self, _ctx: &SignalContext) -> SignalResult {
            self.result.clone()
        }
    }

    fn bar(ts_secs: i64) -> Bar {
        Bar {
            symbol_id: SymbolId::new(1),
            timeframe: Timeframe::M5,
            timestamp: Timestamp::from_secs(ts_secs).unwrap(),
            open: Price::new(dec!(1.1000)).unwrap(),
            high: Price::new(dec!(1.1010)).unwrap(),
            low: Price::new(dec!(1.0990)).unwrap(),
            close: Price::new(dec!(1.1005)).unwrap(),
            volume: Lots::new(dec!(10)).unwrap(),
        }
    }

    fn engine_with(
        execution: RecordingExecution,
        sink: Arc<dyn EventSink>,
        clock_secs: i64,
    ) -> (TradingEngine<RecordingExecution>, Arc<Mutex<RecordingExecution>>) {
        let execution = Arc::new(Mutex::new(execution));
        let clock = Arc::new(SimulatedClock::new(
            Timestamp::from_secs(clock_secs).unwrap(),
        ));
        let engine = TradingEngine::new(Arc::clone(&execution), clock, sink);
        (engine, execution)
    }

    #[test]
    fn test_buy_on_first_bar_places_one_order() {
        let (mut engine, execution) =
            engine_with(RecordingExecution::new(), Arc::new(NullEventSink), 1_705_315_500);
        engine.register_strategy(Box::new(BuyOnFirstBar::new(Timeframe::M5)));

        engine.on_bar_closed(&bar(1_705_315_500));
        engine.on_bar_closed(&bar(1_705_315_800));

        let venue = execution.lock();
        assert_eq!(venue.requests.len(), 1);
        let request = &venue.requests[0];
        assert_eq!(request.side, OrderSide::Buy);
        assert_eq!(request.order_type, OrderType::Market);
        // Default volume when the strategy suggests none.
        assert_eq!(request.volume.as_decimal(), dec!(0.01));
        assert_eq!(
            request.client_order_id.as_deref(),
            Some("BuyOnFirstBar-1705315500")
        );
    }

    #[test]
    fn test_duplicate_bar_is_idempotent() {
        let (mut engine, execution) =
            engine_with(RecordingExecution::new(), Arc::new(NullEventSink), 1_705_315_500);
        engine.register_strategy(Box::new(BuyOnFirstBar::new(Timeframe::M5)));

        let b = bar(1_705_315_500);
        engine.on_bar_closed(&b);
        let cache_size = engine.cached_bar_count(SymbolId::new(1), Timeframe::M5);
        let order_count = execution.lock().requests.len();

        engine.on_bar_closed(&b);
        assert_eq!(
            engine.cached_bar_count(SymbolId::new(1), Timeframe::M5),
            cache_size
        );
        assert_eq!(execution.lock().requests.len(), order_count);
    }

    #[test]
    fn test_insufficient_history_skips_evaluation() {
        let (mut engine, execution) =
            engine_with(RecordingExecution::new(), Arc::new(NullEventSink), 0);
        engine.register_strategy(Box::new(AlwaysSignal::new(3, SignalResult::buy("always"))));

        engine.on_bar_closed(&bar(300));
        engine.on_bar_closed(&bar(600));
        assert!(execution.lock().requests.is_empty());

        engine.on_bar_closed(&bar(900));
        assert_eq!(execution.lock().requests.len(), 1);
    }

    #[test]
    fn test_timeframe_mismatch_not_dispatched() {
        let (mut engine, execution) =
            engine_with(RecordingExecution::new(), Arc::new(NullEventSink), 0);
        engine.register_strategy(Box::new(AlwaysSignal::new(1, SignalResult::buy("always"))));

        let mut h1 = bar(3600);
        h1.timeframe = Timeframe::H1;
        engine.on_bar_closed(&h1);

        assert!(execution.lock().requests.is_empty());
        assert_eq!(engine.cached_bar_count(SymbolId::new(1), Timeframe::H1), 1);
    }

    #[test]
    fn test_suggested_levels_passed_through() {
        let result = SignalResult::sell("short it")
            .with_stop_loss(Price::new(dec!(1.1050)).unwrap())
            .with_take_profit(Price::new(dec!(1.0900)).unwrap())
            .with_volume(Lots::new(dec!(0.05)).unwrap());

        let (mut engine, execution) =
            engine_with(RecordingExecution::new(), Arc::new(NullEventSink), 0);
        engine.register_strategy(Box::new(AlwaysSignal::new(1, result)));

        engine.on_bar_closed(&bar(300));

        let venue = execution.lock();
        let request = &venue.requests[0];
        assert_eq!(request.side, OrderSide::Sell);
        assert_eq!(request.stop_loss.unwrap().as_decimal(), dec!(1.1050));
        assert_eq!(request.take_profit.unwrap().as_decimal(), dec!(1.0900));
        assert_eq!(request.volume.as_decimal(), dec!(0.05));
    }

    #[test]
    fn test_placement_failure_becomes_status_event() {
        let sink = Arc::new(ChannelEventSink::new(16));
        let mut events = sink.subscribe();

        let (mut engine, _execution) = engine_with(
            RecordingExecution::failing(),
            Arc::clone(&sink) as Arc<dyn EventSink>,
            0,
        );
        engine.register_strategy(Box::new(AlwaysSignal::new(1, SignalResult::buy("always"))));

        // Must not panic or propagate.
        engine.on_bar_closed(&bar(300));

        let event = events.try_recv().unwrap();
        match event {
            EngineEvent::Status(status) => {
                assert!(status.starts_with("Order failed:"), "got: {status}");
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_run_live_drains_feed_to_completion() {
        use async_trait::async_trait;
        use sirocco_core::traits::{BarStream, FeedError, TickStream};
        use tokio::sync::mpsc;

        struct StubFeed {
            bars: Vec<Bar>,
        }

        #[async_trait]
        impl MarketDataFeed for StubFeed {
            async fn subscribe_bars(
                &self,
                _symbol_id: SymbolId,
                _timeframe: Timeframe,
            ) -> Result<BarStream, FeedError> {
                let (tx, rx) = mpsc::channel(self.bars.len().max(1));
                for bar in &self.bars {
                    tx.try_send(bar.clone())
                        .map_err(|e| FeedError::Source(e.to_string()))?;
                }
                Ok(rx)
            }

            async fn subscribe_ticks(&self, _symbol_id: SymbolId) -> Result<TickStream, FeedError> {
                let (_tx, rx) = mpsc::channel(1);
                Ok(rx)
            }

            async fn get_history(
                &self,
                _symbol_id: SymbolId,
                _timeframe: Timeframe,
                _from: Timestamp,
                _to: Timestamp,
            ) -> Result<Vec<Bar>, FeedError> {
                Ok(self.bars.clone())
            }
        }

        let (mut engine, execution) =
            engine_with(RecordingExecution::new(), Arc::new(NullEventSink), 0);
        engine.register_strategy(Box::new(BuyOnFirstBar::new(Timeframe::M5)));

        let feed = StubFeed {
            bars: vec![bar(300), bar(600), bar(900)],
        };
        engine
            .run_live(&feed, SymbolId::new(1), Timeframe::M5)
            .await
            .unwrap();

        // Same ingress as replay: all bars cached, single-shot strategy
        // placed exactly one order.
        assert_eq!(engine.cached_bar_count(SymbolId::new(1), Timeframe::M5), 3);
        assert_eq!(execution.lock().requests.len(), 1);
    }

    #[test]
    fn test_success_publishes_order_then_status() {
        let sink = Arc::new(ChannelEventSink::new(16));
        let mut events = sink.subscribe();

        let (mut engine, _execution) = engine_with(
            RecordingExecution::new(),
            Arc::clone(&sink) as Arc<dyn EventSink>,
            0,
        );
        engine.register_symbol(SymbolId::new(1), "EURUSD");
        engine.register_strategy(Box::new(AlwaysSignal::new(1, SignalResult::buy("always"))));

        engine.on_bar_closed(&bar(300));

        assert!(matches!(events.try_recv().unwrap(), EngineEvent::Order(_)));
        match events.try_recv().unwrap() {
            EngineEvent::Status(status) => {
                assert_eq!(status, "Order placed: BUY 0.01 @ EURUSD");
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }
}
