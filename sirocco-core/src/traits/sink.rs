//! Event sink: fire-and-forget fan-out of engine events.

use tokio::sync::broadcast;
use tracing::debug;

use crate::data::{Order, Position, Trade};

/// An event published by the engine or an execution venue.
#[derive(Debug, Clone)]
pub enum EngineEvent {
    /// A trade was executed
    Trade(Trade),
    /// An order changed state
    Order(Order),
    /// A position was opened or closed
    Position(Position),
    /// Free-form engine status line
    Status(String),
}

/// Fire-and-forget event sink.
///
/// Publishing never fails and never blocks the per-bar loop; sinks that
/// cannot keep up drop events.
pub trait EventSink: Send + Sync {
    /// Publishes an executed trade.
    fn publish_trade(&self, trade: &Trade);

    /// Publishes an order state change.
    fn publish_order(&self, order: &Order);

    /// Publishes a position snapshot.
    fn publish_position(&self, position: &Position);

    /// Publishes a free-form status line.
    fn publish_status(&self, status: &str);
}

/// Sink that discards everything. Used by the backtest orchestrator.
#[derive(Debug, Default)]
pub struct NullEventSink;

impl EventSink for NullEventSink {
    fn publish_trade(&self, _trade: &Trade) {}
    fn publish_order(&self, _order: &Order) {}
    fn publish_position(&self, _position: &Position) {}
    fn publish_status(&self, _status: &str) {}
}

/// Sink that fans events out over a tokio broadcast channel.
///
/// Used by the live service to feed downstream consumers. Sends are
/// non-blocking; if no receiver is attached the event is dropped.
#[derive(Debug)]
pub struct ChannelEventSink {
    tx: broadcast::Sender<EngineEvent>,
}

impl ChannelEventSink {
    /// Creates a new sink with the given channel capacity.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Returns a new receiver attached to this sink.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<EngineEvent> {
        self.tx.subscribe()
    }

    fn send(&self, event: EngineEvent) {
        if self.tx.send(event).is_err() {
            debug!("event sink has no receivers, dropping event");
        }
    }
}

impl Default for ChannelEventSink {
    fn default() -> Self {
        Self::new(1024)
    }
}

impl EventSink for ChannelEventSink {
    fn publish_trade(&self, trade: &Trade) {
        self.send(EngineEvent::Trade(trade.clone()));
    }

    fn publish_order(&self, order: &Order) {
        self.send(EngineEvent::Order(order.clone()));
    }

    fn publish_position(&self, position: &Position) {
        self.send(EngineEvent::Position(position.clone()));
    }

    fn publish_status(&self, status: &str) {
        self.send(EngineEvent::Status(status.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{OrderSide, OrderStatus, OrderType};
    use crate::types::{Lots, OrderId, Price, SymbolId, Timestamp};
    use rust_decimal_macros::dec;

    fn order() -> Order {
        Order {
            order_id: OrderId::new_unchecked("SIM-1"),
            symbol_id: SymbolId::new(1),
            side: OrderSide::Buy,
            order_type: OrderType::Market,
            volume: Lots::new(dec!(0.01)).unwrap(),
            price: None,
            stop_loss: None,
            take_profit: None,
            status: OrderStatus::Pending,
            created_at: Timestamp::from_secs(1_705_315_500).unwrap(),
            client_order_id: None,
        }
    }

    #[test]
    fn test_null_sink_accepts_everything() {
        let sink = NullEventSink;
        sink.publish_order(&order());
        sink.publish_status("Order placed");
    }

    #[tokio::test]
    async fn test_channel_sink_fans_out() {
        let sink = ChannelEventSink::new(16);
        let mut rx = sink.subscribe();

        sink.publish_status("engine started");
        sink.publish_order(&order());

        match rx.recv().await.unwrap() {
            EngineEvent::Status(s) => assert_eq!(s, "engine started"),
            other => panic!("unexpected event: {other:?}"),
        }
        assert!(matches!(rx.recv().await.unwrap(), EngineEvent::Order(_)));
    }

    #[test]
    fn test_channel_sink_without_receivers_drops() {
        let sink = ChannelEventSink::new(1);
        // No receiver attached: publishing must not fail.
        sink.publish_status("dropped");

        let price = Price::new(dec!(1.1)).unwrap();
        let position = Position {
            position_id: crate::types::PositionId::new_unchecked("SIM-1"),
            symbol_id: SymbolId::new(1),
            side: OrderSide::Buy,
            volume: Lots::new(dec!(0.01)).unwrap(),
            entry_price: price,
            stop_loss: None,
            take_profit: None,
            entry_bar_timestamp: Timestamp::ZERO,
            opened_at: Timestamp::ZERO,
            strategy_name: None,
        };
        sink.publish_position(&position);
    }
}
