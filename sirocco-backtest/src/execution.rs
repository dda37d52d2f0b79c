//! Simulated order execution with T+1 fills.
//!
//! The broker is driven once per bar, BEFORE the engine dispatches that
//! bar to strategies, in two phases:
//!
//! 1. every pending order for the bar's symbol fills at the bar's open
//!    (buys pay the spread on top);
//! 2. stop-loss / take-profit are evaluated against the bar's range for
//!    every open position of that symbol - but never on the bar that
//!    opened the position (T+1), and with the stop checked before the
//!    target. Long positions exit on bid prices, shorts on ask prices;
//!    stop exits take adverse slippage, target exits are exact.

use std::sync::Arc;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use sirocco_core::data::{Bar, Order, OrderRequest, OrderSide, OrderStatus, Position, Trade};
use sirocco_core::traits::{Clock, ExecutionError, OrderExecution};
use sirocco_core::types::{Money, OrderId, PositionId, Price, Timestamp, TradeId};

use crate::settings::BacktestSettings;

/// Why a position left the open set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CloseReason {
    /// Stop-loss hit
    StopLoss,
    /// Take-profit hit
    TakeProfit,
    /// Explicit `close_position` call
    Manual,
}

/// A position after it has been closed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClosedPosition {
    /// The position as it was while open
    pub position: Position,
    /// Exit execution price; `None` for manual flat closes, which emit
    /// no trade
    pub exit_price: Option<Price>,
    /// Why the position closed
    pub reason: CloseReason,
    /// When the position closed, per the driving clock
    pub closed_at: Timestamp,
}

/// An open position plus the entry-side cost the ledger still owes.
#[derive(Debug, Clone)]
struct OpenPosition {
    position: Position,
    entry_commission: Decimal,
}

/// Deterministic bar-level broker simulation.
pub struct SimulatedExecution {
    settings: BacktestSettings,
    clock: Arc<dyn Clock>,
    pending_orders: Vec<Order>,
    open_positions: Vec<OpenPosition>,
    closed_positions: Vec<ClosedPosition>,
    trades: Vec<Trade>,
    balance: Decimal,
    order_counter: u64,
}

impl SimulatedExecution {
    /// Creates a new simulated venue bound to a clock.
    #[must_use]
    pub fn new(settings: BacktestSettings, clock: Arc<dyn Clock>) -> Self {
        let balance = settings.initial_balance;
        Self {
            settings,
            clock,
            pending_orders: Vec::new(),
            open_positions: Vec::new(),
            closed_positions: Vec::new(),
            trades: Vec::new(),
            balance,
            order_counter: 0,
        }
    }

    /// Processes one bar: fills pending orders at its open, then sweeps
    /// SL/TP against its range. Must be called before the engine
    /// dispatches the same bar.
    pub fn process_bar(&mut self, bar: &Bar) {
        self.fill_pending(bar);
        self.sweep_exits(bar);
    }

    /// Returns the orders still waiting for a fill.
    #[must_use]
    pub fn pending_orders(&self) -> &[Order] {
        &self.pending_orders
    }

    /// Returns the closed positions in close order.
    #[must_use]
    pub fn closed_positions(&self) -> &[ClosedPosition] {
        &self.closed_positions
    }

    /// Returns every trade executed so far, in execution order.
    #[must_use]
    pub fn trades(&self) -> &[Trade] {
        &self.trades
    }

    fn next_order_id(&mut self) -> OrderId {
        self.order_counter += 1;
        OrderId::new_unchecked(format!("SIM-{:016X}", self.order_counter))
    }

    fn commission_for(&self, volume: Decimal) -> Decimal {
        self.settings.commission_per_lot * volume
    }

    fn fill_pending(&mut self, bar: &Bar) {
        let now = self.clock.now();
        let mut remaining = Vec::with_capacity(self.pending_orders.len());

        for order in std::mem::take(&mut self.pending_orders) {
            if order.symbol_id != bar.symbol_id {
                remaining.push(order);
                continue;
            }

            // All order types currently fill as market orders at the
            // bar's open; buys pay the spread.
            let fill_price = match order.side {
                OrderSide::Buy => bar.open + self.settings.spread,
                OrderSide::Sell => bar.open,
            };
            let commission = self.commission_for(order.volume.as_decimal());

            let strategy_name = order
                .client_order_id
                .as_deref()
                .and_then(|id| id.rsplit_once('-').map(|(name, _)| name.to_string()));

            self.open_positions.push(OpenPosition {
                position: Position {
                    position_id: PositionId::from(order.order_id.clone()),
                    symbol_id: order.symbol_id,
                    side: order.side,
                    volume: order.volume,
                    entry_price: fill_price,
                    stop_loss: order.stop_loss,
                    take_profit: order.take_profit,
                    entry_bar_timestamp: bar.timestamp,
                    opened_at: now,
                    strategy_name,
                },
                entry_commission: commission,
            });

            self.trades.push(Trade {
                trade_id: TradeId::generate(),
                order_id: order.order_id.clone(),
                symbol_id: order.symbol_id,
                side: order.side,
                volume: order.volume,
                price: fill_price,
                commission: Money::new(commission, self.settings.currency.clone()),
                executed_at: now,
            });

            debug!(
                order_id = %order.order_id,
                side = %order.side,
                price = %fill_price,
                "pending order filled at bar open"
            );
        }

        self.pending_orders = remaining;
    }

    fn sweep_exits(&mut self, bar: &Bar) {
        let now = self.clock.now();
        let spread = self.settings.spread;
        let slippage = self.settings.slippage;
        let mut still_open = Vec::with_capacity(self.open_positions.len());

        for open in std::mem::take(&mut self.open_positions) {
            let position = &open.position;
            if position.symbol_id != bar.symbol_id
                // T+1: exits never trigger on the entry bar, even when
                // the bar's range covers the stop or target.
                || bar.timestamp <= position.entry_bar_timestamp
            {
                still_open.push(open);
                continue;
            }

            // The stop is checked before the target; a bar covering
            // both exits on the stop. Intrabar ordering is not modelled.
            let exit = match position.side {
                OrderSide::Buy => {
                    let bid_low = bar.low - spread;
                    let bid_high = bar.high - spread;
                    if let Some(sl) = position.stop_loss
                        && bid_low <= sl
                    {
                        Some((sl - slippage, CloseReason::StopLoss))
                    } else if let Some(tp) = position.take_profit
                        && bid_high >= tp
                    {
                        Some((tp, CloseReason::TakeProfit))
                    } else {
                        None
                    }
                }
                OrderSide::Sell => {
                    let ask_low = bar.low + spread;
                    let ask_high = bar.high + spread;
                    if let Some(sl) = position.stop_loss
                        && ask_high >= sl
                    {
                        Some((sl + slippage, CloseReason::StopLoss))
                    } else if let Some(tp) = position.take_profit
                        && ask_low <= tp
                    {
                        Some((tp, CloseReason::TakeProfit))
                    } else {
                        None
                    }
                }
            };

            match exit {
                Some((exit_price, reason)) => self.close_with_trade(open, exit_price, reason, now),
                None => still_open.push(open),
            }
        }

        self.open_positions = still_open;
    }

    fn close_with_trade(
        &mut self,
        open: OpenPosition,
        exit_price: Price,
        reason: CloseReason,
        now: Timestamp,
    ) {
        let position = open.position;
        let exit_commission = self.commission_for(position.volume.as_decimal());

        let gross = (exit_price - position.entry_price)
            * position.side.direction()
            * position.volume.as_decimal();
        let net = gross - open.entry_commission - exit_commission;
        self.balance += net;

        debug!(
            position_id = %position.position_id,
            reason = ?reason,
            exit_price = %exit_price,
            net_pnl = %net,
            "position closed"
        );

        self.trades.push(Trade {
            trade_id: TradeId::generate(),
            order_id: position.position_id.as_order_id(),
            symbol_id: position.symbol_id,
            side: position.side.opposite(),
            volume: position.volume,
            price: exit_price,
            commission: Money::new(exit_commission, self.settings.currency.clone()),
            executed_at: now,
        });

        self.closed_positions.push(ClosedPosition {
            position,
            exit_price: Some(exit_price),
            reason,
            closed_at: now,
        });
    }
}

impl OrderExecution for SimulatedExecution {
    fn place_order(&mut self, request: OrderRequest) -> Result<Order, ExecutionError> {
        let order = Order {
            order_id: self.next_order_id(),
            symbol_id: request.symbol_id,
            side: request.side,
            order_type: request.order_type,
            volume: request.volume,
            price: request.price,
            stop_loss: request.stop_loss,
            take_profit: request.take_profit,
            status: OrderStatus::Pending,
            created_at: self.clock.now(),
            client_order_id: request.client_order_id,
        };
        self.pending_orders.push(order.clone());
        Ok(order)
    }

    fn modify_order(
        &mut self,
        order_id: &OrderId,
        stop_loss: Option<Price>,
        take_profit: Option<Price>,
    ) -> Result<Order, ExecutionError> {
        let order = self
            .pending_orders
            .iter_mut()
            .find(|o| &o.order_id == order_id)
            .ok_or_else(|| ExecutionError::UnknownOrder(order_id.clone()))?;

        // Omitted parameters leave the existing levels untouched. Open
        // positions are deliberately not modifiable through this API.
        if let Some(sl) = stop_loss {
            order.stop_loss = Some(sl);
        }
        if let Some(tp) = take_profit {
            order.take_profit = Some(tp);
        }
        Ok(order.clone())
    }

    fn cancel_order(&mut self, order_id: &OrderId) -> Result<(), ExecutionError> {
        self.pending_orders.retain(|o| &o.order_id != order_id);
        Ok(())
    }

    fn close_position(&mut self, position_id: &PositionId) -> Result<(), ExecutionError> {
        let Some(index) = self
            .open_positions
            .iter()
            .position(|o| &o.position.position_id == position_id)
        else {
            return Ok(());
        };
        let open = self.open_positions.remove(index);
        // A flat close is attributed to an out-of-band decision: no
        // synthetic trade, no ledger movement.
        self.closed_positions.push(ClosedPosition {
            position: open.position,
            exit_price: None,
            reason: CloseReason::Manual,
            closed_at: self.clock.now(),
        });
        Ok(())
    }

    fn positions(&self) -> Vec<Position> {
        self.open_positions
            .iter()
            .map(|o| o.position.clone())
            .collect()
    }

    fn account_balance(&self) -> Money {
        Money::new(self.balance, self.settings.currency.clone())
    }
}
