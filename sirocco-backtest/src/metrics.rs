//! Metrics reduction over executed trades.
//!
//! Trades are paired into positions by `order_id` (the entry order's
//! id, which the simulated broker reuses as the position id on the
//! closing trade). A group with at least two trades is one closed
//! position: the earlier execution is the entry, the later the exit.

use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use sirocco_core::data::{OrderSide, Trade};
use sirocco_core::types::{OrderId, Timestamp};

/// Aggregate trading metrics for one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricsSummary {
    /// Starting balance
    pub initial_balance: Decimal,
    /// `initial_balance` plus the sum of net per-position P&L
    pub final_balance: Decimal,
    /// Closed positions counted
    pub total_trades: u64,
    /// Positions with positive net P&L
    pub winning_trades: u64,
    /// Positions with zero or negative net P&L
    pub losing_trades: u64,
    /// Sum of positive net P&L
    pub gross_profit: Decimal,
    /// Sum of |negative net P&L|
    pub gross_loss: Decimal,
    /// `gross_profit / gross_loss`, 0 when there are no losses
    pub profit_factor: Decimal,
    /// `winning / total`, 0 when nothing closed
    pub win_rate: Decimal,
    /// Peak-to-trough equity decline as a percentage of the peak
    pub max_drawdown_percent: Decimal,
    /// Balance after each closed position, in close order
    pub equity_curve: Vec<(Timestamp, Decimal)>,
}

/// One paired entry/exit, net of both commissions.
struct PositionPnl {
    closed_at: Timestamp,
    net: Decimal,
}

/// Reduces executed trades into a [`MetricsSummary`].
///
/// Unpaired trades (entries whose position is still open, or flat
/// closes that emitted no trade) are ignored.
#[must_use]
pub fn reduce(trades: &[Trade], initial_balance: Decimal) -> MetricsSummary {
    let mut groups: HashMap<&OrderId, Vec<&Trade>> = HashMap::new();
    for trade in trades {
        groups.entry(&trade.order_id).or_default().push(trade);
    }

    let mut positions: Vec<PositionPnl> = Vec::new();
    for group in groups.values() {
        if group.len() < 2 {
            continue;
        }
        let mut ordered: Vec<&Trade> = group.clone();
        ordered.sort_by_key(|t| t.executed_at);
        let entry = ordered[0];
        let exit = ordered[ordered.len() - 1];

        let gross = match entry.side {
            OrderSide::Buy => (exit.price - entry.price) * entry.volume.as_decimal(),
            OrderSide::Sell => (entry.price - exit.price) * entry.volume.as_decimal(),
        };
        let net = gross - entry.commission.amount() - exit.commission.amount();
        positions.push(PositionPnl {
            closed_at: exit.executed_at,
            net,
        });
    }

    positions.sort_by_key(|p| p.closed_at);

    let mut gross_profit = Decimal::ZERO;
    let mut gross_loss = Decimal::ZERO;
    let mut winning = 0u64;
    let mut losing = 0u64;
    let mut equity = initial_balance;
    let mut peak = initial_balance;
    let mut max_drawdown = Decimal::ZERO;
    let mut equity_curve = Vec::with_capacity(positions.len());

    for position in &positions {
        if position.net > Decimal::ZERO {
            winning += 1;
            gross_profit += position.net;
        } else {
            losing += 1;
            gross_loss += -position.net;
        }

        equity += position.net;
        equity_curve.push((position.closed_at, equity));

        if equity > peak {
            peak = equity;
        }
        if peak > Decimal::ZERO {
            let drawdown = (peak - equity) / peak;
            if drawdown > max_drawdown {
                max_drawdown = drawdown;
            }
        }
    }

    let total = winning + losing;
    let profit_factor = if gross_loss > Decimal::ZERO {
        gross_profit / gross_loss
    } else {
        Decimal::ZERO
    };
    let win_rate = if total > 0 {
        Decimal::from(winning) / Decimal::from(total)
    } else {
        Decimal::ZERO
    };

    MetricsSummary {
        initial_balance,
        final_balance: equity,
        total_trades: total,
        winning_trades: winning,
        losing_trades: losing,
        gross_profit,
        gross_loss,
        profit_factor,
        win_rate,
        max_drawdown_percent: max_drawdown * Decimal::ONE_HUNDRED,
        equity_curve,
    }
}
