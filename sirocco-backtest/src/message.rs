//! Backtest job and result messages.
//!
//! These are the bus-facing shapes: delivery is at-least-once, so both
//! types carry the correlation `job_id` and are serde round-trippable.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use sirocco_core::types::SymbolId;

use crate::metrics::MetricsSummary;

/// A backtest job as consumed from the message bus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BacktestJob {
    /// Correlation id
    pub job_id: String,
    /// Strategy name to resolve against the definition store
    pub strategy_name: String,
    /// Specific definition version, or `None` for the latest
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strategy_version: Option<u32>,
    /// Instruments to replay
    pub symbols: Vec<SymbolId>,
    /// Replay range start (inclusive)
    pub start_date: DateTime<Utc>,
    /// Replay range end (inclusive)
    pub end_date: DateTime<Utc>,
    /// Parameter overrides merged over the definition's parameters
    #[serde(default)]
    pub parameters: Map<String, Value>,
    /// When the job was requested
    pub requested_at: DateTime<Utc>,
}

/// A backtest outcome as published to the message bus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BacktestResult {
    /// Correlation id of the job
    pub job_id: String,
    /// Whether the run completed
    pub success: bool,
    /// Failure description when `success` is false
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Starting balance
    pub initial_balance: Decimal,
    /// Balance after all closed positions
    pub final_balance: Decimal,
    /// Closed positions counted
    pub total_trades: u64,
    /// Positions with positive net P&L
    pub winning_trades: u64,
    /// Positions with zero or negative net P&L
    pub losing_trades: u64,
    /// Gross profit over gross loss; 0 when there are no losses
    pub profit_factor: Decimal,
    /// Peak-to-trough equity decline, percent of the peak
    pub max_drawdown_percent: Decimal,
    /// Winning positions over total; 0 when no positions closed
    pub win_rate: Decimal,
    /// Wall-clock UTC at metrics reduction
    pub completed_at: DateTime<Utc>,
}

impl BacktestResult {
    /// Builds a successful result from a metrics summary.
    #[must_use]
    pub fn success(job_id: impl Into<String>, summary: &MetricsSummary) -> Self {
        Self {
            job_id: job_id.into(),
            success: true,
            error: None,
            initial_balance: summary.initial_balance,
            final_balance: summary.final_balance,
            total_trades: summary.total_trades,
            winning_trades: summary.winning_trades,
            losing_trades: summary.losing_trades,
            profit_factor: summary.profit_factor,
            max_drawdown_percent: summary.max_drawdown_percent,
            win_rate: summary.win_rate,
            completed_at: Utc::now(),
        }
    }

    /// Builds an unsuccessful result with zeroed metrics.
    #[must_use]
    pub fn failure(
        job_id: impl Into<String>,
        error: impl Into<String>,
        initial_balance: Decimal,
    ) -> Self {
        Self {
            job_id: job_id.into(),
            success: false,
            error: Some(error.into()),
            initial_balance,
            final_balance: initial_balance,
            total_trades: 0,
            winning_trades: 0,
            losing_trades: 0,
            profit_factor: Decimal::ZERO,
            max_drawdown_percent: Decimal::ZERO,
            win_rate: Decimal::ZERO,
            completed_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_job_serde_roundtrip() {
        let job = BacktestJob {
            job_id: "job-1".to_string(),
            strategy_name: "SmaCross".to_string(),
            strategy_version: Some(3),
            symbols: vec![SymbolId::new(1)],
            start_date: Utc::now(),
            end_date: Utc::now(),
            parameters: serde_json::json!({"fast": 5}).as_object().cloned().unwrap(),
            requested_at: Utc::now(),
        };
        let json = serde_json::to_string(&job).unwrap();
        let parsed: BacktestJob = serde_json::from_str(&json).unwrap();
        assert_eq!(job, parsed);
    }

    #[test]
    fn test_failure_zeroes_metrics() {
        let result = BacktestResult::failure("job-2", "Unknown strategy: Mystery", dec!(10000));
        assert!(!result.success);
        assert_eq!(result.error.as_deref(), Some("Unknown strategy: Mystery"));
        assert_eq!(result.final_balance, dec!(10000));
        assert_eq!(result.total_trades, 0);
        assert_eq!(result.profit_factor, dec!(0));
    }
}
