//! Backtest orchestrator.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;
use tracing::{info, warn};

use sirocco_core::traits::{Clock, MarketDataFeed, NullEventSink, SimulatedClock};
use sirocco_core::types::Timestamp;
use sirocco_engine::TradingEngine;
use sirocco_strategy::{StrategyConfigProvider, StrategyRegistry};

use crate::error::BacktestError;
use crate::execution::SimulatedExecution;
use crate::feed::ReplayFeed;
use crate::message::{BacktestJob, BacktestResult};
use crate::metrics;
use crate::settings::BacktestSettings;

/// Cooperative cancellation flag, checked between bars.
///
/// Clones share the underlying flag; the engine itself ignores
/// cancellation, so an in-flight bar always completes.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    /// Creates a fresh, uncancelled token.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// Returns true once cancellation has been requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// Drives one backtest job to completion.
///
/// Every run constructs a fresh clock, simulated venue, replay feed and
/// engine, so runs are isolated and an optimizer sweep can execute many
/// runners in parallel tasks.
pub struct BacktestRunner {
    catalog: Arc<dyn MarketDataFeed>,
    provider: Arc<dyn StrategyConfigProvider>,
    registry: StrategyRegistry,
    settings: BacktestSettings,
}

impl BacktestRunner {
    /// Creates a runner over a candle catalog and a definition store.
    #[must_use]
    pub fn new(
        catalog: Arc<dyn MarketDataFeed>,
        provider: Arc<dyn StrategyConfigProvider>,
        registry: StrategyRegistry,
        settings: BacktestSettings,
    ) -> Self {
        Self {
            catalog,
            provider,
            registry,
            settings,
        }
    }

    /// Returns the broker settings this runner simulates with.
    #[must_use]
    pub fn settings(&self) -> &BacktestSettings {
        &self.settings
    }

    /// Runs a job, converting every internal failure into an
    /// unsuccessful result. This is the surface direct callers use.
    pub async fn run(&self, job: &BacktestJob, cancel: &CancelToken) -> BacktestResult {
        match self.run_checked(job, cancel).await {
            Ok(result) => result,
            Err(error) => {
                warn!(job_id = %job.job_id, error = %error, "backtest failed");
                BacktestResult::failure(&job.job_id, error.to_string(), self.settings.initial_balance)
            }
        }
    }

    /// Runs a job, surfacing internal failures as errors. The bus
    /// worker uses this to decide between ack and nack.
    pub async fn run_checked(
        &self,
        job: &BacktestJob,
        cancel: &CancelToken,
    ) -> Result<BacktestResult, BacktestError> {
        info!(
            job_id = %job.job_id,
            strategy = %job.strategy_name,
            symbols = job.symbols.len(),
            "backtest started"
        );

        // Resolve the definition and construct the strategy. Unknown
        // names are unsuccessful results, not faults.
        let Some(mut definition) = self.provider.load_by_name(&job.strategy_name).await? else {
            return Ok(self.unknown_strategy(job));
        };
        if let Some(version) = job.strategy_version
            && version != definition.version
        {
            warn!(
                job_id = %job.job_id,
                requested = version,
                served = definition.version,
                "definition store serves the latest version"
            );
        }
        definition
            .parameters
            .extend(job.parameters.iter().map(|(k, v)| (k.clone(), v.clone())));

        let Some(strategy) = self.registry.create_from_definition(&definition)? else {
            return Ok(self.unknown_strategy(job));
        };

        // Fresh collaborators per run.
        let clock = Arc::new(SimulatedClock::at_epoch());
        let execution = Arc::new(Mutex::new(SimulatedExecution::new(
            self.settings.clone(),
            Arc::clone(&clock) as Arc<dyn Clock>,
        )));
        let mut engine = TradingEngine::new(
            Arc::clone(&execution),
            Arc::clone(&clock) as Arc<dyn Clock>,
            Arc::new(NullEventSink),
        );
        engine.register_strategy(strategy);

        // Load the replay window from the external catalog.
        let from = Timestamp::from_datetime(job.start_date);
        let to = Timestamp::from_datetime(job.end_date);
        let mut replay = ReplayFeed::new();
        for &symbol_id in &job.symbols {
            let bars = self
                .catalog
                .get_history(symbol_id, definition.main_timeframe, from, to)
                .await?;
            replay.load_series(symbol_id, definition.main_timeframe, bars)?;
        }
        let merged = replay.merged_bars();
        info!(job_id = %job.job_id, bars = merged.len(), "replay window loaded");

        for bar in &merged {
            if cancel.is_cancelled() {
                info!(job_id = %job.job_id, "backtest cancelled");
                return Ok(BacktestResult::failure(
                    &job.job_id,
                    "Backtest cancelled",
                    self.settings.initial_balance,
                ));
            }

            clock.advance_to(bar.timestamp)?;
            execution.lock().process_bar(bar);
            engine.on_bar_closed(bar);
        }

        let venue = execution.lock();
        let summary = metrics::reduce(venue.trades(), self.settings.initial_balance);
        info!(
            job_id = %job.job_id,
            total_trades = summary.total_trades,
            final_balance = %summary.final_balance,
            "backtest completed"
        );
        Ok(BacktestResult::success(&job.job_id, &summary))
    }

    fn unknown_strategy(&self, job: &BacktestJob) -> BacktestResult {
        BacktestResult::failure(
            &job.job_id,
            format!("Unknown strategy: {}", job.strategy_name),
            self.settings.initial_balance,
        )
    }
}
