//! Bus-facing backtest worker.
//!
//! Jobs arrive at-least-once from a message bus. The worker runs each
//! delivery through the orchestrator, publishes the outcome, and
//! acknowledges the delivery - negatively when processing failed, so
//! the bus redelivers.

use async_trait::async_trait;
use parking_lot::Mutex;
use tracing::{error, info};

use crate::message::{BacktestJob, BacktestResult};
use crate::runner::{BacktestRunner, CancelToken};

/// Error raised by the result bus.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BusError {
    /// Publishing or acknowledging failed
    #[error("bus error: {0}")]
    Transport(String),
}

/// One job delivery from the bus, with its redelivery handle.
#[derive(Debug, Clone)]
pub struct JobDelivery {
    /// The job payload
    pub job: BacktestJob,
    /// Bus-assigned delivery tag for ack/nack
    pub delivery_tag: u64,
}

/// Outbound side of the job bus.
#[async_trait]
pub trait ResultBus: Send + Sync {
    /// Publishes a backtest result.
    async fn publish_result(&self, result: &BacktestResult) -> Result<(), BusError>;

    /// Acknowledges a delivery: the job is done, do not redeliver.
    async fn ack(&self, delivery_tag: u64) -> Result<(), BusError>;

    /// Negatively acknowledges a delivery, requesting redelivery.
    async fn nack(&self, delivery_tag: u64) -> Result<(), BusError>;
}

/// Runs deliveries through a [`BacktestRunner`] and reports outcomes.
pub struct BacktestWorker {
    runner: BacktestRunner,
    bus: std::sync::Arc<dyn ResultBus>,
}

impl BacktestWorker {
    /// Creates a worker over a runner and a result bus.
    #[must_use]
    pub fn new(runner: BacktestRunner, bus: std::sync::Arc<dyn ResultBus>) -> Self {
        Self { runner, bus }
    }

    /// Processes one delivery to completion.
    ///
    /// A completed run (successful or legitimately unsuccessful, e.g.
    /// unknown strategy) is published and acked. An internal processing
    /// failure publishes an error result and nacks for redelivery.
    /// Never panics the host.
    pub async fn process(&self, delivery: JobDelivery, cancel: &CancelToken) {
        let job_id = delivery.job.job_id.clone();

        let (result, processing_failed) =
            match self.runner.run_checked(&delivery.job, cancel).await {
                Ok(result) => (result, false),
                Err(e) => {
                    error!(job_id = %job_id, error = %e, "backtest job processing failed");
                    (
                        BacktestResult::failure(
                            &job_id,
                            e.to_string(),
                            self.runner.settings().initial_balance,
                        ),
                        true,
                    )
                }
            };

        if let Err(e) = self.bus.publish_result(&result).await {
            error!(job_id = %job_id, error = %e, "failed to publish backtest result");
            if let Err(e) = self.bus.nack(delivery.delivery_tag).await {
                error!(job_id = %job_id, error = %e, "nack failed");
            }
            return;
        }

        let outcome = if processing_failed {
            self.bus.nack(delivery.delivery_tag).await
        } else {
            self.bus.ack(delivery.delivery_tag).await
        };
        if let Err(e) = outcome {
            error!(job_id = %job_id, error = %e, "delivery acknowledgement failed");
        } else {
            info!(job_id = %job_id, success = result.success, "backtest job finished");
        }
    }
}

/// In-memory bus double recording publications and acknowledgements.
#[derive(Debug, Default)]
pub struct InMemoryResultBus {
    published: Mutex<Vec<BacktestResult>>,
    acked: Mutex<Vec<u64>>,
    nacked: Mutex<Vec<u64>>,
}

impl InMemoryResultBus {
    /// Creates an empty recording bus.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the published results so far.
    #[must_use]
    pub fn published(&self) -> Vec<BacktestResult> {
        self.published.lock().clone()
    }

    /// Returns the acked delivery tags so far.
    #[must_use]
    pub fn acked(&self) -> Vec<u64> {
        self.acked.lock().clone()
    }

    /// Returns the nacked delivery tags so far.
    #[must_use]
    pub fn nacked(&self) -> Vec<u64> {
        self.nacked.lock().clone()
    }
}

#[async_trait]
impl ResultBus for InMemoryResultBus {
    async fn publish_result(&self, result: &BacktestResult) -> Result<(), BusError> {
        self.published.lock().push(result.clone());
        Ok(())
    }

    async fn ack(&self, delivery_tag: u64) -> Result<(), BusError> {
        self.acked.lock().push(delivery_tag);
        Ok(())
    }

    async fn nack(&self, delivery_tag: u64) -> Result<(), BusError> {
        self.nacked.lock().push(delivery_tag);
        Ok(())
    }
}
