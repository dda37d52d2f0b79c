//! Time abstraction shared by live and simulated runs.

use std::sync::atomic::{AtomicI64, Ordering};

use crate::types::Timestamp;

/// Error raised by the simulated clock.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClockError {
    /// Attempt to advance the clock to an earlier instant
    #[error("clock cannot move backwards: now={now}, requested={requested}")]
    BackwardsTime {
        /// Current clock instant (millis)
        now: i64,
        /// Requested instant (millis)
        requested: i64,
    },
}

/// Monotonically non-decreasing time source.
///
/// In live trading this is the system clock; in backtests the
/// orchestrator advances a [`SimulatedClock`] to each bar's close.
pub trait Clock: Send + Sync {
    /// Returns the current instant.
    fn now(&self) -> Timestamp;

    /// Returns the current instant as whole Unix seconds.
    fn unix_seconds(&self) -> i64 {
        self.now().as_secs()
    }
}

/// System clock implementation for live trading.
#[derive(Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Timestamp::now()
    }
}

/// Deterministic clock for backtests.
///
/// Only the orchestrator advances it; the executor and feed merely
/// observe the current instant through the [`Clock`] trait.
#[derive(Debug)]
pub struct SimulatedClock {
    current_millis: AtomicI64,
}

impl SimulatedClock {
    /// Creates a new simulated clock at the given initial instant.
    #[must_use]
    pub fn new(initial: Timestamp) -> Self {
        Self {
            current_millis: AtomicI64::new(initial.as_millis()),
        }
    }

    /// Creates a new simulated clock at the Unix epoch.
    #[must_use]
    pub fn at_epoch() -> Self {
        Self::new(Timestamp::ZERO)
    }

    /// Advances the clock to a later (or equal) instant.
    ///
    /// # Errors
    ///
    /// Returns `ClockError::BackwardsTime` if `to` is earlier than the
    /// current instant.
    pub fn advance_to(&self, to: Timestamp) -> Result<(), ClockError> {
        let now = self.current_millis.load(Ordering::SeqCst);
        if to.as_millis() < now {
            return Err(ClockError::BackwardsTime {
                now,
                requested: to.as_millis(),
            });
        }
        self.current_millis.store(to.as_millis(), Ordering::SeqCst);
        Ok(())
    }

    /// Rewinds the clock unconditionally. Test-only escape hatch that
    /// bypasses the backwards-time check.
    pub fn reset(&self, to: Timestamp) {
        self.current_millis.store(to.as_millis(), Ordering::SeqCst);
    }
}

impl Clock for SimulatedClock {
    fn now(&self) -> Timestamp {
        Timestamp::new_unchecked(self.current_millis.load(Ordering::SeqCst))
    }
}
