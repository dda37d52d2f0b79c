//! # Sirocco Engine
//!
//! The bar-driven trading engine shared by live, paper and replay
//! modes. Holds a rolling per-(symbol, timeframe) bar cache, dispatches
//! each closing bar to the strategies registered for that timeframe,
//! and translates their signals into order requests against whichever
//! execution venue it was wired with.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_const_for_fn)]
#![allow(clippy::module_name_repetitions)]

mod cache;
mod engine;

pub use cache::{BarCache, MAX_BARS_PER_SERIES};
pub use engine::TradingEngine;
