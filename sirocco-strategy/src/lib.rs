//! # Sirocco Strategy
//!
//! Strategy and risk composition for the Sirocco trading engine.
//!
//! This crate provides:
//! - The [`SignalStrategy`] capability set and its evaluation context
//! - Pluggable stop-loss, take-profit and position-sizing policies
//! - Versioned, JSON-parameterised strategy definitions and their
//!   configuration provider contract
//! - An explicit, case-insensitive strategy registry
//! - Built-in strategies (`BuyOnFirstBar`, `SmaCross`)

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_const_for_fn)]
#![allow(clippy::module_name_repetitions)]

mod definition;
mod provider;
mod registry;
mod signal;
mod strategy;

/// Risk policy traits and implementations.
pub mod risk;

/// Built-in signal strategies.
pub mod strategies;

pub use definition::{
    DefinitionError, PolicyDefinition, RiskDefinition, StrategyConfigRow, StrategyDefinition,
};
pub use provider::{InMemoryConfigProvider, ProviderError, StrategyConfigProvider};
pub use registry::{StrategyConstructor, StrategyRegistry};
pub use signal::{Signal, SignalContext, SignalResult};
pub use strategy::{SignalStrategy, StrategyError};
