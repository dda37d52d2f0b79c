//! Explicit strategy registry.
//!
//! A process-init mapping from strategy name to constructor. Lookups
//! are case-insensitive; an unknown name is `None`, never an error -
//! callers like the backtest orchestrator turn it into an unsuccessful
//! result rather than a fault.

use std::collections::HashMap;

use tracing::debug;

use crate::definition::StrategyDefinition;
use crate::strategies::{BuyOnFirstBar, SmaCross};
use crate::strategy::{SignalStrategy, StrategyError};

/// Constructor for a named strategy type.
pub type StrategyConstructor =
    fn(&StrategyDefinition) -> Result<Box<dyn SignalStrategy>, StrategyError>;

/// Case-insensitive registry of strategy constructors.
#[derive(Default)]
pub struct StrategyRegistry {
    constructors: HashMap<String, StrategyConstructor>,
}

impl StrategyRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry with the built-in strategies registered.
    #[must_use]
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register("BuyOnFirstBar", |def| {
            Ok(Box::new(BuyOnFirstBar::from_definition(def)))
        });
        registry.register("SmaCross", |def| {
            Ok(Box::new(SmaCross::from_definition(def)?))
        });
        registry
    }

    /// Registers a constructor under a name. A later registration under
    /// the same name replaces the earlier one.
    pub fn register(&mut self, name: &str, constructor: StrategyConstructor) {
        self.constructors
            .insert(name.to_ascii_lowercase(), constructor);
    }

    /// Returns the registered names, sorted.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.constructors.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Returns true if a constructor is registered under the name.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.constructors.contains_key(&name.to_ascii_lowercase())
    }

    /// Creates a strategy by explicit name.
    ///
    /// Returns `Ok(None)` when the name is unknown. A registered
    /// constructor that rejects the definition's parameters surfaces
    /// as `Err`.
    pub fn create_by_name(
        &self,
        name: &str,
        definition: &StrategyDefinition,
    ) -> Result<Option<Box<dyn SignalStrategy>>, StrategyError> {
        let Some(constructor) = self.constructors.get(&name.to_ascii_lowercase()) else {
            debug!(strategy = %name, "strategy name not in registry");
            return Ok(None);
        };
        constructor(definition).map(Some)
    }

    /// Creates a strategy using the definition's own name as the key.
    pub fn create_from_definition(
        &self,
        definition: &StrategyDefinition,
    ) -> Result<Option<Box<dyn SignalStrategy>>, StrategyError> {
        self.create_by_name(&definition.name, definition)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definition::{PolicyDefinition, RiskDefinition};
    use sirocco_core::types::Timeframe;
    use serde_json::json;
    use std::collections::BTreeMap;

    fn definition(name: &str) -> StrategyDefinition {
        StrategyDefinition {
            name: name.to_string(),
            version: 1,
            main_timeframe: Timeframe::M5,
            required_timeframes: BTreeMap::from([(Timeframe::M5, 1)]),
            parameters: serde_json::Map::new(),
            risk: RiskDefinition {
                stop_loss: PolicyDefinition {
                    type_tag: "FixedPips".to_string(),
                    parameters: json!({"pips": 30.0}).as_object().cloned().unwrap(),
                },
                take_profit: PolicyDefinition {
                    type_tag: "FixedPips".to_string(),
                    parameters: json!({"pips": 60.0}).as_object().cloned().unwrap(),
                },
                position_sizing: PolicyDefinition {
                    type_tag: "FixedLot".to_string(),
                    parameters: json!({"lots": 0.01}).as_object().cloned().unwrap(),
                },
            },
            symbols: vec![],
            enabled: true,
        }
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        let registry = StrategyRegistry::with_builtins();
        let def = definition("buyonfirstbar");

        assert!(registry.contains("BUYONFIRSTBAR"));
        let strategy = registry.create_by_name("bUyOnFiRsTbAr", &def).unwrap();
        assert!(strategy.is_some());
    }

    #[test]
    fn test_unknown_name_is_none_not_error() {
        let registry = StrategyRegistry::with_builtins();
        let def = definition("Mystery");

        let result = registry.create_from_definition(&def).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_builtins_registered() {
        let registry = StrategyRegistry::with_builtins();
        assert_eq!(registry.names(), vec!["buyonfirstbar", "smacross"]);
    }

    #[test]
    fn test_create_from_definition_uses_name() {
        let registry = StrategyRegistry::with_builtins();
        let strategy = registry
            .create_from_definition(&definition("BuyOnFirstBar"))
            .unwrap()
            .unwrap();
        assert_eq!(strategy.name(), "BuyOnFirstBar");
        assert_eq!(strategy.main_timeframe(), Timeframe::M5);
    }
}
