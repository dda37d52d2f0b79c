//! Versioned, JSON-parameterised strategy definitions.
//!
//! Definitions live in an external store as rows whose `config` column
//! is nested JSON. [`StrategyConfigRow`] is that wire shape;
//! [`StrategyDefinition`] is the decoded, validated form the registry
//! consumes.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use sirocco_core::types::{SymbolId, Timeframe};

/// Error raised while decoding a definition row.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DefinitionError {
    /// A required config section is missing
    #[error("definition '{name}' is missing config section '{section}'")]
    MissingSection {
        /// Definition name
        name: String,
        /// Missing section path
        section: &'static str,
    },

    /// A timeframe code could not be parsed
    #[error("definition '{name}': unknown timeframe code '{code}'")]
    InvalidTimeframe {
        /// Definition name
        name: String,
        /// Offending code
        code: String,
    },

    /// A symbol id entry is not numeric
    #[error("definition '{name}': invalid symbol id '{value}'")]
    InvalidSymbolId {
        /// Definition name
        name: String,
        /// Offending entry
        value: String,
    },

    /// A window count is not a positive integer
    #[error("definition '{name}': invalid bar count for {timeframe}")]
    InvalidBarCount {
        /// Definition name
        name: String,
        /// Offending timeframe
        timeframe: Timeframe,
    },
}

/// One risk-policy block: a type tag plus free-form parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct PolicyDefinition {
    /// Policy type tag, matched case-insensitively by the builders
    #[serde(rename = "Type")]
    pub type_tag: String,
    /// Policy parameters
    #[serde(rename = "Parameters", default)]
    pub parameters: Map<String, Value>,
}

/// The three risk-policy blocks of a definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct RiskDefinition {
    /// Stop-loss policy block
    #[serde(rename = "StopLoss")]
    pub stop_loss: PolicyDefinition,
    /// Take-profit policy block
    #[serde(rename = "TakeProfit")]
    pub take_profit: PolicyDefinition,
    /// Position-sizing policy block
    #[serde(rename = "PositionSizing")]
    pub position_sizing: PolicyDefinition,
}

/// A decoded, validated strategy definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrategyDefinition {
    /// Strategy name; doubles as the registry lookup key
    pub name: String,
    /// Definition version; the provider serves the latest per name
    pub version: u32,
    /// Timeframe whose bar closes trigger evaluation
    pub main_timeframe: Timeframe,
    /// Required history windows: timeframe -> minimum bar count
    pub required_timeframes: BTreeMap<Timeframe, usize>,
    /// Free-form strategy parameters
    #[serde(default)]
    pub parameters: Map<String, Value>,
    /// Risk policy blocks
    #[serde(default)]
    pub risk: RiskDefinition,
    /// Instruments this definition trades
    #[serde(default)]
    pub symbols: Vec<SymbolId>,
    /// Whether the definition is active
    pub enabled: bool,
}

impl StrategyDefinition {
    /// Reads a numeric parameter as `f64`.
    #[must_use]
    pub fn param_f64(&self, key: &str) -> Option<f64> {
        self.parameters.get(key).and_then(Value::as_f64)
    }

    /// Reads an integer parameter as `usize`.
    #[must_use]
    pub fn param_usize(&self, key: &str) -> Option<usize> {
        self.parameters
            .get(key)
            .and_then(Value::as_u64)
            .and_then(|v| usize::try_from(v).ok())
    }
}

/// The persisted row shape served by external definition stores.
///
/// `config` is nested JSON:
///
/// ```json
/// {
///   "Timeframes": { "M5": 50, "H1": 24 },
///   "Parameters": { "fast": 10, "slow": 30 },
///   "Risk": {
///     "StopLoss":       { "Type": "FixedPips",  "Parameters": { "pips": 30.0 } },
///     "TakeProfit":     { "Type": "RiskReward", "Parameters": { "ratio": 2.0 } },
///     "PositionSizing": { "Type": "RiskPercent","Parameters": { "percent": 1.0 } }
///   }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrategyConfigRow {
    /// Row id
    pub id: i64,
    /// Strategy name
    pub name: String,
    /// Definition version
    pub version: u32,
    /// Whether the definition is active
    pub enabled: bool,
    /// Main timeframe code ("M5", "H1", …)
    pub main_timeframe: String,
    /// Nested configuration JSON
    pub config: Value,
    /// Traded instruments as numeric-id strings
    #[serde(default)]
    pub symbol_list: Vec<String>,
    /// Row creation time
    pub created_at: DateTime<Utc>,
}

impl StrategyConfigRow {
    /// Decodes this row into a validated [`StrategyDefinition`].
    ///
    /// # Errors
    ///
    /// Returns a [`DefinitionError`] if the timeframe codes, bar counts
    /// or symbol ids are malformed. A missing `Risk` section is an
    /// error; missing `Parameters` defaults to empty.
    pub fn into_definition(self) -> Result<StrategyDefinition, DefinitionError> {
        let main_timeframe: Timeframe =
            self.main_timeframe
                .parse()
                .map_err(|_| DefinitionError::InvalidTimeframe {
                    name: self.name.clone(),
                    code: self.main_timeframe.clone(),
                })?;

        let mut required_timeframes = BTreeMap::new();
        if let Some(timeframes) = self.config.get("Timeframes").and_then(Value::as_object) {
            for (code, count) in timeframes {
                let timeframe: Timeframe =
                    code.parse().map_err(|_| DefinitionError::InvalidTimeframe {
                        name: self.name.clone(),
                        code: code.clone(),
                    })?;
                let count = count
                    .as_u64()
                    .and_then(|v| usize::try_from(v).ok())
                    .filter(|v| *v > 0)
                    .ok_or(DefinitionError::InvalidBarCount {
                        name: self.name.clone(),
                        timeframe,
                    })?;
                required_timeframes.insert(timeframe, count);
            }
        }
        // The main timeframe always needs at least one bar of history.
        required_timeframes.entry(main_timeframe).or_insert(1);

        let parameters = self
            .config
            .get("Parameters")
            .and_then(Value::as_object)
            .cloned()
            .unwrap_or_default();

        let risk_value = self
            .config
            .get("Risk")
            .ok_or(DefinitionError::MissingSection {
                name: self.name.clone(),
                section: "Risk",
            })?;
        let risk: RiskDefinition = serde_json::from_value(risk_value.clone()).map_err(|_| {
            DefinitionError::MissingSection {
                name: self.name.clone(),
                section: "Risk.{StopLoss,TakeProfit,PositionSizing}",
            }
        })?;

        let mut symbols = Vec::with_capacity(self.symbol_list.len());
        for entry in &self.symbol_list {
            let id: SymbolId = entry
                .parse()
                .map_err(|_| DefinitionError::InvalidSymbolId {
                    name: self.name.clone(),
                    value: entry.clone(),
                })?;
            symbols.push(id);
        }

        Ok(StrategyDefinition {
            name: self.name,
            version: self.version,
            main_timeframe,
            required_timeframes,
            parameters,
            risk,
            symbols,
            enabled: self.enabled,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(name: &str, version: u32) -> StrategyConfigRow {
        StrategyConfigRow {
            id: 1,
            name: name.to_string(),
            version,
            enabled: true,
            main_timeframe: "M5".to_string(),
            config: json!({
                "Timeframes": { "M5": 50, "H1": 24 },
                "Parameters": { "fast": 10, "slow": 30 },
                "Risk": {
                    "StopLoss": { "Type": "FixedPips", "Parameters": { "pips": 30.0 } },
                    "TakeProfit": { "Type": "RiskReward", "Parameters": { "ratio": 2.0 } },
                    "PositionSizing": { "Type": "RiskPercent", "Parameters": { "percent": 1.0 } }
                }
            }),
            symbol_list: vec!["1".to_string(), "2".to_string()],
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_row_decodes_full_definition() {
        let def = row("MR_M5", 3).into_definition().unwrap();

        assert_eq!(def.name, "MR_M5");
        assert_eq!(def.version, 3);
        assert_eq!(def.main_timeframe, Timeframe::M5);
        assert_eq!(def.required_timeframes[&Timeframe::M5], 50);
        assert_eq!(def.required_timeframes[&Timeframe::H1], 24);
        assert_eq!(def.param_usize("fast"), Some(10));
        assert_eq!(def.risk.stop_loss.type_tag, "FixedPips");
        assert_eq!(def.symbols, vec![SymbolId::new(1), SymbolId::new(2)]);
        assert!(def.enabled);
    }

    #[test]
    fn test_row_defaults_main_timeframe_window() {
        let mut r = row("Bare", 1);
        r.config = json!({
            "Risk": {
                "StopLoss": { "Type": "FixedPips", "Parameters": { "pips": 10.0 } },
                "TakeProfit": { "Type": "FixedPips", "Parameters": { "pips": 20.0 } },
                "PositionSizing": { "Type": "FixedLot", "Parameters": { "lots": 0.01 } }
            }
        });
        let def = r.into_definition().unwrap();
        assert_eq!(def.required_timeframes[&Timeframe::M5], 1);
        assert!(def.parameters.is_empty());
    }

    #[test]
    fn test_row_rejects_unknown_timeframe() {
        let mut r = row("Bad", 1);
        r.main_timeframe = "M7".to_string();
        let result = r.into_definition();
        assert!(matches!(
            result,
            Err(DefinitionError::InvalidTimeframe { .. })
        ));
    }

    #[test]
    fn test_row_rejects_zero_bar_count() {
        let mut r = row("Bad", 1);
        r.config["Timeframes"]["M5"] = json!(0);
        let result = r.into_definition();
        assert!(matches!(result, Err(DefinitionError::InvalidBarCount { .. })));
    }

    #[test]
    fn test_row_rejects_missing_risk() {
        let mut r = row("Bad", 1);
        r.config = json!({ "Timeframes": { "M5": 10 } });
        let result = r.into_definition();
        assert!(matches!(result, Err(DefinitionError::MissingSection { .. })));
    }

    #[test]
    fn test_row_rejects_non_numeric_symbol() {
        let mut r = row("Bad", 1);
        r.symbol_list = vec!["EURUSD".to_string()];
        let result = r.into_definition();
        assert!(matches!(result, Err(DefinitionError::InvalidSymbolId { .. })));
    }

    #[test]
    fn test_definition_serde_roundtrip() {
        let def = row("MR_M5", 2).into_definition().unwrap();
        let json = serde_json::to_string(&def).unwrap();
        let parsed: StrategyDefinition = serde_json::from_str(&json).unwrap();
        assert_eq!(def, parsed);
    }
}
