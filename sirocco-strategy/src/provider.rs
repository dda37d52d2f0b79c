//! Strategy-configuration provider contract.

use async_trait::async_trait;
use std::collections::HashMap;

use crate::definition::StrategyDefinition;

/// Error raised by a definition store.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProviderError {
    /// The backing store failed
    #[error("definition store error: {0}")]
    Backend(String),
}

/// Serves strategy definitions from an external store.
///
/// When multiple versions share a name, the latest version wins; both
/// methods only ever surface enabled definitions.
#[async_trait]
pub trait StrategyConfigProvider: Send + Sync {
    /// Loads all enabled definitions, one per name (latest version).
    async fn load_all(&self) -> Result<Vec<StrategyDefinition>, ProviderError>;

    /// Loads the latest enabled definition with the given name, or
    /// `None` if the name is unknown.
    async fn load_by_name(&self, name: &str)
    -> Result<Option<StrategyDefinition>, ProviderError>;
}

/// In-memory provider used by tests and the CLI.
#[derive(Debug, Default)]
pub struct InMemoryConfigProvider {
    definitions: Vec<StrategyDefinition>,
}

impl InMemoryConfigProvider {
    /// Creates a provider over the given definitions.
    #[must_use]
    pub fn new(definitions: Vec<StrategyDefinition>) -> Self {
        Self { definitions }
    }

    fn latest_enabled(&self) -> HashMap<&str, &StrategyDefinition> {
        let mut latest: HashMap<&str, &StrategyDefinition> = HashMap::new();
        for def in self.definitions.iter().filter(|d| d.enabled) {
            latest
                .entry(def.name.as_str())
                .and_modify(|current| {
                    if def.version > current.version {
                        *current = def;
                    }
                })
                .or_insert(def);
        }
        latest
    }
}

#[async_trait]
impl StrategyConfigProvider for InMemoryConfigProvider {
    async fn load_all(&self) -> Result<Vec<StrategyDefinition>, ProviderError> {
        let mut definitions: Vec<StrategyDefinition> =
            self.latest_enabled().into_values().cloned().collect();
        definitions.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(definitions)
    }

    async fn load_by_name(
        &self,
        name: &str,
    ) -> Result<Option<StrategyDefinition>, ProviderError> {
        Ok(self.latest_enabled().get(name).copied().cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definition::RiskDefinition;
    use sirocco_core::types::Timeframe;
    use std::collections::BTreeMap;

    fn definition(name: &str, version: u32, enabled: bool) -> StrategyDefinition {
        StrategyDefinition {
            name: name.to_string(),
            version,
            main_timeframe: Timeframe::M5,
            required_timeframes: BTreeMap::from([(Timeframe::M5, 1)]),
            parameters: serde_json::Map::new(),
            risk: RiskDefinition::default(),
            symbols: vec![],
            enabled,
        }
    }

    #[tokio::test]
    async fn test_latest_version_wins() {
        let provider = InMemoryConfigProvider::new(vec![
            definition("MR_M5", 2, true),
            definition("MR_M5", 3, true),
        ]);

        let all = provider.load_all().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].version, 3);

        let by_name = provider.load_by_name("MR_M5").await.unwrap().unwrap();
        assert_eq!(by_name.version, 3);
    }

    #[tokio::test]
    async fn test_disabled_definitions_hidden() {
        let provider = InMemoryConfigProvider::new(vec![
            definition("A", 1, false),
            definition("B", 1, true),
        ]);

        let all = provider.load_all().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].name, "B");
        assert!(provider.load_by_name("A").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_unknown_name_is_none() {
        let provider = InMemoryConfigProvider::default();
        assert!(provider.load_by_name("missing").await.unwrap().is_none());
    }
}
