//! Dictionary builder for flexible configuration
//!
//! Collects [`Config`] settings and builds a [`TimestampDictionary`] for
//! any node/edge handle types.

use crate::config::Config;
use crate::dictionary::TimestampDictionary;
use crate::element::GraphElement;
use crate::error::Result;

/// Builder for dictionary configuration.
#[derive(Debug, Clone, Default)]
pub struct DictionaryBuilder {
    config: Config,
}

impl DictionaryBuilder {
    /// Create a new builder with the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole configuration.
    pub fn config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    /// Enable or disable the temporal indices.
    pub fn index_timestamps(mut self, enabled: bool) -> Self {
        self.config.index_timestamps = enabled;
        self
    }

    pub fn reentrant_reads(mut self, enabled: bool) -> Self {
        self.config.reentrant_reads = enabled;
        self
    }

    /// Pre-size for `hint` timestamps. Checked when building.
    pub fn slot_capacity_hint(mut self, hint: usize) -> Self {
        self.config.slot_capacity_hint = hint;
        self
    }

    /// Build the dictionary, validating the configuration first.
    pub fn build<N: GraphElement, E: GraphElement>(self) -> Result<TimestampDictionary<N, E>> {
        TimestampDictionary::with_config(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MAX_SLOT_CAPACITY_HINT;
    use crate::error::TimegraphError;
    use crate::graph::{Edge, Node};

    #[test]
    fn test_builder_default() {
        let dict = DictionaryBuilder::new().build::<Node, Edge>().unwrap();
        assert_eq!(dict.config(), &Config::default());
    }

    #[test]
    fn test_builder_settings_reach_dictionary() {
        let dict = DictionaryBuilder::new()
            .index_timestamps(false)
            .reentrant_reads(false)
            .slot_capacity_hint(32)
            .build::<Node, Edge>()
            .unwrap();

        let config = dict.config();
        assert!(!config.index_timestamps);
        assert!(!config.reentrant_reads);
        assert_eq!(config.slot_capacity_hint, 32);
        assert_eq!(dict.main_index().unwrap_err(), TimegraphError::IndexingDisabled);
    }

    #[test]
    fn test_builder_rejects_oversized_hint() {
        let result = DictionaryBuilder::new()
            .slot_capacity_hint(MAX_SLOT_CAPACITY_HINT + 1)
            .build::<Node, Edge>();
        assert!(matches!(result, Err(TimegraphError::InvalidConfig(_))));
    }

    #[test]
    fn test_builder_with_config() {
        let config = Config::default().with_slot_capacity_hint(8);
        let dict = TimestampDictionary::<Node, Edge>::builder()
            .config(config.clone())
            .build::<Node, Edge>()
            .unwrap();
        assert_eq!(dict.config(), &config);
    }
}
