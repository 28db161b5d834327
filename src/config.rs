//! Dictionary configuration.
//!
//! Serializable so embedders can load it from JSON, or TOML with the `toml`
//! feature, alongside the rest of their store settings.

use serde::de::Error;
use serde::{Deserialize, Serialize};

/// Upper bound for `slot_capacity_hint`.
pub const MAX_SLOT_CAPACITY_HINT: usize = 1 << 24;

/// Temporal dictionary configuration
///
/// # Example
///
/// ```rust
/// use timegraph::Config;
///
/// let config = Config::default().with_slot_capacity_hint(64);
///
/// let json = r#"{
///     "index_timestamps": true,
///     "reentrant_reads": false
/// }"#;
/// let config: Config = serde_json::from_str(json).unwrap();
/// assert!(!config.reentrant_reads);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Maintain the main and per-view temporal indices.
    ///
    /// With indexing off the dictionary still assigns slots, but index
    /// lookups fail with `IndexingDisabled`.
    #[serde(default = "Config::default_index_timestamps")]
    pub index_timestamps: bool,

    /// Let a thread that already holds a read scope open another one even
    /// while a writer is waiting.
    #[serde(default = "Config::default_reentrant_reads")]
    pub reentrant_reads: bool,

    /// Pre-size the slot table and main index for this many timestamps
    #[serde(default)]
    pub slot_capacity_hint: usize,
}

impl Config {
    const fn default_index_timestamps() -> bool {
        true
    }

    const fn default_reentrant_reads() -> bool {
        true
    }

    pub fn with_index_timestamps(mut self, enabled: bool) -> Self {
        self.index_timestamps = enabled;
        self
    }

    pub fn with_reentrant_reads(mut self, enabled: bool) -> Self {
        self.reentrant_reads = enabled;
        self
    }

    pub fn with_slot_capacity_hint(mut self, hint: usize) -> Self {
        assert!(
            hint <= MAX_SLOT_CAPACITY_HINT,
            "Slot capacity hint must not exceed {MAX_SLOT_CAPACITY_HINT}"
        );
        self.slot_capacity_hint = hint;
        self
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), String> {
        if self.slot_capacity_hint > MAX_SLOT_CAPACITY_HINT {
            return Err(format!(
                "Slot capacity hint must not exceed {MAX_SLOT_CAPACITY_HINT}"
            ));
        }
        Ok(())
    }

    /// Load configuration from JSON string
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let config: Config = serde_json::from_str(json)?;
        if let Err(e) = config.validate() {
            return Err(serde_json::Error::custom(e));
        }
        Ok(config)
    }

    /// Save configuration as JSON string
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Load configuration from TOML string (requires toml feature)
    #[cfg(feature = "toml")]
    pub fn from_toml(toml_str: &str) -> Result<Self, toml::de::Error> {
        let config: Config = toml::from_str(toml_str)?;
        if let Err(e) = config.validate() {
            return Err(toml::de::Error::custom(e));
        }
        Ok(config)
    }

    /// Save configuration as TOML string (requires toml feature)
    #[cfg(feature = "toml")]
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            index_timestamps: Self::default_index_timestamps(),
            reentrant_reads: Self::default_reentrant_reads(),
            slot_capacity_hint: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert!(config.index_timestamps);
        assert!(config.reentrant_reads);
        assert_eq!(config.slot_capacity_hint, 0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_missing_fields_take_defaults() {
        let config = Config::from_json("{}").unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_json_round_trip() {
        let config = Config::default()
            .with_index_timestamps(false)
            .with_slot_capacity_hint(128);
        let json = config.to_json().unwrap();
        assert_eq!(Config::from_json(&json).unwrap(), config);
    }

    #[test]
    fn test_oversized_hint_rejected() {
        let json = format!(r#"{{"slot_capacity_hint": {}}}"#, MAX_SLOT_CAPACITY_HINT + 1);
        assert!(Config::from_json(&json).is_err());
    }

    #[test]
    #[should_panic(expected = "Slot capacity hint must not exceed")]
    fn test_builder_rejects_oversized_hint() {
        let _ = Config::default().with_slot_capacity_hint(MAX_SLOT_CAPACITY_HINT + 1);
    }

    #[cfg(feature = "toml")]
    #[test]
    fn test_toml_round_trip() {
        let config = Config::default().with_reentrant_reads(false);
        let text = config.to_toml().unwrap();
        assert_eq!(Config::from_toml(&text).unwrap(), config);
    }
}
