//! State store configuration.

use serde::{Deserialize, Serialize};

/// Default capacity of the store's command channel.
pub const DEFAULT_CHANNEL_SIZE: usize = 64;

/// Configuration for the state store actor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Seed for the dice. `None` seeds from the operating system, so
    /// every run differs; `Some(n)` makes the roll sequence reproducible.
    pub seed: Option<u64>,

    /// Capacity of the command channel. When it is full, callers wait
    /// (bounded channel backpressure).
    pub channel_size: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            seed: None,
            channel_size: DEFAULT_CHANNEL_SIZE,
        }
    }
}

impl StoreConfig {
    /// A default config with a fixed dice seed.
    pub fn seeded(seed: u64) -> Self {
        Self {
            seed: Some(seed),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_config_default() {
        let config = StoreConfig::default();
        assert_eq!(config.seed, None);
        assert_eq!(config.channel_size, DEFAULT_CHANNEL_SIZE);
    }

    #[test]
    fn test_store_config_seeded_keeps_channel_default() {
        let config = StoreConfig::seeded(42);
        assert_eq!(config.seed, Some(42));
        assert_eq!(config.channel_size, DEFAULT_CHANNEL_SIZE);
    }

    #[test]
    fn test_store_config_deserializes_from_json() {
        let config: StoreConfig =
            serde_json::from_str(r#"{"seed":7,"channel_size":8}"#).unwrap();
        assert_eq!(config, StoreConfig { seed: Some(7), channel_size: 8 });
    }
}
