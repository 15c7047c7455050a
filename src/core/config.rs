//! Engine configuration.
//!
//! Hosts build an `EngineConfig` with the builder methods or deserialize one
//! from JSON. Every field has a default, so a partial document is enough:
//!
//! ```
//! use memory_match::core::EngineConfig;
//!
//! let config: EngineConfig = serde_json::from_str(r#"{ "settle_delay_ms": 500 }"#).unwrap();
//! assert_eq!(config.settle_delay_ms, 500);
//! assert_eq!(config.initial_deck_size, 4);
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Configuration for a `MatchEngine`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// How long a mismatched pair stays face-up before flipping back.
    pub settle_delay_ms: u64,

    /// Deck size dealt when the engine starts.
    pub initial_deck_size: usize,

    /// Key the history list is stored under.
    pub history_key: String,

    /// Shuffle seed. `None` seeds from OS entropy.
    pub seed: Option<u64>,

    /// `chrono` format string for history timestamps.
    pub timestamp_format: String,
}

impl EngineConfig {
    /// Deck sizes a presentation layer offers by default.
    ///
    /// The engine itself accepts any positive even size the catalog can pair.
    pub const PRESET_DECK_SIZES: [usize; 3] = [4, 16, 32];

    /// Default settle delay in milliseconds.
    pub const DEFAULT_SETTLE_DELAY_MS: u64 = 1000;

    /// Default storage key for history.
    pub const DEFAULT_HISTORY_KEY: &'static str = "gameHistory";

    /// Set the settle delay.
    #[must_use]
    pub fn with_settle_delay(mut self, delay: Duration) -> Self {
        self.settle_delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// Set the deck size dealt at startup.
    #[must_use]
    pub fn with_initial_deck_size(mut self, size: usize) -> Self {
        self.initial_deck_size = size;
        self
    }

    /// Set the history storage key.
    #[must_use]
    pub fn with_history_key(mut self, key: impl Into<String>) -> Self {
        self.history_key = key.into();
        self
    }

    /// Use a fixed shuffle seed.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Set the timestamp format.
    #[must_use]
    pub fn with_timestamp_format(mut self, format: impl Into<String>) -> Self {
        self.timestamp_format = format.into();
        self
    }

    /// The settle delay as a `Duration`.
    #[must_use]
    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            settle_delay_ms: Self::DEFAULT_SETTLE_DELAY_MS,
            initial_deck_size: Self::PRESET_DECK_SIZES[0],
            history_key: Self::DEFAULT_HISTORY_KEY.to_string(),
            seed: None,
            timestamp_format: "%Y-%m-%d %H:%M:%S".to_string(),
        }
    }
}
