//! History records.

use serde::{Deserialize, Serialize};

/// One won session.
///
/// Serialized as `{"pairCountMode": 16, "date": "2025-03-14 09:26:53"}`.
/// Records written under the older `gameMode` field name still load.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    /// Deck size the session was played with.
    #[serde(alias = "gameMode")]
    pub pair_count_mode: usize,

    /// Human-readable local time the session was won.
    #[serde(rename = "date")]
    pub timestamp: String,
}

impl HistoryEntry {
    /// Create a history entry.
    pub fn new(pair_count_mode: usize, timestamp: impl Into<String>) -> Self {
        Self {
            pair_count_mode,
            timestamp: timestamp.into(),
        }
    }
}
