//! Session snapshots.
//!
//! A snapshot captures everything needed to resume a session: the dealt deck,
//! matched positions, a single face-up card if one is waiting for its
//! partner, and the RNG position so later decks continue the same sequence.
//! A mismatched pair still settling is saved face down.

use serde::{Deserialize, Serialize};

use crate::cards::Deck;
use crate::core::{GameError, GameRngState, Position};

/// Serializable state of one session.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    /// The dealt deck.
    pub deck: Deck,
    /// Matched positions, ascending.
    pub matched: Vec<Position>,
    /// Face-up card awaiting its partner.
    pub revealed: Option<Position>,
    /// Shuffle RNG position.
    pub rng: GameRngState,
}

impl SessionSnapshot {
    /// Encode with bincode.
    pub fn to_bytes(&self) -> Result<Vec<u8>, GameError> {
        bincode::serialize(self).map_err(|err| GameError::InvalidSnapshot {
            reason: err.to_string(),
        })
    }

    /// Decode from bincode. Deck invariants are checked on restore, not here.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, GameError> {
        bincode::deserialize(bytes).map_err(|err| GameError::InvalidSnapshot {
            reason: err.to_string(),
        })
    }
}
