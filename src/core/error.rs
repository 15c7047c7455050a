//! Error taxonomy.
//!
//! `GameError` covers caller mistakes that stop an operation before any state
//! changes. `StoreError` covers persistence failures, which the engine logs and
//! reports but never treats as fatal.

use thiserror::Error;

/// Caller errors surfaced by the deck builder and the match engine.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum GameError {
    /// Deck size is odd, zero, or larger than the catalog can pair.
    #[error("invalid deck size {size}: expected a positive even number no greater than {max}")]
    InvalidDeckSize { size: usize, max: usize },

    /// `reveal` addressed a slot outside the current deck.
    #[error("position {position} is outside the deck (size {deck_size})")]
    InvalidPosition { position: usize, deck_size: usize },

    /// The token catalog is empty or contains duplicates.
    #[error("invalid token catalog: {reason}")]
    InvalidCatalog { reason: String },

    /// A deck breaks a layout invariant (positions, ordinals or pairing).
    #[error("invalid deck: {reason}")]
    InvalidDeck { reason: String },

    /// A session snapshot failed to decode or violates a deck invariant.
    #[error("invalid snapshot: {reason}")]
    InvalidSnapshot { reason: String },
}

/// History persistence failures.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Underlying filesystem failure.
    #[error("history store I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// Stored history could not be encoded or decoded.
    #[error("history store serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Backend refused the operation.
    #[error("history store unavailable: {reason}")]
    Unavailable { reason: String },
}

impl StoreError {
    /// Shorthand for an `Unavailable` error.
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self::Unavailable {
            reason: reason.into(),
        }
    }
}
