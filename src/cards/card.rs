//! A dealt card.

use serde::{Deserialize, Serialize};

use super::catalog::Token;
use crate::core::{Ordinal, Position};

/// One card in a dealt deck. Immutable once the deck is built.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Card {
    /// Slot the card occupies.
    pub position: Position,

    /// Face value; two cards match when their tokens are equal.
    pub token: Token,

    /// Label printed on the face, distinct for every card.
    pub ordinal: Ordinal,
}

impl Card {
    /// Create a card.
    #[must_use]
    pub fn new(position: Position, token: Token, ordinal: Ordinal) -> Self {
        Self {
            position,
            token,
            ordinal,
        }
    }

    /// Check whether two cards form a pair.
    #[must_use]
    pub fn matches(&self, other: &Card) -> bool {
        self.position != other.position && self.token == other.token
    }
}
