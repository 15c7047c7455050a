//! Identifier newtypes.
//!
//! ## Layout
//!
//! - `Position`: a slot index into the deck, `0..deck_size`
//! - `Ordinal`: a per-card label, `1..=deck_size`, fixed at deck build time
//! - `SessionId`: one per dealt deck, strictly increasing within an engine
//!
//! ```
//! use memory_match::core::{Ordinal, Position};
//!
//! let p = Position::new(3);
//! assert_eq!(p.index(), 3);
//! assert!(p.in_deck(4));
//! assert!(!Position::new(4).in_deck(4));
//!
//! assert_eq!(format!("{}", Ordinal::new(7)), "#7");
//! ```

use serde::{Deserialize, Serialize};

/// A slot in the deck. Cards never move once dealt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Position(pub usize);

impl Position {
    /// Create a position from a raw index.
    #[must_use]
    pub const fn new(index: usize) -> Self {
        Self(index)
    }

    /// Get the raw index.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }

    /// Check if this position addresses a card in a deck of `deck_size`.
    #[must_use]
    pub const fn in_deck(self, deck_size: usize) -> bool {
        self.0 < deck_size
    }
}

impl From<usize> for Position {
    fn from(index: usize) -> Self {
        Self(index)
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The label shown on a card face.
///
/// Both cards of a pair carry distinct ordinals.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Ordinal(pub u32);

impl Ordinal {
    /// Create a new ordinal.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Get the raw value.
    #[must_use]
    pub const fn value(self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for Ordinal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Identifies one dealt deck.
///
/// Deferred work is tagged with the session it was scheduled for and is
/// dropped if the session has since been replaced.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SessionId(pub u64);

impl SessionId {
    /// The session that follows this one.
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Session({})", self.0)
    }
}
