//! Session state and the reveal rule.
//!
//! A `Session` is the live state of one dealt deck. It owns the pure part of
//! the state machine; scheduling the mismatch settle and recording wins is
//! the engine's job.
//!
//! ## Slot states
//!
//! ```text
//! hidden --reveal--> revealed --match--> matched
//!                       |
//!                       +--mismatch, after settle--> hidden
//! ```
//!
//! ## Invariants
//!
//! - `revealed` holds 0, 1 or 2 positions; 2 only while a mismatch settles
//! - `revealed ∩ matched = ∅`
//! - `matched` only grows, always by whole pairs

use im::OrdSet;
use smallvec::SmallVec;

use crate::cards::{Card, Deck};
use crate::core::{GameError, Position, SessionId};

/// State of one slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SlotState {
    /// Face down.
    Hidden,
    /// Face up, not yet paired.
    Revealed,
    /// Permanently face up.
    Matched,
}

/// Overall session state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SessionStatus {
    /// Pairs remain.
    InProgress,
    /// Every card is matched.
    Won,
}

/// Why a reveal was ignored.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RejectReason {
    /// The slot is already matched.
    AlreadyMatched,
    /// The slot is already face up.
    AlreadyRevealed,
    /// A mismatched pair is still settling.
    ResolutionPending,
    /// The session is over.
    SessionWon,
}

/// Result of applying the reveal rule to a session.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Flip {
    /// Nothing changed.
    Rejected(RejectReason),
    /// First card of a round is face up.
    First(Position),
    /// Second card matched the first; both are now matched.
    Matched([Position; 2]),
    /// Second card differs; both stay face up until settled.
    Mismatched([Position; 2]),
}

/// Live state of one dealt deck.
#[derive(Clone, Debug)]
pub struct Session {
    id: SessionId,
    deck: Deck,
    revealed: SmallVec<[Position; 2]>,
    matched: OrdSet<Position>,
    status: SessionStatus,
}

impl Session {
    /// Start a fresh session with every slot hidden.
    #[must_use]
    pub fn new(id: SessionId, deck: Deck) -> Self {
        Self {
            id,
            deck,
            revealed: SmallVec::new(),
            matched: OrdSet::new(),
            status: SessionStatus::InProgress,
        }
    }

    /// Rebuild a session from saved parts.
    ///
    /// `matched` must consist of whole pairs and `revealed` may hold at most
    /// one position outside `matched`.
    pub fn restore(
        id: SessionId,
        deck: Deck,
        matched: impl IntoIterator<Item = Position>,
        revealed: Option<Position>,
    ) -> Result<Self, GameError> {
        deck.validate()?;
        let size = deck.len();
        let invalid = |reason: String| GameError::InvalidSnapshot { reason };

        let matched: OrdSet<Position> = matched.into_iter().collect();
        for &position in &matched {
            if !position.in_deck(size) {
                return Err(invalid(format!("matched position {position} outside deck of {size}")));
            }
            let partner = deck.partner_of(position);
            if partner.map_or(true, |p| !matched.contains(&p)) {
                return Err(invalid(format!("matched position {position} has an unmatched partner")));
            }
        }

        let mut session = Self::new(id, deck);
        if let Some(position) = revealed {
            if !position.in_deck(size) {
                return Err(invalid(format!("revealed position {position} outside deck of {size}")));
            }
            if matched.contains(&position) {
                return Err(invalid(format!("position {position} is both revealed and matched")));
            }
            session.revealed.push(position);
        }

        session.matched = matched;
        if session.matched.len() == size {
            session.status = SessionStatus::Won;
        }
        Ok(session)
    }

    /// Apply the reveal rule to `position`.
    ///
    /// Errors only for out-of-range positions; every other refusal is a
    /// `Flip::Rejected` with no state change.
    pub fn flip(&mut self, position: Position) -> Result<Flip, GameError> {
        if !position.in_deck(self.deck.len()) {
            return Err(GameError::InvalidPosition {
                position: position.index(),
                deck_size: self.deck.len(),
            });
        }

        if let Some(reason) = self.reject_reason(position) {
            return Ok(Flip::Rejected(reason));
        }

        // Past the reject check at most one card is face up.
        let Some(&first) = self.revealed.first() else {
            self.revealed.push(position);
            return Ok(Flip::First(position));
        };
        let second = position;
        self.revealed.push(second);

        let is_pair = match (self.deck.get(first), self.deck.get(second)) {
            (Some(a), Some(b)) => a.matches(b),
            _ => false,
        };

        if !is_pair {
            return Ok(Flip::Mismatched([first, second]));
        }

        self.revealed.clear();
        self.matched.insert(first);
        self.matched.insert(second);
        if self.matched.len() == self.deck.len() {
            self.status = SessionStatus::Won;
        }
        Ok(Flip::Matched([first, second]))
    }

    /// Why `position` cannot be revealed right now, if it cannot.
    #[must_use]
    pub fn reject_reason(&self, position: Position) -> Option<RejectReason> {
        if self.status == SessionStatus::Won {
            Some(RejectReason::SessionWon)
        } else if self.matched.contains(&position) {
            Some(RejectReason::AlreadyMatched)
        } else if self.revealed.contains(&position) {
            Some(RejectReason::AlreadyRevealed)
        } else if self.is_resolution_pending() {
            Some(RejectReason::ResolutionPending)
        } else {
            None
        }
    }

    /// Flip a settling pair face down. Returns false if `pair` is not the
    /// currently revealed pair.
    pub fn hide_pair(&mut self, pair: [Position; 2]) -> bool {
        let current = self.revealed.as_slice();
        if current.len() != 2 || !pair.iter().all(|p| current.contains(p)) {
            return false;
        }
        self.revealed.clear();
        true
    }

    /// This session's id.
    #[must_use]
    pub fn id(&self) -> SessionId {
        self.id
    }

    /// The dealt deck.
    #[must_use]
    pub fn deck(&self) -> &Deck {
        &self.deck
    }

    /// Face-up, unpaired positions in reveal order.
    #[must_use]
    pub fn revealed(&self) -> &[Position] {
        &self.revealed
    }

    /// Matched positions.
    #[must_use]
    pub fn matched(&self) -> &OrdSet<Position> {
        &self.matched
    }

    /// Overall status.
    #[must_use]
    pub fn status(&self) -> SessionStatus {
        self.status
    }

    /// Check if every pair is matched.
    #[must_use]
    pub fn is_won(&self) -> bool {
        self.status == SessionStatus::Won
    }

    /// Check if a mismatched pair is waiting to flip back.
    #[must_use]
    pub fn is_resolution_pending(&self) -> bool {
        self.revealed.len() == 2
    }

    /// State of one slot, `None` outside the deck.
    #[must_use]
    pub fn slot(&self, position: Position) -> Option<SlotState> {
        if !position.in_deck(self.deck.len()) {
            None
        } else if self.matched.contains(&position) {
            Some(SlotState::Matched)
        } else if self.revealed.contains(&position) {
            Some(SlotState::Revealed)
        } else {
            Some(SlotState::Hidden)
        }
    }

    /// Cards currently face up (revealed or matched), in position order.
    pub fn face_up(&self) -> impl Iterator<Item = &Card> {
        self.deck
            .iter()
            .filter(|card| self.slot(card.position) != Some(SlotState::Hidden))
    }
}
