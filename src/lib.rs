//! # memory-match
//!
//! Game-state engine for a single-player memory matching game.
//!
//! A deck of paired tokens is shuffled face down; the player reveals two
//! cards at a time, keeps matches, and wins when every pair is matched.
//!
//! ## Design Principles
//!
//! 1. **Semantic State Only**: The engine exposes which positions are
//!    revealed or matched, the deck, and history. Layout, colours and
//!    animation belong to the presentation layer.
//!
//! 2. **Never Block**: The mismatch settle delay is a scheduled task the host
//!    fires via `poll`, cancelled when a new deck replaces the session.
//!
//! 3. **Injected Storage**: History persistence goes through the
//!    `HistoryStore` trait. Storage failures are reported, never fatal.
//!
//! ## Modules
//!
//! - `core`: Identifiers, RNG, clocks, configuration, errors
//! - `cards`: Tokens, catalog, cards, and deck construction
//! - `rules`: Session state machine, match engine, settle timer, snapshots
//! - `history`: History entries and stores

pub mod core;
pub mod cards;
pub mod rules;
pub mod history;

#[cfg(feature = "python")]
pub mod python;

// Re-export commonly used types
pub use crate::core::{
    Ordinal, Position, SessionId,
    GameRng, GameRngState,
    Clock, ManualClock, SystemClock,
    EngineConfig, GameError, StoreError,
};

pub use crate::cards::{build_deck, Card, Catalog, Deck, DeckBuilder, Token};

pub use crate::rules::{
    MatchEngine, MatchEngineBuilder, RevealOutcome, Settled,
    Session, SessionStatus, SlotState, RejectReason, Flip,
    SessionSnapshot, TimerQueue, TimerId,
};

pub use crate::history::{
    HistoryEntry, HistoryStore, KvHistoryStore,
    KeyValueStore, MemoryKvStore, FileKvStore,
};
