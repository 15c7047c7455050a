//! The match engine.
//!
//! `MatchEngine` owns the live session, the history list and the settle
//! timer. Every transition happens inside one of its methods:
//!
//! - `new_game` deals a deck and discards the previous session, cancelling
//!   anything still scheduled for it
//! - `reveal` applies the reveal rule; a mismatch schedules a settle task
//! - `poll` fires settle tasks whose deadline has passed
//!
//! Nothing blocks. A host drives `poll` from its own event loop, using
//! `next_deadline` to know when.
//!
//! ## Example
//!
//! ```
//! use std::time::Duration;
//! use memory_match::cards::Deck;
//! use memory_match::core::{ManualClock, Position};
//! use memory_match::history::{KvHistoryStore, MemoryKvStore};
//! use memory_match::rules::{MatchEngineBuilder, RevealOutcome, SessionStatus};
//!
//! let clock = ManualClock::new();
//! let store = KvHistoryStore::new(MemoryKvStore::new(), "gameHistory");
//! let mut engine = MatchEngineBuilder::new().clock(clock.clone()).build(store).unwrap();
//!
//! engine.deal(Deck::from_tokens(["A", "B", "A", "B"]).unwrap()).unwrap();
//!
//! engine.reveal(Position(0)).unwrap();
//! let outcome = engine.reveal(Position(1)).unwrap();
//! assert!(matches!(outcome, RevealOutcome::Mismatched { .. }));
//!
//! clock.advance(Duration::from_secs(1));
//! engine.poll();
//! assert!(engine.revealed().is_empty());
//!
//! for p in [0, 2, 1, 3] {
//!     engine.reveal(Position(p)).unwrap();
//! }
//! assert_eq!(engine.status(), SessionStatus::Won);
//! assert_eq!(engine.history().len(), 1);
//! ```

use std::fmt::Write as _;
use std::time::Instant;

use im::{OrdSet, Vector};

use super::session::{Flip, RejectReason, Session, SessionStatus, SlotState};
use super::snapshot::SessionSnapshot;
use super::timer::TimerQueue;
use crate::cards::{Catalog, Deck, DeckBuilder};
use crate::core::{Clock, EngineConfig, GameError, GameRng, Position, SessionId, StoreError, SystemClock};
use crate::history::{HistoryEntry, HistoryStore};

/// What a `reveal` call did.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RevealOutcome {
    /// Ignored; no state changed.
    Rejected(RejectReason),
    /// First card of a round is face up.
    FirstRevealed(Position),
    /// The pair matched.
    Matched { pair: [Position; 2] },
    /// The pair differs and will flip back at `settle_at`.
    Mismatched { pair: [Position; 2], settle_at: Instant },
    /// The last pair matched. `persisted` is false if the history store
    /// refused the new entry; it is in the in-memory history either way.
    Won {
        pair: [Position; 2],
        entry: HistoryEntry,
        persisted: bool,
    },
}

impl RevealOutcome {
    /// Check if the reveal changed state.
    #[must_use]
    pub fn is_accepted(&self) -> bool {
        !matches!(self, RevealOutcome::Rejected(_))
    }
}

/// A mismatched pair that flipped back face down.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Settled {
    /// Session the pair belonged to.
    pub session: SessionId,
    /// The pair, in reveal order.
    pub pair: [Position; 2],
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Deferred {
    HideMismatch { session: SessionId, pair: [Position; 2] },
}

impl Deferred {
    fn session(&self) -> SessionId {
        match self {
            Deferred::HideMismatch { session, .. } => *session,
        }
    }
}

/// Builder for `MatchEngine`.
#[derive(Clone, Debug)]
pub struct MatchEngineBuilder<C = SystemClock> {
    config: EngineConfig,
    catalog: Catalog,
    clock: C,
}

impl Default for MatchEngineBuilder<SystemClock> {
    fn default() -> Self {
        Self {
            config: EngineConfig::default(),
            catalog: Catalog::default(),
            clock: SystemClock,
        }
    }
}

impl MatchEngineBuilder<SystemClock> {
    /// Start from defaults: default config, default palette, system clock.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl<C: Clock> MatchEngineBuilder<C> {
    /// Use `config`.
    #[must_use]
    pub fn config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Draw tokens from `catalog`.
    #[must_use]
    pub fn catalog(mut self, catalog: Catalog) -> Self {
        self.catalog = catalog;
        self
    }

    /// Read time from `clock`.
    #[must_use]
    pub fn clock<C2: Clock>(self, clock: C2) -> MatchEngineBuilder<C2> {
        MatchEngineBuilder {
            config: self.config,
            catalog: self.catalog,
            clock,
        }
    }

    /// Load history from `store` and deal the initial deck.
    ///
    /// A failing `load` is logged and recorded; the engine starts with an
    /// empty history. An invalid `initial_deck_size` is an error.
    pub fn build<S: HistoryStore>(self, mut store: S) -> Result<MatchEngine<S, C>, GameError> {
        let mut rng = match self.config.seed {
            Some(seed) => GameRng::new(seed),
            None => GameRng::from_entropy(),
        };

        let deck = DeckBuilder::new(&self.catalog).build(self.config.initial_deck_size, &mut rng)?;

        let mut last_persistence_error = None;
        let history = match store.load() {
            Ok(entries) => entries.into_iter().collect(),
            Err(err) => {
                tracing::warn!(error = %err, "Failed to load game history, starting empty");
                last_persistence_error = Some(err);
                Vector::new()
            }
        };

        let session = Session::new(SessionId(1), deck);
        tracing::info!(
            session = %session.id(),
            deck_size = session.deck().len(),
            history = history.len(),
            "Match engine ready"
        );

        Ok(MatchEngine {
            config: self.config,
            catalog: self.catalog,
            rng,
            clock: self.clock,
            store,
            session,
            history,
            timers: TimerQueue::new(),
            last_persistence_error,
        })
    }
}

/// Single-player memory game engine.
pub struct MatchEngine<S, C = SystemClock> {
    config: EngineConfig,
    catalog: Catalog,
    rng: GameRng,
    clock: C,
    store: S,
    session: Session,
    history: Vector<HistoryEntry>,
    timers: TimerQueue<Deferred>,
    last_persistence_error: Option<StoreError>,
}

impl<S: HistoryStore, C: Clock> MatchEngine<S, C> {
    // === Inputs ===

    /// Deal a fresh shuffled deck of `deck_size` cards.
    ///
    /// On error the current session is left untouched.
    pub fn new_game(&mut self, deck_size: usize) -> Result<&Session, GameError> {
        let deck = DeckBuilder::new(&self.catalog).build(deck_size, &mut self.rng)?;
        self.replace_session(deck);
        Ok(&self.session)
    }

    /// Start a session with a caller-supplied deck.
    ///
    /// The deck must satisfy every layout invariant but need not come from
    /// this engine's catalog.
    pub fn deal(&mut self, deck: Deck) -> Result<&Session, GameError> {
        deck.validate()?;
        self.replace_session(deck);
        Ok(&self.session)
    }

    /// Reveal the card at `position`.
    pub fn reveal(&mut self, position: Position) -> Result<RevealOutcome, GameError> {
        let session = self.session.id();
        let flip = self.session.flip(position)?;

        let outcome = match flip {
            Flip::Rejected(reason) => {
                tracing::debug!(%session, %position, ?reason, "Reveal rejected");
                RevealOutcome::Rejected(reason)
            }
            Flip::First(position) => {
                tracing::debug!(%session, %position, "Card revealed");
                RevealOutcome::FirstRevealed(position)
            }
            Flip::Mismatched(pair) => {
                let settle_at = self.clock.now() + self.config.settle_delay();
                self.timers
                    .schedule(settle_at, Deferred::HideMismatch { session, pair });
                tracing::debug!(%session, first = %pair[0], second = %pair[1], "Mismatch, settling");
                RevealOutcome::Mismatched { pair, settle_at }
            }
            Flip::Matched(pair) if self.session.is_won() => {
                tracing::debug!(%session, first = %pair[0], second = %pair[1], "Final pair matched");
                let (entry, persisted) = self.record_win();
                RevealOutcome::Won {
                    pair,
                    entry,
                    persisted,
                }
            }
            Flip::Matched(pair) => {
                tracing::debug!(%session, first = %pair[0], second = %pair[1], "Pair matched");
                RevealOutcome::Matched { pair }
            }
        };

        Ok(outcome)
    }

    /// Fire every settle task due by the engine's clock.
    pub fn poll(&mut self) -> Vec<Settled> {
        let now = self.clock.now();
        self.poll_at(now)
    }

    /// Fire every settle task due at or before `now`.
    pub fn poll_at(&mut self, now: Instant) -> Vec<Settled> {
        let mut settled = Vec::new();

        for event in self.timers.pop_due(now) {
            match event {
                Deferred::HideMismatch { session, pair } => {
                    if session != self.session.id() {
                        tracing::debug!(%session, current = %self.session.id(), "Dropping stale settle");
                        continue;
                    }
                    if self.session.hide_pair(pair) {
                        tracing::debug!(%session, first = %pair[0], second = %pair[1], "Mismatch settled");
                        settled.push(Settled { session, pair });
                    }
                }
            }
        }

        settled
    }

    /// Flip a settling pair back immediately instead of waiting.
    pub fn settle_now(&mut self) -> Option<Settled> {
        let session = self.session.id();
        let pair = match self.session.revealed() {
            &[first, second] => [first, second],
            _ => return None,
        };

        self.timers.cancel_where(|event| event.session() == session);
        if self.session.hide_pair(pair) {
            tracing::debug!(%session, first = %pair[0], second = %pair[1], "Mismatch settled early");
            Some(Settled { session, pair })
        } else {
            None
        }
    }

    // === Observable state ===

    /// The live session.
    #[must_use]
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// The current session's id.
    #[must_use]
    pub fn session_id(&self) -> SessionId {
        self.session.id()
    }

    /// The dealt deck.
    #[must_use]
    pub fn deck(&self) -> &Deck {
        self.session.deck()
    }

    /// Current deck size.
    #[must_use]
    pub fn deck_size(&self) -> usize {
        self.session.deck().len()
    }

    /// Face-up, unpaired positions in reveal order.
    #[must_use]
    pub fn revealed(&self) -> &[Position] {
        self.session.revealed()
    }

    /// Matched positions.
    #[must_use]
    pub fn matched(&self) -> &OrdSet<Position> {
        self.session.matched()
    }

    /// State of one slot.
    #[must_use]
    pub fn slot(&self, position: Position) -> Option<SlotState> {
        self.session.slot(position)
    }

    /// Session status.
    #[must_use]
    pub fn status(&self) -> SessionStatus {
        self.session.status()
    }

    /// Check if a mismatched pair is settling.
    #[must_use]
    pub fn is_resolution_pending(&self) -> bool {
        self.session.is_resolution_pending()
    }

    /// Every won session, oldest first.
    #[must_use]
    pub fn history(&self) -> &Vector<HistoryEntry> {
        &self.history
    }

    /// When `poll` next has work to do.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Instant> {
        self.timers.next_deadline()
    }

    /// Most recent persistence failure, if any.
    #[must_use]
    pub fn last_persistence_error(&self) -> Option<&StoreError> {
        self.last_persistence_error.as_ref()
    }

    /// Take and clear the recorded persistence failure.
    pub fn take_persistence_error(&mut self) -> Option<StoreError> {
        self.last_persistence_error.take()
    }

    /// Engine configuration.
    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Token catalog.
    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// The history store.
    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    // === Snapshots ===

    /// Capture the live session.
    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        let revealed = match self.session.revealed() {
            &[only] => Some(only),
            _ => None,
        };
        SessionSnapshot {
            deck: self.session.deck().clone(),
            matched: self.session.matched().iter().copied().collect(),
            revealed,
            rng: self.rng.state(),
        }
    }

    /// Replace the live session with a saved one.
    ///
    /// The snapshot is fully validated first; on error nothing changes.
    pub fn restore(&mut self, snapshot: SessionSnapshot) -> Result<&Session, GameError> {
        let id = self.session.id().next();
        let session = Session::restore(id, snapshot.deck, snapshot.matched, snapshot.revealed)?;

        let cancelled = self.timers.cancel_all();
        self.rng = GameRng::from_state(&snapshot.rng);
        self.session = session;
        tracing::info!(
            session = %id,
            deck_size = self.session.deck().len(),
            matched = self.session.matched().len(),
            cancelled,
            "Session restored"
        );
        Ok(&self.session)
    }

    // === Internals ===

    fn replace_session(&mut self, deck: Deck) {
        let id = self.session.id().next();
        let cancelled = self.timers.cancel_all();
        self.session = Session::new(id, deck);
        tracing::info!(
            session = %id,
            deck_size = self.session.deck().len(),
            cancelled,
            "New game dealt"
        );
    }

    fn record_win(&mut self) -> (HistoryEntry, bool) {
        let entry = HistoryEntry::new(self.deck_size(), self.timestamp());
        self.history.push_back(entry.clone());

        let persisted = match self.store.append(&entry) {
            Ok(()) => true,
            Err(err) => {
                tracing::warn!(error = %err, "Failed to persist game history");
                self.last_persistence_error = Some(err);
                false
            }
        };

        tracing::info!(
            session = %self.session.id(),
            deck_size = entry.pair_count_mode,
            persisted,
            "Session won"
        );
        (entry, persisted)
    }

    fn timestamp(&self) -> String {
        let wall = self.clock.wall_time();
        let mut out = String::new();
        if write!(out, "{}", wall.format(&self.config.timestamp_format)).is_err() {
            out = wall.to_rfc3339();
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ManualClock;
    use crate::history::{KvHistoryStore, MemoryKvStore};
    use std::time::Duration;

    type TestEngine = MatchEngine<KvHistoryStore<MemoryKvStore>, ManualClock>;

    fn engine_with(kv: MemoryKvStore, clock: ManualClock) -> TestEngine {
        MatchEngineBuilder::new()
            .config(EngineConfig::default().with_seed(42))
            .clock(clock)
            .build(KvHistoryStore::new(kv, "gameHistory"))
            .unwrap()
    }

    fn abab_engine() -> (TestEngine, ManualClock, MemoryKvStore) {
        let clock = ManualClock::new();
        let kv = MemoryKvStore::new();
        let mut engine = engine_with(kv.clone(), clock.clone());
        engine.deal(Deck::from_tokens(["A", "B", "A", "B"]).unwrap()).unwrap();
        (engine, clock, kv)
    }

    #[test]
    fn test_starts_with_initial_deck() {
        let engine = engine_with(MemoryKvStore::new(), ManualClock::new());

        assert_eq!(engine.deck_size(), 4);
        assert_eq!(engine.status(), SessionStatus::InProgress);
        assert!(engine.history().is_empty());
        assert!(engine.last_persistence_error().is_none());
    }

    #[test]
    fn test_invalid_initial_size() {
        let result = MatchEngineBuilder::new()
            .config(EngineConfig::default().with_initial_deck_size(3))
            .clock(ManualClock::new())
            .build(KvHistoryStore::new(MemoryKvStore::new(), "h"));

        assert!(matches!(result, Err(GameError::InvalidDeckSize { size: 3, .. })));
    }

    #[test]
    fn test_mismatch_settles_after_delay() {
        let (mut engine, clock, _) = abab_engine();

        engine.reveal(Position(0)).unwrap();
        let outcome = engine.reveal(Position(1)).unwrap();
        let RevealOutcome::Mismatched { pair, settle_at } = outcome else {
            panic!("expected mismatch, got {outcome:?}");
        };
        assert_eq!(pair, [Position(0), Position(1)]);
        assert_eq!(engine.next_deadline(), Some(settle_at));

        clock.advance(Duration::from_millis(999));
        assert!(engine.poll().is_empty());
        assert_eq!(engine.revealed(), &[Position(0), Position(1)]);

        clock.advance(Duration::from_millis(1));
        let settled = engine.poll();
        assert_eq!(settled.len(), 1);
        assert!(engine.revealed().is_empty());
        assert!(engine.matched().is_empty());
        assert_eq!(engine.next_deadline(), None);
    }

    #[test]
    fn test_reveal_rejected_while_settling() {
        let mut engine = engine_with(MemoryKvStore::new(), ManualClock::new());
        engine
            .deal(Deck::from_tokens(["A", "B", "C", "A", "B", "C"]).unwrap())
            .unwrap();

        engine.reveal(Position(0)).unwrap();
        engine.reveal(Position(1)).unwrap();

        assert_eq!(
            engine.reveal(Position(2)).unwrap(),
            RevealOutcome::Rejected(RejectReason::ResolutionPending)
        );
    }

    #[test]
    fn test_settle_now() {
        let (mut engine, _, _) = abab_engine();
        assert_eq!(engine.settle_now(), None);

        engine.reveal(Position(0)).unwrap();
        engine.reveal(Position(1)).unwrap();

        let settled = engine.settle_now().unwrap();
        assert_eq!(settled.pair, [Position(0), Position(1)]);
        assert!(engine.revealed().is_empty());
        assert_eq!(engine.next_deadline(), None);
    }

    #[test]
    fn test_win_records_history() {
        let (mut engine, _, kv) = abab_engine();

        for p in [0, 2, 1] {
            assert!(engine.reveal(Position(p)).unwrap().is_accepted());
        }
        let outcome = engine.reveal(Position(3)).unwrap();

        let RevealOutcome::Won { entry, persisted, .. } = outcome else {
            panic!("expected win, got {outcome:?}");
        };
        assert!(persisted);
        assert_eq!(entry.pair_count_mode, 4);
        assert_eq!(engine.history().len(), 1);
        assert!(kv.raw("gameHistory").unwrap().contains("\"pairCountMode\":4"));
    }

    #[test]
    fn test_persistence_failure_is_not_fatal() {
        let (mut engine, _, kv) = abab_engine();
        kv.fail_writes(true);

        for p in [0, 2, 1] {
            engine.reveal(Position(p)).unwrap();
        }
        let outcome = engine.reveal(Position(3)).unwrap();

        assert!(matches!(outcome, RevealOutcome::Won { persisted: false, .. }));
        assert_eq!(engine.status(), SessionStatus::Won);
        assert_eq!(engine.history().len(), 1);
        assert!(engine.take_persistence_error().is_some());
        assert!(engine.last_persistence_error().is_none());

        // Play continues.
        engine.new_game(4).unwrap();
        assert_eq!(engine.status(), SessionStatus::InProgress);
    }

    #[test]
    fn test_load_failure_starts_empty() {
        let kv = MemoryKvStore::new();
        kv.fail_reads(true);

        let engine = engine_with(kv, ManualClock::new());

        assert!(engine.history().is_empty());
        assert!(matches!(
            engine.last_persistence_error(),
            Some(StoreError::Unavailable { .. })
        ));
    }

    #[test]
    fn test_new_game_cancels_pending_settle() {
        let (mut engine, clock, _) = abab_engine();
        engine.reveal(Position(0)).unwrap();
        engine.reveal(Position(1)).unwrap();
        let old = engine.session_id();

        engine.new_game(4).unwrap();
        assert_ne!(engine.session_id(), old);
        assert_eq!(engine.next_deadline(), None);

        engine.reveal(Position(0)).unwrap();
        clock.advance(Duration::from_secs(5));
        assert!(engine.poll().is_empty());
        assert_eq!(engine.revealed(), &[Position(0)]);
    }

    #[test]
    fn test_stale_settle_is_ignored() {
        let (mut engine, clock, _) = abab_engine();
        let stale_session = engine.session_id();
        engine.new_game(4).unwrap();
        engine.reveal(Position(0)).unwrap();

        // A task that escaped cancellation must not touch the new session.
        engine.timers.schedule(
            clock.now(),
            Deferred::HideMismatch {
                session: stale_session,
                pair: [Position(0), Position(1)],
            },
        );
        assert!(engine.poll().is_empty());
        assert_eq!(engine.revealed(), &[Position(0)]);
    }

    #[test]
    fn test_invalid_new_game_keeps_session() {
        let (mut engine, _, _) = abab_engine();
        engine.reveal(Position(0)).unwrap();
        let id = engine.session_id();

        for size in [0, 5, 66] {
            assert!(matches!(
                engine.new_game(size),
                Err(GameError::InvalidDeckSize { .. })
            ));
        }

        assert_eq!(engine.session_id(), id);
        assert_eq!(engine.revealed(), &[Position(0)]);
    }

    #[test]
    fn test_invalid_position() {
        let (mut engine, _, _) = abab_engine();
        assert_eq!(
            engine.reveal(Position(4)).unwrap_err(),
            GameError::InvalidPosition {
                position: 4,
                deck_size: 4
            }
        );
    }

    #[test]
    fn test_bad_timestamp_format_falls_back() {
        let clock = ManualClock::new();
        let mut engine = MatchEngineBuilder::new()
            .config(EngineConfig::default().with_timestamp_format("%Q"))
            .clock(clock)
            .build(KvHistoryStore::new(MemoryKvStore::new(), "h"))
            .unwrap();
        engine.deal(Deck::from_tokens(["A", "A"]).unwrap()).unwrap();

        engine.reveal(Position(0)).unwrap();
        let outcome = engine.reveal(Position(1)).unwrap();

        let RevealOutcome::Won { entry, .. } = outcome else {
            panic!("expected win, got {outcome:?}");
        };
        assert!(!entry.timestamp.is_empty());
    }

    #[test]
    fn test_snapshot_restore() {
        let (mut engine, _, _) = abab_engine();
        engine.reveal(Position(0)).unwrap();
        engine.reveal(Position(2)).unwrap();
        engine.reveal(Position(1)).unwrap();

        let bytes = engine.snapshot().to_bytes().unwrap();
        engine.new_game(16).unwrap();

        engine.restore(SessionSnapshot::from_bytes(&bytes).unwrap()).unwrap();
        assert_eq!(engine.deck_size(), 4);
        assert_eq!(engine.revealed(), &[Position(1)]);
        assert_eq!(engine.matched().len(), 2);

        let outcome = engine.reveal(Position(3)).unwrap();
        assert!(matches!(outcome, RevealOutcome::Won { .. }));
    }

    #[test]
    fn test_snapshot_drops_settling_pair() {
        let (mut engine, _, _) = abab_engine();
        engine.reveal(Position(0)).unwrap();
        engine.reveal(Position(1)).unwrap();

        let snapshot = engine.snapshot();
        assert_eq!(snapshot.revealed, None);

        engine.restore(snapshot).unwrap();
        assert!(engine.revealed().is_empty());
        assert_eq!(engine.next_deadline(), None);
    }
}
