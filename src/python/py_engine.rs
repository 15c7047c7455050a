//! Engine bindings for Python.

use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;

use crate::core::{EngineConfig, GameError, Position, SystemClock};
use crate::history::{FileKvStore, KeyValueStore, KvHistoryStore, MemoryKvStore};
use crate::rules::{MatchEngine, MatchEngineBuilder, RevealOutcome, SessionStatus};

type PyEngine = MatchEngine<KvHistoryStore<Box<dyn KeyValueStore>>, SystemClock>;

fn to_py_err(err: GameError) -> PyErr {
    PyValueError::new_err(err.to_string())
}

/// Python wrapper for MatchEngine.
///
/// History goes to `<history_dir>/gameHistory.json` when a directory is
/// given and is kept in memory otherwise.
#[pyclass(name = "MemoryGame", unsendable)]
pub struct PyMemoryGame {
    engine: PyEngine,
}

#[pymethods]
impl PyMemoryGame {
    /// Create a game and deal the first deck.
    ///
    /// # Arguments
    /// - deck_size: Number of cards in the first deck (even)
    /// - seed: RNG seed; omit for a random seed
    /// - settle_delay_ms: How long a mismatch stays face up
    /// - history_dir: Directory for persisted history
    #[new]
    #[pyo3(signature = (deck_size = 4, seed = None, settle_delay_ms = 1000, history_dir = None))]
    fn new(
        deck_size: usize,
        seed: Option<u64>,
        settle_delay_ms: u64,
        history_dir: Option<String>,
    ) -> PyResult<Self> {
        let mut config = EngineConfig::default().with_initial_deck_size(deck_size);
        config.settle_delay_ms = settle_delay_ms;
        config.seed = seed;

        let kv: Box<dyn KeyValueStore> = match history_dir {
            Some(dir) => Box::new(FileKvStore::new(dir)),
            None => Box::new(MemoryKvStore::new()),
        };
        let store = KvHistoryStore::new(kv, config.history_key.clone());

        let engine = MatchEngineBuilder::new()
            .config(config)
            .build(store)
            .map_err(to_py_err)?;
        Ok(Self { engine })
    }

    /// Deal a new deck, discarding the current session.
    fn new_game(&mut self, deck_size: usize) -> PyResult<()> {
        self.engine.new_game(deck_size).map_err(to_py_err)?;
        Ok(())
    }

    /// Reveal a card.
    ///
    /// Returns one of "rejected", "first", "matched", "mismatched", "won".
    fn reveal(&mut self, position: usize) -> PyResult<&'static str> {
        let outcome = self.engine.reveal(Position(position)).map_err(to_py_err)?;
        Ok(match outcome {
            RevealOutcome::Rejected(_) => "rejected",
            RevealOutcome::FirstRevealed(_) => "first",
            RevealOutcome::Matched { .. } => "matched",
            RevealOutcome::Mismatched { .. } => "mismatched",
            RevealOutcome::Won { .. } => "won",
        })
    }

    /// Flip back any mismatched pair whose settle delay has passed.
    fn poll(&mut self) -> Vec<(usize, usize)> {
        self.engine
            .poll()
            .into_iter()
            .map(|s| (s.pair[0].index(), s.pair[1].index()))
            .collect()
    }

    /// Flip back a settling pair immediately.
    fn settle_now(&mut self) -> Option<(usize, usize)> {
        self.engine
            .settle_now()
            .map(|s| (s.pair[0].index(), s.pair[1].index()))
    }

    /// Seconds until `poll` has work, or None.
    fn seconds_until_poll(&self) -> Option<f64> {
        self.engine
            .next_deadline()
            .map(|due| due.saturating_duration_since(std::time::Instant::now()).as_secs_f64())
    }

    /// Number of cards.
    #[getter]
    fn deck_size(&self) -> usize {
        self.engine.deck_size()
    }

    /// Token of every card, in position order.
    #[getter]
    fn tokens(&self) -> Vec<String> {
        self.engine
            .deck()
            .iter()
            .map(|card| card.token.to_string())
            .collect()
    }

    /// Ordinal of every card, in position order.
    #[getter]
    fn ordinals(&self) -> Vec<u32> {
        self.engine
            .deck()
            .iter()
            .map(|card| card.ordinal.value())
            .collect()
    }

    /// Face-up, unpaired positions.
    #[getter]
    fn revealed(&self) -> Vec<usize> {
        self.engine.revealed().iter().map(|p| p.index()).collect()
    }

    /// Matched positions, ascending.
    #[getter]
    fn matched(&self) -> Vec<usize> {
        self.engine.matched().iter().map(|p| p.index()).collect()
    }

    /// "in_progress" or "won".
    #[getter]
    fn status(&self) -> &'static str {
        match self.engine.status() {
            SessionStatus::InProgress => "in_progress",
            SessionStatus::Won => "won",
        }
    }

    /// Won sessions as (deck_size, date) tuples, oldest first.
    #[getter]
    fn history(&self) -> Vec<(usize, String)> {
        self.engine
            .history()
            .iter()
            .map(|entry| (entry.pair_count_mode, entry.timestamp.clone()))
            .collect()
    }

    /// Whether a mismatched pair is waiting to flip back.
    #[getter]
    fn resolution_pending(&self) -> bool {
        self.engine.is_resolution_pending()
    }

    /// Most recent history persistence failure.
    #[getter]
    fn persistence_error(&self) -> Option<String> {
        self.engine.last_persistence_error().map(ToString::to_string)
    }

    fn __repr__(&self) -> String {
        format!(
            "MemoryGame(deck_size={}, matched={}, status={})",
            self.engine.deck_size(),
            self.engine.matched().len(),
            self.status()
        )
    }
}
