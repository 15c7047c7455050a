//! Python bindings for the memory-match engine.
//!
//! # Quick Start
//!
//! ```python
//! import memory_match as mm
//!
//! game = mm.MemoryGame(deck_size=16, history_dir="/tmp/memory-match")
//!
//! game.reveal(0)            # "first"
//! game.reveal(5)            # "matched", "mismatched" or "won"
//!
//! # Call from the UI loop; flips a settled mismatch back face down.
//! for first, second in game.poll():
//!     ...
//!
//! print(game.history)       # [(16, "2025-03-14 09:26:53"), ...]
//! ```

use pyo3::prelude::*;

mod py_engine;

pub use py_engine::*;

/// memory_match: engine for a single-player memory matching game.
#[pymodule]
fn memory_match(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<PyMemoryGame>()?;
    Ok(())
}
