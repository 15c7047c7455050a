//! Core engine types: identifiers, RNG, clocks, configuration, errors.
//!
//! Everything here is independent of the game rules and is shared by the
//! deck builder, the match engine and the history store.

pub mod ids;
pub mod rng;
pub mod clock;
pub mod config;
pub mod error;

pub use ids::{Ordinal, Position, SessionId};
pub use rng::{GameRng, GameRngState};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::EngineConfig;
pub use error::{GameError, StoreError};
