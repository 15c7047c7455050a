//! Game rules: the reveal state machine and the engine that drives it.
//!
//! - `session`: Pure per-deck state and the reveal rule
//! - `engine`: `MatchEngine`, which adds the settle timer, history and snapshots
//! - `timer`: Cooperative deadline queue used for the settle delay
//! - `snapshot`: Serializable session state

pub mod session;
pub mod engine;
pub mod timer;
pub mod snapshot;

pub use session::{Flip, RejectReason, Session, SessionStatus, SlotState};
pub use engine::{MatchEngine, MatchEngineBuilder, RevealOutcome, Settled};
pub use timer::{TimerId, TimerQueue};
pub use snapshot::SessionSnapshot;
