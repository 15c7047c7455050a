//! Time sources.
//!
//! The engine reads time in two forms: a monotonic `Instant` for settle
//! deadlines and a local wall-clock time for history timestamps. `SystemClock`
//! reads the real clocks; `ManualClock` is advanced by hand so tests can step
//! through a settle delay without sleeping.
//!
//! ```
//! use std::time::Duration;
//! use memory_match::core::{Clock, ManualClock};
//!
//! let clock = ManualClock::new();
//! let handle = clock.clone();
//! let start = clock.now();
//!
//! handle.advance(Duration::from_millis(1000));
//! assert_eq!(clock.now() - start, Duration::from_millis(1000));
//! ```

use std::cell::Cell;
use std::rc::Rc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Local};

/// Source of monotonic and wall-clock time.
pub trait Clock {
    /// Monotonic time used for scheduling.
    fn now(&self) -> Instant;

    /// Local wall-clock time used for history timestamps.
    fn wall_time(&self) -> DateTime<Local>;
}

/// The real system clocks.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn wall_time(&self) -> DateTime<Local> {
        Local::now()
    }
}

/// A hand-driven clock.
///
/// Clones share the same underlying time, so a test can keep one handle and
/// give another to the engine.
#[derive(Clone, Debug)]
pub struct ManualClock {
    now: Rc<Cell<Instant>>,
    wall: Rc<Cell<DateTime<Local>>>,
}

impl ManualClock {
    /// Start at the current system time.
    #[must_use]
    pub fn new() -> Self {
        Self::with_wall_time(Local::now())
    }

    /// Start at a fixed wall-clock time.
    #[must_use]
    pub fn with_wall_time(wall: DateTime<Local>) -> Self {
        Self {
            now: Rc::new(Cell::new(Instant::now())),
            wall: Rc::new(Cell::new(wall)),
        }
    }

    /// Move both clocks forward.
    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
        let wall = self.wall.get();
        let step = chrono::Duration::from_std(by).unwrap_or(chrono::Duration::zero());
        self.wall.set(wall + step);
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.now.get()
    }

    fn wall_time(&self) -> DateTime<Local> {
        self.wall.get()
    }
}
