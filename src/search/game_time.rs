//! Deadline tracking for search cancellation. Grounded on
//! examples/jeff-pow-Titan/src/search/game_time.rs's time-control bookkeeping,
//! simplified to the single "search deadline or stop flag" contract spec.md §4
//! requires rather than full UCI `go` time-control math (which lives in `uci.rs`).

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

pub struct Deadline {
    start: Instant,
    hard_limit: Option<Duration>,
    stop: AtomicBool,
}

impl Deadline {
    pub fn new(hard_limit: Option<Duration>) -> Self {
        Self { start: Instant::now(), hard_limit, stop: AtomicBool::new(false) }
    }

    pub fn infinite() -> Self {
        Self::new(None)
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    pub fn stop(&self) {
        self.stop.store(true, Ordering::Relaxed);
    }

    /// Checked on a node-count interval inside the search loop, never on every
    /// node, since `Instant::now()` is too slow to call per-node (spec.md §4.1).
    pub fn should_stop(&self) -> bool {
        if self.stop.load(Ordering::Relaxed) {
            return true;
        }
        match self.hard_limit {
            Some(limit) => self.start.elapsed() >= limit,
            None => false,
        }
    }
}
