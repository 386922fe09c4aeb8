//! Time sources the profiler measures against.
//!
//! Production code uses [`MonotonicClock`]. Tests and simulated workloads
//! use [`ManualClock`], which only moves when told to.

use std::cell::Cell;
use std::rc::Rc;
use std::time::{Duration, Instant};

/// A monotonic nanosecond time source
pub trait Clock {
    /// Nanoseconds elapsed since a fixed, arbitrary origin. Never decreases.
    fn now_ns(&self) -> u64;

    /// Let `nanos` nanoseconds pass.
    fn idle(&self, nanos: u64) {
        std::thread::sleep(Duration::from_nanos(nanos));
    }
}

/// Wall-clock backed time source built on [`Instant`]
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now_ns(&self) -> u64 {
        u64::try_from(self.origin.elapsed().as_nanos()).unwrap_or(u64::MAX)
    }
}

/// Manually driven time source.
///
/// Clones share the same counter, so a test can keep one handle and
/// advance time while the profiler owns another.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Rc<Cell<u64>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn starting_at(nanos: u64) -> Self {
        Self {
            now: Rc::new(Cell::new(nanos)),
        }
    }

    /// Move time forward by `nanos`
    pub fn advance(&self, nanos: u64) {
        self.now.set(self.now.get().saturating_add(nanos));
    }
}

impl Clock for ManualClock {
    fn now_ns(&self) -> u64 {
        self.now.get()
    }

    fn idle(&self, nanos: u64) {
        self.advance(nanos);
    }
}
