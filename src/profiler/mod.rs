//! Profiler runtime: active-frame stack plus call-tree statistics.
//!
//! Instrumented code and manual call sites drive a [`Profiler`] through
//! `push`/`pop`/`profile`; `dump` turns the collected samples into an
//! indented report.

pub mod clock;
pub mod dump;
pub mod runtime;
pub mod tree;

// Re-export main types
pub use clock::{Clock, ManualClock, MonotonicClock};
pub use runtime::{FrameGuard, Profiler, ProfilerConfig};
pub use tree::{CallNode, CallTree, NodeId, NodeStats};
