//! Probe Trace
//!
//! Entry/exit probe instrumentation paired with a hierarchical timing
//! profiler.
//!
//! - [`instrument`] rewrites marked functions of a unit so they call
//!   `push(label)` on entry and `pop()` before every normal exit.
//! - [`profiler`] aggregates the resulting nested samples into a call tree
//!   and renders an indented report.
//! - [`exec`] runs units against a profiler, [`output`] and [`flamegraph`]
//!   export what was collected.
//!
//! ## Getting Started
//!
//! ```bash
//! probe-trace instrument --input unit.json --output unit.probed.json
//! probe-trace run --input unit.probed.json --entry Game::tick --repeat 10
//! ```

pub mod commands;
pub mod exec;
pub mod flamegraph;
pub mod instrument;
pub mod output;
pub mod profiler;
pub mod utils;

pub use profiler::{Profiler, ProfilerConfig};
