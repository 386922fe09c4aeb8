//! Flamegraph export of the call tree.
//!
//! This module converts the call tree into collapsed stacks and renders
//! them as interactive SVG flamegraphs.

pub mod generator;
pub mod stacks;

// Re-export main types
pub use generator::{generate_flamegraph, generate_text_summary, FlamegraphConfig};
pub use stacks::{collapsed_stacks, CollapsedStack};
