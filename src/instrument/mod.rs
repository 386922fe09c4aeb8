//! Instrumentor: injects entry/exit probes into marked functions.
//!
//! This module handles:
//! - The unit representation and its JSON encoding
//! - Label selection for marked functions
//! - The rewrite pass and its `bytes -> bytes` entry point

pub mod label;
pub mod transform;
pub mod unit;

// Re-export main types and functions
pub use label::{probe_label, synthesize_label};
pub use transform::{instrument, instrument_bytes, instrument_function, InstrumentSummary, ProbeSite};
pub use unit::{BinOp, Expr, Function, Marker, Operand, Param, Receiver, Stmt, Unit, ValueType};
