//! Error types for the entire crate.
//!
//! We use `thiserror` for library-style errors with custom types,
//! and `anyhow` for application-level error propagation in main.rs and commands.

use thiserror::Error;

/// Errors raised by the profiler runtime
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProfilerError {
    /// `pop` was called with no active frame; the push/pop nesting contract was broken
    #[error("cannot pop the root of profiler '{root}': pop called without a matching push")]
    PopAtRoot { root: String },
}

/// Errors that can occur while decoding or validating a unit
#[derive(Error, Debug)]
pub enum UnitError {
    #[error("JSON (de)serialization failed: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Invalid unit: {0}")]
    InvalidUnit(String),
}

/// Errors raised while executing a unit
#[derive(Error, Debug)]
pub enum ExecError {
    #[error("Unknown function: {0}")]
    UnknownFunction(String),

    #[error("Unknown variable '{name}' in {function}")]
    UnknownVariable { function: String, name: String },

    #[error("{function} expects {expected} argument(s), got {got}")]
    ArityMismatch {
        function: String,
        expected: usize,
        got: usize,
    },

    #[error("Type mismatch in {function}: {detail}")]
    TypeMismatch { function: String, detail: String },

    #[error("Uncaught throw: {0}")]
    Thrown(String),

    #[error("Step limit of {0} exceeded")]
    StepLimitExceeded(u64),

    #[error("Nesting depth limit of {0} exceeded")]
    CallDepthExceeded(usize),

    #[error(transparent)]
    Unit(#[from] UnitError),

    #[error(transparent)]
    Profiler(#[from] ProfilerError),
}

/// Errors that can occur during flamegraph generation
#[derive(Error, Debug)]
pub enum FlamegraphError {
    #[error("Empty stack data")]
    EmptyStacks,

    #[error("Flamegraph rendering failed: {0}")]
    RenderFailed(String),

    #[error("Rendered flamegraph is not valid UTF-8")]
    InvalidUtf8(#[from] std::string::FromUtf8Error),
}

/// Errors that can occur during file output
#[derive(Error, Debug)]
pub enum OutputError {
    #[error("Failed to write file: {0}")]
    WriteFailed(#[from] std::io::Error),

    #[error("Failed to serialize JSON: {0}")]
    SerializationFailed(#[from] serde_json::Error),

    #[error("Invalid output path: {0}")]
    InvalidPath(String),
}
