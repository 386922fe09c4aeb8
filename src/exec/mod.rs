//! Executor for units, standing in for the code-loading host.

pub mod executor;
pub mod value;

pub use executor::{ExecConfig, Executor};
pub use value::Value;
