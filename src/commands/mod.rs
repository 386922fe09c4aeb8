//! CLI command implementations.
//!
//! Each command is implemented in its own module.
//! Commands orchestrate the various library components to perform user tasks.

pub mod inspect;
pub mod instrument;
pub mod models;
pub mod run;
pub mod utils;

// Re-export main command functions
pub use inspect::{execute_inspect, inspect_unit};
pub use instrument::execute_instrument;
pub use models::{InstrumentArgs, RunArgs};
pub use run::{execute_run, validate_args};
pub use utils::display_version;
