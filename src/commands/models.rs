use crate::exec::Value;
use crate::flamegraph::FlamegraphConfig;
use crate::utils::config::{DEFAULT_MAX_STEPS, DEFAULT_ROOT_LABEL};
use std::path::PathBuf;

/// Arguments for the run command
///
/// **Public** - used by main.rs to construct from CLI args
#[derive(Debug, Clone)]
pub struct RunArgs {
    /// Unit JSON files to load
    pub inputs: Vec<PathBuf>,

    /// Function to call, as `Type::name`
    pub entry: String,

    /// Arguments passed to the entry function
    pub args: Vec<Value>,

    /// How many times to call the entry function
    pub repeat: usize,

    /// Instrument the units before running them
    pub instrument: bool,

    /// Label of the call-tree root
    pub root_label: String,

    /// Executor step budget per call
    pub max_steps: u64,

    /// Output path for the JSON report (optional)
    pub report: Option<PathBuf>,

    /// Output path for the SVG flamegraph (optional)
    pub flamegraph: Option<PathBuf>,

    /// Flamegraph configuration
    pub flamegraph_config: Option<FlamegraphConfig>,

    /// Number of heaviest stacks to list after the dump (0 = none)
    pub top_stacks: usize,
}

impl Default for RunArgs {
    fn default() -> Self {
        Self {
            inputs: Vec::new(),
            entry: String::new(),
            args: Vec::new(),
            repeat: 1,
            instrument: false,
            root_label: DEFAULT_ROOT_LABEL.to_string(),
            max_steps: DEFAULT_MAX_STEPS,
            report: None,
            flamegraph: None,
            flamegraph_config: None,
            top_stacks: 0,
        }
    }
}

/// Arguments for the instrument command
#[derive(Debug, Clone, Default)]
pub struct InstrumentArgs {
    /// Unit JSON to rewrite
    pub input: PathBuf,

    /// Where to write the result; stdout when absent
    pub output: Option<PathBuf>,
}
