//! Configuration and constants shared across the crate.

/// Label given to the call-tree root when none is configured
pub const DEFAULT_ROOT_LABEL: &str = "root";

/// One level of indentation in `Profiler::dump` output
pub const INDENT_UNIT: &str = "|   ";

/// Prefix written before every node label in `Profiler::dump` output
pub const NODE_PREFIX: &str = "|=> ";

// Separators used by synthesized labels: `Type.f()` vs `Type#g()`
pub const STATIC_SEPARATOR: char = '.';
pub const INSTANCE_SEPARATOR: char = '#';

/// Separator between a type and a function name in call targets (`Type::name`)
pub const PATH_SEPARATOR: &str = "::";

/// Current JSON report schema version
pub const REPORT_SCHEMA_VERSION: &str = "1.0.0";

/// Default instruction budget for the unit executor
pub const DEFAULT_MAX_STEPS: u64 = 1_000_000;

/// Environment variable consulted for the root label by the CLI
pub const ROOT_LABEL_ENV: &str = "PROBE_TRACE_ROOT_LABEL";
