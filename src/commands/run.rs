//! Run command implementation.
//!
//! The run command:
//! 1. Loads (and optionally instruments) the units
//! 2. Calls the entry function the requested number of times
//! 3. Renders the call tree
//! 4. Writes the optional JSON report and flamegraph

use super::models::RunArgs;
use crate::exec::{ExecConfig, Executor};
use crate::flamegraph::{collapsed_stacks, generate_flamegraph, generate_text_summary};
use crate::instrument::{instrument, Unit};
use crate::output::{write_report, write_svg, CallTreeReport};
use crate::profiler::{Profiler, ProfilerConfig};
use crate::utils::config::PATH_SEPARATOR;
use anyhow::{Context, Result};
use log::{debug, info, warn};
use std::time::Instant;

/// Execute the run command and return the text dump
pub fn execute_run(args: &RunArgs) -> Result<String> {
    let start_time = Instant::now();

    let mut units = Vec::with_capacity(args.inputs.len());
    for path in &args.inputs {
        let bytes = std::fs::read(path)
            .with_context(|| format!("Failed to read unit {}", path.display()))?;
        let mut unit = Unit::from_bytes(&bytes)
            .with_context(|| format!("Invalid unit {}", path.display()))?;
        if args.instrument {
            instrument(&mut unit);
        }
        units.push(unit);
    }
    info!("Loaded {} unit(s)", units.len());

    let mut profiler =
        Profiler::from_config(&ProfilerConfig::new().with_root_label(args.root_label.as_str()));
    let config = ExecConfig::default().with_max_steps(args.max_steps);
    let mut executor = Executor::new(&units, &mut profiler).with_config(config);

    for i in 0..args.repeat {
        let value = executor
            .call(&args.entry, &args.args)
            .with_context(|| format!("Call {} of {} failed", i + 1, args.entry))?;
        debug!(
            "Call {} returned {} after {} step(s)",
            i + 1,
            value,
            executor.steps()
        );
    }

    if profiler.depth() > 0 {
        warn!(
            "{} frame(s) still open after the run: {}",
            profiler.depth(),
            profiler.active_path().join(" > ")
        );
    }

    if let Some(path) = &args.report {
        let report = CallTreeReport::from_tree(profiler.tree());
        write_report(&report, path).context("Failed to write report JSON")?;
        info!("✓ Report written to: {}", path.display());
    }

    let stacks = collapsed_stacks(profiler.tree());
    if let Some(path) = &args.flamegraph {
        let svg = generate_flamegraph(&stacks, args.flamegraph_config.as_ref())
            .context("Failed to generate flamegraph")?;
        write_svg(&svg, path).context("Failed to write flamegraph SVG")?;
        info!("✓ Flamegraph written to: {}", path.display());
    }

    let mut output = profiler.dump();
    if args.top_stacks > 0 {
        output.push_str("\n\n");
        output.push_str(&generate_text_summary(&stacks, args.top_stacks));
    }

    info!(
        "Run completed in {:.2}s",
        start_time.elapsed().as_secs_f64()
    );
    Ok(output)
}

/// Validate run arguments
pub fn validate_args(args: &RunArgs) -> Result<()> {
    if args.inputs.is_empty() {
        anyhow::bail!("At least one input unit is required");
    }

    match args.entry.rsplit_once(PATH_SEPARATOR) {
        Some((type_name, name)) if !type_name.is_empty() && !name.is_empty() => {}
        _ => anyhow::bail!("Entry must be written as Type{}name", PATH_SEPARATOR),
    }

    if args.repeat == 0 {
        anyhow::bail!("repeat must be greater than 0");
    }

    if args.max_steps == 0 {
        anyhow::bail!("max_steps must be greater than 0");
    }

    if args.root_label.is_empty() {
        anyhow::bail!("Root label cannot be empty");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn valid_args() -> RunArgs {
        RunArgs {
            inputs: vec![PathBuf::from("unit.json")],
            entry: "Game::tick".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_validate_args_valid() {
        assert!(validate_args(&valid_args()).is_ok());
    }

    #[test]
    fn test_validate_args_no_inputs() {
        let args = RunArgs {
            inputs: vec![],
            ..valid_args()
        };
        assert!(validate_args(&args).is_err());
    }

    #[test]
    fn test_validate_args_bare_entry() {
        let args = RunArgs {
            entry: "tick".to_string(),
            ..valid_args()
        };
        assert!(validate_args(&args).is_err());
    }

    #[test]
    fn test_validate_args_zero_repeat() {
        let args = RunArgs {
            repeat: 0,
            ..valid_args()
        };
        assert!(validate_args(&args).is_err());
    }

    #[test]
    fn test_validate_args_empty_root_label() {
        let args = RunArgs {
            root_label: String::new(),
            ..valid_args()
        };
        assert!(validate_args(&args).is_err());
    }
}
