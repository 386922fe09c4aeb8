//! Probe Trace CLI
//!
//! Instruments units with entry/exit probes, runs them and reports the
//! resulting call-tree timings.

use anyhow::Result;
use clap::{Parser, Subcommand};
use env_logger::Env;
use std::path::PathBuf;

use probe_trace::commands::{
    display_version, execute_inspect, execute_instrument, execute_run, validate_args,
    InstrumentArgs, RunArgs,
};
use probe_trace::exec::Value;
use probe_trace::flamegraph::FlamegraphConfig;
use probe_trace::utils::config::{DEFAULT_MAX_STEPS, DEFAULT_ROOT_LABEL, ROOT_LABEL_ENV};

/// Probe Trace - entry/exit probes and call-tree timing
#[derive(Parser, Debug)]
#[command(name = "probe-trace")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
enum Commands {
    /// Inject probes into the marked functions of a unit
    Instrument {
        /// Unit JSON file
        #[arg(short, long)]
        input: PathBuf,

        /// Output path (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Run a function and print the call-tree dump
    Run {
        /// Unit JSON files (repeatable)
        #[arg(short, long, required = true)]
        input: Vec<PathBuf>,

        /// Entry function as Type::name
        #[arg(short, long)]
        entry: String,

        /// Argument for the entry function (int, true/false); repeatable
        #[arg(short, long = "arg")]
        args: Vec<Value>,

        /// Number of times to call the entry function
        #[arg(long, default_value = "1")]
        repeat: usize,

        /// Instrument the units before running
        #[arg(long)]
        instrument: bool,

        /// Label of the call-tree root
        #[arg(long, env = ROOT_LABEL_ENV, default_value = DEFAULT_ROOT_LABEL)]
        root_label: String,

        /// Step budget per call
        #[arg(long, default_value_t = DEFAULT_MAX_STEPS)]
        max_steps: u64,

        /// Output path for the JSON report (optional)
        #[arg(long)]
        report: Option<PathBuf>,

        /// Output path for the SVG flamegraph (optional)
        #[arg(short, long)]
        flamegraph: Option<PathBuf>,

        /// Flamegraph title
        #[arg(long)]
        title: Option<String>,

        /// Flamegraph width in pixels
        #[arg(long, default_value = "1200")]
        width: usize,

        /// List the N heaviest stacks after the dump
        #[arg(long, default_value = "0")]
        top: usize,
    },

    /// Show the functions of a unit and their probe labels
    Inspect {
        /// Unit JSON file
        #[arg(short, long)]
        input: PathBuf,
    },

    /// Display version information
    Version,
}

fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Setup logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(log_level)).init();

    // Execute command
    match cli.command {
        Commands::Instrument { input, output } => {
            execute_instrument(&InstrumentArgs { input, output })?;
        }

        Commands::Run {
            input,
            entry,
            args,
            repeat,
            instrument,
            root_label,
            max_steps,
            report,
            flamegraph,
            title,
            width,
            top,
        } => {
            let flamegraph_config = flamegraph.as_ref().map(|_| {
                let config = FlamegraphConfig::new().with_width(width);
                match title {
                    Some(title) => config.with_title(title),
                    None => config,
                }
            });

            let args = RunArgs {
                inputs: input,
                entry,
                args,
                repeat,
                instrument,
                root_label,
                max_steps,
                report,
                flamegraph,
                flamegraph_config,
                top_stacks: top,
            };

            // Validate args first
            validate_args(&args)?;

            println!("{}", execute_run(&args)?);
        }

        Commands::Inspect { input } => {
            println!("{}", execute_inspect(&input)?);
        }

        Commands::Version => {
            display_version();
        }
    }

    Ok(())
}
