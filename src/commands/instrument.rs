//! Instrument command implementation.
//!
//! Reads a unit, injects probes into its marked functions and writes the
//! result. Units without marked functions are copied through unchanged.

use super::models::InstrumentArgs;
use crate::instrument::instrument_bytes;
use anyhow::{Context, Result};
use log::info;
use std::io::Write;

/// Execute the instrument command
pub fn execute_instrument(args: &InstrumentArgs) -> Result<()> {
    let input = std::fs::read(&args.input)
        .with_context(|| format!("Failed to read unit {}", args.input.display()))?;

    let output = instrument_bytes(&input)
        .with_context(|| format!("Failed to instrument {}", args.input.display()))?;

    match &args.output {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("Cannot create directory {}", parent.display()))?;
            }
            std::fs::write(path, &output)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            info!("✓ Instrumented unit written to: {}", path.display());
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(&output)?;
            stdout.write_all(b"\n")?;
        }
    }

    Ok(())
}
