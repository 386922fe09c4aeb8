//! Inspect command implementation.
//!
//! Lists the functions of a unit together with the probe label each one
//! would receive.

use crate::instrument::{probe_label, Unit};
use anyhow::{Context, Result};
use std::path::Path;

/// Describe every function of `unit`, one line each
pub fn inspect_unit(unit: &Unit) -> String {
    let mut lines = vec![format!(
        "{} ({} function(s))",
        unit.type_name,
        unit.functions.len()
    )];

    for function in &unit.functions {
        let probe = match probe_label(&unit.type_name, function) {
            Some(label) if function.instrumented => format!("instrumented as \"{}\"", label),
            Some(label) => format!("marked, label \"{}\"", label),
            None => "not marked".to_string(),
        };
        lines.push(format!("  {:<32} {}", function.signature(), probe));
    }

    lines.join("\n")
}

/// Execute the inspect command
pub fn execute_inspect(input: &Path) -> Result<String> {
    let bytes =
        std::fs::read(input).with_context(|| format!("Failed to read unit {}", input.display()))?;
    let unit = Unit::from_bytes(&bytes)
        .with_context(|| format!("Invalid unit {}", input.display()))?;
    Ok(inspect_unit(&unit))
}
