//! The instrumentation pass.
//!
//! For every marked function: a `push(label)` becomes the first statement,
//! a `pop` is placed right before every `return`, and one more `pop` is
//! appended when control can run off the end of the body. Nothing else in
//! the body changes. A `throw` that escapes the function is not covered.

use super::label::probe_label;
use super::unit::{Function, Stmt, Unit};
use crate::utils::error::UnitError;
use log::{debug, info, warn};

/// Probes injected into one function
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeSite {
    /// `Type::signature` of the rewritten function
    pub function: String,
    pub label: String,
    /// Number of `pop` probes placed on normal exits
    pub exit_pops: usize,
}

/// Outcome of instrumenting one unit
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstrumentSummary {
    pub sites: Vec<ProbeSite>,
    /// Marked functions skipped because they already carry probes
    pub already_instrumented: usize,
}

impl InstrumentSummary {
    pub fn changed(&self) -> bool {
        !self.sites.is_empty()
    }
}

/// Instrument every marked function of `unit` in place.
///
/// Functions that were already rewritten are left alone, so running the
/// pass twice gives the same unit as running it once.
pub fn instrument(unit: &mut Unit) -> InstrumentSummary {
    let Unit {
        type_name,
        functions,
    } = unit;
    let mut summary = InstrumentSummary::default();

    for function in functions.iter_mut() {
        if function.marker.is_none() {
            continue;
        }
        if function.instrumented {
            debug!(
                "{}::{} already instrumented, skipping",
                type_name,
                function.signature()
            );
            summary.already_instrumented += 1;
            continue;
        }
        if let Some(site) = instrument_function(type_name, function) {
            summary.sites.push(site);
        }
    }

    info!(
        "Instrumented {} function(s) in {} ({} already instrumented)",
        summary.sites.len(),
        type_name,
        summary.already_instrumented
    );
    summary
}

/// Rewrite a single function. Returns `None` when it is unmarked or already instrumented.
pub fn instrument_function(type_name: &str, function: &mut Function) -> Option<ProbeSite> {
    if function.instrumented {
        return None;
    }
    let label = probe_label(type_name, function)?;

    let body = std::mem::take(&mut function.body);
    let falls_through = block_falls_through(&body);
    let mut exit_pops = 0;

    let mut rewritten = Vec::with_capacity(body.len() + 2);
    rewritten.push(Stmt::Push {
        label: label.clone(),
    });
    rewritten.extend(insert_exit_pops(body, &mut exit_pops));
    if falls_through {
        rewritten.push(Stmt::Pop);
        exit_pops += 1;
    }

    if exit_pops == 0 {
        warn!(
            "'{}' has no normal exit; its frame is pushed but never popped",
            label
        );
    }
    debug!("Injected probes for '{}' ({} exit pop(s))", label, exit_pops);

    function.body = rewritten;
    function.instrumented = true;

    Some(ProbeSite {
        function: format!("{}::{}", type_name, function.signature()),
        label,
        exit_pops,
    })
}

/// Decode a unit, instrument it and encode it again.
///
/// When nothing needed rewriting the input bytes come back untouched.
pub fn instrument_bytes(bytes: &[u8]) -> Result<Vec<u8>, UnitError> {
    let mut unit = Unit::from_bytes(bytes)?;
    let summary = instrument(&mut unit);
    if !summary.changed() {
        return Ok(bytes.to_vec());
    }
    unit.to_bytes()
}

fn insert_exit_pops(block: Vec<Stmt>, exit_pops: &mut usize) -> Vec<Stmt> {
    let mut out = Vec::with_capacity(block.len());
    for stmt in block {
        match stmt {
            Stmt::Return { value } => {
                out.push(Stmt::Pop);
                out.push(Stmt::Return { value });
                *exit_pops += 1;
            }
            Stmt::If {
                cond,
                then,
                otherwise,
            } => out.push(Stmt::If {
                cond,
                then: insert_exit_pops(then, exit_pops),
                otherwise: insert_exit_pops(otherwise, exit_pops),
            }),
            Stmt::While { cond, body } => out.push(Stmt::While {
                cond,
                body: insert_exit_pops(body, exit_pops),
            }),
            Stmt::Loop { body } => out.push(Stmt::Loop {
                body: insert_exit_pops(body, exit_pops),
            }),
            Stmt::Try { body, handler } => out.push(Stmt::Try {
                body: insert_exit_pops(body, exit_pops),
                handler: insert_exit_pops(handler, exit_pops),
            }),
            other => out.push(other),
        }
    }
    out
}

/// Whether control can reach the end of `block`. Errs on the side of `true`.
fn block_falls_through(block: &[Stmt]) -> bool {
    block.iter().all(completes_normally)
}

fn completes_normally(stmt: &Stmt) -> bool {
    match stmt {
        Stmt::Return { .. } | Stmt::Throw { .. } | Stmt::Break => false,
        Stmt::If {
            then, otherwise, ..
        } => block_falls_through(then) || block_falls_through(otherwise),
        Stmt::Try { body, handler } => block_falls_through(body) || block_falls_through(handler),
        Stmt::Loop { body } => breaks_out(body),
        _ => true,
    }
}

/// Whether `block` holds a `break` aimed at the loop that directly encloses it
fn breaks_out(block: &[Stmt]) -> bool {
    block.iter().any(|stmt| match stmt {
        Stmt::Break => true,
        Stmt::If {
            then, otherwise, ..
        } => breaks_out(then) || breaks_out(otherwise),
        Stmt::Try { body, handler } => breaks_out(body) || breaks_out(handler),
        _ => false,
    })
}
