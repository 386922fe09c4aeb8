use crate::utils::config::REPORT_SCHEMA_VERSION;

/// Display version information
pub fn display_version() {
    println!("Probe Trace v{}", env!("CARGO_PKG_VERSION"));
    println!("Report Schema: v{}", REPORT_SCHEMA_VERSION);
    println!();
    println!("Entry/exit probe instrumentation with hierarchical call-tree timing.");
}
