use crate::output::{validate_output_path, write_report, ReportOptions};
use anyhow::{Context, Result};
use std::path::Path;

/// Validate rendering options shared by all commands
pub fn validate_report_options(options: &ReportOptions) -> Result<()> {
    if !options.threshold.is_finite() {
        anyhow::bail!("threshold must be a finite number");
    }

    if options.threshold < 0.0 {
        anyhow::bail!("threshold must not be negative");
    }

    if options.top_chains > 1000 {
        anyhow::bail!("top_chains is too large (max 1000)");
    }

    Ok(())
}

/// Validate an optional report path before any work starts
pub fn validate_output(output: Option<&Path>) -> Result<()> {
    if let Some(path) = output {
        validate_output_path(path)?;
    }
    Ok(())
}

/// Print the report and optionally save it
pub fn emit_report(report: &str, output: Option<&Path>) -> Result<()> {
    print!("{}", report);

    if let Some(path) = output {
        write_report(report, path)
            .with_context(|| format!("Failed to write report to {}", path.display()))?;
        log::info!("✓ Report written to: {}", path.display());
    }

    Ok(())
}

/// Display version information
pub fn display_version() {
    println!("gdbprof v{}", env!("CARGO_PKG_VERSION"));
    println!();
    println!("A wall-clock sampling profiler driven through GDB/MI.");
}
