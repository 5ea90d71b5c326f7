//! Per-thread text report and report file writer.

use super::tree::{render, render_counts};
use crate::aggregator::{hot_chains, ProfileSession, ThreadProfile};
use crate::utils::config::{DEFAULT_THRESHOLD, UNKNOWN_THREAD_NAME};
use crate::utils::error::OutputError;
use log::{debug, info};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Rendering options shared by every thread section
#[derive(Debug, Clone, PartialEq)]
pub struct ReportOptions {
    /// Minimum percentage for a subtree to be expanded
    pub threshold: f64,

    /// Number of hot chains listed per thread (0 disables the section)
    pub top_chains: usize,

    /// Show raw inclusive counts instead of percentages
    pub counts: bool,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            top_chains: 0,
            counts: false,
        }
    }
}

/// Header line introducing a thread's tree
pub fn thread_header(profile: &ThreadProfile, total: u64) -> String {
    let name = if profile.display_name().is_empty() {
        UNKNOWN_THREAD_NAME
    } else {
        profile.display_name()
    };
    format!("Thread: {} ({}) - {} samples", profile.thread_id(), name, total)
}

/// Render one thread section
///
/// **Public** - used by the report and by callers printing a single thread
///
/// The thread total is computed once here and used as the denominator for
/// every percentage in the section.
pub fn render_thread(profile: &ThreadProfile, options: &ReportOptions) -> Vec<String> {
    let total = profile.total_samples();
    let root = profile.root();

    let mut lines = vec![String::new(), thread_header(profile, total), String::new()];

    if options.counts {
        lines.extend(render_counts(root));
    } else {
        lines.extend(render(root, total, options.threshold));
    }

    if options.top_chains > 0 {
        lines.push(String::new());
        lines.push("Hot chains:".to_string());
        for chain in hot_chains(root, total, options.top_chains) {
            lines.push(format!("{}\t{:.2}%\t{}", chain.samples, chain.percent, chain.label()));
        }
    }

    lines
}

/// Render every thread of a session, in thread id order
pub fn format_report(session: &ProfileSession, options: &ReportOptions) -> String {
    let mut report = String::new();

    for profile in session.threads() {
        for line in render_thread(profile, options) {
            report.push_str(&line);
            report.push('\n');
        }
    }

    report
}

/// Write a rendered report to a text file
///
/// **Public** - used when `--output` is given
///
/// # Errors
/// * `OutputError::WriteFailed` - I/O error during write
/// * `OutputError::InvalidPath` - Path cannot be created or is invalid
pub fn write_report(report: &str, output_path: impl AsRef<Path>) -> Result<(), OutputError> {
    let output_path = output_path.as_ref();

    info!("Writing report to: {}", output_path.display());

    validate_output_path(output_path)?;

    if let Some(parent) = output_path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            debug!("Creating parent directories: {}", parent.display());
            std::fs::create_dir_all(parent).map_err(|e| {
                OutputError::InvalidPath(format!(
                    "Cannot create directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }
    }

    let file = File::create(output_path)?;
    let mut writer = BufWriter::new(file);
    writer.write_all(report.as_bytes())?;
    writer.flush()?;

    info!("Report written successfully ({} bytes)", report.len());

    Ok(())
}

/// Validate that output path is writable
///
/// **Public** - also used for early argument validation
pub fn validate_output_path(path: &Path) -> Result<(), OutputError> {
    if path.as_os_str().is_empty() {
        return Err(OutputError::InvalidPath("Path is empty".to_string()));
    }

    if path.is_dir() {
        return Err(OutputError::InvalidPath(format!(
            "Path is a directory: {}",
            path.display()
        )));
    }

    Ok(())
}
