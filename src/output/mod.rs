//! Text output of profiling results.
//!
//! This module handles:
//! - Rendering call trees (percentages or raw counts)
//! - Assembling per-thread report sections
//! - Writing reports to disk

pub mod report;
pub mod tree;

// Re-export main functions
pub use report::{
    format_report, render_thread, thread_header, validate_output_path, write_report,
    ReportOptions,
};
pub use tree::{render, render_counts};
