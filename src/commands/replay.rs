//! Replay command implementation.
//!
//! Aggregates a recorded sample file exactly as a live run would and prints
//! the same report.

use super::models::ReplayArgs;
use super::utils::{emit_report, validate_output, validate_report_options};
use crate::aggregator::ProfileSession;
use crate::output::format_report;
use crate::parser::{build_session, read_samples};
use anyhow::{Context, Result};
use log::info;

/// Execute the replay command
///
/// **Public** - main entry point called from main.rs
pub fn execute_replay(args: ReplayArgs) -> Result<()> {
    let session = replay_session(&args)?;

    let report = format_report(&session, &args.report);
    emit_report(&report, args.output.as_deref())?;

    Ok(())
}

/// Validate arguments, read the sample file and aggregate it
pub fn replay_session(args: &ReplayArgs) -> Result<ProfileSession> {
    validate_replay_args(args)?;

    let records = read_samples(&args.input)
        .with_context(|| format!("Failed to load samples from {}", args.input.display()))?;

    let session = build_session(&records, args.chain_order());
    info!(
        "Replayed {} samples across {} threads",
        session.total_samples(),
        session.thread_count()
    );

    Ok(session)
}

/// Validate replay arguments
pub fn validate_replay_args(args: &ReplayArgs) -> Result<()> {
    if args.input.as_os_str().is_empty() {
        anyhow::bail!("Sample file path cannot be empty");
    }

    validate_report_options(&args.report)?;
    validate_output(args.output.as_deref())?;

    Ok(())
}
