//! Profile command implementation.
//!
//! The profile command:
//! 1. Attaches gdb to the target process
//! 2. Samples every thread at the requested frequency
//! 3. Detaches, leaving the target running
//! 4. Renders one call tree per thread

use super::models::ProfileArgs;
use super::utils::{emit_report, validate_output, validate_report_options};
use crate::aggregator::ProfileSession;
use crate::debugger::{
    Debugger, GdbProcess, Sampler, SamplerConfig, SamplingOutcome, StopReason,
};
use crate::output::format_report;
use crate::utils::config::MAX_FREQUENCY;
use anyhow::{Context, Result};
use log::{debug, info, warn};
use std::io::IsTerminal;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

/// Execute the profile command
///
/// **Public** - main entry point called from main.rs
///
/// # Errors
/// * Invalid arguments
/// * gdb cannot be started or cannot attach
/// * Report file cannot be written
///
/// A debugger failure after sampling started is not an error: the samples
/// collected so far are still reported.
pub fn execute_profile(args: ProfileArgs) -> Result<()> {
    validate_profile_args(&args)?;

    let config = SamplerConfig::from_rate(args.frequency, args.duration_secs)
        .context("Sampling frequency must be greater than 0")?
        .with_progress(args.progress);

    info!(
        "Profiling process {} at {} Hz for {}s",
        args.pid, args.frequency, args.duration_secs
    );

    let mut gdb = GdbProcess::attach(&args.gdb, args.pid).with_context(|| {
        format!("Failed to attach {} to process {}", args.gdb.display(), args.pid)
    })?;

    let stop = Arc::new(AtomicBool::new(false));
    install_interrupt_handler(Arc::clone(&stop));
    if args.progress && std::io::stdin().is_terminal() {
        eprintln!("Press Enter to stop sampling early.");
        spawn_stop_listener(Arc::clone(&stop));
    }

    let outcome = sample(&mut gdb, config, ProfileSession::with_order(args.chain_order()), &stop);

    if let Err(e) = gdb.detach() {
        warn!("Failed to detach from process {}: {}", args.pid, e);
    }
    if let Err(e) = gdb.finish() {
        warn!("gdb did not exit cleanly: {}", e);
    }

    report_outcome(&outcome, &args)
}

/// Print (and optionally save) the report for a finished run
///
/// **Public** - a cancelled or aborted run is reported the same way as a
/// completed one
pub fn report_outcome(outcome: &SamplingOutcome, args: &ProfileArgs) -> Result<()> {
    let report = format_report(&outcome.session, &args.report);
    emit_report(&report, args.output.as_deref())?;

    eprintln!("{}", outcome_summary(outcome));

    Ok(())
}

/// Run the sampler against any debugger
///
/// **Public** - separated from gdb startup so it can run against test doubles
pub fn sample<D: Debugger + ?Sized>(
    debugger: &mut D,
    config: SamplerConfig,
    session: ProfileSession,
    stop: &AtomicBool,
) -> SamplingOutcome {
    let outcome = Sampler::new(debugger, config).run(session, stop);

    info!(
        "Collected {} samples from {} threads in {:.2}s",
        outcome.session.total_samples(),
        outcome.session.thread_count(),
        outcome.elapsed.as_secs_f64()
    );

    outcome
}

/// One-line description of how the run went
pub fn outcome_summary(outcome: &SamplingOutcome) -> String {
    let ended = match &outcome.stop_reason {
        StopReason::Completed => "completed".to_string(),
        StopReason::Cancelled => "stopped early".to_string(),
        StopReason::TargetExited(reason) => format!("target exited ({})", reason),
        StopReason::Failed(message) => format!("aborted: {}", message),
    };

    format!(
        "Profiling {} after {} ticks: {} samples across {} threads, \
         {} unreadable stacks (started {})",
        ended,
        outcome.ticks,
        outcome.session.total_samples(),
        outcome.session.thread_count(),
        outcome.failed_samples,
        outcome.session.started_at().format("%Y-%m-%d %H:%M:%S UTC")
    )
}

/// Raise `stop` on Ctrl-C; a second Ctrl-C exits immediately
///
/// Only one handler can exist per process, so a failed registration is
/// logged and sampling continues without it.
pub fn install_interrupt_handler(stop: Arc<AtomicBool>) -> bool {
    let result = ctrlc::set_handler(move || {
        if stop.swap(true, Ordering::Relaxed) {
            std::process::exit(130);
        }
        eprintln!();
        eprintln!("Interrupted, finishing the current sample...");
    });

    match result {
        Ok(()) => {
            debug!("Ctrl-C handler installed");
            true
        }
        Err(e) => {
            warn!("Ctrl-C will not stop sampling cleanly: {}", e);
            false
        }
    }
}

/// Raise `stop` when a line is read from stdin
fn spawn_stop_listener(stop: Arc<AtomicBool>) {
    thread::spawn(move || {
        let mut line = String::new();
        if std::io::stdin().read_line(&mut line).is_ok() {
            stop.store(true, Ordering::Relaxed);
        }
    });
}

/// Validate profile arguments
///
/// **Public** - can be called before execute_profile for early validation
pub fn validate_profile_args(args: &ProfileArgs) -> Result<()> {
    if args.pid == 0 {
        anyhow::bail!("A target process id is required");
    }

    if args.frequency == 0 {
        anyhow::bail!("frequency must be greater than 0");
    }

    if args.frequency > MAX_FREQUENCY {
        anyhow::bail!("frequency is too large (max {} Hz)", MAX_FREQUENCY);
    }

    if args.duration_secs == 0 {
        anyhow::bail!("duration must be greater than 0");
    }

    if args.gdb.as_os_str().is_empty() {
        anyhow::bail!("gdb path cannot be empty");
    }

    validate_report_options(&args.report)?;
    validate_output(args.output.as_deref())?;

    Ok(())
}
