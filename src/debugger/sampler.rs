//! Wall-clock sampling loop.
//!
//! Each tick lets the target run for one sampling period, stops it, and
//! records the call chain of every thread. Whatever was collected is kept
//! when sampling ends early, whether through cancellation, target exit or a
//! debugger failure.

use super::Debugger;
use crate::aggregator::{frame_name, ProfileSession};
use crate::utils::error::DebuggerError;
use log::{debug, info, warn};
use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

/// Timing of a sampling run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SamplerConfig {
    /// How long the target runs between samples
    pub period: Duration,

    /// Number of sampling ticks before stopping
    pub max_ticks: u64,

    /// Print one `.` per tick to stderr
    pub progress: bool,
}

impl SamplerConfig {
    /// Derive the period and tick count from a frequency and duration
    ///
    /// Returns `None` for a zero frequency.
    pub fn from_rate(frequency: u32, duration_secs: u64) -> Option<Self> {
        let period = Duration::from_secs(1).checked_div(frequency)?;
        Some(Self {
            period,
            max_ticks: u64::from(frequency).saturating_mul(duration_secs),
            progress: false,
        })
    }

    pub fn with_progress(mut self, progress: bool) -> Self {
        self.progress = progress;
        self
    }
}

/// Why a sampling run ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopReason {
    /// All ticks were taken
    Completed,
    /// The stop flag was raised
    Cancelled,
    /// The target process exited (with gdb's stop reason)
    TargetExited(String),
    /// The debugger failed; the message describes the error
    Failed(String),
}

/// Result of a sampling run
#[derive(Debug)]
pub struct SamplingOutcome {
    /// Samples collected before the run ended
    pub session: ProfileSession,

    /// Completed ticks
    pub ticks: u64,

    /// Thread stacks that could not be read
    pub failed_samples: u64,

    pub stop_reason: StopReason,

    pub elapsed: Duration,
}

/// Drives a debugger and feeds the observed chains into a session
pub struct Sampler<'a, D: Debugger + ?Sized> {
    debugger: &'a mut D,
    config: SamplerConfig,
}

impl<'a, D: Debugger + ?Sized> Sampler<'a, D> {
    pub fn new(debugger: &'a mut D, config: SamplerConfig) -> Self {
        Self { debugger, config }
    }

    /// Sample until the tick budget is spent, `stop` is raised or the
    /// debugger gives up
    ///
    /// **Public** - main entry point for live collection
    ///
    /// The target is left stopped when this returns.
    pub fn run(&mut self, mut session: ProfileSession, stop: &AtomicBool) -> SamplingOutcome {
        let start = Instant::now();
        let mut ticks = 0;
        let mut failed_samples = 0;

        info!(
            "Sampling every {:?} for up to {} ticks",
            self.config.period, self.config.max_ticks
        );

        let stop_reason = loop {
            if ticks >= self.config.max_ticks {
                break StopReason::Completed;
            }
            if stop.load(Ordering::Relaxed) {
                info!("Sampling cancelled after {} ticks", ticks);
                break StopReason::Cancelled;
            }

            match self.sample_tick(&mut session) {
                Ok(failed) => {
                    ticks += 1;
                    failed_samples += failed;
                    if self.config.progress {
                        eprint!(".");
                        let _ = std::io::stderr().flush();
                    }
                }
                Err(DebuggerError::TargetExited(reason)) => {
                    info!("Target exited after {} ticks ({})", ticks, reason);
                    break StopReason::TargetExited(reason);
                }
                Err(e) => {
                    warn!("Sampling stopped after {} ticks: {}", ticks, e);
                    break StopReason::Failed(e.to_string());
                }
            }
        };

        if self.config.progress && ticks > 0 {
            eprintln!();
        }

        SamplingOutcome {
            session,
            ticks,
            failed_samples,
            stop_reason,
            elapsed: start.elapsed(),
        }
    }

    /// Take one sample of every thread; returns the number of unreadable stacks
    fn sample_tick(&mut self, session: &mut ProfileSession) -> Result<u64, DebuggerError> {
        self.debugger.resume()?;
        thread::sleep(self.config.period);
        self.debugger.interrupt()?;

        let mut failed = 0;
        for thread in self.debugger.threads()? {
            // The whole chain is read before the tree is touched.
            let chain = match self.debugger.call_chain(thread.id) {
                Ok(chain) => chain,
                Err(e @ DebuggerError::DebuggerExited) => return Err(e),
                Err(e) => {
                    debug!("Skipping thread {}: {}", thread.id, e);
                    failed += 1;
                    continue;
                }
            };

            let frames: Vec<&str> = chain
                .iter()
                .map(|frame| frame_name(frame.as_deref()))
                .collect();
            session.record_sample(thread.id, thread.name.as_deref(), &frames);
        }

        Ok(failed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_rate() {
        let config = SamplerConfig::from_rate(10, 180).unwrap();
        assert_eq!(config.period, Duration::from_millis(100));
        assert_eq!(config.max_ticks, 1800);
        assert!(!config.progress);
    }

    #[test]
    fn test_from_rate_zero_frequency() {
        assert!(SamplerConfig::from_rate(0, 10).is_none());
    }
}
