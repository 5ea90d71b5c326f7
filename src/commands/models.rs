use crate::aggregator::ChainOrder;
use crate::output::ReportOptions;
use crate::utils::config::{DEFAULT_DURATION_SECS, DEFAULT_FREQUENCY, DEFAULT_GDB};
use std::path::PathBuf;

/// Arguments for the profile command
///
/// **Public** - used by main.rs to construct from CLI args
#[derive(Debug, Clone)]
pub struct ProfileArgs {
    /// Process to attach to
    pub pid: u32,

    /// Samples per second
    pub frequency: u32,

    /// Sampling duration in seconds
    pub duration_secs: u64,

    /// gdb executable
    pub gdb: PathBuf,

    /// Build bottom-up (callee first) trees
    pub inverted: bool,

    /// Rendering options
    pub report: ReportOptions,

    /// Also write the report to this file
    pub output: Option<PathBuf>,

    /// Show progress dots and accept Enter to stop early
    pub progress: bool,
}

impl Default for ProfileArgs {
    fn default() -> Self {
        Self {
            pid: 0,
            frequency: DEFAULT_FREQUENCY,
            duration_secs: DEFAULT_DURATION_SECS,
            gdb: PathBuf::from(DEFAULT_GDB),
            inverted: false,
            report: ReportOptions::default(),
            output: None,
            progress: true,
        }
    }
}

impl ProfileArgs {
    pub fn chain_order(&self) -> ChainOrder {
        chain_order(self.inverted)
    }
}

/// Arguments for the replay command
#[derive(Debug, Clone, Default)]
pub struct ReplayArgs {
    /// Recorded sample file (JSON Lines)
    pub input: PathBuf,

    /// Build bottom-up (callee first) trees
    pub inverted: bool,

    /// Rendering options
    pub report: ReportOptions,

    /// Also write the report to this file
    pub output: Option<PathBuf>,
}

impl ReplayArgs {
    pub fn chain_order(&self) -> ChainOrder {
        chain_order(self.inverted)
    }
}

fn chain_order(inverted: bool) -> ChainOrder {
    if inverted {
        ChainOrder::CalleeFirst
    } else {
        ChainOrder::CallerFirst
    }
}
