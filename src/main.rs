//! gdbprof CLI
//!
//! A wall-clock sampling profiler for running processes.
//! Attaches gdb, samples every thread's stack and prints a call tree per thread.

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use env_logger::Env;
use std::path::PathBuf;

use gdbprof::commands::{
    display_version, execute_profile, execute_replay, ProfileArgs, ReplayArgs,
};
use gdbprof::output::ReportOptions;
use gdbprof::utils::config::{
    DEFAULT_DURATION_SECS, DEFAULT_FREQUENCY, DEFAULT_GDB, DEFAULT_THRESHOLD, GDB_ENV_VAR,
};

/// gdbprof - sampling call-tree profiler
#[derive(Parser, Debug)]
#[command(name = "gdbprof")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

/// Report options shared by `profile` and `replay`
#[derive(Args, Debug)]
struct ReportFlags {
    /// Subtrees below this percentage are listed but not expanded
    #[arg(short, long, default_value_t = DEFAULT_THRESHOLD, allow_negative_numbers = true)]
    threshold: f64,

    /// Build bottom-up trees (innermost frame at the top)
    #[arg(long)]
    inverted: bool,

    /// Number of most frequent complete call chains to list per thread
    #[arg(long, default_value = "0")]
    top_chains: usize,

    /// Show raw sample counts instead of percentages
    #[arg(long)]
    counts: bool,

    /// Also write the report to this file
    #[arg(short, long)]
    output: Option<PathBuf>,
}

impl ReportFlags {
    fn options(&self) -> ReportOptions {
        ReportOptions {
            threshold: self.threshold,
            top_chains: self.top_chains,
            counts: self.counts,
        }
    }
}

/// Available commands
#[derive(Subcommand, Debug)]
enum Commands {
    /// Attach to a running process and profile it
    Profile {
        /// Process id to attach to
        #[arg(short, long)]
        pid: u32,

        /// Sampling frequency in Hz
        #[arg(short, long, default_value_t = DEFAULT_FREQUENCY)]
        frequency: u32,

        /// Sampling duration in seconds
        #[arg(short, long, default_value_t = DEFAULT_DURATION_SECS)]
        duration: u64,

        /// gdb executable
        #[arg(long, env = GDB_ENV_VAR, default_value = DEFAULT_GDB)]
        gdb: PathBuf,

        /// Do not print progress dots or listen for Enter
        #[arg(long)]
        no_progress: bool,

        #[command(flatten)]
        report: ReportFlags,
    },

    /// Aggregate a recorded sample file (JSON Lines)
    Replay {
        /// Sample file to read
        #[arg(long)]
        file: PathBuf,

        #[command(flatten)]
        report: ReportFlags,
    },

    /// Display version information
    Version,
}

fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Setup logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(log_level)).init();

    // Execute command
    match cli.command {
        Commands::Profile {
            pid,
            frequency,
            duration,
            gdb,
            no_progress,
            report,
        } => {
            let args = ProfileArgs {
                pid,
                frequency,
                duration_secs: duration,
                gdb,
                inverted: report.inverted,
                report: report.options(),
                output: report.output,
                progress: !no_progress,
            };

            execute_profile(args)?;
        }

        Commands::Replay { file, report } => {
            let args = ReplayArgs {
                input: file,
                inverted: report.inverted,
                report: report.options(),
                output: report.output,
            };

            execute_replay(args)?;
        }

        Commands::Version => {
            display_version();
        }
    }

    Ok(())
}
