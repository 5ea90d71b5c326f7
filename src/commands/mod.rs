//! CLI command implementations.
//!
//! Each command is implemented in its own module.
//! Commands orchestrate the various library components to perform user tasks.

pub mod models;
pub mod profile;
pub mod replay;
pub mod utils;

// Re-export main command functions
pub use models::{ProfileArgs, ReplayArgs};
pub use profile::{
    execute_profile, install_interrupt_handler, outcome_summary, report_outcome, sample,
    validate_profile_args,
};
pub use replay::{execute_replay, replay_session, validate_replay_args};
pub use utils::{display_version, validate_report_options};
