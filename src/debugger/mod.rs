//! Debugger control and the sampling loop.
//!
//! The sampler only talks to the [`Debugger`] trait; the GDB/MI driver is
//! one implementation of it, tests use scripted ones.

pub mod gdb;
pub mod mi;
pub mod sampler;

use crate::utils::error::DebuggerError;

// Re-export main types
pub use gdb::{GdbMi, GdbProcess};
pub use sampler::{Sampler, SamplerConfig, SamplingOutcome, StopReason};

/// A live debuggee thread
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThreadInfo {
    /// Debugger thread number (stable for the thread's lifetime)
    pub id: u64,

    /// Thread name, if the debugger knows one
    pub name: Option<String>,
}

/// Process control needed by the sampler
///
/// **Public** - implemented by [`GdbProcess`] and by test doubles
pub trait Debugger {
    /// Let the target run
    fn resume(&mut self) -> Result<(), DebuggerError>;

    /// Stop the target and wait until it is stopped
    ///
    /// Returns `DebuggerError::TargetExited` when the target is gone.
    fn interrupt(&mut self) -> Result<(), DebuggerError>;

    /// Threads of the stopped target
    fn threads(&mut self) -> Result<Vec<ThreadInfo>, DebuggerError>;

    /// Function names on a thread's stack, outermost caller first
    ///
    /// `None` marks a frame whose function could not be resolved.
    fn call_chain(&mut self, thread_id: u64) -> Result<Vec<Option<String>>, DebuggerError>;

    /// Release the target and let it continue on its own
    fn detach(&mut self) -> Result<(), DebuggerError>;
}
