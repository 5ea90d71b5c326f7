//! gdbprof
//!
//! Wall-clock sampling profiler driven through GDB/MI.
//!
//! The target is repeatedly stopped, every thread's stack is read, and the
//! observed call chains are aggregated into one call tree per thread. The
//! result is printed as a percentage-annotated tree:
//!
//! ```text
//! Thread: 1 (server) - 1800 samples
//!
//! + 100.00% main
//!   + 71.22% serve
//!   | + 70.89% handle_request
//!   + 28.78% poll_wait
//! ```
//!
//! This crate provides the implementation behind the `gdbprof` CLI:
//!
//! ```bash
//! gdbprof profile --pid 1234 --frequency 20 --duration 30
//! gdbprof replay --file samples.jsonl --threshold 1.0
//! ```

pub mod aggregator;
pub mod commands;
pub mod debugger;
pub mod output;
pub mod parser;
pub mod utils;
