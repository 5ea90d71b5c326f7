//! Parsing of recorded sample files.
//!
//! Recorded samples replay through the same aggregation and rendering path
//! as a live profiling run.

pub mod samples;

// Re-export main types
pub use samples::{build_session, parse_samples, read_samples, SampleRecord};
