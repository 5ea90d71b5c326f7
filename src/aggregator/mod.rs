//! Aggregation of sampled call chains into per-thread call trees.
//!
//! This module turns the stream of samples into:
//! - One call tree per thread (inclusive/exclusive sample counts)
//! - Hot chain analysis (most frequently observed complete stacks)

pub mod call_tree;
pub mod metrics;
pub mod session;

// Re-export main types and functions
pub use call_tree::{frame_name, percent_of, CallTreeNode};
pub use metrics::{hot_chains, HotChain};
pub use session::{ChainOrder, ProfileSession, ThreadProfile};
