//! Per-thread profiles collected during one profiling run.

use super::call_tree::CallTreeNode;
use chrono::{DateTime, Utc};
use log::debug;
use std::collections::BTreeMap;

/// Direction in which call chains are inserted into the tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChainOrder {
    /// Outermost caller at the top (top-down call tree)
    #[default]
    CallerFirst,

    /// Innermost frame at the top (bottom-up, who-calls-the-hot-function view)
    CalleeFirst,
}

/// Samples observed for one debuggee thread
#[derive(Debug)]
pub struct ThreadProfile {
    thread_id: u64,
    display_name: String,
    root: CallTreeNode,
}

impl ThreadProfile {
    pub fn new(thread_id: u64, display_name: impl Into<String>) -> Self {
        Self {
            thread_id,
            display_name: display_name.into(),
            root: CallTreeNode::root(),
        }
    }

    pub fn thread_id(&self) -> u64 {
        self.thread_id
    }

    /// Name reported by the debugger; may be empty
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn root(&self) -> &CallTreeNode {
        &self.root
    }

    /// Number of samples recorded for this thread
    pub fn total_samples(&self) -> u64 {
        self.root.total_samples()
    }
}

/// All thread profiles of one profiling invocation
///
/// **Public** - filled by the sampler or a replayed sample file, read once
/// for rendering
#[derive(Debug)]
pub struct ProfileSession {
    threads: BTreeMap<u64, ThreadProfile>,
    order: ChainOrder,
    started_at: DateTime<Utc>,
}

impl Default for ProfileSession {
    fn default() -> Self {
        Self::new()
    }
}

impl ProfileSession {
    pub fn new() -> Self {
        Self::with_order(ChainOrder::default())
    }

    pub fn with_order(order: ChainOrder) -> Self {
        Self {
            threads: BTreeMap::new(),
            order,
            started_at: Utc::now(),
        }
    }

    /// Record one observed call chain for a thread
    ///
    /// **Public** - called once per thread per sampling tick
    ///
    /// # Arguments
    /// * `thread_id` - Debugger thread number
    /// * `display_name` - Thread name, if the debugger knows one
    /// * `frames` - Frame names, outermost caller first
    ///
    /// The first sample for a thread id creates its profile. A thread first
    /// seen without a name picks up the name from a later sample.
    pub fn record_sample<S: AsRef<str>>(
        &mut self,
        thread_id: u64,
        display_name: Option<&str>,
        frames: &[S],
    ) {
        let profile = self.threads.entry(thread_id).or_insert_with(|| {
            debug!("New thread {} ({})", thread_id, display_name.unwrap_or_default());
            ThreadProfile::new(thread_id, display_name.unwrap_or_default())
        });

        if profile.display_name.is_empty() {
            if let Some(name) = display_name {
                profile.display_name = name.to_string();
            }
        }

        match self.order {
            ChainOrder::CallerFirst => profile.root.insert_chain(frames),
            ChainOrder::CalleeFirst => profile.root.insert_chain(frames.iter().rev()),
        }
    }

    /// Profiles in ascending thread id order
    pub fn threads(&self) -> impl Iterator<Item = &ThreadProfile> {
        self.threads.values()
    }

    pub fn thread(&self, thread_id: u64) -> Option<&ThreadProfile> {
        self.threads.get(&thread_id)
    }

    pub fn thread_count(&self) -> usize {
        self.threads.len()
    }

    pub fn is_empty(&self) -> bool {
        self.threads.is_empty()
    }

    /// Samples across all threads
    pub fn total_samples(&self) -> u64 {
        self.threads.values().map(ThreadProfile::total_samples).sum()
    }

    pub fn order(&self) -> ChainOrder {
        self.order
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_threads_created_lazily() {
        let mut session = ProfileSession::new();
        assert!(session.is_empty());

        session.record_sample(2, Some("worker"), &["main", "work"]);
        session.record_sample(1, Some("main"), &["main"]);
        session.record_sample(2, Some("worker"), &["main", "work"]);

        assert_eq!(session.thread_count(), 2);
        assert_eq!(session.thread(2).unwrap().total_samples(), 2);
        assert_eq!(session.total_samples(), 3);

        let ids: Vec<u64> = session.threads().map(ThreadProfile::thread_id).collect();
        assert_eq!(ids, vec![1, 2]);
    }

    #[test]
    fn test_trees_are_per_thread() {
        let mut session = ProfileSession::new();
        session.record_sample(1, None, &["a"]);
        session.record_sample(2, None, &["b"]);

        assert!(session.thread(1).unwrap().root().child("b").is_none());
        assert!(session.thread(2).unwrap().root().child("a").is_none());
    }

    #[test]
    fn test_missing_name_filled_later() {
        let mut session = ProfileSession::new();
        session.record_sample(7, None, &["main"]);
        assert_eq!(session.thread(7).unwrap().display_name(), "");

        session.record_sample(7, Some("io-loop"), &["main"]);
        session.record_sample(7, Some("renamed"), &["main"]);
        assert_eq!(session.thread(7).unwrap().display_name(), "io-loop");
    }

    #[test]
    fn test_callee_first_order() {
        let mut session = ProfileSession::with_order(ChainOrder::CalleeFirst);
        session.record_sample(1, None, &["main", "work", "io"]);

        let root = session.thread(1).unwrap().root();
        let io = root.child("io").unwrap();
        assert_eq!(io.child("work").unwrap().child("main").unwrap().self_count(), 1);
        assert_eq!(session.order(), ChainOrder::CalleeFirst);
    }
}
