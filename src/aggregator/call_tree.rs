//! Aggregated call tree for a single thread.
//!
//! Every sample is a call chain (outermost frame first). Inserting a chain
//! walks the tree from the root, creating nodes for unseen frames, and bumps
//! the self count of the node where the chain ends. Inclusive counts are never
//! stored; they are summed on demand because the tree keeps changing while
//! sampling is in progress.
//!
//! Example: the chains `main;work;io`, `main;work;io` and `main;idle` produce
//!
//! ```text
//! (root)
//!   main        total 3
//!     work      total 2
//!       io      self 2
//!     idle      self 1
//! ```

use crate::utils::config::UNKNOWN_FRAME;
use std::collections::HashMap;

/// One function's position in a thread's call tree
///
/// **Public** - built by the session, read by the renderers
#[derive(Debug, Default)]
pub struct CallTreeNode {
    /// Function name (`None` only for the synthetic root)
    name: Option<String>,

    /// Callees keyed by function name
    children: HashMap<String, CallTreeNode>,

    /// Samples whose chain ended exactly at this node
    self_count: u64,
}

impl CallTreeNode {
    /// Create an empty, unnamed root
    pub fn root() -> Self {
        Self::default()
    }

    fn named(name: &str) -> Self {
        Self {
            name: Some(name.to_string()),
            children: HashMap::new(),
            self_count: 0,
        }
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Name used for sorting and display; the root has none
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(UNKNOWN_FRAME)
    }

    pub fn self_count(&self) -> u64 {
        self.self_count
    }

    /// Direct children in unspecified order
    pub fn children(&self) -> impl Iterator<Item = &CallTreeNode> {
        self.children.values()
    }

    pub fn child(&self, name: &str) -> Option<&CallTreeNode> {
        self.children.get(name)
    }

    pub fn child_count(&self) -> usize {
        self.children.len()
    }

    /// True when nothing was ever recorded below this node
    pub fn is_empty(&self) -> bool {
        self.self_count == 0 && self.children.is_empty()
    }

    /// Record one sample
    ///
    /// **Public** - main entry point for aggregation
    ///
    /// # Arguments
    /// * `frames` - Frame names, outermost caller first. An empty chain
    ///   counts against this node itself.
    ///
    /// Empty names are stored under the unknown-frame placeholder. The count
    /// is bumped only once the whole path exists, so totals never observe a
    /// half-inserted sample.
    pub fn insert_chain<I, S>(&mut self, frames: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut node = self;
        for frame in frames {
            let name = frame_name(Some(frame.as_ref()));
            node = node
                .children
                .entry(name.to_string())
                .or_insert_with(|| CallTreeNode::named(name));
        }
        node.self_count += 1;
    }

    /// Inclusive sample count: own samples plus everything below
    pub fn total_samples(&self) -> u64 {
        let mut total = 0;
        let mut pending = vec![self];

        while let Some(node) = pending.pop() {
            total += node.self_count;
            pending.extend(node.children.values());
        }

        total
    }

    /// Share of `total` spent in this node and its callees, in percent
    pub fn percent(&self, total: u64) -> f64 {
        percent_of(self.total_samples(), total)
    }

    /// Depth of the deepest node below this one (0 for a leaf)
    pub fn max_depth(&self) -> usize {
        let mut deepest = 0;
        let mut pending = vec![(self, 0usize)];

        while let Some((node, depth)) = pending.pop() {
            deepest = deepest.max(depth);
            pending.extend(node.children.values().map(|child| (child, depth + 1)));
        }

        deepest
    }
}

// Deep stacks would otherwise recurse once per level in drop glue.
impl Drop for CallTreeNode {
    fn drop(&mut self) {
        let mut pending: Vec<CallTreeNode> =
            self.children.drain().map(|(_, child)| child).collect();
        while let Some(mut node) = pending.pop() {
            pending.extend(node.children.drain().map(|(_, child)| child));
        }
    }
}

/// Map a possibly unresolved frame name to the name stored in the tree
///
/// **Public** - used by every sample source before insertion
pub fn frame_name(name: Option<&str>) -> &str {
    match name {
        Some(name) if !name.is_empty() => name,
        _ => UNKNOWN_FRAME,
    }
}

/// `100 * samples / total`, defined as zero for an empty total
pub fn percent_of(samples: u64, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    100.0 * samples as f64 / total as f64
}
