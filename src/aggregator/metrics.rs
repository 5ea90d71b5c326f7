//! Flat summaries derived from a call tree.
//!
//! Hot chains are the complete call chains observed most often, i.e. the
//! exact stacks the thread was sitting in when it was interrupted.

use super::call_tree::{percent_of, CallTreeNode};
use log::debug;

/// Label used for samples that had no resolvable frames at all
pub const EMPTY_CHAIN_LABEL: &str = "<no frames>";

/// A complete call chain and how often it was observed
#[derive(Debug, Clone, PartialEq)]
pub struct HotChain {
    /// Frame names, outermost first
    pub chain: Vec<String>,

    /// Samples that ended exactly on this chain
    pub samples: u64,

    /// Percentage of the thread total
    pub percent: f64,
}

impl HotChain {
    /// Chain joined with `->`
    pub fn label(&self) -> String {
        if self.chain.is_empty() {
            EMPTY_CHAIN_LABEL.to_string()
        } else {
            self.chain.join("->")
        }
    }
}

/// Calculate the most frequently observed chains of a tree
///
/// **Public** - main entry point for chain metrics
///
/// # Arguments
/// * `root` - Thread root
/// * `total` - Thread total used as the percentage denominator
/// * `top_n` - Number of chains to return
///
/// # Returns
/// Chains sorted by sample count (descending), ties by label (ascending)
pub fn hot_chains(root: &CallTreeNode, total: u64, top_n: usize) -> Vec<HotChain> {
    let mut found: Vec<(String, HotChain)> = Vec::new();
    let mut path: Vec<String> = Vec::new();
    let mut pending = vec![(root, 0usize)];

    // Pre-order walk; `depth` is the path length above the popped node.
    while let Some((node, depth)) = pending.pop() {
        path.truncate(depth);
        if let Some(name) = node.name() {
            path.push(name.to_string());
        }

        if node.self_count() > 0 {
            let chain = HotChain {
                chain: path.clone(),
                samples: node.self_count(),
                percent: percent_of(node.self_count(), total),
            };
            found.push((chain.label(), chain));
        }

        let child_depth = path.len();
        pending.extend(node.children().map(|child| (child, child_depth)));
    }

    debug!("Found {} distinct chains, keeping top {}", found.len(), top_n);

    found.sort_by(|(a_label, a), (b_label, b)| {
        b.samples.cmp(&a.samples).then_with(|| a_label.cmp(b_label))
    });

    found
        .into_iter()
        .take(top_n)
        .map(|(_, chain)| chain)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_tree() -> CallTreeNode {
        let mut root = CallTreeNode::root();
        root.insert_chain(["main", "work", "io"]);
        root.insert_chain(["main", "work", "io"]);
        root.insert_chain(["main", "idle"]);
        root.insert_chain(["main", "work"]);
        root
    }

    #[test]
    fn test_hot_chains_order() {
        let root = sample_tree();
        let chains = hot_chains(&root, root.total_samples(), 10);

        let labels: Vec<String> = chains.iter().map(HotChain::label).collect();
        assert_eq!(labels, vec!["main->work->io", "main->idle", "main->work"]);
        assert_eq!(chains[0].samples, 2);
        assert_eq!(chains[0].percent, 50.0);
    }

    #[test]
    fn test_hot_chains_truncated() {
        let root = sample_tree();
        let chains = hot_chains(&root, root.total_samples(), 1);
        assert_eq!(chains.len(), 1);
        assert_eq!(chains[0].chain, vec!["main", "work", "io"]);
    }

    #[test]
    fn test_empty_chain_label() {
        let mut root = CallTreeNode::root();
        root.insert_chain(Vec::<&str>::new());

        let chains = hot_chains(&root, 1, 5);
        assert_eq!(chains.len(), 1);
        assert_eq!(chains[0].label(), EMPTY_CHAIN_LABEL);
        assert_eq!(chains[0].percent, 100.0);
    }

    #[test]
    fn test_hot_chains_empty_tree() {
        let root = CallTreeNode::root();
        assert!(hot_chains(&root, 0, 5).is_empty());
    }
}
