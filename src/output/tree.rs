//! Text rendering of a thread's call tree.
//!
//! ```text
//! + 100.00% main
//!   + 66.67% work
//!   | + 66.67% io
//!   + 33.33% idle
//! ```
//!
//! Children are ordered by percentage and then by name, both descending.
//! Descendants of a non-last child carry a `| ` connector; descendants of the
//! last child are indented with two spaces. Children below the threshold are
//! listed but not expanded.

use crate::aggregator::{percent_of, CallTreeNode};

/// A child with its inclusive count resolved for one render pass
struct Ranked<'a> {
    node: &'a CallTreeNode,
    name: &'a str,
    samples: u64,
    percent: f64,
}

/// A line waiting to be emitted
struct PendingLine<'a> {
    entry: Ranked<'a>,
    prefix: String,
    child_prefix: String,
}

/// Children of `node`, sorted for display
fn ranked_children(node: &CallTreeNode, total: u64) -> Vec<Ranked<'_>> {
    let mut ranked: Vec<Ranked<'_>> = node
        .children()
        .map(|child| {
            let samples = child.total_samples();
            Ranked {
                node: child,
                name: child.display_name(),
                samples,
                percent: percent_of(samples, total),
            }
        })
        .collect();

    ranked.sort_by(|a, b| {
        b.percent
            .total_cmp(&a.percent)
            .then_with(|| b.name.cmp(a.name))
    });

    ranked
}

/// Queue the sorted children of `node` so the first one is popped first
fn push_children<'a>(
    pending: &mut Vec<PendingLine<'a>>,
    node: &'a CallTreeNode,
    total: u64,
    prefix: &str,
) {
    let ranked = ranked_children(node, total);
    let last = ranked.len().saturating_sub(1);

    for (i, entry) in ranked.into_iter().enumerate().rev() {
        let connector = if i == last { "  " } else { "| " };
        pending.push(PendingLine {
            entry,
            prefix: prefix.to_string(),
            child_prefix: format!("{prefix}{connector}"),
        });
    }
}

/// Render a call tree as percentage-annotated lines
///
/// **Public** - main entry point for tree output
///
/// # Arguments
/// * `root` - Thread root (never printed itself)
/// * `total` - Thread total; every percentage uses this denominator
/// * `threshold` - Minimum percentage for a node to be expanded
///
/// # Returns
/// One `"{prefix}+ {percent:.2}% {name}"` line per listed node
pub fn render(root: &CallTreeNode, total: u64, threshold: f64) -> Vec<String> {
    let mut lines = Vec::new();
    let mut pending = Vec::new();
    push_children(&mut pending, root, total, "");

    while let Some(line) = pending.pop() {
        let PendingLine {
            entry,
            prefix,
            child_prefix,
        } = line;

        lines.push(format!("{}+ {:.2}% {}", prefix, entry.percent, entry.name));

        if entry.percent >= threshold {
            push_children(&mut pending, entry.node, total, &child_prefix);
        }
    }

    lines
}

// Percentages only drive ordering here, so any non-zero total works.
fn push_counted<'a>(
    pending: &mut Vec<(Ranked<'a>, usize)>,
    node: &'a CallTreeNode,
    depth: usize,
) {
    for entry in ranked_children(node, 1).into_iter().rev() {
        pending.push((entry, depth));
    }
}

/// Render a call tree with raw inclusive counts instead of percentages
///
/// Every node is listed as `"{indent}{samples} - {name}"`, two spaces of
/// indentation per level, in the same order as [`render`].
pub fn render_counts(root: &CallTreeNode) -> Vec<String> {
    let mut lines = Vec::new();
    let mut pending = Vec::new();
    push_counted(&mut pending, root, 0);

    while let Some((entry, depth)) = pending.pop() {
        lines.push(format!("{}{} - {}", "  ".repeat(depth), entry.samples, entry.name));
        push_counted(&mut pending, entry.node, depth + 1);
    }

    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_render_empty_tree() {
        let root = CallTreeNode::root();
        assert!(render(&root, 0, 0.0).is_empty());
    }

    #[test]
    fn test_render_zero_total() {
        let mut root = CallTreeNode::root();
        root.insert_chain(["main"]);
        assert_eq!(render(&root, 0, 0.0), vec!["+ 0.00% main"]);
    }

    #[test]
    fn test_tie_break_is_descending_name() {
        let mut root = CallTreeNode::root();
        root.insert_chain(["alpha"]);
        root.insert_chain(["zeta"]);
        for _ in 0..8 {
            root.insert_chain(["rest"]);
        }

        let lines = render(&root, 10, 0.0);
        assert_eq!(
            lines,
            vec!["+ 80.00% rest", "+ 10.00% zeta", "+ 10.00% alpha"]
        );
    }

    #[test]
    fn test_below_threshold_not_expanded() {
        let mut root = CallTreeNode::root();
        root.insert_chain(["rare", "leaf"]);
        for _ in 0..199 {
            root.insert_chain(["busy"]);
        }

        let lines = render(&root, 200, 1.0);
        assert_eq!(lines, vec!["+ 99.50% busy", "+ 0.50% rare"]);
    }

    #[test]
    fn test_threshold_is_inclusive() {
        let mut root = CallTreeNode::root();
        root.insert_chain(["a", "b"]);
        root.insert_chain(["c"]);

        let lines = render(&root, 2, 50.0);
        assert_eq!(lines, vec!["+ 50.00% c", "+ 50.00% a", "  + 50.00% b"]);
    }

    #[test]
    fn test_last_child_prefix() {
        let mut root = CallTreeNode::root();
        root.insert_chain(["top", "first", "x"]);
        root.insert_chain(["top", "first", "x"]);
        root.insert_chain(["top", "second", "y"]);

        let lines = render(&root, 3, 0.0);
        assert_eq!(
            lines,
            vec![
                "+ 100.00% top",
                "  + 66.67% first",
                "  | + 66.67% x",
                "  + 33.33% second",
                "    + 33.33% y",
            ]
        );
    }

    #[test]
    fn test_render_is_deterministic() {
        let mut root = CallTreeNode::root();
        for name in ["d", "b", "a", "c", "e"] {
            root.insert_chain(["main", name]);
        }

        let first = render(&root, 5, 0.0);
        for _ in 0..10 {
            assert_eq!(render(&root, 5, 0.0), first);
        }
    }

    #[test]
    fn test_render_counts() {
        let mut root = CallTreeNode::root();
        root.insert_chain(["main", "work", "io"]);
        root.insert_chain(["main", "work", "io"]);
        root.insert_chain(["main", "idle"]);

        assert_eq!(
            render_counts(&root),
            vec!["3 - main", "  2 - work", "    2 - io", "  1 - idle"]
        );
    }

    #[test]
    fn test_render_deep_chain() {
        let frames: Vec<String> = (0..10_000).map(|i| format!("f{i}")).collect();
        let mut root = CallTreeNode::root();
        root.insert_chain(&frames);

        let lines = render(&root, 1, 0.0);
        assert_eq!(lines.len(), 10_000);
        assert_eq!(lines[0], "+ 100.00% f0");
        assert!(lines[9_999].ends_with("+ 100.00% f9999"));
    }
}
