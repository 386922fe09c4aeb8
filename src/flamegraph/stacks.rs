//! Collapsed-stack export of a call tree.
//!
//! Collapsed stacks are the input format for flamegraph generation.
//! Format: "parent;child;grandchild weight"
//!
//! Weights are self time: a node's total minus its children's totals.

use crate::profiler::CallTree;
use log::debug;

/// A single collapsed stack entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollapsedStack {
    /// Stack trace as semicolon-separated string
    pub stack: String,

    /// Self time in nanoseconds
    pub weight: u64,
}

impl CollapsedStack {
    pub fn new(stack: String, weight: u64) -> Self {
        Self { stack, weight }
    }

    /// `stack weight`, one line of collapsed-stack input
    pub fn to_line(&self) -> String {
        format!("{} {}", self.stack, self.weight)
    }
}

/// Build collapsed stacks from a call tree, heaviest first.
///
/// Stacks start at the root label. Nodes without self time are left out.
pub fn collapsed_stacks(tree: &CallTree) -> Vec<CollapsedStack> {
    let mut stacks = Vec::new();

    for (id, depth) in tree.depth_first() {
        if depth == 0 {
            continue;
        }
        let Some(node) = tree.get(id) else { continue };

        let children_total: u64 = node
            .children()
            .iter()
            .filter_map(|&child| tree.get(child))
            .map(|child| child.total_ns())
            .fold(0u64, u64::saturating_add);
        let self_ns = node.total_ns().saturating_sub(children_total);
        if self_ns == 0 {
            continue;
        }

        let frames: Vec<String> = std::iter::once(tree.root_label())
            .chain(tree.path(id))
            .map(sanitize_frame)
            .collect();
        stacks.push(CollapsedStack::new(frames.join(";"), self_ns));
    }

    stacks.sort_by(|a, b| b.weight.cmp(&a.weight));
    debug!("Built {} collapsed stacks", stacks.len());
    stacks
}

/// Frame separators inside a label would split the frame
fn sanitize_frame(label: &str) -> String {
    label.replace(';', ",")
}
