//! Text rendering of a call tree.
//!
//! One line per node, depth-first in creation order:
//!
//! ```text
//! |=> root
//! |   |=> frame : 1000 ns
//! |   |   |=> draw : 250 ns - 25.00%
//! ```

use super::tree::CallTree;
use crate::utils::config::{INDENT_UNIT, NODE_PREFIX};
use std::fmt::Write;

/// Render `tree` starting at its root. No trailing newline.
pub fn render(tree: &CallTree) -> String {
    let mut out = String::new();

    for (index, (id, depth)) in tree.depth_first().into_iter().enumerate() {
        let Some(node) = tree.get(id) else { continue };

        if index > 0 {
            out.push('\n');
        }
        out.push_str(&INDENT_UNIT.repeat(depth));
        out.push_str(NODE_PREFIX);
        out.push_str(node.label());

        let Some(average) = node.average_ns() else {
            continue;
        };
        // Writing into a String cannot fail
        let _ = write!(out, " : {} ns", average);

        let parent_average = node
            .parent()
            .and_then(|parent| tree.get(parent))
            .and_then(|parent| parent.average_ns());
        if let Some(parent_average) = parent_average.filter(|&avg| avg > 0) {
            let percentage = 100.0 * average as f64 / parent_average as f64;
            let _ = write!(out, " - {:.2}%", percentage);
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_render_bare_root() {
        let tree = CallTree::new("root");
        assert_eq!(render(&tree), "|=> root");
    }

    #[test]
    fn test_render_nested_with_percentages() {
        let mut tree = CallTree::new("root");
        let p = tree.get_or_create_child(tree.root(), "P");
        let c = tree.get_or_create_child(p, "C");
        tree.get_or_create_child(p, "never-popped");
        tree.record(p, 100);
        tree.record(c, 25);

        let expected = "\
|=> root
|   |=> P : 100 ns
|   |   |=> C : 25 ns - 25.00%
|   |   |=> never-popped";
        assert_eq!(render(&tree), expected);
    }

    #[test]
    fn test_render_skips_percentage_when_parent_average_is_zero() {
        let mut tree = CallTree::new("root");
        let p = tree.get_or_create_child(tree.root(), "P");
        let c = tree.get_or_create_child(p, "C");
        tree.record(p, 0);
        tree.record(c, 0);

        assert_eq!(render(&tree), "|=> root\n|   |=> P : 0 ns\n|   |   |=> C : 0 ns");
    }
}
