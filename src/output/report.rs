//! JSON report schema for a call tree.
//!
//! Schema is versioned to allow future evolution.

use crate::profiler::{CallTree, NodeId};
use crate::utils::config::REPORT_SCHEMA_VERSION;
use serde::{Deserialize, Serialize};

/// Top-level report written to JSON
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallTreeReport {
    /// Schema version for compatibility checking
    pub version: String,

    pub root_label: String,

    /// RFC 3339 timestamp of when the report was generated
    pub generated_at: String,

    pub root: ReportNode,
}

/// One call-tree node with its statistics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportNode {
    pub label: String,

    /// Number of samples recorded
    #[serde(default)]
    pub count: usize,

    #[serde(default)]
    pub total_ns: u64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub average_ns: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_ns: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_ns: Option<u64>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<ReportNode>,
}

impl CallTreeReport {
    /// Snapshot `tree`, stamped with the current time
    pub fn from_tree(tree: &CallTree) -> Self {
        Self {
            version: REPORT_SCHEMA_VERSION.to_string(),
            root_label: tree.root_label().to_string(),
            generated_at: chrono::Utc::now().to_rfc3339(),
            root: build_node(tree, tree.root()),
        }
    }

    /// Look up a node by its label path below the root
    pub fn find(&self, path: &[&str]) -> Option<&ReportNode> {
        path.iter().try_fold(&self.root, |node, label| {
            node.children.iter().find(|child| child.label == *label)
        })
    }
}

fn build_node(tree: &CallTree, id: NodeId) -> ReportNode {
    let node = tree.get(id);
    let stats = tree.stats(id);
    ReportNode {
        label: node.map(|n| n.label().to_string()).unwrap_or_default(),
        count: stats.map(|s| s.count).unwrap_or(0),
        total_ns: stats.map(|s| s.total_ns).unwrap_or(0),
        average_ns: stats.map(|s| s.average_ns),
        min_ns: stats.map(|s| s.min_ns),
        max_ns: stats.map(|s| s.max_ns),
        children: node
            .map(|n| n.children().iter().map(|&child| build_node(tree, child)).collect())
            .unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profiler::{ManualClock, Profiler};

    #[test]
    fn test_report_mirrors_tree() {
        let clock = ManualClock::new();
        let mut profiler = Profiler::with_clock("frame", clock.clone());
        for elapsed in [10, 30] {
            profiler.push("update");
            clock.advance(elapsed);
            profiler.pop().unwrap();
        }
        profiler.push("render");

        let report = CallTreeReport::from_tree(profiler.tree());

        assert_eq!(report.version, REPORT_SCHEMA_VERSION);
        assert_eq!(report.root_label, "frame");
        assert_eq!(report.root.count, 0);
        assert_eq!(report.root.average_ns, None);

        let update = report.find(&["update"]).unwrap();
        assert_eq!(update.count, 2);
        assert_eq!(update.average_ns, Some(20));
        assert_eq!(update.min_ns, Some(10));
        assert_eq!(update.max_ns, Some(30));

        let render = report.find(&["render"]).unwrap();
        assert_eq!(render.count, 0);
        assert!(render.average_ns.is_none());
    }
}
