//! Arena-backed call tree.
//!
//! Every node is addressed by a [`NodeId`] into a flat `Vec`. A node is
//! identified by the path of labels from the root, so re-entering a label
//! under the same parent reuses the node instead of adding a sibling.

use std::collections::HashMap;

/// Index of a node inside a [`CallTree`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    /// The root is always the first node of the arena
    pub const ROOT: NodeId = NodeId(0);

    pub fn index(self) -> usize {
        self.0
    }
}

/// One aggregation point: all samples seen for a label under one call path
#[derive(Debug, Clone)]
pub struct CallNode {
    label: String,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    child_index: HashMap<String, NodeId>,
    samples: Vec<u64>,
}

impl CallNode {
    fn new(label: String, parent: Option<NodeId>) -> Self {
        Self {
            label,
            parent,
            children: Vec::new(),
            child_index: HashMap::new(),
            samples: Vec::new(),
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Children in the order they were first created
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Elapsed nanoseconds, in the order the pops happened
    pub fn samples(&self) -> &[u64] {
        &self.samples
    }

    /// Sum of all samples
    pub fn total_ns(&self) -> u64 {
        let total: u128 = self.samples.iter().map(|&s| u128::from(s)).sum();
        u64::try_from(total).unwrap_or(u64::MAX)
    }

    /// Truncating arithmetic mean over every sample ever recorded, if any
    pub fn average_ns(&self) -> Option<u64> {
        if self.samples.is_empty() {
            return None;
        }
        let total: u128 = self.samples.iter().map(|&s| u128::from(s)).sum();
        let average = total / self.samples.len() as u128;
        Some(u64::try_from(average).unwrap_or(u64::MAX))
    }
}

/// Summary statistics for a single node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeStats {
    pub count: usize,
    pub total_ns: u64,
    pub average_ns: u64,
    pub min_ns: u64,
    pub max_ns: u64,
}

/// Tree of historical timing statistics keyed by call path
#[derive(Debug, Clone)]
pub struct CallTree {
    nodes: Vec<CallNode>,
}

impl CallTree {
    pub fn new(root_label: impl Into<String>) -> Self {
        Self {
            nodes: vec![CallNode::new(root_label.into(), None)],
        }
    }

    pub fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    pub fn root_label(&self) -> &str {
        self.nodes[NodeId::ROOT.0].label()
    }

    /// Look up a node. Returns `None` for ids from another tree or from before a reset.
    pub fn get(&self, id: NodeId) -> Option<&CallNode> {
        self.nodes.get(id.0)
    }

    /// Number of nodes, root included
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Child of `parent` carrying `label`, if it was ever created
    pub fn child(&self, parent: NodeId, label: &str) -> Option<NodeId> {
        self.get(parent)?.child_index.get(label).copied()
    }

    /// Resolve a label path below the root, e.g. `["frame", "draw"]`
    pub fn find(&self, path: &[&str]) -> Option<NodeId> {
        path.iter()
            .try_fold(self.root(), |node, label| self.child(node, label))
    }

    /// Number of edges between the root and `id`
    pub fn depth_of(&self, id: NodeId) -> usize {
        let mut depth = 0;
        let mut current = self.get(id).and_then(CallNode::parent);
        while let Some(parent) = current {
            depth += 1;
            current = self.nodes[parent.0].parent;
        }
        depth
    }

    /// Labels from the first level below the root down to `id`
    pub fn path(&self, id: NodeId) -> Vec<&str> {
        let mut labels = Vec::new();
        let mut current = Some(id);
        while let Some(node_id) = current {
            match self.get(node_id) {
                Some(node) if node.parent.is_some() => {
                    labels.push(node.label());
                    current = node.parent;
                }
                _ => break,
            }
        }
        labels.reverse();
        labels
    }

    pub fn stats(&self, id: NodeId) -> Option<NodeStats> {
        let node = self.get(id)?;
        let average_ns = node.average_ns()?;
        Some(NodeStats {
            count: node.samples.len(),
            total_ns: node.total_ns(),
            average_ns,
            min_ns: node.samples.iter().copied().min().unwrap_or(0),
            max_ns: node.samples.iter().copied().max().unwrap_or(0),
        })
    }

    /// Every node paired with its depth, parents before children and
    /// siblings in creation order
    pub fn depth_first(&self) -> Vec<(NodeId, usize)> {
        let mut order = Vec::with_capacity(self.nodes.len());
        let mut pending = vec![(self.root(), 0)];
        while let Some((id, depth)) = pending.pop() {
            order.push((id, depth));
            for &child in self.nodes[id.0].children.iter().rev() {
                pending.push((child, depth + 1));
            }
        }
        order
    }

    pub(crate) fn get_or_create_child(&mut self, parent: NodeId, label: &str) -> NodeId {
        if let Some(existing) = self.child(parent, label) {
            return existing;
        }
        let id = NodeId(self.nodes.len());
        self.nodes.push(CallNode::new(label.to_string(), Some(parent)));
        let parent_node = &mut self.nodes[parent.0];
        parent_node.children.push(id);
        parent_node.child_index.insert(label.to_string(), id);
        id
    }

    pub(crate) fn record(&mut self, id: NodeId, elapsed_ns: u64) {
        if let Some(node) = self.nodes.get_mut(id.0) {
            node.samples.push(elapsed_ns);
        }
    }

    /// Drop every node but the root and forget the root's samples
    pub(crate) fn reset(&mut self) {
        self.nodes.truncate(1);
        let root = &mut self.nodes[NodeId::ROOT.0];
        root.children.clear();
        root.child_index.clear();
        root.samples.clear();
    }
}
