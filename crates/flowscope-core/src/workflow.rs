//! Immutable snapshot of one workflow's node set.
//!
//! [`Workflow`] is what the graph loader hands to the analysis: the complete
//! node list of one workflow, keyed by id in insertion order. It performs no
//! validation beyond id dedup -- dangling edge ids are tolerated everywhere
//! downstream, per the model's invariants.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::id::NodeId;
use crate::node::{FlowNode, NodeKind};

/// Insertion-ordered node map for one workflow.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Workflow {
    nodes: IndexMap<NodeId, FlowNode>,
}

impl Workflow {
    /// Builds a snapshot from a node list. When the list carries duplicate
    /// ids the first occurrence wins and later ones are dropped.
    pub fn from_nodes(nodes: impl IntoIterator<Item = FlowNode>) -> Self {
        let mut map = IndexMap::new();
        for node in nodes {
            map.entry(node.id).or_insert(node);
        }
        Workflow { nodes: map }
    }

    /// Looks up a node by id.
    pub fn get(&self, id: NodeId) -> Option<&FlowNode> {
        self.nodes.get(&id)
    }

    /// Returns `true` if the workflow contains the id.
    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    /// The first node whose kind is Start, if any.
    pub fn start_id(&self) -> Option<NodeId> {
        self.nodes
            .values()
            .find(|node| node.kind() == NodeKind::Start)
            .map(|node| node.id)
    }

    /// Iterates nodes in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &FlowNode> {
        self.nodes.values()
    }

    /// Consumes the snapshot, yielding the owned node map.
    pub fn into_nodes(self) -> IndexMap<NodeId, FlowNode> {
        self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
