//! Result views returned by a lineage query.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use flowscope_core::arg::Arg;
use flowscope_core::id::NodeId;
use flowscope_core::node::NodeKind;

/// Rank value for views the display sequencer never reached. Sorts last.
pub const UNRANKED: u32 = u32::MAX;

/// View of one upstream node whose outputs are referenceable from the target.
///
/// Identity is the node id: the walk collapses duplicates and keeps the
/// first-discovered argument set.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviousNode {
    pub id: NodeId,
    pub name: String,
    pub kind: NodeKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loop_id: Option<NodeId>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub output_args: Vec<Arg>,
    /// Display rank assigned by the sequencer; [`UNRANKED`] until assigned.
    pub rank: u32,
}

impl PreviousNode {
    pub fn new(
        id: NodeId,
        name: impl Into<String>,
        kind: NodeKind,
        loop_id: Option<NodeId>,
        output_args: Vec<Arg>,
    ) -> Self {
        PreviousNode {
            id,
            name: name.into(),
            kind,
            loop_id,
            output_args,
            rank: UNRANKED,
        }
    }
}

/// The full answer to "what can this node read".
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lineage {
    /// Upstream nodes in global scope, in display order.
    pub previous_nodes: Vec<PreviousNode>,
    /// Loop-body nodes, populated only when the target is a Loop node.
    pub inner_previous_nodes: Vec<PreviousNode>,
    /// Flattened dotted-key catalogue of every referenceable argument.
    pub arg_map: IndexMap<String, Arg>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_views_start_unranked() {
        let view = PreviousNode::new(NodeId(3), "n3", NodeKind::Generic, None, vec![]);
        assert_eq!(view.rank, UNRANKED);
    }

    #[test]
    fn empty_lineage_is_default() {
        let lineage = Lineage::default();
        assert!(lineage.previous_nodes.is_empty());
        assert!(lineage.inner_previous_nodes.is_empty());
        assert!(lineage.arg_map.is_empty());
    }

    #[test]
    fn serde_roundtrip_lineage() {
        let mut lineage = Lineage::default();
        lineage
            .previous_nodes
            .push(PreviousNode::new(NodeId(1), "start", NodeKind::Start, None, vec![]));
        let json = serde_json::to_string(&lineage).unwrap();
        let back: Lineage = serde_json::from_str(&json).unwrap();
        assert_eq!(back.previous_nodes.len(), 1);
        assert!(json.contains("\"previousNodes\""));
        assert!(json.contains("\"innerPreviousNodes\""));
        assert!(json.contains("\"argMap\""));
    }
}
