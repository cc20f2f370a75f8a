//! The per-request working copy of a workflow graph.
//!
//! [`WorkGraph`] owns a normalized copy of the loaded snapshot: exception
//! handler edges merged into the forward edges, editor back-pointer edges
//! stripped, set-variable outputs rewritten, and the reverse (predecessor)
//! adjacency built. The analysis mutates this copy freely -- pruning
//! predecessor edges, clearing a boundary node's forward edges -- and none of
//! it is ever written back to the source graph.

use indexmap::IndexMap;

use flowscope_core::arg::Arg;
use flowscope_core::id::NodeId;
use flowscope_core::node::{FlowNode, NodeConfig, NodeKind, VariableMode};
use flowscope_core::workflow::Workflow;

/// Mutable working copy: node arena plus predecessor adjacency, both keyed
/// by stable node id in snapshot order.
#[derive(Debug)]
pub struct WorkGraph {
    nodes: IndexMap<NodeId, FlowNode>,
    preds: IndexMap<NodeId, Vec<NodeId>>,
}

impl WorkGraph {
    /// Builds a normalized working copy from a snapshot.
    ///
    /// Normalization order matters: handler edges and back-pointer strips
    /// change the forward edges the predecessor build then reads.
    pub fn new(workflow: Workflow) -> Self {
        let mut nodes = workflow.into_nodes();

        for node in nodes.values_mut() {
            // Exception handlers join the ordinary successors, at the end.
            // A handler that is already a declared successor keeps its
            // authored position; only the missing ones are appended.
            let handlers: Vec<NodeId> = node.exception_handlers().to_vec();
            for handler in handlers {
                if !node.next_ids.contains(&handler) {
                    node.next_ids.push(handler);
                }
            }

            // The editor stores a back-pointer edge from body nodes to their
            // loop container; it is not control flow.
            if let Some(loop_id) = node.loop_id {
                node.next_ids.retain(|next| *next != loop_id);
            }

            // A set-variable node's real write target is never observable
            // downstream; it exposes only the synthetic success flag.
            if let NodeConfig::Variable(cfg) = &mut node.config {
                if cfg.mode == VariableMode::Set {
                    cfg.output_args = vec![Arg::success_flag()];
                }
            }
        }

        let mut preds: IndexMap<NodeId, Vec<NodeId>> = IndexMap::new();
        let edges: Vec<(NodeId, Vec<NodeId>)> = nodes
            .values()
            .map(|node| (node.id, node.next_ids.to_vec()))
            .collect();
        for (source, nexts) in edges {
            for next in nexts {
                if !nodes.contains_key(&next) {
                    continue;
                }
                let entry = preds.entry(next).or_default();
                if !entry.contains(&source) {
                    entry.push(source);
                }
            }
        }

        WorkGraph { nodes, preds }
    }

    pub fn node(&self, id: NodeId) -> Option<&FlowNode> {
        self.nodes.get(&id)
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    /// The first Start node in snapshot order, if any.
    pub fn start_id(&self) -> Option<NodeId> {
        self.nodes
            .values()
            .find(|node| node.kind() == NodeKind::Start)
            .map(|node| node.id)
    }

    /// Predecessors of a node. Empty for unknown ids.
    pub fn preds(&self, id: NodeId) -> &[NodeId] {
        self.preds.get(&id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Forward edges of a node. Empty for unknown ids.
    pub fn next(&self, id: NodeId) -> &[NodeId] {
        self.nodes
            .get(&id)
            .map(|node| node.next_ids.as_slice())
            .unwrap_or(&[])
    }

    /// Removes and returns a node's predecessor list.
    pub fn take_preds(&mut self, id: NodeId) -> Vec<NodeId> {
        self.preds.shift_remove(&id).unwrap_or_default()
    }

    /// Replaces a node's predecessor list.
    pub fn set_preds(&mut self, id: NodeId, preds: Vec<NodeId>) {
        self.preds.insert(id, preds);
    }

    /// Clears a node's forward edges in the working copy. Used on a loop's
    /// inner-end so neither the inner walk nor the sequencer leaks past the
    /// body boundary.
    pub fn clear_next(&mut self, id: NodeId) {
        if let Some(node) = self.nodes.get_mut(&id) {
            node.next_ids.clear();
        }
    }

    /// Drops from a loop node's predecessor list every node that belongs to
    /// that same loop's body, so the body's back-edge cannot re-enter the
    /// walk as an "external" predecessor.
    pub fn drop_same_loop_preds(&mut self, loop_id: NodeId) {
        let Some(list) = self.preds.get(&loop_id) else {
            return;
        };
        let kept: Vec<NodeId> = list
            .iter()
            .copied()
            .filter(|pred| {
                self.nodes
                    .get(pred)
                    .map_or(true, |node| node.loop_id != Some(loop_id))
            })
            .collect();
        self.preds.insert(loop_id, kept);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flowscope_core::arg::DataType;
    use flowscope_core::node::{
        ExceptionHandling, ExceptionPolicy, GenericConfig, StartConfig, VariableConfig,
    };
    use smallvec::smallvec;

    fn generic(id: i64, next: &[i64]) -> FlowNode {
        FlowNode::new(
            NodeId(id),
            format!("n{id}"),
            NodeConfig::Generic(GenericConfig::default()),
        )
        .with_next(next.iter().map(|&n| NodeId(n)))
    }

    fn build(nodes: Vec<FlowNode>) -> WorkGraph {
        WorkGraph::new(Workflow::from_nodes(nodes))
    }

    #[test]
    fn predecessors_follow_forward_edges() {
        let graph = build(vec![generic(1, &[2, 3]), generic(2, &[3]), generic(3, &[])]);
        assert_eq!(graph.preds(NodeId(3)), &[NodeId(1), NodeId(2)]);
        assert_eq!(graph.preds(NodeId(2)), &[NodeId(1)]);
        assert!(graph.preds(NodeId(1)).is_empty());
    }

    #[test]
    fn unknown_edge_targets_are_ignored() {
        let graph = build(vec![generic(1, &[99, 2]), generic(2, &[])]);
        assert_eq!(graph.preds(NodeId(2)), &[NodeId(1)]);
        assert!(graph.preds(NodeId(99)).is_empty());
    }

    #[test]
    fn duplicate_edges_register_one_predecessor() {
        let graph = build(vec![generic(1, &[2, 2]), generic(2, &[])]);
        assert_eq!(graph.preds(NodeId(2)), &[NodeId(1)]);
    }

    #[test]
    fn exception_handlers_are_appended_without_duplicates() {
        let mut node = generic(1, &[2]);
        node.config = NodeConfig::Generic(GenericConfig {
            on_exception: Some(ExceptionPolicy {
                kind: ExceptionHandling::ExecuteExceptionFlow,
                handler_ids: smallvec![NodeId(2), NodeId(5)],
            }),
            ..GenericConfig::default()
        });
        let graph = build(vec![node, generic(2, &[]), generic(5, &[])]);

        assert_eq!(graph.next(NodeId(1)), &[NodeId(2), NodeId(5)]);
        assert_eq!(graph.preds(NodeId(5)), &[NodeId(1)]);
    }

    #[test]
    fn handler_that_is_also_a_successor_keeps_its_position() {
        let mut node = generic(1, &[2, 3]);
        node.config = NodeConfig::Generic(GenericConfig {
            on_exception: Some(ExceptionPolicy {
                kind: ExceptionHandling::ExecuteExceptionFlow,
                handler_ids: smallvec![NodeId(2)],
            }),
            ..GenericConfig::default()
        });
        let graph = build(vec![node, generic(2, &[]), generic(3, &[])]);
        assert_eq!(graph.next(NodeId(1)), &[NodeId(2), NodeId(3)]);
    }

    #[test]
    fn non_flow_exception_policies_add_no_edges() {
        let mut node = generic(1, &[2]);
        node.config = NodeConfig::Generic(GenericConfig {
            on_exception: Some(ExceptionPolicy {
                kind: ExceptionHandling::Interrupt,
                handler_ids: smallvec![NodeId(5)],
            }),
            ..GenericConfig::default()
        });
        let graph = build(vec![node, generic(2, &[]), generic(5, &[])]);
        assert_eq!(graph.next(NodeId(1)), &[NodeId(2)]);
    }

    #[test]
    fn loop_back_pointer_edges_are_stripped() {
        let body = generic(10, &[11, 7]).with_loop(NodeId(7));
        let graph = build(vec![body, generic(11, &[]), generic(7, &[])]);
        assert_eq!(graph.next(NodeId(10)), &[NodeId(11)]);
        assert!(graph.preds(NodeId(7)).is_empty());
    }

    #[test]
    fn set_variable_outputs_become_success_flag() {
        let node = FlowNode::new(
            NodeId(4),
            "setvar",
            NodeConfig::Variable(VariableConfig {
                mode: VariableMode::Set,
                output_args: vec![Arg::new("secret", DataType::String)],
            }),
        );
        let graph = build(vec![node]);

        let outputs = graph.node(NodeId(4)).unwrap().output_args();
        assert_eq!(outputs.len(), 1);
        assert_eq!(outputs[0].name, "isSuccess");
        assert_eq!(outputs[0].data_type, Some(DataType::Boolean));
    }

    #[test]
    fn get_variable_outputs_are_untouched() {
        let node = FlowNode::new(
            NodeId(4),
            "getvar",
            NodeConfig::Variable(VariableConfig {
                mode: VariableMode::Get,
                output_args: vec![Arg::new("value", DataType::String)],
            }),
        );
        let graph = build(vec![node]);
        assert_eq!(graph.node(NodeId(4)).unwrap().output_args()[0].name, "value");
    }

    #[test]
    fn start_id_finds_start_node() {
        let start = FlowNode::new(NodeId(1), "start", NodeConfig::Start(StartConfig::default()));
        let graph = build(vec![generic(2, &[]), start]);
        assert_eq!(graph.start_id(), Some(NodeId(1)));
    }

    #[test]
    fn drop_same_loop_preds_filters_body_members() {
        let body = generic(10, &[7]).with_loop(NodeId(7));
        let outside = generic(2, &[7]);
        let mut looped = generic(7, &[]);
        looped.config = NodeConfig::Loop(Default::default());
        // Keep the body back-edge visible by not marking 10's membership in
        // next_ids strip: rebuild manually.
        let graph_nodes = vec![outside, body, looped];
        let mut graph = build(graph_nodes);
        // the strip already removed 10 -> 7; re-add to exercise the filter
        graph.set_preds(NodeId(7), vec![NodeId(2), NodeId(10)]);

        graph.drop_same_loop_preds(NodeId(7));
        assert_eq!(graph.preds(NodeId(7)), &[NodeId(2)]);
    }

    #[test]
    fn clear_next_empties_forward_edges() {
        let mut graph = build(vec![generic(1, &[2]), generic(2, &[])]);
        graph.clear_next(NodeId(1));
        assert!(graph.next(NodeId(1)).is_empty());
        // unknown id: no panic
        graph.clear_next(NodeId(99));
    }
}
