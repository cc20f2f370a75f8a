//! Cycle breaking over the predecessor adjacency.
//!
//! The editor lets users draw arbitrary edges, so the predecessor structure
//! reaching a target may contain accidental cycles on top of the intentional
//! loop-body back-edge. Rather than detecting cycles reactively during the
//! walk, the predecessor edges are pruned up front: one seen-set spans the
//! entire recursive unwind, and any predecessor already seen anywhere is cut.
//!
//! The pruning is deliberately conservative. A node keeps only the first
//! position it is discovered in, so independent diamond paths into it are
//! cut as well -- after this pass every node has at most one surviving spot
//! in the predecessor structure, which is what lets the scope walker recurse
//! without its own visited set.

use indexmap::IndexSet;

use flowscope_core::id::NodeId;
use flowscope_core::node::FlowNode;

use crate::graph::WorkGraph;

/// Prunes the predecessor adjacency reachable from `target` into a DAG
/// (in fact a forest) rooted at the target.
pub fn break_cycles(graph: &mut WorkGraph, target: NodeId) {
    let mut seen = IndexSet::new();
    seen.insert(target);
    prune(graph, target, &mut seen);
}

fn prune(graph: &mut WorkGraph, id: NodeId, seen: &mut IndexSet<NodeId>) {
    // The node under scan counts as seen, so a back-edge into it is pruned
    // instead of re-entering its own predecessor list mid-scan.
    seen.insert(id);
    let candidates = graph.take_preds(id);
    let mut kept = Vec::with_capacity(candidates.len());
    for pred in candidates {
        if seen.insert(pred) {
            kept.push(pred);
            prune(graph, pred, seen);
        }
    }
    graph.set_preds(id, kept);

    // A loop's body back-edge reaches the walk through the inner-end node,
    // so its predecessor chain is scanned with the same seen-set.
    let inner_end = graph.node(id).and_then(FlowNode::inner_end);
    if let Some(end) = inner_end {
        if graph.contains(end) {
            prune(graph, end, seen);
        }
    }
}
