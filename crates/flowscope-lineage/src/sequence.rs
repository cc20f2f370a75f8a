//! Display sequencer: orders lineage views to match the canvas.
//!
//! A breadth-first pass over the forward edges from the workflow's Start node
//! numbers each node by discovery; views are then sorted by that rank. Views
//! whose node the pass never reaches (a node wired in only through an
//! exception edge that normalization merged, say) keep the sentinel rank and
//! sort after everything ranked, by id.

use std::collections::VecDeque;

use indexmap::{IndexMap, IndexSet};

use flowscope_core::id::NodeId;

use crate::graph::WorkGraph;
use crate::result::PreviousNode;

/// Assigns display ranks to `views` by breadth-first order from `start`,
/// then sorts them by `(rank, id)`.
pub fn assign_ranks(graph: &WorkGraph, start: NodeId, views: &mut Vec<PreviousNode>) {
    let mut index_of: IndexMap<NodeId, usize> = IndexMap::new();
    for (idx, view) in views.iter().enumerate() {
        index_of.entry(view.id).or_insert(idx);
    }

    let mut visited: IndexSet<NodeId> = IndexSet::new();
    visited.insert(start);
    let mut queue: VecDeque<NodeId> = VecDeque::new();
    queue.push_back(start);

    let mut next_rank: u32 = 0;
    while let Some(id) = queue.pop_front() {
        if let Some(&idx) = index_of.get(&id) {
            views[idx].rank = next_rank;
            next_rank += 1;
        }
        for &next in graph.next(id) {
            if graph.contains(next) && visited.insert(next) {
                queue.push_back(next);
            }
        }
    }

    views.sort_by(|a, b| a.rank.cmp(&b.rank).then(a.id.cmp(&b.id)));
}
