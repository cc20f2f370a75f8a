//! Lineage analysis over visually-authored workflow graphs.
//!
//! Given a workflow snapshot and a target node, the analysis answers: which
//! upstream nodes' outputs can the target reference, and under which dotted
//! keys? The pipeline runs in fixed stages over a private working copy:
//!
//! 1. [`graph::WorkGraph`] normalizes the snapshot (exception-handler edges
//!    merged, loop back-pointers stripped, set-variable outputs rewritten)
//!    and builds the predecessor adjacency.
//! 2. [`cycles::break_cycles`] prunes accidental cycles out of the
//!    predecessor structure reaching the target.
//! 3. [`walk`] collects scope views and the argument catalogue, with the
//!    loop-boundary promotion and projection rules.
//! 4. [`sequence::assign_ranks`] orders the views to match the canvas.
//!
//! The whole analysis is pure: it never mutates the loaded snapshot and has
//! no side effects beyond its return value.

pub mod catalogue;
pub mod cycles;
pub mod error;
pub mod graph;
pub mod result;
pub mod sequence;
pub mod walk;

pub use error::LineageError;
pub use result::{Lineage, PreviousNode, UNRANKED};

use flowscope_core::id::NodeId;
use flowscope_core::node::FlowNode;
use flowscope_core::workflow::Workflow;

use graph::WorkGraph;

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

/// Source of workflow snapshots, keyed by a node that belongs to them.
///
/// Returning `Ok(None)` means the node is not part of any known workflow;
/// the service answers with an empty lineage rather than an error.
pub trait GraphLoader {
    fn workflow_nodes(&self, node: NodeId) -> Result<Option<Vec<FlowNode>>, LineageError>;
}

impl<L: GraphLoader + ?Sized> GraphLoader for &L {
    fn workflow_nodes(&self, node: NodeId) -> Result<Option<Vec<FlowNode>>, LineageError> {
        (**self).workflow_nodes(node)
    }
}

// ---------------------------------------------------------------------------
// Service
// ---------------------------------------------------------------------------

/// Front door of the analysis: loads the snapshot a node belongs to and
/// computes its lineage.
#[derive(Debug)]
pub struct LineageService<L> {
    loader: L,
}

impl<L: GraphLoader> LineageService<L> {
    pub fn new(loader: L) -> Self {
        LineageService { loader }
    }

    /// Everything `target` can read: upstream views, loop-body views when the
    /// target is a loop, and the flattened argument catalogue.
    pub fn previous_nodes(&self, target: NodeId) -> Result<Lineage, LineageError> {
        match self.loader.workflow_nodes(target)? {
            Some(nodes) => compute_lineage(nodes, target),
            None => Ok(Lineage::default()),
        }
    }
}

/// Runs the full pipeline over an already-loaded snapshot.
///
/// A snapshot without a Start node is rejected; a target id absent from the
/// snapshot yields an empty lineage.
pub fn compute_lineage(nodes: Vec<FlowNode>, target: NodeId) -> Result<Lineage, LineageError> {
    let workflow = Workflow::from_nodes(nodes);
    let mut graph = WorkGraph::new(workflow);
    let start = graph.start_id().ok_or(LineageError::StartNodeMissing)?;

    if !graph.contains(target) {
        return Ok(Lineage::default());
    }

    let mut lineage = walk::collect(&mut graph, target);
    // Only the global list is ranked; inner (loop body) views keep the
    // discovery order of the inner walk.
    sequence::assign_ranks(&graph, start, &mut lineage.previous_nodes);
    Ok(lineage)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
