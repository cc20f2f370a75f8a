//! Scope walker: the depth-first traversal that decides what a node can read.
//!
//! Runs over the cycle-broken predecessor adjacency of the target node.
//! Ordinary predecessors with declared outputs become [`PreviousNode`] views;
//! the Start node contributes the workflow inputs plus the system argument
//! set; loop boundaries promote body outputs into per-iteration slices and
//! synthesize the element/index projections visible inside the body.

use flowscope_core::arg::{Arg, BindKind, DataType};
use flowscope_core::id::NodeId;
use flowscope_core::node::{FlowNode, NodeConfig, NodeKind};

use crate::catalogue::{loop_input_key, loop_var_key, outputs_key, ArgCatalogue};
use crate::cycles::break_cycles;
use crate::graph::WorkGraph;
use crate::result::{Lineage, PreviousNode};

/// One output list under construction: views in discovery order, dedup by id
/// with the first discovery kept.
#[derive(Debug, Default)]
struct ScopeList {
    views: Vec<PreviousNode>,
    seen: indexmap::IndexSet<NodeId>,
}

impl ScopeList {
    fn push(&mut self, view: PreviousNode) {
        if self.seen.insert(view.id) {
            self.views.push(view);
        }
    }
}

/// Computes the lineage of `target` over the working copy. Ranks are left at
/// the sentinel; the display sequencer assigns them afterwards.
pub fn collect(graph: &mut WorkGraph, target: NodeId) -> Lineage {
    break_cycles(graph, target);

    let mut catalogue = ArgCatalogue::new();
    let mut global = ScopeList::default();
    let mut inner = ScopeList::default();

    let direct = graph.preds(target).to_vec();
    walk_predecessors(graph, &mut catalogue, &direct, &mut global);

    collect_loop_inner(graph, &mut catalogue, target, &mut inner);
    collect_loop_member(graph, &mut catalogue, target, &mut global);

    Lineage {
        previous_nodes: global.views,
        inner_previous_nodes: inner.views,
        arg_map: catalogue.into_map(),
    }
}

/// Depth-first walk over predecessor lists. The adjacency is a forest after
/// cycle breaking, so recursion needs no visited set of its own.
fn walk_predecessors(
    graph: &mut WorkGraph,
    catalogue: &mut ArgCatalogue,
    pred_ids: &[NodeId],
    scope: &mut ScopeList,
) {
    for &pred in pred_ids {
        let Some(node) = graph.node(pred) else {
            continue;
        };

        match node.kind() {
            NodeKind::Start => {
                let args = start_scope_args(node);
                catalogue.register(&outputs_key(pred), &args);
                scope.push(PreviousNode::new(
                    pred,
                    node.name.clone(),
                    NodeKind::Start,
                    node.loop_id,
                    args,
                ));
            }
            kind => {
                let outputs = node.output_args();
                if !outputs.is_empty() {
                    let args = outputs.to_vec();
                    catalogue.register(&outputs_key(pred), &args);
                    scope.push(PreviousNode::new(
                        pred,
                        node.name.clone(),
                        kind,
                        node.loop_id,
                        args,
                    ));
                }
            }
        }

        let upstream = graph.preds(pred).to_vec();
        if !upstream.is_empty() {
            walk_predecessors(graph, catalogue, &upstream, scope);
        }

        // Loop-entry rule: the body's first node also sees everything the
        // loop itself sees, minus the body's own back-edge.
        if let Some(loop_id) = graph.node(pred).and_then(|n| n.loop_id) {
            let is_inner_start = graph
                .node(loop_id)
                .and_then(FlowNode::inner_start)
                .map_or(false, |start| start == pred);
            if is_inner_start {
                graph.drop_same_loop_preds(loop_id);
                let loop_preds = graph.preds(loop_id).to_vec();
                walk_predecessors(graph, catalogue, &loop_preds, scope);
            }
        }
    }
}

/// Start's inputs constitute the initial scope: they are exposed as outputs,
/// with their bindings cleared, followed by the fixed system arguments.
fn start_scope_args(node: &FlowNode) -> Vec<Arg> {
    let mut args: Vec<Arg> = node
        .input_args()
        .iter()
        .map(|input| {
            let mut arg = input.clone();
            arg.bind_kind = None;
            arg.bind_value = None;
            arg
        })
        .collect();
    args.extend(Arg::system_args());
    args
}

/// Loop-exit handling when the target is itself a Loop: walk the body from
/// its inner-end, keep only body members, and promote their outputs to
/// per-iteration array slices. Also exposes the loop's variable bindings as
/// an inner view.
fn collect_loop_inner(
    graph: &mut WorkGraph,
    catalogue: &mut ArgCatalogue,
    target: NodeId,
    inner: &mut ScopeList,
) {
    let Some(node) = graph.node(target) else {
        return;
    };
    let NodeConfig::Loop(cfg) = &node.config else {
        return;
    };
    let name = node.name.clone();
    let loop_membership = node.loop_id;
    let inner_end = cfg.inner_end;
    let variable_args = cfg.variable_args.clone();

    if let Some(end) = inner_end.filter(|&end| graph.contains(end)) {
        graph.clear_next(end);
        walk_predecessors(graph, catalogue, &[end], inner);

        // Only body members of this loop stay in the inner scope.
        let kept_ids: Vec<NodeId> = inner
            .views
            .iter()
            .filter(|view| view.loop_id == Some(target))
            .map(|view| view.id)
            .collect();
        inner.views.retain(|view| view.loop_id == Some(target));
        inner.seen.retain(|id| kept_ids.contains(id));

        for view in &mut inner.views {
            promote_to_iteration_slices(view, catalogue);
        }
    }

    if !variable_args.is_empty() {
        let bindings = derive_variable_bindings(&variable_args, catalogue);
        catalogue.register(&loop_var_key(target), &bindings);
        inner.push(PreviousNode::new(
            target,
            name,
            NodeKind::Loop,
            loop_membership,
            bindings,
        ));
    }
}

/// A body node's single-iteration output is a per-iteration slice when
/// observed from the loop's exterior: record the origin type and promote.
/// The promotion is also written back to the already-catalogued entries,
/// which were registered during the inner walk.
fn promote_to_iteration_slices(view: &mut PreviousNode, catalogue: &mut ArgCatalogue) {
    for arg in &mut view.output_args {
        let origin = arg.data_type;
        let promoted = Some(origin.map_or(DataType::ArrayObject, |dt| dt.promoted()));
        arg.origin_data_type = origin;
        arg.data_type = promoted;
        let key = format!("{prefix}.{name}", prefix = view.id, name = arg.name);
        catalogue.update_type(&key, promoted, origin);
    }
}

/// Scope synthesized for a node inside loop L: per-element projections of
/// L's array inputs, the INDEX system argument, and L's variable bindings,
/// all attributed to L in the global list. When the target is the body's
/// entry node, L's own (filtered) predecessors join the walk as well.
fn collect_loop_member(
    graph: &mut WorkGraph,
    catalogue: &mut ArgCatalogue,
    target: NodeId,
    global: &mut ScopeList,
) {
    let Some(loop_id) = graph.node(target).and_then(|node| node.loop_id) else {
        return;
    };
    let Some(loop_node) = graph.node(loop_id) else {
        return;
    };
    let NodeConfig::Loop(cfg) = &loop_node.config else {
        return;
    };
    let loop_name = loop_node.name.clone();
    let inner_start = cfg.inner_start;
    let input_args = cfg.input_args.clone();
    let variable_args = cfg.variable_args.clone();

    // The body's entry node sees the loop's exterior scope directly. Walk it
    // first: the projections below resolve their references against what
    // that walk catalogues.
    if inner_start == Some(target) {
        graph.drop_same_loop_preds(loop_id);
        let loop_preds = graph.preds(loop_id).to_vec();
        walk_predecessors(graph, catalogue, &loop_preds, global);
    }

    let mut outputs = Vec::new();
    for input in &input_args {
        if input.bind_kind == Some(BindKind::Input) {
            continue;
        }
        let Some(referenced) = input
            .bind_value
            .as_deref()
            .and_then(|bind| catalogue.get(bind))
        else {
            continue;
        };
        let Some(referenced_type) = referenced.data_type.filter(DataType::is_array) else {
            continue;
        };
        let mut item = input.clone();
        item.name = format!("{}_item", input.name);
        item.data_type = Some(referenced_type.element());
        item.sub_args = referenced.sub_args.clone();
        outputs.push(item);
    }
    outputs.push(Arg::loop_index());

    if !variable_args.is_empty() {
        let bindings = derive_variable_bindings(&variable_args, catalogue);
        catalogue.register(&loop_var_key(loop_id), &bindings);
        outputs.extend(bindings);
    }
    catalogue.register(&loop_input_key(loop_id), &outputs);

    if !outputs.is_empty() {
        global.push(PreviousNode::new(
            loop_id,
            loop_name,
            NodeKind::Loop,
            None,
            outputs,
        ));
    }
}

/// Resolves a loop's variable bindings against the catalogue: Reference
/// bindings carry over the referenced argument's nested structure, and drop
/// out entirely when the reference cannot be resolved; anything else passes
/// through unchanged.
fn derive_variable_bindings(variable_args: &[Arg], catalogue: &ArgCatalogue) -> Vec<Arg> {
    let mut bindings = Vec::with_capacity(variable_args.len());
    for var in variable_args {
        if var.bind_kind == Some(BindKind::Reference) {
            let referenced = var.bind_value.as_deref().and_then(|bind| catalogue.get(bind));
            if let Some(referenced) = referenced {
                let mut bound = var.clone();
                bound.sub_args = referenced.sub_args.clone();
                bindings.push(bound);
            }
        } else {
            bindings.push(var.clone());
        }
    }
    bindings
}
