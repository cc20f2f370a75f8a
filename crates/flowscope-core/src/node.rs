//! Workflow node model.
//!
//! A [`FlowNode`] is one unit of the authored graph: identity, display name,
//! declared forward edges, loop membership, and a per-kind configuration.
//! The configuration is a tagged union ([`NodeConfig`]) so each node kind
//! carries exactly the fields it needs -- Start declares workflow inputs,
//! Loop declares its body boundary and iteration bindings, Variable declares
//! its mode, and every other kind collapses into [`GenericConfig`].

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::arg::Arg;
use crate::id::NodeId;

/// Forward-edge list. Most nodes have one or two successors.
pub type NextIds = SmallVec<[NodeId; 4]>;

/// The kind of a node, derived from its configuration variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeKind {
    Start,
    Loop,
    Variable,
    Generic,
}

/// What a Variable node does when it executes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VariableMode {
    #[serde(rename = "SET_VARIABLE")]
    Set,
    #[serde(rename = "GET_VARIABLE")]
    Get,
}

/// What happens when a node's execution fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExceptionHandling {
    /// Divert control to the configured handler nodes.
    ExecuteExceptionFlow,
    /// Abort the whole workflow run.
    Interrupt,
    /// Swallow the failure and continue on the ordinary edges.
    IgnoreAndContinue,
}

/// Exception policy attached to a node's configuration.
///
/// Only [`ExceptionHandling::ExecuteExceptionFlow`] contributes edges to the
/// lineage analysis; the other modes do not alter the graph shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExceptionPolicy {
    pub kind: ExceptionHandling,
    #[serde(default, skip_serializing_if = "SmallVec::is_empty")]
    pub handler_ids: SmallVec<[NodeId; 2]>,
}

/// Start node configuration: the workflow's declared inputs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartConfig {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub input_args: Vec<Arg>,
}

/// Loop node configuration.
///
/// `inner_start`/`inner_end` bound the body sub-graph. `input_args` bind the
/// iterables the body runs over; `variable_args` are loop-scoped variables
/// carried across iterations.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoopConfig {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub input_args: Vec<Arg>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub variable_args: Vec<Arg>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub output_args: Vec<Arg>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inner_start: Option<NodeId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inner_end: Option<NodeId>,
}

/// Variable node configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariableConfig {
    pub mode: VariableMode,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub output_args: Vec<Arg>,
}

/// Configuration shared by all remaining node kinds (LLM calls, code blocks,
/// conditions, plugins, ...). The lineage analysis only cares about declared
/// arguments and the exception policy, so the kinds collapse into one shape.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenericConfig {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub input_args: Vec<Arg>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub output_args: Vec<Arg>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_exception: Option<ExceptionPolicy>,
}

/// Per-kind node configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum NodeConfig {
    Start(StartConfig),
    Loop(LoopConfig),
    Variable(VariableConfig),
    Generic(GenericConfig),
}

/// One unit of the authored workflow graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowNode {
    pub id: NodeId,
    pub name: String,
    /// Declared forward edges, in authored order.
    #[serde(default, skip_serializing_if = "SmallVec::is_empty")]
    pub next_ids: NextIds,
    /// Id of the enclosing Loop node, when this node sits inside a body.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loop_id: Option<NodeId>,
    pub config: NodeConfig,
}

impl FlowNode {
    /// Creates a node with no edges and no loop membership.
    pub fn new(id: NodeId, name: impl Into<String>, config: NodeConfig) -> Self {
        FlowNode {
            id,
            name: name.into(),
            next_ids: SmallVec::new(),
            loop_id: None,
            config,
        }
    }

    /// Sets the forward edges.
    pub fn with_next(mut self, next: impl IntoIterator<Item = NodeId>) -> Self {
        self.next_ids = next.into_iter().collect();
        self
    }

    /// Marks this node as a member of the given loop's body.
    pub fn with_loop(mut self, loop_id: NodeId) -> Self {
        self.loop_id = Some(loop_id);
        self
    }

    /// The kind of this node.
    pub fn kind(&self) -> NodeKind {
        match &self.config {
            NodeConfig::Start(_) => NodeKind::Start,
            NodeConfig::Loop(_) => NodeKind::Loop,
            NodeConfig::Variable(_) => NodeKind::Variable,
            NodeConfig::Generic(_) => NodeKind::Generic,
        }
    }

    /// Declared output arguments. Start nodes have none here -- their inputs
    /// are turned into referenceable outputs by the scope walker.
    pub fn output_args(&self) -> &[Arg] {
        match &self.config {
            NodeConfig::Start(_) => &[],
            NodeConfig::Loop(cfg) => &cfg.output_args,
            NodeConfig::Variable(cfg) => &cfg.output_args,
            NodeConfig::Generic(cfg) => &cfg.output_args,
        }
    }

    /// Declared input arguments.
    pub fn input_args(&self) -> &[Arg] {
        match &self.config {
            NodeConfig::Start(cfg) => &cfg.input_args,
            NodeConfig::Loop(cfg) => &cfg.input_args,
            NodeConfig::Variable(_) => &[],
            NodeConfig::Generic(cfg) => &cfg.input_args,
        }
    }

    /// The loop body's entry node id, for Loop nodes.
    pub fn inner_start(&self) -> Option<NodeId> {
        match &self.config {
            NodeConfig::Loop(cfg) => cfg.inner_start,
            _ => None,
        }
    }

    /// The loop body's exit node id, for Loop nodes.
    pub fn inner_end(&self) -> Option<NodeId> {
        match &self.config {
            NodeConfig::Loop(cfg) => cfg.inner_end,
            _ => None,
        }
    }

    /// Handler node ids that receive control on failure, when the node is
    /// configured to execute an exception flow. Empty for every other policy.
    pub fn exception_handlers(&self) -> &[NodeId] {
        match &self.config {
            NodeConfig::Generic(GenericConfig {
                on_exception: Some(policy),
                ..
            }) if policy.kind == ExceptionHandling::ExecuteExceptionFlow => &policy.handler_ids,
            _ => &[],
        }
    }
}
