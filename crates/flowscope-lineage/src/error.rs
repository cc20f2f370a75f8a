//! Error taxonomy for the lineage analysis.
//!
//! Only structural problems surface to the caller. An unknown target node
//! recovers to an empty result, and array-type derivation misses recover to
//! `Object` inside the walk; neither is represented here.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors surfaced by a lineage query.
#[derive(Debug, Clone, Serialize, Deserialize, Error)]
pub enum LineageError {
    /// The workflow has no Start node; the graph is structurally broken and
    /// no scope can be rooted.
    #[error("workflow has no start node")]
    StartNodeMissing,

    /// The graph loader failed to produce the workflow snapshot.
    #[error("graph loader failed: {message}")]
    Loader { message: String },
}
