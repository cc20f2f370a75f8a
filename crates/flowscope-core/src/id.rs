//! Stable node identity.
//!
//! Workflow nodes are identified by ids assigned by the editor when the node
//! is created. They are stable across saves and across reorderings of the
//! node list, so every cross-reference in the model (forward edges, loop
//! membership, boundary ids, catalogue keys) is expressed in terms of
//! [`NodeId`] rather than positions.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Stable workflow node identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub i64);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for NodeId {
    fn from(raw: i64) -> Self {
        NodeId(raw)
    }
}
