//! Non-fatal conditions recorded during a resolution pass

use serde::{Deserialize, Serialize};

use crate::types::NodeId;

/// A condition the engine recovered from by substituting null
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Diagnostic {
    /// A cycle was cut under the `warn` policy
    #[serde(rename_all = "camelCase")]
    CircularDependency { chain: Vec<NodeId> },

    /// A node re-entered resolution more than `max_loops` times under the `allow` policy
    #[serde(rename_all = "camelCase")]
    MaxLoopsExceeded { node_id: NodeId, max_loops: usize },

    /// A connection read an output port the source node does not currently expose
    #[serde(rename_all = "camelCase")]
    UnknownPort {
        node_id: NodeId,
        port_name: String,
        /// The node that read the port
        requested_by: NodeId,
    },

    /// No root node was given or found
    NoRootNode,
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::CircularDependency { chain } => {
                write!(f, "Circular dependency: {}", chain.join(" -> "))
            }
            Self::MaxLoopsExceeded { node_id, max_loops } => {
                write!(f, "Node '{}' exceeded the loop limit of {}", node_id, max_loops)
            }
            Self::UnknownPort {
                node_id,
                port_name,
                requested_by,
            } => write!(
                f,
                "Node '{}' has no output '{}' (read by '{}')",
                node_id, port_name, requested_by
            ),
            Self::NoRootNode => write!(f, "No root node found"),
        }
    }
}
