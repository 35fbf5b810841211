//! Error types for the node resolver

use thiserror::Error;

use crate::types::NodeId;

/// Result type alias using ResolveError
pub type Result<T> = std::result::Result<T, ResolveError>;

/// Errors that abort a resolution pass
///
/// Conditions the engine can recover from on its own (unknown ports, cycles
/// under the `warn`/`allow` policies) are reported as
/// [`Diagnostic`](crate::diagnostics::Diagnostic)s instead.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// A node re-entered resolution while it was still being resolved
    #[error("Circular dependency detected: {}", chain.join(" -> "))]
    CircularDependency { chain: Vec<NodeId> },

    /// A node references a type absent from the node type catalog
    #[error("Node '{node_id}' has unknown node type '{node_type}'")]
    MissingNodeType { node_id: NodeId, node_type: String },

    /// A port references a type absent from the port type catalog
    #[error("Port '{port_name}' on node '{node_id}' has unknown port type '{port_type}'")]
    MissingPortType {
        node_id: NodeId,
        port_name: String,
        port_type: String,
    },

    /// The requested root node does not exist in the graph
    #[error("Node not found: {0}")]
    NodeNotFound(NodeId),

    /// More than one root node where exactly one was expected
    #[error("Expected a single root node, found {}: {}", .0.len(), .0.join(", "))]
    MultipleRootNodes(Vec<NodeId>),

    /// A node resolver callback failed
    #[error("Resolver execution failed: {0}")]
    ExecutionFailed(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ResolveError {
    /// Create an execution failed error with a message
    pub fn failed(msg: impl Into<String>) -> Self {
        Self::ExecutionFailed(msg.into())
    }

    /// Node ids taking part in a circular dependency, if this is one
    pub fn cycle(&self) -> Option<&[NodeId]> {
        match self {
            Self::CircularDependency { chain } => Some(chain),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_circular_dependency_display() {
        let err = ResolveError::CircularDependency {
            chain: vec!["a".into(), "b".into(), "a".into()],
        };
        assert_eq!(err.to_string(), "Circular dependency detected: a -> b -> a");
        assert_eq!(err.cycle().unwrap().len(), 3);
    }

    #[test]
    fn test_failed_helper() {
        let err = ResolveError::failed("division by zero");
        assert!(matches!(err, ResolveError::ExecutionFailed(ref m) if m == "division by zero"));
        assert!(err.cycle().is_none());
    }
}
