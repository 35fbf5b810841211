//! Fluent builder for node graphs
//!
//! Provides a compact API for constructing graphs programmatically, mostly
//! for hosts that generate graphs and for tests.

use crate::types::{CircularBehavior, GraphNode, NodeGraph};

/// Fluent builder for constructing node graphs
///
/// # Example
///
/// ```ignore
/// let graph = GraphBuilder::new()
///     .add_node("n1", "number")
///     .with_data("number", "number", json!(4))
///     .add_root("out", "output")
///     .connect("n1", "number", "out", "value")
///     .build();
/// ```
#[derive(Debug, Default)]
pub struct GraphBuilder {
    nodes: Vec<GraphNode>,
    connections: Vec<(String, String, String, String)>,
    circular_behavior: CircularBehavior,
}

impl GraphBuilder {
    /// Create a new graph builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node to the graph
    pub fn add_node(mut self, id: impl Into<String>, node_type: impl Into<String>) -> Self {
        self.nodes.push(GraphNode::new(id, node_type));
        self
    }

    /// Add a node flagged as a root
    pub fn add_root(mut self, id: impl Into<String>, node_type: impl Into<String>) -> Self {
        let mut node = GraphNode::new(id, node_type);
        node.root = true;
        self.nodes.push(node);
        self
    }

    /// Set a control value on the most recently added node
    ///
    /// Must be called after `add_node` or `add_root`.
    pub fn with_data(
        mut self,
        port_name: impl Into<String>,
        control_name: impl Into<String>,
        value: serde_json::Value,
    ) -> Self {
        if let Some(node) = self.nodes.last_mut() {
            node.set_control(port_name, control_name, value);
        }
        self
    }

    /// Connect an output port to an input port
    ///
    /// Connections are applied in call order once all nodes exist, so nodes
    /// may be added after the connections that reference them.
    pub fn connect(
        mut self,
        from_node: impl Into<String>,
        from_port: impl Into<String>,
        to_node: impl Into<String>,
        to_port: impl Into<String>,
    ) -> Self {
        self.connections.push((from_node.into(), from_port.into(), to_node.into(), to_port.into()));
        self
    }

    /// Set the cycle policy of the graph
    pub fn circular_behavior(mut self, behavior: CircularBehavior) -> Self {
        self.circular_behavior = behavior;
        self
    }

    /// Build the graph without validation
    ///
    /// Connections naming a node that was never added are dropped.
    pub fn build(self) -> NodeGraph {
        let mut graph = NodeGraph::new().with_circular_behavior(self.circular_behavior);
        for node in self.nodes {
            graph.insert_node(node);
        }
        for (from_node, from_port, to_node, to_port) in &self.connections {
            if !graph.connect(from_node, from_port, to_node, to_port) {
                log::debug!(
                    "Skipping connection {}.{} -> {}.{}",
                    from_node, from_port, to_node, to_port
                );
            }
        }
        graph
    }
}
