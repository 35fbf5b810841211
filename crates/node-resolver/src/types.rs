//! Core types for node graphs
//!
//! These types define the structure of a node graph: node instances, the
//! control data they carry for their own ports, and the connections between
//! their ports. The graph is owned by the host; the resolver only reads it.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Unique identifier for a node
pub type NodeId = String;

/// Name of a port on a node
pub type PortName = String;

/// Raw control values for one port, keyed by control name
pub type ControlData = serde_json::Map<String, serde_json::Value>;

/// Control data for every port of a node
pub type InputData = HashMap<PortName, ControlData>;

/// Resolved values fed into a node resolver, keyed by input port
pub type InputValues = HashMap<PortName, serde_json::Value>;

/// Values produced by a node resolver, keyed by output port
pub type OutputValues = HashMap<PortName, serde_json::Value>;

/// One end of a connection
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Connection {
    /// The node on the other side
    pub node_id: NodeId,
    /// The port on that node
    pub port_name: PortName,
}

impl Connection {
    pub fn new(node_id: impl Into<String>, port_name: impl Into<String>) -> Self {
        Self {
            node_id: node_id.into(),
            port_name: port_name.into(),
        }
    }
}

/// Connections of a single direction, keyed by local port name
pub type ConnectionMap = HashMap<PortName, Vec<Connection>>;

/// All connections of a node
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Connections {
    /// Incoming connections, keyed by this node's input port
    #[serde(default)]
    pub inputs: ConnectionMap,
    /// Outgoing connections, keyed by this node's output port
    #[serde(default)]
    pub outputs: ConnectionMap,
}

impl Connections {
    /// Incoming connections for an input port, in declaration order
    pub fn inputs_for(&self, port_name: &str) -> &[Connection] {
        self.inputs.get(port_name).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Outgoing connections for an output port, in declaration order
    pub fn outputs_for(&self, port_name: &str) -> &[Connection] {
        self.outputs.get(port_name).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Iterate over every connection in both directions
    pub fn iter_all(&self) -> impl Iterator<Item = &Connection> + '_ {
        self.inputs.values().chain(self.outputs.values()).flatten()
    }

    /// True if there are no connections in either direction
    pub fn is_empty(&self) -> bool {
        self.iter_all().next().is_none()
    }
}

/// Editor-level policy for cycles met during resolution
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CircularBehavior {
    /// A cycle fails the whole resolution pass
    #[default]
    Prevent,
    /// A cycle is reported and the cyclic edge resolves to null
    Warn,
    /// Cycles re-enter resolution up to `max_loops` times per node
    Allow,
}

/// A node instance in a graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphNode {
    /// Unique identifier for this node instance
    pub id: NodeId,
    /// Node type (key into the node type catalog)
    #[serde(rename = "type")]
    pub node_type: String,
    /// Control data for the node's own ports
    #[serde(default)]
    pub input_data: InputData,
    /// Connections to other nodes
    #[serde(default)]
    pub connections: Connections,
    /// Marks this instance as a root regardless of its type
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub root: bool,
}

impl GraphNode {
    /// Create a node with no data and no connections
    pub fn new(id: impl Into<String>, node_type: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            node_type: node_type.into(),
            input_data: InputData::new(),
            connections: Connections::default(),
            root: false,
        }
    }

    /// Create a node with a freshly generated id
    pub fn with_generated_id(node_type: impl Into<String>) -> Self {
        Self::new(uuid::Uuid::new_v4().to_string(), node_type)
    }

    /// Set a control value for one of this node's ports
    pub fn set_control(
        &mut self,
        port_name: impl Into<String>,
        control_name: impl Into<String>,
        value: serde_json::Value,
    ) {
        self.input_data
            .entry(port_name.into())
            .or_default()
            .insert(control_name.into(), value);
    }

    /// Get a control value for one of this node's ports
    pub fn control(&self, port_name: &str, control_name: &str) -> Option<&serde_json::Value> {
        self.input_data.get(port_name)?.get(control_name)
    }
}

/// A complete node graph
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeGraph {
    /// Nodes keyed by id
    pub nodes: HashMap<NodeId, GraphNode>,
    /// How resolution treats cycles in this graph
    #[serde(default)]
    pub circular_behavior: CircularBehavior,
}

impl NodeGraph {
    /// Create a new empty graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the cycle policy
    pub fn with_circular_behavior(mut self, behavior: CircularBehavior) -> Self {
        self.circular_behavior = behavior;
        self
    }

    /// Parse a graph from JSON
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serialize the graph to JSON
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Load a graph from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Insert a node, replacing any node with the same id
    pub fn insert_node(&mut self, node: GraphNode) -> Option<GraphNode> {
        self.nodes.insert(node.id.clone(), node)
    }

    /// Find a node by ID
    pub fn find_node(&self, id: &str) -> Option<&GraphNode> {
        self.nodes.get(id)
    }

    /// Find a node by ID (mutable)
    pub fn find_node_mut(&mut self, id: &str) -> Option<&mut GraphNode> {
        self.nodes.get_mut(id)
    }

    /// Check whether a node exists
    pub fn contains_node(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    /// Node ids in sorted order
    pub fn node_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.nodes.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }

    /// Connect an output port of one node to an input port of another
    ///
    /// Both sides are updated. Returns false if either node is missing or the
    /// connection already exists.
    pub fn connect(
        &mut self,
        from_node: &str,
        from_port: &str,
        to_node: &str,
        to_port: &str,
    ) -> bool {
        if !self.contains_node(from_node) || !self.contains_node(to_node) {
            return false;
        }

        let incoming = Connection::new(from_node, from_port);
        let outgoing = Connection::new(to_node, to_port);

        if let Some(target) = self.nodes.get_mut(to_node) {
            let list = target.connections.inputs.entry(to_port.to_string()).or_default();
            if list.contains(&incoming) {
                return false;
            }
            list.push(incoming);
        }
        if let Some(source) = self.nodes.get_mut(from_node) {
            source
                .connections
                .outputs
                .entry(from_port.to_string())
                .or_default()
                .push(outgoing);
        }
        true
    }

    /// Remove a connection from both sides
    ///
    /// Returns true if anything was removed.
    pub fn disconnect(
        &mut self,
        from_node: &str,
        from_port: &str,
        to_node: &str,
        to_port: &str,
    ) -> bool {
        let mut removed = false;
        if let Some(target) = self.nodes.get_mut(to_node) {
            let inputs = &mut target.connections.inputs;
            removed |= remove_connection(inputs, to_port, from_node, from_port);
        }
        if let Some(source) = self.nodes.get_mut(from_node) {
            let outputs = &mut source.connections.outputs;
            removed |= remove_connection(outputs, from_port, to_node, to_port);
        }
        removed
    }

    /// Get the IDs of nodes that this node takes input from (upstream nodes)
    pub fn get_dependencies(&self, node_id: &str) -> Vec<NodeId> {
        let Some(node) = self.find_node(node_id) else {
            return Vec::new();
        };
        let mut deps: Vec<NodeId> = node
            .connections
            .inputs
            .values()
            .flatten()
            .map(|c| c.node_id.clone())
            .collect();
        deps.sort_unstable();
        deps.dedup();
        deps
    }

    /// Get the IDs of nodes that read from this node (downstream nodes)
    ///
    /// Derived from the other nodes' input connections, so it does not rely on
    /// the `outputs` side being kept in sync.
    pub fn get_dependents(&self, node_id: &str) -> Vec<NodeId> {
        let mut dependents: Vec<NodeId> = self
            .nodes
            .values()
            .filter(|n| {
                n.connections
                    .inputs
                    .values()
                    .flatten()
                    .any(|c| c.node_id == node_id)
            })
            .map(|n| n.id.clone())
            .collect();
        dependents.sort_unstable();
        dependents
    }
}

fn remove_connection(map: &mut ConnectionMap, port: &str, node_id: &str, port_name: &str) -> bool {
    let Some(list) = map.get_mut(port) else {
        return false;
    };
    let before = list.len();
    list.retain(|c| !(c.node_id == node_id && c.port_name == port_name));
    let removed = list.len() != before;
    if list.is_empty() {
        map.remove(port);
    }
    removed
}
