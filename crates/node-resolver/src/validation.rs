//! Static validation of node graphs
//!
//! Checks graph structure against the catalogs without running any resolver:
//! connection references, node and port types, port type compatibility,
//! cycles and root count. Resolution tolerates most of these problems, so
//! validation is what an editor runs before saving or after loading a graph.

use std::collections::{HashMap, HashSet, VecDeque};

use crate::catalog::NodeTypeCatalog;
use crate::engine::root_node_ids;
use crate::ports::PortTypeCatalog;
use crate::types::{GraphNode, NodeGraph, NodeId};

/// Validation error with location context
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// The graph contains at least one cycle; lists the nodes on or behind it
    CycleDetected { nodes: Vec<NodeId> },
    /// A node has a type the node type catalog does not know
    UnknownNodeType { node_id: NodeId, node_type: String },
    /// A port declares a type the port type catalog does not know
    UnknownPortType {
        node_id: NodeId,
        port_name: String,
        port_type: String,
    },
    /// An input connection references a node that does not exist
    DanglingConnection {
        node_id: NodeId,
        port_name: String,
        missing_node: NodeId,
    },
    /// A connection feeds an input that does not accept the output's type
    IncompatiblePortTypes {
        from_node: NodeId,
        from_port: String,
        to_node: NodeId,
        to_port: String,
        source_type: String,
        target_type: String,
    },
    /// More than one node is a root
    MultipleRootNodes(Vec<NodeId>),
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::CycleDetected { nodes } => {
                write!(f, "Cycle detected involving nodes: {}", nodes.join(", "))
            }
            Self::UnknownNodeType { node_id, node_type } => {
                write!(f, "Unknown node type '{}' for node '{}'", node_type, node_id)
            }
            Self::UnknownPortType {
                node_id,
                port_name,
                port_type,
            } => write!(
                f,
                "Unknown port type '{}' for port '{}' on node '{}'",
                port_type, port_name, node_id
            ),
            Self::DanglingConnection {
                node_id,
                port_name,
                missing_node,
            } => write!(
                f,
                "Input '{}' on node '{}' references unknown node '{}'",
                port_name, node_id, missing_node
            ),
            Self::IncompatiblePortTypes {
                from_node,
                from_port,
                to_node,
                to_port,
                source_type,
                target_type,
            } => write!(
                f,
                "Connection {}.{} -> {}.{} joins incompatible types: {} -> {}",
                from_node, from_port, to_node, to_port, source_type, target_type
            ),
            Self::MultipleRootNodes(ids) => {
                write!(f, "Graph has multiple root nodes: {}", ids.join(", "))
            }
        }
    }
}

impl std::error::Error for ValidationError {}

/// Validate a graph against node and port type catalogs
///
/// Returns all validation errors found (not just the first). Ports of node
/// types with dynamic port lists are skipped, since their ports depend on
/// the context of a pass.
pub fn validate_graph(
    graph: &NodeGraph,
    node_types: &NodeTypeCatalog,
    port_types: &PortTypeCatalog,
) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    validate_connection_references(graph, &mut errors);
    validate_types(graph, node_types, port_types, &mut errors);
    validate_port_compatibility(graph, node_types, port_types, &mut errors);
    detect_cycles(graph, &mut errors);

    let roots = root_node_ids(graph, node_types);
    if roots.len() > 1 {
        errors.push(ValidationError::MultipleRootNodes(roots));
    }

    errors
}

/// Whether connecting an output of `from_node` into `to_node` closes a cycle
///
/// True when `from_node` is `to_node` or already reads, directly or
/// transitively, from `to_node`.
pub fn would_create_cycle(graph: &NodeGraph, from_node: &str, to_node: &str) -> bool {
    if from_node == to_node {
        return true;
    }

    let mut seen: HashSet<NodeId> = HashSet::new();
    let mut queue: VecDeque<NodeId> = VecDeque::from([to_node.to_string()]);
    while let Some(id) = queue.pop_front() {
        for dependent in graph.get_dependents(&id) {
            if dependent == from_node {
                return true;
            }
            if seen.insert(dependent.clone()) {
                queue.push_back(dependent);
            }
        }
    }
    false
}

/// Nodes in id order, so errors come out deterministically
fn sorted_nodes(graph: &NodeGraph) -> impl Iterator<Item = &GraphNode> {
    graph.node_ids().into_iter().filter_map(move |id| graph.find_node(id))
}

/// Input connections of a node, ports in name order
fn sorted_inputs(node: &GraphNode) -> Vec<(&String, &crate::types::Connection)> {
    let mut ports: Vec<&String> = node.connections.inputs.keys().collect();
    ports.sort();
    ports
        .into_iter()
        .flat_map(|port| node.connections.inputs_for(port).iter().map(move |c| (port, c)))
        .collect()
}

/// Check that every input connection points at an existing node
fn validate_connection_references(graph: &NodeGraph, errors: &mut Vec<ValidationError>) {
    for node in sorted_nodes(graph) {
        for (port, connection) in sorted_inputs(node) {
            if !graph.contains_node(&connection.node_id) {
                errors.push(ValidationError::DanglingConnection {
                    node_id: node.id.clone(),
                    port_name: port.clone(),
                    missing_node: connection.node_id.clone(),
                });
            }
        }
    }
}

/// Check node types, and the port types of their static ports
fn validate_types(
    graph: &NodeGraph,
    node_types: &NodeTypeCatalog,
    port_types: &PortTypeCatalog,
    errors: &mut Vec<ValidationError>,
) {
    for node in sorted_nodes(graph) {
        let Some(definition) = node_types.get(&node.node_type) else {
            errors.push(ValidationError::UnknownNodeType {
                node_id: node.id.clone(),
                node_type: node.node_type.clone(),
            });
            continue;
        };

        let static_ports = [definition.inputs.as_static(), definition.outputs.as_static()];
        for port in static_ports.into_iter().flatten().flatten() {
            if !port_types.has_port_type(&port.port_type) {
                errors.push(ValidationError::UnknownPortType {
                    node_id: node.id.clone(),
                    port_name: port.name.clone(),
                    port_type: port.port_type.clone(),
                });
            }
        }
    }
}

/// Check that each connection's input port accepts the output's type
fn validate_port_compatibility(
    graph: &NodeGraph,
    node_types: &NodeTypeCatalog,
    port_types: &PortTypeCatalog,
    errors: &mut Vec<ValidationError>,
) {
    let static_port_type = |node: &GraphNode, port_name: &str, output: bool| -> Option<String> {
        let definition = node_types.get(&node.node_type)?;
        let list = if output {
            &definition.outputs
        } else {
            &definition.inputs
        };
        list.as_static()?
            .iter()
            .find(|p| p.name == port_name)
            .map(|p| p.port_type.clone())
    };

    for node in sorted_nodes(graph) {
        for (port, connection) in sorted_inputs(node) {
            let Some(source) = graph.find_node(&connection.node_id) else {
                continue;
            };
            let Some(target_type) = static_port_type(node, port, false) else {
                continue;
            };
            let Some(source_type) = static_port_type(source, &connection.port_name, true) else {
                continue;
            };
            let Some(target) = port_types.get(&target_type) else {
                continue;
            };
            if !target.accepts(&source_type) {
                errors.push(ValidationError::IncompatiblePortTypes {
                    from_node: source.id.clone(),
                    from_port: connection.port_name.clone(),
                    to_node: node.id.clone(),
                    to_port: port.clone(),
                    source_type,
                    target_type,
                });
            }
        }
    }
}

/// Detect cycles using Kahn's algorithm (topological sort)
fn detect_cycles(graph: &NodeGraph, errors: &mut Vec<ValidationError>) {
    let mut in_degree: HashMap<&str, usize> =
        graph.node_ids().into_iter().map(|id| (id, 0)).collect();
    let mut downstream: HashMap<&str, Vec<&str>> = HashMap::new();

    for node in sorted_nodes(graph) {
        for (_, connection) in sorted_inputs(node) {
            if !graph.contains_node(&connection.node_id) {
                continue;
            }
            downstream
                .entry(connection.node_id.as_str())
                .or_default()
                .push(node.id.as_str());
            if let Some(deg) = in_degree.get_mut(node.id.as_str()) {
                *deg += 1;
            }
        }
    }

    let mut queue: VecDeque<&str> = in_degree
        .iter()
        .filter(|(_, &deg)| deg == 0)
        .map(|(&id, _)| id)
        .collect();

    while let Some(node_id) = queue.pop_front() {
        for &target in downstream.get(node_id).into_iter().flatten() {
            if let Some(deg) = in_degree.get_mut(target) {
                *deg -= 1;
                if *deg == 0 {
                    queue.push_back(target);
                }
            }
        }
    }

    let mut remaining: Vec<NodeId> = in_degree
        .into_iter()
        .filter(|(_, deg)| *deg > 0)
        .map(|(id, _)| id.to_string())
        .collect();
    if !remaining.is_empty() {
        remaining.sort();
        errors.push(ValidationError::CycleDetected { nodes: remaining });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::GraphBuilder;
    use crate::catalog::NodeTypeDefinition;
    use crate::ports::{Control, PortTypeDefinition};

    fn make_port_types() -> PortTypeCatalog {
        let mut catalog = PortTypeCatalog::new();
        catalog.add_port_type(
            PortTypeDefinition::new("string").with_control(Control::text("string", "Text", "")),
        );
        catalog.add_port_type(
            PortTypeDefinition::new("number")
                .with_control(Control::number("number", "Number", 0.0)),
        );
        catalog.add_port_type(
            PortTypeDefinition::new("boolean")
                .with_control(Control::checkbox("boolean", "Boolean", false))
                .accept("number"),
        );
        catalog
    }

    fn make_node_types(port_types: &PortTypeCatalog) -> NodeTypeCatalog {
        let port = |ty: &str, name: &str| port_types.port(ty, name, name).unwrap();
        let mut catalog = NodeTypeCatalog::new();
        catalog.add_node_type(
            NodeTypeDefinition::new("text", "Text")
                .with_inputs(vec![port("string", "in")])
                .with_outputs(vec![port("string", "out")]),
        );
        catalog.add_node_type(
            NodeTypeDefinition::new("number", "Number").with_outputs(vec![port("number", "out")]),
        );
        catalog.add_node_type(
            NodeTypeDefinition::new("flag", "Flag").with_inputs(vec![port("boolean", "in")]),
        );
        catalog.add_root_node_type(
            NodeTypeDefinition::new("output", "Output").with_inputs(vec![port("string", "in")]),
        );
        catalog
    }

    fn validate(graph: &NodeGraph) -> Vec<ValidationError> {
        let port_types = make_port_types();
        let node_types = make_node_types(&port_types);
        validate_graph(graph, &node_types, &port_types)
    }

    #[test]
    fn test_valid_graph() {
        let graph = GraphBuilder::new()
            .add_node("a", "text")
            .add_node("b", "text")
            .add_root("out", "output")
            .connect("a", "out", "b", "in")
            .connect("b", "out", "out", "in")
            .build();

        let errors = validate(&graph);
        assert!(errors.is_empty(), "Expected no errors, got: {:?}", errors);
    }

    #[test]
    fn test_detect_cycle() {
        let graph = GraphBuilder::new()
            .add_node("a", "text")
            .add_node("b", "text")
            .add_node("c", "text")
            .connect("a", "out", "b", "in")
            .connect("b", "out", "a", "in")
            .connect("b", "out", "c", "in")
            .build();

        let errors = validate(&graph);
        assert!(errors.contains(&ValidationError::CycleDetected {
            nodes: vec!["a".into(), "b".into(), "c".into()]
        }));
    }

    #[test]
    fn test_no_cycle_linear() {
        let graph = GraphBuilder::new()
            .add_node("a", "text")
            .add_node("b", "text")
            .add_node("c", "text")
            .connect("a", "out", "b", "in")
            .connect("b", "out", "c", "in")
            .build();

        let errors = validate(&graph);
        assert!(!errors
            .iter()
            .any(|e| matches!(e, ValidationError::CycleDetected { .. })));
    }

    #[test]
    fn test_self_loop_is_a_cycle() {
        let graph = GraphBuilder::new()
            .add_node("a", "text")
            .connect("a", "out", "a", "in")
            .build();

        let errors = validate(&graph);
        assert_eq!(
            errors,
            vec![ValidationError::CycleDetected {
                nodes: vec!["a".into()]
            }]
        );
    }

    #[test]
    fn test_unknown_node_type() {
        let graph = GraphBuilder::new().add_node("a", "unknown-type").build();

        let errors = validate(&graph);
        assert_eq!(
            errors,
            vec![ValidationError::UnknownNodeType {
                node_id: "a".into(),
                node_type: "unknown-type".into()
            }]
        );
    }

    #[test]
    fn test_unknown_port_type() {
        let port_types = make_port_types();
        let mut node_types = make_node_types(&port_types);
        node_types.add_node_type(
            NodeTypeDefinition::new("matrix", "Matrix")
                .with_outputs(vec![PortTypeDefinition::new("matrix").port_named("m", "M")]),
        );
        let graph = GraphBuilder::new().add_node("m", "matrix").build();

        let errors = validate_graph(&graph, &node_types, &port_types);
        assert!(errors.iter().any(|e| matches!(
            e,
            ValidationError::UnknownPortType { port_type, .. } if port_type == "matrix"
        )));
    }

    #[test]
    fn test_dynamic_ports_are_not_checked() {
        let port_types = make_port_types();
        let mut node_types = make_node_types(&port_types);
        node_types.add_node_type(
            NodeTypeDefinition::new("dyn", "Dynamic").with_dynamic_outputs(|_, _, _| {
                vec![PortTypeDefinition::new("matrix").port_named("m", "M")]
            }),
        );
        let graph = GraphBuilder::new()
            .add_node("d", "dyn")
            .add_node("t", "text")
            .connect("d", "m", "t", "in")
            .build();

        assert!(validate_graph(&graph, &node_types, &port_types).is_empty());
    }

    #[test]
    fn test_dangling_connection() {
        let mut graph = GraphBuilder::new().add_node("a", "text").build();
        graph
            .find_node_mut("a")
            .unwrap()
            .connections
            .inputs
            .insert("in".into(), vec![crate::types::Connection::new("missing", "out")]);

        let errors = validate(&graph);
        assert_eq!(
            errors,
            vec![ValidationError::DanglingConnection {
                node_id: "a".into(),
                port_name: "in".into(),
                missing_node: "missing".into()
            }]
        );
    }

    #[test]
    fn test_port_compatibility_uses_accept_types() {
        let graph = GraphBuilder::new()
            .add_node("n", "number")
            .add_node("t", "text")
            .add_node("f", "flag")
            .connect("n", "out", "t", "in")
            .connect("n", "out", "f", "in")
            .build();

        let errors = validate(&graph);
        assert_eq!(
            errors,
            vec![ValidationError::IncompatiblePortTypes {
                from_node: "n".into(),
                from_port: "out".into(),
                to_node: "t".into(),
                to_port: "in".into(),
                source_type: "number".into(),
                target_type: "string".into(),
            }]
        );
    }

    #[test]
    fn test_multiple_roots() {
        let graph = GraphBuilder::new()
            .add_root("a", "text")
            .add_node("out", "output")
            .build();

        let errors = validate(&graph);
        assert_eq!(
            errors,
            vec![ValidationError::MultipleRootNodes(vec!["a".into(), "out".into()])]
        );
    }

    #[test]
    fn test_collects_multiple_errors() {
        let graph = GraphBuilder::new()
            .add_node("a", "unknown-type-1")
            .add_node("b", "unknown-type-2")
            .connect("a", "out", "b", "in")
            .connect("b", "out", "a", "in")
            .build();

        let errors = validate(&graph);
        // Should have both cycle and unknown type errors
        assert_eq!(errors.len(), 3);
        assert!(errors[0].to_string().contains("unknown-type-1"));
    }

    #[test]
    fn test_would_create_cycle() {
        let graph = GraphBuilder::new()
            .add_node("a", "text")
            .add_node("b", "text")
            .add_node("c", "text")
            .connect("a", "out", "b", "in")
            .connect("b", "out", "c", "in")
            .build();

        assert!(would_create_cycle(&graph, "c", "a"));
        assert!(would_create_cycle(&graph, "b", "b"));
        assert!(!would_create_cycle(&graph, "a", "c"));
        assert!(!would_create_cycle(&graph, "c", "unknown"));
    }
}
