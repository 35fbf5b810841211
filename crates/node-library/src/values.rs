//! Coercion of resolved input values

use node_resolver::{GraphNode, InputValues};
use serde_json::Value;

/// Read a value as a number
///
/// Strings are parsed, booleans count as 0 or 1, anything else is 0.
pub fn number_value(value: Option<&Value>) -> f64 {
    match value {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        Some(Value::String(s)) => s.trim().parse().unwrap_or(0.0),
        Some(Value::Bool(b)) => f64::from(u8::from(*b)),
        _ => 0.0,
    }
}

/// Read a value as text; null becomes the empty string
pub fn text_value(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

/// Read a value as a boolean; non-zero numbers are true
pub fn bool_value(value: Option<&Value>) -> bool {
    match value {
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|n| n != 0.0),
        Some(Value::String(s)) => s == "true",
        _ => false,
    }
}

/// Values of a port that may have several connections
///
/// With two or more connections the port holds one array entry per
/// connection. A single connection's value is one item even when it is an
/// array itself. Null means nothing arrived.
pub fn each_value<'v>(node: &GraphNode, port: &str, inputs: &'v InputValues) -> Vec<&'v Value> {
    let connected = node.connections.inputs_for(port).len();
    match inputs.get(port) {
        Some(Value::Array(items)) if connected > 1 => items.iter().collect(),
        None | Some(Value::Null) => Vec::new(),
        Some(other) => vec![other],
    }
}

/// A node whose `port` has `count` incoming connections
#[cfg(test)]
pub(crate) fn wired(node_type: &str, port: &str, count: usize) -> GraphNode {
    let mut node = GraphNode::new("n", node_type);
    node.connections.inputs.insert(
        port.to_string(),
        (0..count)
            .map(|i| node_resolver::Connection::new(format!("src{i}"), "out"))
            .collect(),
    );
    node
}
