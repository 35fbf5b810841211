//! Split Text Node
//!
//! Splits text on a separator. The node exposes one output port per part;
//! how many parts there are is set by its own `parts` control, so the port
//! list changes as soon as the control does.

use std::sync::Arc;

use node_resolver::{
    Control, GraphNode, InputData, InputValues, NodeDescriptor, NodeResolver, NodeTypeDefinition,
    OutputValues, Port, ResolveContext, Result,
};
use serde_json::json;

use crate::ports::{number_port, string_port};
use crate::values::text_value;

/// Split Text Node
///
/// # Inputs
/// - `string` - Text to split
/// - `separator` - Where to split (default `","`)
/// - `parts` - Number of parts, between 1 and [`Self::MAX_PARTS`]
///
/// # Outputs
/// - `part-1` .. `part-N` - The parts; the last one keeps any remainder
pub struct SplitTextNode;

impl SplitTextNode {
    pub const PORT_STRING: &'static str = "string";
    pub const PORT_SEPARATOR: &'static str = "separator";
    pub const PORT_PARTS: &'static str = "parts";

    pub const DEFAULT_SEPARATOR: &'static str = ",";
    pub const DEFAULT_PARTS: usize = 2;
    pub const MAX_PARTS: usize = 16;

    /// Output port name of the n-th part, counting from 1
    pub fn part_port(n: usize) -> String {
        format!("part-{}", n)
    }

    fn part_count(data: &InputData) -> usize {
        data.get(Self::PORT_PARTS)
            .and_then(|d| d.get(Self::PORT_PARTS))
            .and_then(|v| v.as_f64())
            .map(|n| n.clamp(1.0, Self::MAX_PARTS as f64) as usize)
            .unwrap_or(Self::DEFAULT_PARTS)
    }

    fn output_ports(data: &InputData) -> Vec<Port> {
        (1..=Self::part_count(data))
            .map(|n| string_port(&Self::part_port(n), &format!("Part {}", n)))
            .collect()
    }
}

impl NodeDescriptor for SplitTextNode {
    fn definition() -> NodeTypeDefinition {
        NodeTypeDefinition::new("split-text", "Split Text")
            .with_description("Splits text into parts")
            .with_group("Text")
            .with_inputs(vec![
                string_port(Self::PORT_STRING, "Text"),
                string_port(Self::PORT_SEPARATOR, "Separator").with_controls(vec![Control::text(
                    Self::PORT_SEPARATOR,
                    "Separator",
                    Self::DEFAULT_SEPARATOR,
                )]),
                number_port(Self::PORT_PARTS, "Parts").with_controls(vec![Control::number(
                    Self::PORT_PARTS,
                    "Parts",
                    Self::DEFAULT_PARTS as f64,
                )]),
            ])
            .with_dynamic_outputs(|data, _connections, _context| Self::output_ports(data))
            .with_resolver(Arc::new(SplitTextNode))
    }
}

inventory::submit!(node_resolver::DescriptorFn(SplitTextNode::definition));

impl NodeResolver for SplitTextNode {
    fn resolve(
        &self,
        node: &GraphNode,
        inputs: &InputValues,
        node_type: &NodeTypeDefinition,
        context: &ResolveContext,
    ) -> Result<OutputValues> {
        let text = text_value(inputs.get(Self::PORT_STRING));
        let separator = text_value(inputs.get(Self::PORT_SEPARATOR));
        let count = node_type.outputs.ports(node, context).len();

        let mut parts: Vec<String> = if separator.is_empty() {
            vec![text]
        } else {
            text.splitn(count, separator.as_str()).map(str::to_string).collect()
        };
        parts.resize(count, String::new());

        Ok(parts
            .into_iter()
            .enumerate()
            .map(|(i, part)| (Self::part_port(i + 1), json!(part)))
            .collect())
    }
}
