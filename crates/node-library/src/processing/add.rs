//! Add Node
//!
//! Sums two number inputs. Either input may receive several connections,
//! in which case every connected value is added.

use std::sync::Arc;

use node_resolver::{
    GraphNode, InputValues, NodeDescriptor, NodeResolver, NodeTypeDefinition, OutputValues,
    ResolveContext, Result,
};
use serde_json::json;

use crate::ports::number_port;
use crate::values::{each_value, number_value};

/// Add Node
///
/// # Inputs
/// - `a` - First addend
/// - `b` - Second addend
///
/// # Outputs
/// - `result` - `a + b`
pub struct AddNode;

impl AddNode {
    pub const PORT_A: &'static str = "a";
    pub const PORT_B: &'static str = "b";
    pub const PORT_RESULT: &'static str = "result";
}

impl NodeDescriptor for AddNode {
    fn definition() -> NodeTypeDefinition {
        NodeTypeDefinition::new("add", "Add")
            .with_description("Adds numbers together")
            .with_group("Math")
            .with_inputs(vec![number_port(Self::PORT_A, "A"), number_port(Self::PORT_B, "B")])
            .with_outputs(vec![number_port(Self::PORT_RESULT, "Result")])
            .with_resolver(Arc::new(AddNode))
    }
}

inventory::submit!(node_resolver::DescriptorFn(AddNode::definition));

impl NodeResolver for AddNode {
    fn resolve(
        &self,
        node: &GraphNode,
        inputs: &InputValues,
        _node_type: &NodeTypeDefinition,
        _context: &ResolveContext,
    ) -> Result<OutputValues> {
        let sum: f64 = [Self::PORT_A, Self::PORT_B]
            .into_iter()
            .flat_map(|port| each_value(node, port, inputs))
            .map(|v| number_value(Some(v)))
            .sum();
        Ok(OutputValues::from([(Self::PORT_RESULT.to_string(), json!(sum))]))
    }
}
