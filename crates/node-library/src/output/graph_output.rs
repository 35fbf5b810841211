//! Output Node
//!
//! The root of a graph. It computes nothing itself: hosts read its resolved
//! inputs through `RootEngine::resolve_root_node`.

use node_resolver::{NodeDescriptor, NodeTypeDefinition};

use crate::ports::{boolean_port, number_port, string_port};

/// Output Node
///
/// # Inputs
/// - `text` - Text result
/// - `number` - Numeric result
/// - `boolean` - Boolean result
pub struct OutputNode;

impl OutputNode {
    pub const PORT_TEXT: &'static str = "text";
    pub const PORT_NUMBER: &'static str = "number";
    pub const PORT_BOOLEAN: &'static str = "boolean";
}

impl NodeDescriptor for OutputNode {
    fn definition() -> NodeTypeDefinition {
        NodeTypeDefinition::new("output", "Output")
            .with_description("Collects the results of the graph")
            .with_group("Output")
            .with_inputs(vec![
                string_port(Self::PORT_TEXT, "Text"),
                number_port(Self::PORT_NUMBER, "Number"),
                boolean_port(Self::PORT_BOOLEAN, "True/False"),
            ])
            .as_root()
    }
}

inventory::submit!(node_resolver::DescriptorFn(OutputNode::definition));

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_is_root_without_outputs() {
        let definition = OutputNode::definition();
        assert!(definition.root);
        assert!(!definition.has_resolver());
        assert!(definition.outputs.as_static().unwrap().is_empty());
    }
}
