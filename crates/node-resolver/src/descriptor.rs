//! Node descriptor trait and link-time registration
//!
//! Node implementations describe themselves through [`NodeDescriptor`]: the
//! type that implements the resolver also produces the node type definition,
//! so there is a single source of truth for ports and behaviour.
//!
//! Crates that ship node or port types register them with `inventory`:
//!
//! ```ignore
//! inventory::submit!(node_resolver::DescriptorFn(AddNode::definition));
//! inventory::submit!(node_resolver::PortTypeFn(number_port));
//! ```
//!
//! `NodeTypeCatalog::with_builtins()` and `PortTypeCatalog::with_builtins()`
//! then pick up everything linked into the binary.

use crate::catalog::NodeTypeDefinition;
use crate::ports::PortTypeDefinition;

/// Trait for node implementations that can describe their node type
///
/// # Example
///
/// ```ignore
/// impl NodeDescriptor for AddNode {
///     fn definition() -> NodeTypeDefinition {
///         NodeTypeDefinition::new("add", "Add")
///             .with_inputs(vec![number.port_named("a", "A"), number.port_named("b", "B")])
///             .with_outputs(vec![number.port_named("sum", "Sum")])
///             .with_resolver(Arc::new(AddNode))
///     }
/// }
/// ```
pub trait NodeDescriptor {
    /// Build the node type definition for this node
    fn definition() -> NodeTypeDefinition
    where
        Self: Sized;
}

/// Link-time registration of a node type
pub struct DescriptorFn(pub fn() -> NodeTypeDefinition);

inventory::collect!(DescriptorFn);

/// Link-time registration of a port type
pub struct PortTypeFn(pub fn() -> PortTypeDefinition);

inventory::collect!(PortTypeFn);
