//! Node type catalog
//!
//! This module maps node type strings to their definitions: labels, input
//! and output port lists (static or computed from node data), and the
//! resolver that turns resolved inputs into outputs.
//!
//! # Usage
//!
//! ```ignore
//! use node_resolver::{NodeTypeCatalog, NodeTypeDefinition};
//!
//! let mut catalog = NodeTypeCatalog::new();
//! catalog.add_node_type(
//!     NodeTypeDefinition::new("double", "Double")
//!         .with_inputs(vec![number.port_named("value", "Value")])
//!         .with_outputs(vec![number.port_named("value", "Value")])
//!         .with_resolver_fn(|_node, inputs, _ty, _ctx| {
//!             let v = inputs.get("value").and_then(|v| v.as_f64()).unwrap_or(0.0);
//!             Ok(HashMap::from([("value".to_string(), json!(v * 2.0))]))
//!         }),
//! );
//! ```

use std::borrow::Cow;
use std::collections::HashMap;
use std::sync::Arc;

use crate::context::ResolveContext;
use crate::descriptor::DescriptorFn;
use crate::error::Result;
use crate::ports::Port;
use crate::types::{Connections, GraphNode, InputData, InputValues, OutputValues};

/// Computes the output values of one node type
///
/// Resolvers must behave as pure functions of their arguments: the engine
/// calls each one at most once per node per pass, after every input of the
/// node has been resolved.
pub trait NodeResolver: Send + Sync {
    fn resolve(
        &self,
        node: &GraphNode,
        inputs: &InputValues,
        node_type: &NodeTypeDefinition,
        context: &ResolveContext,
    ) -> Result<OutputValues>;
}

type ResolverCallback = dyn Fn(
        &GraphNode,
        &InputValues,
        &NodeTypeDefinition,
        &ResolveContext,
    ) -> Result<OutputValues>
    + Send
    + Sync;

/// Closure-based NodeResolver
pub struct CallbackResolver {
    callback: Box<ResolverCallback>,
}

impl CallbackResolver {
    pub fn new(
        callback: impl Fn(
                &GraphNode,
                &InputValues,
                &NodeTypeDefinition,
                &ResolveContext,
            ) -> Result<OutputValues>
            + Send
            + Sync
            + 'static,
    ) -> Self {
        Self {
            callback: Box::new(callback),
        }
    }
}

impl NodeResolver for CallbackResolver {
    fn resolve(
        &self,
        node: &GraphNode,
        inputs: &InputValues,
        node_type: &NodeTypeDefinition,
        context: &ResolveContext,
    ) -> Result<OutputValues> {
        (self.callback)(node, inputs, node_type, context)
    }
}

/// Builds a port list from a node's current data
pub type PortBuilderFn =
    dyn Fn(&InputData, &Connections, &ResolveContext) -> Vec<Port> + Send + Sync;

/// Input or output ports of a node type
#[derive(Clone)]
pub enum PortList {
    /// The same ports for every node of the type
    Static(Vec<Port>),
    /// Ports computed from each node's input data and connections
    Dynamic(Arc<PortBuilderFn>),
}

impl PortList {
    pub fn dynamic(
        builder: impl Fn(&InputData, &Connections, &ResolveContext) -> Vec<Port>
            + Send
            + Sync
            + 'static,
    ) -> Self {
        Self::Dynamic(Arc::new(builder))
    }

    /// Effective ports for a node right now
    ///
    /// Dynamic lists are evaluated on every call; nothing is cached.
    pub fn ports<'a>(&'a self, node: &GraphNode, context: &ResolveContext) -> Cow<'a, [Port]> {
        match self {
            Self::Static(ports) => Cow::Borrowed(ports),
            Self::Dynamic(builder) => {
                Cow::Owned(builder(&node.input_data, &node.connections, context))
            }
        }
    }

    /// Ports of a static list; `None` for dynamic lists
    pub fn as_static(&self) -> Option<&[Port]> {
        match self {
            Self::Static(ports) => Some(ports),
            Self::Dynamic(_) => None,
        }
    }

    pub fn is_dynamic(&self) -> bool {
        matches!(self, Self::Dynamic(_))
    }
}

impl Default for PortList {
    fn default() -> Self {
        Self::Static(Vec::new())
    }
}

impl From<Vec<Port>> for PortList {
    fn from(ports: Vec<Port>) -> Self {
        Self::Static(ports)
    }
}

impl std::fmt::Debug for PortList {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Static(ports) => f.debug_tuple("Static").field(ports).finish(),
            Self::Dynamic(_) => f.write_str("Dynamic(..)"),
        }
    }
}

/// Definition of a node type
#[derive(Clone)]
pub struct NodeTypeDefinition {
    /// Unique type identifier (e.g., "add")
    pub node_type: String,
    /// Human-readable label
    pub label: String,
    /// Description of what the node does
    pub description: String,
    /// Group for menus; `None` for ungrouped nodes
    pub group: Option<String>,
    /// Nodes of this type are resolution roots
    pub root: bool,
    pub inputs: PortList,
    pub outputs: PortList,
    resolver: Option<Arc<dyn NodeResolver>>,
}

impl NodeTypeDefinition {
    /// Create a node type with no ports and no resolver
    pub fn new(node_type: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            node_type: node_type.into(),
            label: label.into(),
            description: String::new(),
            group: None,
            root: false,
            inputs: PortList::default(),
            outputs: PortList::default(),
            resolver: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }

    /// Mark nodes of this type as resolution roots
    pub fn as_root(mut self) -> Self {
        self.root = true;
        self
    }

    pub fn with_inputs(mut self, inputs: impl Into<PortList>) -> Self {
        self.inputs = inputs.into();
        self
    }

    pub fn with_dynamic_inputs(
        mut self,
        builder: impl Fn(&InputData, &Connections, &ResolveContext) -> Vec<Port>
            + Send
            + Sync
            + 'static,
    ) -> Self {
        self.inputs = PortList::dynamic(builder);
        self
    }

    pub fn with_outputs(mut self, outputs: impl Into<PortList>) -> Self {
        self.outputs = outputs.into();
        self
    }

    pub fn with_dynamic_outputs(
        mut self,
        builder: impl Fn(&InputData, &Connections, &ResolveContext) -> Vec<Port>
            + Send
            + Sync
            + 'static,
    ) -> Self {
        self.outputs = PortList::dynamic(builder);
        self
    }

    pub fn with_resolver(mut self, resolver: Arc<dyn NodeResolver>) -> Self {
        self.resolver = Some(resolver);
        self
    }

    /// Use a closure as the resolver
    pub fn with_resolver_fn(
        self,
        callback: impl Fn(
                &GraphNode,
                &InputValues,
                &NodeTypeDefinition,
                &ResolveContext,
            ) -> Result<OutputValues>
            + Send
            + Sync
            + 'static,
    ) -> Self {
        self.with_resolver(Arc::new(CallbackResolver::new(callback)))
    }

    pub fn has_resolver(&self) -> bool {
        self.resolver.is_some()
    }

    /// Run this type's resolver for a node
    ///
    /// A type without a resolver produces no values.
    pub fn resolve(
        &self,
        node: &GraphNode,
        inputs: &InputValues,
        context: &ResolveContext,
    ) -> Result<OutputValues> {
        match &self.resolver {
            Some(resolver) => resolver.resolve(node, inputs, self, context),
            None => {
                log::debug!("Node type '{}' has no resolver, producing no values", self.node_type);
                Ok(OutputValues::new())
            }
        }
    }
}

impl std::fmt::Debug for NodeTypeDefinition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NodeTypeDefinition")
            .field("node_type", &self.node_type)
            .field("label", &self.label)
            .field("group", &self.group)
            .field("root", &self.root)
            .field("inputs", &self.inputs)
            .field("outputs", &self.outputs)
            .field("has_resolver", &self.resolver.is_some())
            .finish()
    }
}

/// Registry of node types
///
/// # Composability
///
/// Catalogs can be composed by merging:
/// ```ignore
/// let mut catalog = NodeTypeCatalog::with_builtins();
/// catalog.merge(plugin_catalog); // plugin types override built-ins
/// ```
#[derive(Debug, Clone, Default)]
pub struct NodeTypeCatalog {
    entries: HashMap<String, NodeTypeDefinition>,
}

impl NodeTypeCatalog {
    /// Create a new empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a catalog holding every node type registered via `inventory`
    pub fn with_builtins() -> Self {
        let mut catalog = Self::new();
        catalog.register_builtins();
        catalog
    }

    /// Add every node type registered via `inventory`
    pub fn register_builtins(&mut self) {
        for DescriptorFn(definition) in inventory::iter::<DescriptorFn> {
            self.add_node_type(definition());
        }
    }

    /// Register a node type, replacing any previous one with the same type
    pub fn add_node_type(&mut self, definition: NodeTypeDefinition) -> &mut Self {
        self.entries.insert(definition.node_type.clone(), definition);
        self
    }

    /// Register a node type as a resolution root
    pub fn add_root_node_type(&mut self, definition: NodeTypeDefinition) -> &mut Self {
        self.add_node_type(definition.as_root())
    }

    pub fn get(&self, node_type: &str) -> Option<&NodeTypeDefinition> {
        self.entries.get(node_type)
    }

    /// Check if a node type is registered
    pub fn has_node_type(&self, node_type: &str) -> bool {
        self.entries.contains_key(node_type)
    }

    /// List all registered node type strings, sorted
    pub fn node_types(&self) -> Vec<&str> {
        let mut types: Vec<&str> = self.entries.keys().map(|s| s.as_str()).collect();
        types.sort_unstable();
        types
    }

    /// Get all registered definitions
    pub fn all(&self) -> Vec<&NodeTypeDefinition> {
        self.entries.values().collect()
    }

    /// Get definitions grouped by their menu group
    pub fn by_group(&self) -> HashMap<Option<String>, Vec<&NodeTypeDefinition>> {
        let mut grouped: HashMap<Option<String>, Vec<&NodeTypeDefinition>> = HashMap::new();
        for definition in self.entries.values() {
            grouped.entry(definition.group.clone()).or_default().push(definition);
        }
        grouped
    }

    /// Merge another catalog into this one
    ///
    /// Entries from `other` override entries in `self` if they share the same node_type.
    pub fn merge(&mut self, other: NodeTypeCatalog) {
        self.entries.extend(other.entries);
    }
}
