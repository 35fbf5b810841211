//! Demand-driven graph resolution
//!
//! A resolution pass starts at one or more root nodes and pulls values
//! backward through input connections. Every node reached is resolved at
//! most once per pass: its effective input ports are computed (possibly from
//! its own data), each input is resolved from the connected upstream node or
//! from the node's own control data, and then the node type's resolver runs.
//!
//! # Key Concepts
//!
//! - **Per-pass cache**: resolved outputs are memoized for the duration of
//!   one pass, so shared upstream nodes run exactly once
//! - **Resolving stack**: nodes currently being resolved; meeting one of
//!   them again is a cycle, handled by the graph's [`CircularBehavior`]
//! - **Fresh state**: the cache, stack and loop counters belong to one pass
//!   and are dropped when it returns

use std::borrow::Cow;
use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::catalog::{NodeTypeCatalog, NodeTypeDefinition};
use crate::context::ResolveContext;
use crate::diagnostics::Diagnostic;
use crate::error::{ResolveError, Result};
use crate::events::{EventSink, NullEventSink, ResolveEvent};
use crate::ports::{ControlPortResolver, Port, PortResolver, PortTypeCatalog, PortTypeDefinition};
use crate::types::{
    CircularBehavior, Connection, ControlData, GraphNode, InputValues, NodeGraph, NodeId,
    OutputValues,
};

/// Default ceiling on cyclic re-entries per node
///
/// Re-entries are tracked on the heap, so the ceiling bounds work done per
/// pass rather than call depth.
pub const DEFAULT_MAX_LOOPS: usize = 1000;

/// Options for a single resolution pass
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ResolveOptions {
    /// Resolve from this node instead of the graph's root nodes
    pub root_node_id: Option<NodeId>,
    /// How many times the same node may re-enter resolution through a cycle
    /// under [`CircularBehavior::Allow`]
    pub max_loops: usize,
    /// Only resolve what the roots reach
    ///
    /// When unset and no `root_node_id` is given, every node the roots do
    /// not reach is resolved afterwards in id order, sharing the pass cache.
    pub only_resolve_connected: bool,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        Self {
            root_node_id: None,
            max_loops: DEFAULT_MAX_LOOPS,
            only_resolve_connected: false,
        }
    }
}

impl ResolveOptions {
    /// Options resolving from a specific root
    pub fn for_root(root_node_id: impl Into<String>) -> Self {
        Self {
            root_node_id: Some(root_node_id.into()),
            ..Self::default()
        }
    }

    pub fn with_max_loops(mut self, max_loops: usize) -> Self {
        self.max_loops = max_loops;
        self
    }

    pub fn only_resolve_connected(mut self, only_connected: bool) -> Self {
        self.only_resolve_connected = only_connected;
        self
    }
}

/// Outcome of a resolution pass
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Resolution {
    /// Output values of every visited node
    pub outputs: HashMap<NodeId, OutputValues>,
    /// Input values each visited node's resolver received
    pub inputs: HashMap<NodeId, InputValues>,
    /// Conditions recovered from during the pass
    pub diagnostics: Vec<Diagnostic>,
}

impl Resolution {
    /// Outputs of one node
    pub fn node(&self, node_id: &str) -> Option<&OutputValues> {
        self.outputs.get(node_id)
    }

    /// A single output value
    pub fn value(&self, node_id: &str, port_name: &str) -> Option<&Value> {
        self.outputs.get(node_id)?.get(port_name)
    }

    pub fn is_resolved(&self, node_id: &str) -> bool {
        self.outputs.contains_key(node_id)
    }
}

/// Resolve a graph against a pair of catalogs
///
/// Unconnected ports are derived with [`ControlPortResolver`] and no events
/// are emitted. Use [`RootEngine`] to customise either.
pub fn resolve(
    graph: &NodeGraph,
    node_types: &NodeTypeCatalog,
    port_types: &PortTypeCatalog,
    options: &ResolveOptions,
    context: &ResolveContext,
) -> Result<Resolution> {
    Pass::new(
        graph,
        node_types,
        port_types,
        &ControlPortResolver,
        &NullEventSink,
        options,
        context,
    )
    .run()
}

/// Resolution engine bound to a node type and port type configuration
///
/// The engine itself holds no per-pass state, so one instance can serve any
/// number of passes, including concurrent ones on different threads.
pub struct RootEngine {
    node_types: NodeTypeCatalog,
    port_types: PortTypeCatalog,
    port_resolver: Box<dyn PortResolver>,
    event_sink: Box<dyn EventSink>,
}

impl RootEngine {
    /// Create an engine with the default port resolver and no event sink
    pub fn new(node_types: NodeTypeCatalog, port_types: PortTypeCatalog) -> Self {
        Self {
            node_types,
            port_types,
            port_resolver: Box::new(ControlPortResolver),
            event_sink: Box::new(NullEventSink),
        }
    }

    /// Create an engine from every node and port type registered via `inventory`
    pub fn with_builtins() -> Self {
        Self::new(NodeTypeCatalog::with_builtins(), PortTypeCatalog::with_builtins())
    }

    /// Replace how unconnected ports get their value
    pub fn with_port_resolver(mut self, resolver: impl PortResolver + 'static) -> Self {
        self.port_resolver = Box::new(resolver);
        self
    }

    /// Stream resolution events to a sink
    pub fn with_event_sink(mut self, sink: impl EventSink + 'static) -> Self {
        self.event_sink = Box::new(sink);
        self
    }

    pub fn node_types(&self) -> &NodeTypeCatalog {
        &self.node_types
    }

    pub fn port_types(&self) -> &PortTypeCatalog {
        &self.port_types
    }

    /// Run a resolution pass
    pub fn resolve(
        &self,
        graph: &NodeGraph,
        options: &ResolveOptions,
        context: &ResolveContext,
    ) -> Result<Resolution> {
        Pass::new(
            graph,
            &self.node_types,
            &self.port_types,
            self.port_resolver.as_ref(),
            self.event_sink.as_ref(),
            options,
            context,
        )
        .run()
    }

    /// Resolve the inputs of the graph's single root node
    ///
    /// Without `root_node_id` the graph must contain exactly one root. With
    /// `only_resolve_connected` only connected inputs are returned; otherwise
    /// unconnected inputs carry the values derived from the root's own data.
    pub fn resolve_root_node(
        &self,
        graph: &NodeGraph,
        options: &ResolveOptions,
        context: &ResolveContext,
    ) -> Result<InputValues> {
        let root_id = match &options.root_node_id {
            Some(id) => id.clone(),
            None => {
                let roots = root_node_ids(graph, &self.node_types);
                match roots.as_slice() {
                    [] => {
                        log::warn!("No root node found, nothing to resolve");
                        return Ok(InputValues::new());
                    }
                    [root] => root.clone(),
                    _ => return Err(ResolveError::MultipleRootNodes(roots)),
                }
            }
        };

        let options = ResolveOptions {
            root_node_id: Some(root_id.clone()),
            ..options.clone()
        };
        let mut resolution = self.resolve(graph, &options, context)?;
        let mut inputs = resolution.inputs.remove(&root_id).unwrap_or_default();

        if options.only_resolve_connected {
            if let Some(root) = graph.find_node(&root_id) {
                inputs.retain(|port, _| {
                    root.connections
                        .inputs_for(port)
                        .iter()
                        .any(|c| graph.contains_node(&c.node_id))
                });
            }
        }
        Ok(inputs)
    }
}

/// Ids of nodes that are roots by instance flag or by node type, sorted
pub fn root_node_ids(graph: &NodeGraph, node_types: &NodeTypeCatalog) -> Vec<NodeId> {
    graph
        .node_ids()
        .into_iter()
        .filter_map(|id| graph.find_node(id))
        .filter(|node| node.root || node_types.get(&node.node_type).is_some_and(|t| t.root))
        .map(|node| node.id.clone())
        .collect()
}

/// State of one resolution pass
///
/// Resolution is driven by an explicit stack of [`Frame`]s rather than by
/// native recursion, so long dependency chains and deep `allow` re-entry
/// only grow heap memory.
struct Pass<'a> {
    graph: &'a NodeGraph,
    node_types: &'a NodeTypeCatalog,
    port_types: &'a PortTypeCatalog,
    port_resolver: &'a dyn PortResolver,
    events: &'a dyn EventSink,
    options: &'a ResolveOptions,
    context: &'a ResolveContext,
    /// Outputs of nodes resolved in this pass
    resolved: HashMap<NodeId, OutputValues>,
    /// Inputs those nodes were resolved with
    resolved_inputs: HashMap<NodeId, InputValues>,
    /// Nodes currently being resolved, outermost first
    frames: Vec<Frame<'a>>,
    /// Cyclic re-entries per node
    reentries: HashMap<NodeId, usize>,
    diagnostics: Vec<Diagnostic>,
}

/// A node whose inputs are being resolved
struct Frame<'a> {
    node: &'a GraphNode,
    node_type: &'a NodeTypeDefinition,
    /// Effective input ports, fixed when the node is entered
    ports: Cow<'a, [Port]>,
    /// Index of the port being resolved
    port: usize,
    /// Live connections of that port
    connections: Vec<&'a Connection>,
    /// Values read from `connections` so far
    values: Vec<Value>,
    inputs: InputValues,
}

/// Outcome of asking for a node's outputs
enum Request<'a> {
    /// Known right away: cached, missing, or cut by the cycle policy
    Ready(Option<OutputValues>),
    /// The node must be resolved first
    Enter(Frame<'a>),
}

/// What the top frame needs next
enum Step<'a> {
    /// The outputs of the node behind this connection
    Read(&'a Connection),
    /// Nothing; every input is resolved
    Inputs,
}

impl<'a> Pass<'a> {
    fn new(
        graph: &'a NodeGraph,
        node_types: &'a NodeTypeCatalog,
        port_types: &'a PortTypeCatalog,
        port_resolver: &'a dyn PortResolver,
        events: &'a dyn EventSink,
        options: &'a ResolveOptions,
        context: &'a ResolveContext,
    ) -> Self {
        Self {
            graph,
            node_types,
            port_types,
            port_resolver,
            events,
            options,
            context,
            resolved: HashMap::new(),
            resolved_inputs: HashMap::new(),
            frames: Vec::new(),
            reentries: HashMap::new(),
            diagnostics: Vec::new(),
        }
    }

    fn run(mut self) -> Result<Resolution> {
        self.check_node_types()?;

        let roots = match &self.options.root_node_id {
            Some(id) if self.graph.contains_node(id) => vec![id.clone()],
            Some(id) => return Err(ResolveError::NodeNotFound(id.clone())),
            None => root_node_ids(self.graph, self.node_types),
        };

        if roots.is_empty() {
            log::warn!("No root node found, nothing to resolve");
            self.diagnostics.push(Diagnostic::NoRootNode);
            return Ok(self.finish());
        }

        log::debug!("Resolving graph from roots {:?}", roots);
        self.emit(ResolveEvent::PassStarted {
            roots: roots.clone(),
        });

        for root in &roots {
            self.resolve_node(root)?;
        }

        // Nodes no root reaches, including whole disconnected islands
        if self.options.root_node_id.is_none() && !self.options.only_resolve_connected {
            let graph = self.graph;
            for id in graph.node_ids() {
                if !self.resolved.contains_key(id) {
                    self.resolve_node(id)?;
                }
            }
        }

        self.emit(ResolveEvent::PassCompleted {
            resolved_nodes: self.resolved.len(),
            diagnostics: self.diagnostics.len(),
        });
        Ok(self.finish())
    }

    fn finish(self) -> Resolution {
        Resolution {
            outputs: self.resolved,
            inputs: self.resolved_inputs,
            diagnostics: self.diagnostics,
        }
    }

    /// Fail before any resolver runs if a node's type is unknown
    fn check_node_types(&self) -> Result<()> {
        for id in self.graph.node_ids() {
            if let Some(node) = self.graph.find_node(id) {
                if !self.node_types.has_node_type(&node.node_type) {
                    return Err(ResolveError::MissingNodeType {
                        node_id: node.id.clone(),
                        node_type: node.node_type.clone(),
                    });
                }
            }
        }
        Ok(())
    }

    /// Resolve one node's outputs along with everything it depends on
    ///
    /// Returns `None` when the node cannot contribute a value: it does not
    /// exist, or it was cut out of a cycle by the cycle policy.
    fn resolve_node(&mut self, node_id: &str) -> Result<Option<OutputValues>> {
        match self.request(node_id)? {
            Request::Ready(outputs) => return Ok(outputs),
            Request::Enter(frame) => self.frames.push(frame),
        }

        loop {
            match self.step()? {
                Step::Read(connection) => match self.request(&connection.node_id)? {
                    Request::Ready(outputs) => self.deliver(outputs),
                    Request::Enter(frame) => self.frames.push(frame),
                },
                Step::Inputs => {
                    let Some(frame) = self.frames.pop() else {
                        return Ok(None);
                    };
                    let outputs = self.complete(frame)?;
                    if self.frames.is_empty() {
                        return Ok(Some(outputs));
                    }
                    self.deliver(Some(outputs));
                }
            }
        }
    }

    /// Look a node up, applying the cache and the cycle policy
    fn request(&mut self, node_id: &str) -> Result<Request<'a>> {
        if let Some(cached) = self.resolved.get(node_id) {
            return Ok(Request::Ready(Some(cached.clone())));
        }

        if let Some(pos) = self.frames.iter().position(|f| f.node.id == node_id) {
            let mut chain: Vec<NodeId> = self.frames[pos..]
                .iter()
                .map(|f| f.node.id.clone())
                .collect();
            chain.push(node_id.to_string());
            if !self.enter_cycle(node_id, chain)? {
                return Ok(Request::Ready(None));
            }
        }

        let graph = self.graph;
        let Some(node) = graph.find_node(node_id) else {
            log::debug!("Connection to missing node '{}' ignored", node_id);
            return Ok(Request::Ready(None));
        };
        let node_type = self.node_type(node)?;
        let ports = node_type.inputs.ports(node, self.context);
        Ok(Request::Enter(Frame {
            node,
            node_type,
            inputs: InputValues::with_capacity(ports.len()),
            ports,
            port: 0,
            connections: Vec::new(),
            values: Vec::new(),
        }))
    }

    /// Apply the cycle policy; true if resolution may re-enter the node
    fn enter_cycle(&mut self, node_id: &str, chain: Vec<NodeId>) -> Result<bool> {
        let behavior = self.graph.circular_behavior;
        self.emit(ResolveEvent::CycleDetected {
            chain: chain.clone(),
            behavior,
        });

        match behavior {
            CircularBehavior::Prevent => Err(ResolveError::CircularDependency { chain }),
            CircularBehavior::Warn => {
                log::warn!("Circular dependency cut: {}", chain.join(" -> "));
                self.report(Diagnostic::CircularDependency { chain });
                Ok(false)
            }
            CircularBehavior::Allow => {
                let max_loops = self.options.max_loops;
                let count = self.reentries.entry(node_id.to_string()).or_insert(0);
                if *count >= max_loops {
                    log::warn!(
                        "Node '{}' exceeded {} loops, substituting null",
                        node_id,
                        max_loops
                    );
                    self.report(Diagnostic::MaxLoopsExceeded {
                        node_id: node_id.to_string(),
                        max_loops,
                    });
                    return Ok(false);
                }
                *count += 1;
                Ok(true)
            }
        }
    }

    /// Advance the top frame until it needs an upstream node or is done
    ///
    /// A port with one connection takes the upstream value, several yield an
    /// array in declaration order, none falls back to the node's own data.
    fn step(&mut self) -> Result<Step<'a>> {
        let graph = self.graph;
        let port_types = self.port_types;
        let port_resolver = self.port_resolver;
        let context = self.context;
        let Some(frame) = self.frames.last_mut() else {
            return Ok(Step::Inputs);
        };

        loop {
            if let Some(&connection) = frame.connections.get(frame.values.len()) {
                return Ok(Step::Read(connection));
            }
            if !frame.connections.is_empty() {
                let values = std::mem::take(&mut frame.values);
                let value = match <[Value; 1]>::try_from(values) {
                    Ok([single]) => single,
                    Err(many) => Value::Array(many),
                };
                frame
                    .inputs
                    .insert(frame.ports[frame.port].name.clone(), value);
                frame.connections.clear();
                frame.port += 1;
            }

            let node = frame.node;
            let Some(port) = frame.ports.get(frame.port) else {
                return Ok(Step::Inputs);
            };
            let port_type = lookup_port_type(port_types, node, port)?;
            frame.connections = live_connections(graph, node, port);
            if frame.connections.is_empty() {
                let empty = ControlData::new();
                let data = node.input_data.get(&port.name).unwrap_or(&empty);
                let value = port_resolver.resolve_port(port, port_type, data, context);
                frame.inputs.insert(port.name.clone(), value);
                frame.port += 1;
            }
        }
    }

    /// Hand an upstream node's outputs to the connection the top frame reads
    fn deliver(&mut self, outputs: Option<OutputValues>) {
        let Some(frame) = self.frames.last() else {
            return;
        };
        let Some(&connection) = frame.connections.get(frame.values.len()) else {
            return;
        };
        let reader = frame.node;

        let value = match outputs {
            None => Value::Null,
            Some(outputs) => match outputs.get(&connection.port_name) {
                Some(value) => value.clone(),
                None => {
                    log::debug!(
                        "Node '{}' has no output '{}' (read by '{}')",
                        connection.node_id,
                        connection.port_name,
                        reader.id
                    );
                    self.report(Diagnostic::UnknownPort {
                        node_id: connection.node_id.clone(),
                        port_name: connection.port_name.clone(),
                        requested_by: reader.id.clone(),
                    });
                    Value::Null
                }
            },
        };

        if let Some(frame) = self.frames.last_mut() {
            frame.values.push(value);
        }
    }

    /// Run the resolver of a frame whose inputs are all resolved
    fn complete(&mut self, frame: Frame<'a>) -> Result<OutputValues> {
        let Frame {
            node,
            node_type,
            inputs,
            ..
        } = frame;

        let output_ports = node_type.outputs.ports(node, self.context);
        for port in output_ports.iter() {
            lookup_port_type(self.port_types, node, port)?;
        }

        let mut produced = node_type.resolve(node, &inputs, self.context)?;
        let outputs: OutputValues = output_ports
            .iter()
            .map(|port| {
                let value = produced.remove(&port.name).unwrap_or(Value::Null);
                (port.name.clone(), value)
            })
            .collect();

        // Nested re-entries of a node still being resolved are not final.
        if !self.frames.iter().any(|f| f.node.id == node.id) {
            log::debug!("Resolved node '{}' ({})", node.id, node.node_type);
            self.resolved.insert(node.id.clone(), outputs.clone());
            self.resolved_inputs.insert(node.id.clone(), inputs);
            self.emit(ResolveEvent::NodeResolved {
                node_id: node.id.clone(),
            });
        }
        Ok(outputs)
    }

    fn node_type(&self, node: &GraphNode) -> Result<&'a NodeTypeDefinition> {
        self.node_types
            .get(&node.node_type)
            .ok_or_else(|| ResolveError::MissingNodeType {
                node_id: node.id.clone(),
                node_type: node.node_type.clone(),
            })
    }

    fn report(&mut self, diagnostic: Diagnostic) {
        if !self.diagnostics.contains(&diagnostic) {
            self.diagnostics.push(diagnostic);
        }
    }

    fn emit(&self, event: ResolveEvent) {
        if let Err(e) = self.events.send(event) {
            log::warn!("Failed to send resolve event: {}", e);
        }
    }
}

fn lookup_port_type<'a>(
    port_types: &'a PortTypeCatalog,
    node: &GraphNode,
    port: &Port,
) -> Result<&'a PortTypeDefinition> {
    port_types
        .get(&port.port_type)
        .ok_or_else(|| ResolveError::MissingPortType {
            node_id: node.id.clone(),
            port_name: port.name.clone(),
            port_type: port.port_type.clone(),
        })
}

/// Connections into a port whose source node exists
fn live_connections<'a>(
    graph: &NodeGraph,
    node: &'a GraphNode,
    port: &Port,
) -> Vec<&'a Connection> {
    node.connections
        .inputs_for(&port.name)
        .iter()
        .filter(|c| {
            let exists = graph.contains_node(&c.node_id);
            if !exists {
                log::debug!(
                    "Dangling connection {}.{} <- {}.{} ignored",
                    node.id,
                    port.name,
                    c.node_id,
                    c.port_name
                );
            }
            exists
        })
        .collect()
}
