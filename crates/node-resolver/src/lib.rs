//! Node Resolver - Demand-driven resolution of node graphs
//!
//! This crate evaluates node-based programs as built by a visual editor: a
//! graph of typed nodes whose ports are wired together. Resolution starts at
//! one or more root nodes and pulls values backward through the connections,
//! so only what a root needs is computed. It supports:
//!
//! - Per-pass memoization (shared upstream nodes resolve once)
//! - Configurable cycle handling (prevent, warn, allow with a loop ceiling)
//! - Dynamic port lists computed from a node's data, connections and context
//! - An opaque, host-defined context threaded to every callback
//!
//! # Architecture
//!
//! - `NodeGraph`: the serializable graph, keyed by node id
//! - `NodeTypeCatalog` / `PortTypeCatalog`: what node and port types exist
//! - `RootEngine`: runs resolution passes; holds no per-pass state
//! - `EventSink`: generic event streaming for hosts and tests
//!
//! # Example
//!
//! ```ignore
//! use node_resolver::{GraphBuilder, ResolveContext, ResolveOptions, RootEngine};
//!
//! let graph = GraphBuilder::new()
//!     .add_node("a", "number")
//!     .with_data("number", "number", json!(2))
//!     .add_root("out", "output")
//!     .connect("a", "number", "out", "value")
//!     .build();
//!
//! let engine = RootEngine::with_builtins();
//! let options = ResolveOptions::default();
//! let inputs = engine.resolve_root_node(&graph, &options, &ResolveContext::new())?;
//! ```

pub mod builder;
pub mod catalog;
pub mod context;
pub mod descriptor;
pub mod diagnostics;
pub mod engine;
pub mod error;
pub mod events;
pub mod ports;
pub mod types;
pub mod validation;

// Re-export key types
pub use builder::GraphBuilder;
pub use catalog::{
    CallbackResolver, NodeResolver, NodeTypeCatalog, NodeTypeDefinition, PortBuilderFn, PortList,
};
pub use context::ResolveContext;
pub use descriptor::{DescriptorFn, NodeDescriptor, PortTypeFn};
pub use diagnostics::Diagnostic;
pub use engine::{
    resolve, root_node_ids, Resolution, ResolveOptions, RootEngine, DEFAULT_MAX_LOOPS,
};
pub use error::{ResolveError, Result};
pub use events::{EventError, EventSink, NullEventSink, ResolveEvent, VecEventSink};
pub use ports::{
    Control, ControlPortResolver, ControlType, FnPortResolver, Port, PortResolver,
    PortTypeCatalog, PortTypeDefinition, SelectOption,
};
pub use types::{
    CircularBehavior, Connection, ConnectionMap, Connections, ControlData, GraphNode, InputData,
    InputValues, NodeGraph, NodeId, OutputValues, PortName,
};
pub use validation::{validate_graph, would_create_cycle, ValidationError};
