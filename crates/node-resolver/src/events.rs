//! Event types for observing resolution passes
//!
//! Events are sent from the engine to any consumer (an editor's debug
//! panel, a test, a log shipper) while a pass runs.

use serde::{Deserialize, Serialize};

use crate::types::{CircularBehavior, NodeId};

/// Trait for receiving resolution events
///
/// This abstracts over the transport mechanism (channel, UI bridge, etc.)
/// so the engine can be embedded in different hosts.
pub trait EventSink: Send + Sync {
    /// Send an event
    ///
    /// Returns an error if the event could not be sent (e.g., channel closed)
    fn send(&self, event: ResolveEvent) -> Result<(), EventError>;
}

/// Error when sending events fails
#[derive(Debug, Clone)]
pub struct EventError {
    pub message: String,
}

impl std::fmt::Display for EventError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Event error: {}", self.message)
    }
}

impl std::error::Error for EventError {}

/// Events emitted during a resolution pass
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ResolveEvent {
    /// A pass started from the given roots
    #[serde(rename_all = "camelCase")]
    PassStarted { roots: Vec<NodeId> },

    /// A node's resolver ran and its outputs are known
    #[serde(rename_all = "camelCase")]
    NodeResolved { node_id: NodeId },

    /// A node re-entered resolution while still on the stack
    #[serde(rename_all = "camelCase")]
    CycleDetected {
        chain: Vec<NodeId>,
        behavior: CircularBehavior,
    },

    /// A pass finished without error
    #[serde(rename_all = "camelCase")]
    PassCompleted {
        resolved_nodes: usize,
        diagnostics: usize,
    },
}

impl<T: EventSink + ?Sized> EventSink for std::sync::Arc<T> {
    fn send(&self, event: ResolveEvent) -> Result<(), EventError> {
        (**self).send(event)
    }
}

/// A no-op event sink that discards all events
pub struct NullEventSink;

impl EventSink for NullEventSink {
    fn send(&self, _event: ResolveEvent) -> Result<(), EventError> {
        Ok(())
    }
}

/// A vector-based event sink that collects events
///
/// Useful for testing to verify events were emitted correctly.
pub struct VecEventSink {
    events: std::sync::Mutex<Vec<ResolveEvent>>,
}

impl VecEventSink {
    pub fn new() -> Self {
        Self {
            events: std::sync::Mutex::new(Vec::new()),
        }
    }

    /// Get all collected events
    pub fn events(&self) -> Vec<ResolveEvent> {
        self.events.lock().map(|e| e.clone()).unwrap_or_default()
    }
}

impl Default for VecEventSink {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSink for VecEventSink {
    fn send(&self, event: ResolveEvent) -> Result<(), EventError> {
        let mut events = self.events.lock().map_err(|_| EventError {
            message: "Event buffer poisoned".to_string(),
        })?;
        events.push(event);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vec_event_sink() {
        let sink = VecEventSink::new();

        sink.send(ResolveEvent::NodeResolved { node_id: "n1".into() })
            .unwrap();

        let events = sink.events();
        assert_eq!(events.len(), 1);

        match &events[0] {
            ResolveEvent::NodeResolved { node_id } => assert_eq!(node_id, "n1"),
            _ => panic!("Expected NodeResolved event"),
        }
    }

    #[test]
    fn test_null_event_sink() {
        let sink = NullEventSink;
        sink.send(ResolveEvent::PassStarted { roots: vec![] }).unwrap();
    }

    #[test]
    fn test_event_serialization() {
        let event = ResolveEvent::CycleDetected {
            chain: vec!["a".into(), "a".into()],
            behavior: CircularBehavior::Warn,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "cycleDetected");
        assert_eq!(json["behavior"], "warn");
    }
}
