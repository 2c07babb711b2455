//! The dispatch gate: the only entry point for starting an action.
//!
//! Every invocation, from any surface, goes through
//! [`DispatchGate::dispatch_action_start`]. The gate normalizes the requested
//! id through the registry and fails closed: an id that does not resolve to a
//! canonical executable action produces a diagnostic warning and no event.
//! The gate is synchronous and performs no I/O; it returns before any
//! execution begins.

use std::sync::Arc;

use serde_json::Value;
use tracing::warn;

use crate::bus::{ActionPublisher, ActionStartEvent};
use crate::registry::ActionRegistry;
use crate::types::ActionContext;

/// Source recorded when the caller does not identify itself.
pub const DEFAULT_DISPATCH_SOURCE: &str = "dispatch_action_start";

/// Sole producer on the action-start channel.
pub struct DispatchGate {
    registry: Arc<ActionRegistry>,
    publisher: ActionPublisher,
}

impl DispatchGate {
    /// Create the gate, consuming the channel's publish capability.
    pub fn new(registry: Arc<ActionRegistry>, publisher: ActionPublisher) -> Self {
        Self {
            registry,
            publisher,
        }
    }

    /// Validate and normalize `action_id`, then publish exactly one
    /// action-start event. Unknown or retired ids are logged and dropped.
    pub fn dispatch_action_start(
        &self,
        action_id: &str,
        context: Option<ActionContext>,
        config: Option<Value>,
        source: Option<&str>,
    ) {
        let source = source.unwrap_or(DEFAULT_DISPATCH_SOURCE);
        let Some(normalized) = self.registry.normalize_executable_action_id(action_id) else {
            warn!(
                action_id,
                source, "action id is not executable; dispatch rejected"
            );
            return;
        };
        let event = ActionStartEvent {
            action_id: normalized,
            context: context.unwrap_or_default(),
            config: config.unwrap_or_else(|| Value::Object(serde_json::Map::new())),
            source: source.to_string(),
        };
        self.publisher.publish(event);
    }
}
