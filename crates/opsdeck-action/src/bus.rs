//! The action-start channel.
//!
//! A process-wide broadcast with exactly one producer, enforced by
//! construction: `action_channel` hands out a single non-clonable
//! [`ActionPublisher`] whose publish method is crate-private, so only the
//! dispatch gate can emit, while any number of consumers subscribe through
//! the clonable [`ActionEvents`] handle. Subscribers receive clones of each
//! event and must not rely on payload mutation being visible elsewhere.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tokio_stream::wrappers::BroadcastStream;

use crate::types::{ActionContext, ActionId};

/// Well-known name of the action-start channel.
pub const ACTION_START_CHANNEL: &str = "opsdeck.action.start";

/// Event published for every accepted dispatch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionStartEvent {
    pub action_id: ActionId,
    pub context: ActionContext,
    pub config: serde_json::Value,
    pub source: String,
}

/// The single publish capability for the action-start channel.
///
/// Deliberately not `Clone`: holding this value is what authorizes emitting
/// action-start events, and the dispatch gate consumes it on construction.
pub struct ActionPublisher {
    tx: broadcast::Sender<ActionStartEvent>,
}

impl ActionPublisher {
    /// Publish one event, returning the number of subscribers that received
    /// it. Zero subscribers is not an error.
    pub(crate) fn publish(&self, event: ActionStartEvent) -> usize {
        self.tx.send(event).unwrap_or(0)
    }
}

/// Subscription handle for the action-start channel.
#[derive(Clone)]
pub struct ActionEvents {
    tx: broadcast::Sender<ActionStartEvent>,
}

impl ActionEvents {
    /// A fresh receiver observing events published after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<ActionStartEvent> {
        self.tx.subscribe()
    }

    /// A `Stream` adapter over a fresh subscription.
    pub fn stream(&self) -> BroadcastStream<ActionStartEvent> {
        BroadcastStream::new(self.tx.subscribe())
    }

    /// Number of live subscribers.
    pub fn receiver_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

/// Create the action-start channel, returning its one publish capability and
/// the subscription handle.
pub fn action_channel(capacity: usize) -> (ActionPublisher, ActionEvents) {
    let (tx, _) = broadcast::channel(capacity.max(1));
    (ActionPublisher { tx: tx.clone() }, ActionEvents { tx })
}
