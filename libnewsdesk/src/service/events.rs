//! Event system for publication progress and failure signals
//!
//! Events are distributed over a `tokio::sync::broadcast` channel. Emitting
//! never blocks: with no subscribers the event is dropped, and lagging
//! subscribers lose the oldest events first.
//!
//! # Example
//!
//! ```no_run
//! use libnewsdesk::service::events::{EventBus, Event};
//!
//! # async fn example() {
//! let event_bus = EventBus::new(100);
//! let mut receiver = event_bus.subscribe();
//!
//! event_bus.emit(Event::StoreCleared);
//!
//! if let Ok(event) = receiver.recv().await {
//!     println!("Received: {:?}", event);
//! }
//! # }
//! ```

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::types::Role;

/// Event receiver type alias
pub type EventReceiver = broadcast::Receiver<Event>;

/// Event bus for distributing store and pipeline events
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<Event>,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(100)
    }
}

impl EventBus {
    /// Create a new event bus with the specified per-subscriber capacity
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Subscribe to events emitted after this call
    pub fn subscribe(&self) -> EventReceiver {
        self.sender.subscribe()
    }

    /// Emit an event to all subscribers
    pub fn emit(&self, event: Event) {
        // send() only fails when nobody is listening
        let _ = self.sender.send(event);
    }
}

/// Events emitted by the store and the publication pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// A publish attempt passed validation and authentication
    PublishStarted { role: Role, title: String },

    /// A media upload failed and the field was left empty
    MediaUploadFailed { file_name: String, error: String },

    /// Item persisted
    PublishCompleted { id: Option<String>, title: String },

    /// Publish rejected before any write
    PublishRejected { reason: String },

    /// Save was attempted and failed; the draft is kept for retry
    PersistFailed { error: String },

    /// The remote listing failed and the local sequence was served instead
    RemoteFallback { error: String },

    ItemDeleted { id: String },

    StoreCleared,
}
