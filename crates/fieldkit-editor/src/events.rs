//! Engine events
//!
//! Provides:
//! - Event types for session lifecycle and field changes
//! - Event dispatcher for publishing events to subscribers
//!
//! Events are published after the registry state has changed, so a
//! subscriber can read the registry to get the new state. A persistence
//! layer typically saves on `FieldCreated`/`FieldUpdated` and deletes on
//! `FieldDeleted`. Drag moves are not published.

use std::fmt;
use tokio::sync::broadcast;

use crate::draw::SessionKind;
use crate::model::FieldId;

/// Identifies the kind of an active session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionTag {
    Drawing(SessionKind),
    Editing(FieldId),
}

impl fmt::Display for SessionTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionTag::Drawing(kind) => write!(f, "{}", kind.label()),
            SessionTag::Editing(id) => write!(f, "editing {}", id),
        }
    }
}

/// Engine event types
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    /// A drawing or editing session became active
    SessionStarted(SessionTag),
    /// The active session ended (closed, cancelled, committed or discarded)
    SessionEnded(SessionTag),
    /// A drawing session was closed into a new field
    FieldCreated(FieldId),
    /// Field vertices, style or name changed
    FieldUpdated(FieldId),
    /// A field was deleted
    FieldDeleted(FieldId),
    /// The selected field changed
    SelectionChanged(Option<FieldId>),
    /// A distance path was closed
    PathMeasured {
        /// Total path length in metres.
        length_m: f64,
    },
}

impl fmt::Display for EngineEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineEvent::SessionStarted(tag) => write!(f, "Session started: {}", tag),
            EngineEvent::SessionEnded(tag) => write!(f, "Session ended: {}", tag),
            EngineEvent::FieldCreated(id) => write!(f, "Field created: {}", id),
            EngineEvent::FieldUpdated(id) => write!(f, "Field updated: {}", id),
            EngineEvent::FieldDeleted(id) => write!(f, "Field deleted: {}", id),
            EngineEvent::SelectionChanged(Some(id)) => write!(f, "Selected: {}", id),
            EngineEvent::SelectionChanged(None) => write!(f, "Selection cleared"),
            EngineEvent::PathMeasured { length_m } => {
                write!(f, "Path measured: {}", fieldkit_core::format_distance(*length_m))
            }
        }
    }
}

/// Event dispatcher for publishing events to subscribers
#[derive(Clone)]
pub struct EventDispatcher {
    tx: broadcast::Sender<EngineEvent>,
}

impl EventDispatcher {
    /// Create a new event dispatcher
    ///
    /// # Arguments
    /// * `buffer_size` - Number of events a slow subscriber may lag behind
    pub fn new(buffer_size: usize) -> Self {
        let (tx, _) = broadcast::channel(buffer_size.max(1));
        Self { tx }
    }

    /// Subscribe to events
    pub fn subscribe(&self) -> broadcast::Receiver<EngineEvent> {
        self.tx.subscribe()
    }

    /// Publish an event to all subscribers
    ///
    /// Returns the number of subscribers that received it. Publishing with
    /// no subscribers is not an error.
    pub fn publish(&self, event: EngineEvent) -> usize {
        tracing::trace!("{}", event);
        self.tx.send(event).unwrap_or(0)
    }

    /// Get number of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for EventDispatcher {
    fn default() -> Self {
        Self::new(256)
    }
}

impl fmt::Debug for EventDispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventDispatcher")
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}
