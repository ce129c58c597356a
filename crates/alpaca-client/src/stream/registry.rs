//! Concurrent subscription registry with ordered fan-out.

use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::error;

use crate::stream::events::{EventKind, StreamEvent};

/// A subscriber to one event stream.
pub trait EventListener: Send + Sync {
    /// Invoked for every event of the subscribed kind, in arrival order.
    fn on_event(&self, event: &StreamEvent);
}

impl<F> EventListener for F
where
    F: Fn(&StreamEvent) + Send + Sync,
{
    fn on_event(&self, event: &StreamEvent) {
        self(event);
    }
}

/// Routes decoded events to registered listeners.
///
/// Listeners for a kind are invoked in registration order. A listener that
/// panics is isolated; the remaining listeners still run.
#[derive(Default)]
pub struct SubscriptionRegistry {
    listeners: RwLock<HashMap<EventKind, Vec<Arc<dyn EventListener>>>>,
}

impl SubscriptionRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener for events of the given kind.
    pub fn subscribe(&self, kind: EventKind, listener: Arc<dyn EventListener>) {
        self.listeners.write().entry(kind).or_default().push(listener);
    }

    /// Number of listeners registered for a kind.
    #[must_use]
    pub fn listener_count(&self, kind: EventKind) -> usize {
        self.listeners.read().get(&kind).map_or(0, Vec::len)
    }

    /// The kinds with at least one listener, the streams worth negotiating.
    #[must_use]
    pub fn subscribed_kinds(&self) -> Vec<EventKind> {
        let listeners = self.listeners.read();
        let mut kinds: Vec<EventKind> = listeners
            .iter()
            .filter(|(_, v)| !v.is_empty())
            .map(|(k, _)| *k)
            .collect();
        kinds.sort_by_key(|kind| kind.as_str());
        kinds
    }

    /// Deliver an event to every listener of its kind.
    ///
    /// The listener list is snapshotted under the read lock and invoked
    /// outside it, so a listener may subscribe without deadlocking.
    pub fn dispatch(&self, event: &StreamEvent) {
        let snapshot: Vec<Arc<dyn EventListener>> = {
            let listeners = self.listeners.read();
            listeners.get(&event.kind()).cloned().unwrap_or_default()
        };

        for listener in snapshot {
            if panic::catch_unwind(AssertUnwindSafe(|| listener.on_event(event))).is_err() {
                error!(kind = %event.kind(), "event listener panicked");
            }
        }
    }
}

impl std::fmt::Debug for SubscriptionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let listeners = self.listeners.read();
        f.debug_struct("SubscriptionRegistry")
            .field("kinds", &listeners.keys().collect::<Vec<_>>())
            .finish()
    }
}
