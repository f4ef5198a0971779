//! Viewer lifecycle events and the dispatcher that fans them out.
//!
//! The readiness and recovery signals required by the load coordinator ride
//! the same bus as the informational playback events, so observers subscribe
//! once and filter by variant.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::animation::AnimationType;
use crate::time::Timestamp;

/// Events emitted by the viewer runtime
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum ViewerEvent {
    /// A model finished loading and is bound to the surface
    ModelLoaded { model_id: String },
    /// A model session was evicted, reclaimed or explicitly unloaded
    ModelUnloaded { model_id: String },
    /// A model load failed
    LoadFailed { model_id: String, reason: String },
    /// An animation started playing
    AnimationStarted {
        model_id: String,
        kind: AnimationType,
        group: String,
        index: usize,
    },
    /// The active animation ran to completion
    AnimationCompleted {
        model_id: String,
        group: String,
        index: usize,
    },
    /// The active expression changed (`None` means cleared)
    ExpressionChanged {
        model_id: String,
        index: Option<usize>,
    },
    /// The render surface was recreated after a failed health check
    SurfaceRecovered { at: Timestamp },
}

type Subscriber = Box<dyn Fn(&ViewerEvent) + Send + Sync>;

/// Fan-out dispatcher for viewer events
#[derive(Default)]
pub struct EventDispatcher {
    subscribers: Vec<(Uuid, Subscriber)>,
}

impl EventDispatcher {
    /// Create an empty dispatcher
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe to all events; returns a token for unsubscribing
    pub fn subscribe(&mut self, subscriber: impl Fn(&ViewerEvent) + Send + Sync + 'static) -> Uuid {
        let token = Uuid::new_v4();
        self.subscribers.push((token, Box::new(subscriber)));
        token
    }

    /// Remove a subscriber; returns `false` if the token is unknown
    pub fn unsubscribe(&mut self, token: Uuid) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(t, _)| *t != token);
        self.subscribers.len() != before
    }

    /// Deliver an event to every subscriber in subscription order
    pub fn dispatch(&self, event: &ViewerEvent) {
        for (_, subscriber) in &self.subscribers {
            subscriber(event);
        }
    }

    /// Number of live subscriptions
    #[inline]
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }
}

impl std::fmt::Debug for EventDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventDispatcher")
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_subscribe_dispatch_unsubscribe() {
        let mut dispatcher = EventDispatcher::new();
        let seen = Arc::new(AtomicUsize::new(0));

        let seen_clone = Arc::clone(&seen);
        let token = dispatcher.subscribe(move |_| {
            seen_clone.fetch_add(1, Ordering::SeqCst);
        });

        dispatcher.dispatch(&ViewerEvent::ModelLoaded {
            model_id: "haru".to_string(),
        });
        assert_eq!(seen.load(Ordering::SeqCst), 1);

        assert!(dispatcher.unsubscribe(token));
        assert!(!dispatcher.unsubscribe(token));

        dispatcher.dispatch(&ViewerEvent::ModelUnloaded {
            model_id: "haru".to_string(),
        });
        assert_eq!(seen.load(Ordering::SeqCst), 1);
    }
}
