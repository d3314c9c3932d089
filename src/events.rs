//! Broadcast channel for real-time job events

use crate::types::{Event, JobId};
use tokio::sync::broadcast;

/// Fans events out to every connected real-time client
///
/// Cloning is cheap; all clones publish into the same channel. Publishing is
/// best effort: with no subscribers the event is dropped, and a subscriber
/// that connects later never sees earlier events.
#[derive(Clone, Debug)]
pub struct EventPublisher {
    tx: broadcast::Sender<Event>,
}

impl EventPublisher {
    /// Create a publisher whose subscribers may lag by up to `capacity` events
    pub fn new(capacity: usize) -> Self {
        // broadcast::channel panics on a zero capacity
        let (tx, _rx) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    /// Send an event to all current subscribers
    pub fn publish(&self, event: Event) {
        // send() only fails when nobody is listening
        self.tx.send(event).ok();
    }

    /// Publish a progress fraction for a job
    pub fn publish_progress(&self, id: JobId, progress: f64) {
        self.publish(Event::Progress { id, progress });
    }

    /// Subscribe to all future events
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.tx.subscribe()
    }

    /// Number of connected subscribers
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}
