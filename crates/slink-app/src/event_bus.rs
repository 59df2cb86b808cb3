//! Minimal synchronous publish/subscribe
//!
//! Observers are called in subscription order, on the publisher's thread,
//! before `publish` returns. Nothing is queued: an event published with no
//! subscribers is gone, so late subscribers must query current state instead.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;

/// Receives published events
pub trait Observer<E>: Send + Sync {
    fn notify(&self, event: &E);
}

impl<E, F> Observer<E> for F
where
    F: Fn(&E) + Send + Sync,
{
    fn notify(&self, event: &E) {
        self(event)
    }
}

/// Handle returned by [`EventBus::subscribe`], used to unsubscribe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Subscriber<E> = (SubscriptionId, Arc<dyn Observer<E>>);

pub struct EventBus<E> {
    subscribers: Mutex<Vec<Subscriber<E>>>,
    next_id: AtomicU64,
}

impl<E: 'static> Default for EventBus<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: 'static> EventBus<E> {
    pub fn new() -> Self {
        Self {
            subscribers: Mutex::new(Vec::new()),
            next_id: AtomicU64::new(1),
        }
    }

    pub fn subscribe(&self, observer: impl Observer<E> + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.subscribers
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push((id, Arc::new(observer)));
        id
    }

    /// Returns false if the subscription was already removed
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut subscribers = self.subscribers.lock().unwrap_or_else(|e| e.into_inner());
        let before = subscribers.len();
        subscribers.retain(|(sub_id, _)| *sub_id != id);
        subscribers.len() != before
    }

    /// Deliver `event` to every current subscriber. Returns how many were notified.
    pub fn publish(&self, event: &E) -> usize {
        // Snapshot so observers may (un)subscribe from inside `notify`
        let snapshot: Vec<Arc<dyn Observer<E>>> = self
            .subscribers
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .map(|(_, observer)| Arc::clone(observer))
            .collect();

        for observer in &snapshot {
            observer.notify(event);
        }
        snapshot.len()
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .len()
    }
}

impl<E: Clone + Send + 'static> EventBus<E> {
    /// Subscribe with a channel, for async consumers
    pub fn subscribe_channel(&self) -> (SubscriptionId, mpsc::UnboundedReceiver<E>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let id = self.subscribe(move |event: &E| {
            // Receiver dropped is fine
            let _ = tx.send(event.clone());
        });
        (id, rx)
    }
}
