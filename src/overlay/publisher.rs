//! Snapshot broadcast hub

use std::{
    panic::{catch_unwind, AssertUnwindSafe},
    sync::{Arc, Mutex, MutexGuard, PoisonError, Weak},
};
use tracing::{debug, warn};

use crate::state::CountdownSnapshot;

type Callback = Arc<dyn Fn(&CountdownSnapshot) + Send + Sync>;

#[derive(Default)]
struct Subscribers {
    next_id: u64,
    entries: Vec<(u64, Callback)>,
}

/// Delivers snapshots synchronously to every subscriber, in subscription order.
///
/// Callbacks run on the publishing thread after the engine has released its
/// state lock. They may read the engine's snapshot but should hand work off
/// (e.g. into a channel) rather than issue countdown commands.
#[derive(Default)]
pub struct OverlayPublisher {
    subscribers: Arc<Mutex<Subscribers>>,
}

impl OverlayPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a callback. It stays registered until the returned
    /// [`Subscription`] is dropped or explicitly unsubscribed.
    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&CountdownSnapshot) + Send + Sync + 'static,
    {
        let mut subscribers = lock(&self.subscribers);
        let id = subscribers.next_id;
        subscribers.next_id += 1;
        subscribers.entries.push((id, Arc::new(callback)));
        debug!("Overlay subscriber {} registered", id);

        Subscription {
            id,
            subscribers: Arc::downgrade(&self.subscribers),
        }
    }

    /// Deliver a snapshot to all current subscribers.
    ///
    /// A panicking subscriber is logged and skipped. Returns the number of
    /// subscribers that received the snapshot without panicking.
    pub fn publish(&self, snapshot: &CountdownSnapshot) -> usize {
        // Iterate over a copy so callbacks may (un)subscribe freely.
        let callbacks: Vec<(u64, Callback)> = lock(&self.subscribers).entries.clone();

        let mut delivered = 0;
        for (id, callback) in callbacks {
            match catch_unwind(AssertUnwindSafe(|| callback(snapshot))) {
                Ok(()) => delivered += 1,
                Err(_) => warn!("Overlay subscriber {} panicked; skipping", id),
            }
        }
        delivered
    }

    pub fn subscriber_count(&self) -> usize {
        lock(&self.subscribers).entries.len()
    }
}

/// Registration handle returned by [`OverlayPublisher::subscribe`]
pub struct Subscription {
    id: u64,
    subscribers: Weak<Mutex<Subscribers>>,
}

impl Subscription {
    /// Remove the callback now instead of at drop.
    pub fn unsubscribe(self) {
        drop(self);
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(subscribers) = self.subscribers.upgrade() {
            lock(&subscribers).entries.retain(|(id, _)| *id != self.id);
            debug!("Overlay subscriber {} removed", self.id);
        }
    }
}

fn lock(subscribers: &Mutex<Subscribers>) -> MutexGuard<'_, Subscribers> {
    subscribers.lock().unwrap_or_else(PoisonError::into_inner)
}
