//! Observer registry
//!
//! A small subscription abstraction used by the store and the tracker.
//! `subscribe` returns a cancellation handle; dispatch iterates a snapshot of
//! the subscriber list so a subscriber added or removed mid-dispatch cannot
//! corrupt iteration, and a panicking subscriber is isolated from the others.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::rc::Rc;

/// Identity of one subscriber within a registry
pub type SubscriberId = u64;

/// Cancellation handle returned by `subscribe`
///
/// Dropping the handle does not cancel the subscription; pass it back to
/// `cancel` explicitly so callbacks are never silently unhooked.
#[derive(Debug)]
pub struct Subscription {
    id: SubscriberId,
}

impl Subscription {
    pub fn id(&self) -> SubscriberId {
        self.id
    }
}

/// A list of callbacks receiving events of type `T`
pub struct ObserverRegistry<T> {
    subscribers: Vec<(SubscriberId, Rc<dyn Fn(&T)>)>,
    next_id: SubscriberId,
}

impl<T> ObserverRegistry<T> {
    pub fn new() -> Self {
        Self {
            subscribers: Vec::new(),
            next_id: 0,
        }
    }

    /// Register a callback, returning its cancellation handle
    pub fn subscribe(&mut self, callback: impl Fn(&T) + 'static) -> Subscription {
        let id = self.next_id;
        self.next_id += 1;
        self.subscribers.push((id, Rc::new(callback)));
        Subscription { id }
    }

    /// Remove a subscription; returns false if it was already gone
    pub fn cancel(&mut self, subscription: Subscription) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(id, _)| *id != subscription.id);
        self.subscribers.len() != before
    }

    /// Call every subscriber with the event
    ///
    /// Iterates a snapshot taken before the first call; a panic in one
    /// subscriber is caught, logged and does not reach the others.
    pub fn dispatch(&self, event: &T) {
        let snapshot: Vec<(SubscriberId, Rc<dyn Fn(&T)>)> = self.subscribers.clone();
        for (id, callback) in snapshot {
            if catch_unwind(AssertUnwindSafe(|| callback(event))).is_err() {
                log::error!("subscriber {} panicked during dispatch", id);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.subscribers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscribers.is_empty()
    }
}

impl<T> Default for ObserverRegistry<T> {
    fn default() -> Self {
        Self::new()
    }
}
