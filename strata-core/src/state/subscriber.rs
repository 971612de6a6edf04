//! Subscriber types for the state store.
//!
//! A subscriber is a `(prev, next)` callback registered on a
//! [`StateStore`](super::StateStore). Each registration gets its own
//! [`SubscriberId`] so it can be removed without touching the others.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use indexmap::IndexMap;
use parking_lot::RwLock;

/// Key of one `(prev, next)` callback in a store's registry.
///
/// Ids come from a process-wide counter, so a [`Subscription`] can never
/// remove a callback registered after it on any store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriberId(u64);

impl SubscriberId {
    pub fn new() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

impl Default for SubscriberId {
    fn default() -> Self {
        Self::new()
    }
}

/// Change callback: receives the snapshot before and after a commit.
pub type Callback<S> = Arc<dyn Fn(&Arc<S>, &Arc<S>) + Send + Sync>;

/// Subscribers in registration order.
pub(crate) type Registry<S> = RwLock<IndexMap<SubscriberId, Callback<S>>>;

/// Handle returned by [`StateStore::subscribe`](super::StateStore::subscribe).
///
/// Dropping the handle leaves the callback registered; call
/// [`unsubscribe`](Self::unsubscribe) to stop notifications.
pub struct Subscription {
    id: SubscriberId,
    detach: Box<dyn Fn(SubscriberId) + Send + Sync>,
}

impl Subscription {
    pub(crate) fn new<S>(id: SubscriberId, registry: Weak<Registry<S>>) -> Self
    where
        S: Send + Sync + 'static,
    {
        Self {
            id,
            detach: Box::new(move |id| {
                if let Some(registry) = registry.upgrade() {
                    // shift_remove keeps the remaining subscribers in order
                    registry.write().shift_remove(&id);
                }
            }),
        }
    }

    /// The subscriber's ID.
    pub fn id(&self) -> SubscriberId {
        self.id
    }

    /// Stop receiving notifications. Calling this more than once is a no-op.
    pub fn unsubscribe(&self) {
        (self.detach)(self.id);
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subscriber_ids_are_unique() {
        let id1 = SubscriberId::new();
        let id2 = SubscriberId::new();
        let id3 = SubscriberId::new();

        assert_ne!(id1, id2);
        assert_ne!(id2, id3);
        assert_ne!(id1, id3);
    }

    #[test]
    fn unsubscribe_removes_only_its_own_entry() {
        let registry: Arc<Registry<i32>> = Arc::new(RwLock::new(IndexMap::new()));
        let first = SubscriberId::new();
        let second = SubscriberId::new();
        registry.write().insert(first, Arc::new(|_, _| {}));
        registry.write().insert(second, Arc::new(|_, _| {}));

        let subscription = Subscription::new(first, Arc::downgrade(&registry));
        subscription.unsubscribe();
        subscription.unsubscribe();

        let remaining: Vec<_> = registry.read().keys().copied().collect();
        assert_eq!(remaining, vec![second]);
    }

    #[test]
    fn unsubscribe_after_store_dropped_is_harmless() {
        let registry: Arc<Registry<i32>> = Arc::new(RwLock::new(IndexMap::new()));
        let subscription = Subscription::new(SubscriberId::new(), Arc::downgrade(&registry));
        drop(registry);

        subscription.unsubscribe();
    }
}
