//! State Store Implementation
//!
//! A StateStore owns one immutable snapshot of a model's state and the
//! ordered list of callbacks interested in its changes.
//!
//! # How Commits Work
//!
//! 1. `set_state` receives an [`Update`]: a replacement value or a mutator.
//!
//! 2. The update is applied to the current snapshot. Mutators work on a
//!    copy-on-write [`Draft`](super::Draft), so untouched sub-structures are
//!    shared with the previous snapshot and a no-op mutator commits the very
//!    same `Arc`.
//!
//! 3. The new snapshot is published and every subscriber registered at that
//!    moment is called once with `(prev, next)`, in subscription order. No
//!    de-duplication happens here: equal snapshots are still delivered.
//!
//! # Re-entrancy
//!
//! A `set_state` issued while another commit is publishing (from inside a
//! mutator, from a subscriber callback, or from another thread) is queued
//! and committed right after the current notification round. Each queued
//! update still produces its own notification, and the nested call returns
//! before its update is visible.
//!
//! If a mutator or subscriber panics, the panic propagates out of the
//! `set_state` that was publishing. Updates queued behind it are kept and
//! committed by the next `set_state`.
//!
//! # Thread Safety
//!
//! The snapshot pointer and the subscriber registry sit behind
//! `parking_lot` locks that are never held while user code runs.

use std::collections::VecDeque;
use std::fmt::Debug;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::{Mutex, RwLock};
use tracing::trace;

use super::draft::Draft;
use super::subscriber::{Callback, Registry, SubscriberId, Subscription};
use super::update::Update;

/// Counter for generating unique store IDs.
static STORE_ID_COUNTER: AtomicU64 = AtomicU64::new(0);

fn next_store_id() -> u64 {
    STORE_ID_COUNTER.fetch_add(1, Ordering::Relaxed)
}

/// Updates waiting for the publishing commit to finish.
struct CommitQueue<S> {
    publishing: bool,
    pending: VecDeque<Update<S>>,
}

/// Holder of a model's current snapshot.
///
/// # Example
///
/// ```rust,ignore
/// let store = StateStore::new(Counter { value: 0, step: 1 });
///
/// let subscription = store.subscribe(|prev, next| {
///     println!("{} -> {}", prev.value, next.value);
/// });
///
/// store.mutate(|draft| draft.value += 1); // prints "0 -> 1"
/// subscription.unsubscribe();
/// ```
pub struct StateStore<S>
where
    S: Clone + Send + Sync + 'static,
{
    /// Unique identifier for this store.
    id: u64,

    /// The published snapshot.
    current: Arc<RwLock<Arc<S>>>,

    /// Change callbacks in registration order.
    subscribers: Arc<Registry<S>>,

    commits: Arc<Mutex<CommitQueue<S>>>,
}

impl<S> StateStore<S>
where
    S: Clone + Send + Sync + 'static,
{
    /// Create a new store holding `initial`.
    pub fn new(initial: S) -> Self {
        Self {
            id: next_store_id(),
            current: Arc::new(RwLock::new(Arc::new(initial))),
            subscribers: Arc::new(RwLock::new(IndexMap::new())),
            commits: Arc::new(Mutex::new(CommitQueue {
                publishing: false,
                pending: VecDeque::new(),
            })),
        }
    }

    /// Get the store's unique ID.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// The current snapshot. Cloning the `Arc` is the only copy made.
    pub fn get_state(&self) -> Arc<S> {
        Arc::clone(&self.current.read())
    }

    /// Commit an update and notify subscribers.
    ///
    /// Also commits anything left queued by a publishing round that panicked.
    pub fn set_state(&self, update: Update<S>) {
        {
            let mut commits = self.commits.lock();
            commits.pending.push_back(update);
            if commits.publishing {
                trace!(
                    store = self.id,
                    queued = commits.pending.len(),
                    "set_state queued behind publishing commit"
                );
                return;
            }
            commits.publishing = true;
        }

        let _guard = PublishGuard {
            commits: &self.commits,
        };
        while let Some(update) = self.next_pending() {
            self.commit(update);
        }
    }

    /// Replace the whole snapshot.
    pub fn replace(&self, value: S) {
        self.set_state(Update::replace(value));
    }

    /// Mutate a draft of the current snapshot.
    pub fn mutate<F>(&self, mutator: F)
    where
        F: FnOnce(&mut Draft<'_, S>) + Send + 'static,
    {
        self.set_state(Update::mutate(mutator));
    }

    /// Mutate with extra arguments forwarded after the draft.
    pub fn mutate_with<F, A>(&self, mutator: F, args: A)
    where
        F: FnOnce(&mut Draft<'_, S>, A) + Send + 'static,
        A: Send + 'static,
    {
        self.set_state(Update::mutate_with(mutator, args));
    }

    /// Register a change callback.
    ///
    /// The callback only sees commits made after this call.
    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&Arc<S>, &Arc<S>) + Send + Sync + 'static,
    {
        let id = SubscriberId::new();
        self.subscribers.write().insert(id, Arc::new(callback));
        Subscription::new(id, Arc::downgrade(&self.subscribers))
    }

    /// Get the number of subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.read().len()
    }

    fn next_pending(&self) -> Option<Update<S>> {
        let mut commits = self.commits.lock();
        let next = commits.pending.pop_front();
        if next.is_none() {
            commits.publishing = false;
        }
        next
    }

    fn commit(&self, update: Update<S>) {
        let prev = self.get_state();
        let next = update.apply(&prev);
        *self.current.write() = Arc::clone(&next);

        // Callbacks registered at publish time; the lock is released before
        // any of them runs so they may subscribe or unsubscribe freely.
        let callbacks: Vec<Callback<S>> = self.subscribers.read().values().cloned().collect();

        trace!(
            store = self.id,
            subscribers = callbacks.len(),
            unchanged = Arc::ptr_eq(&prev, &next),
            "state committed"
        );

        for callback in callbacks {
            callback(&prev, &next);
        }
    }
}

/// Releases the publishing flag when a mutator or subscriber panics.
/// Pending updates stay queued.
struct PublishGuard<'a, S> {
    commits: &'a Mutex<CommitQueue<S>>,
}

impl<S> Drop for PublishGuard<'_, S> {
    fn drop(&mut self) {
        if std::thread::panicking() {
            let mut commits = self.commits.lock();
            commits.publishing = false;
            trace!(pending = commits.pending.len(), "publishing round unwound");
        }
    }
}

impl<S> Clone for StateStore<S>
where
    S: Clone + Send + Sync + 'static,
{
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            current: Arc::clone(&self.current),
            subscribers: Arc::clone(&self.subscribers),
            commits: Arc::clone(&self.commits),
        }
    }
}

impl<S> Debug for StateStore<S>
where
    S: Clone + Send + Sync + Debug + 'static,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StateStore")
            .field("id", &self.id)
            .field("state", &self.get_state())
            .field("subscriber_count", &self.subscriber_count())
            .finish()
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicI32, Ordering};

    #[derive(Clone, Debug, Default, PartialEq)]
    struct Counter {
        value: i64,
        step: i64,
        tags: Arc<Vec<String>>,
    }

    fn counter() -> Counter {
        Counter {
            value: 0,
            step: 1,
            tags: Arc::new(vec!["a".into()]),
        }
    }

    #[test]
    fn store_get_and_replace() {
        let store = StateStore::new(counter());
        assert_eq!(store.get_state().value, 0);

        store.replace(Counter {
            value: 42,
            ..counter()
        });
        assert_eq!(store.get_state().value, 42);
    }

    #[test]
    fn get_state_does_not_copy() {
        let store = StateStore::new(counter());
        assert!(Arc::ptr_eq(&store.get_state(), &store.get_state()));
    }

    #[test]
    fn mutate_shares_untouched_fields() {
        let store = StateStore::new(counter());
        let before = store.get_state();

        store.mutate(|draft| draft.value += 1);

        let after = store.get_state();
        assert_eq!(after.value, 1);
        assert!(Arc::ptr_eq(&before.tags, &after.tags));
    }

    #[test]
    fn noop_mutation_keeps_identity_and_still_notifies() {
        let store = StateStore::new(counter());
        let before = store.get_state();
        let identical = Arc::new(AtomicI32::new(0));
        let identical_clone = identical.clone();

        store.subscribe(move |prev, next| {
            if Arc::ptr_eq(prev, next) {
                identical_clone.fetch_add(1, Ordering::SeqCst);
            }
        });

        store.mutate(|_| {});

        assert!(Arc::ptr_eq(&before, &store.get_state()));
        assert_eq!(identical.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn replace_hands_out_previous_snapshot() {
        let store = StateStore::new(counter());
        let seen = Arc::new(parking_lot::Mutex::new(Vec::new()));
        let seen_clone = seen.clone();

        store.subscribe(move |prev, next| {
            seen_clone.lock().push((prev.value, next.value));
        });

        store.replace(Counter {
            value: 5,
            ..counter()
        });
        store.mutate(|draft| draft.value = 9);

        assert_eq!(*seen.lock(), vec![(0, 5), (5, 9)]);
    }

    #[test]
    fn store_notifies_in_subscription_order() {
        let store = StateStore::new(counter());
        let order = Arc::new(parking_lot::Mutex::new(Vec::new()));

        for label in ["first", "second", "third"] {
            let order = order.clone();
            store.subscribe(move |_, _| order.lock().push(label));
        }

        store.mutate(|draft| draft.value += 1);
        assert_eq!(*order.lock(), vec!["first", "second", "third"]);
    }

    #[test]
    fn subscribe_does_not_replay_current_state() {
        let store = StateStore::new(counter());
        store.replace(counter());

        let call_count = Arc::new(AtomicI32::new(0));
        let call_count_clone = call_count.clone();
        store.subscribe(move |_, _| {
            call_count_clone.fetch_add(1, Ordering::SeqCst);
        });

        assert_eq!(call_count.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn store_unsubscribe_is_isolated() {
        let store = StateStore::new(counter());
        let first = Arc::new(AtomicI32::new(0));
        let second = Arc::new(AtomicI32::new(0));

        let first_clone = first.clone();
        let subscription = store.subscribe(move |_, _| {
            first_clone.fetch_add(1, Ordering::SeqCst);
        });
        let second_clone = second.clone();
        store.subscribe(move |_, _| {
            second_clone.fetch_add(1, Ordering::SeqCst);
        });

        store.mutate(|draft| draft.value += 1);
        subscription.unsubscribe();
        subscription.unsubscribe();
        store.mutate(|draft| draft.value += 1);

        assert_eq!(first.load(Ordering::SeqCst), 1);
        assert_eq!(second.load(Ordering::SeqCst), 2);
        assert_eq!(store.subscriber_count(), 1);
    }

    #[test]
    fn nested_set_state_is_queued_after_current_round() {
        let store = StateStore::new(counter());
        let log = Arc::new(parking_lot::Mutex::new(Vec::new()));

        let inner = store.clone();
        let log_clone = log.clone();
        store.subscribe(move |prev, next| {
            log_clone.lock().push((prev.value, next.value));
            if next.value == 1 {
                inner.mutate(|draft| draft.value = 10);
                // Not visible until this round finishes.
                assert_eq!(inner.get_state().value, 1);
            }
        });

        store.mutate(|draft| draft.value = 1);

        assert_eq!(*log.lock(), vec![(0, 1), (1, 10)]);
        assert_eq!(store.get_state().value, 10);
    }

    #[test]
    fn set_state_from_a_mutator_is_queued() {
        let store = StateStore::new(counter());
        let log = Arc::new(parking_lot::Mutex::new(Vec::new()));
        let log_clone = log.clone();
        store.subscribe(move |prev, next| {
            log_clone.lock().push((prev.value, next.value));
        });

        let inner = store.clone();
        store.mutate(move |draft| {
            inner.mutate(|draft| draft.value *= 10);
            // The queued update has not run yet.
            assert_eq!(inner.get_state().value, 0);
            draft.value = 2;
        });

        assert_eq!(*log.lock(), vec![(0, 2), (2, 20)]);
        assert_eq!(store.get_state().value, 20);
    }

    #[test]
    fn updates_queued_before_a_panic_survive_it() {
        let store = StateStore::new(counter());
        let log = Arc::new(parking_lot::Mutex::new(Vec::new()));

        let inner = store.clone();
        let log_clone = log.clone();
        store.subscribe(move |prev, next| {
            log_clone.lock().push((prev.value, next.value));
            if next.value == 1 {
                inner.mutate(|draft| draft.value = 5);
                panic!("subscriber failed");
            }
        });

        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            store.mutate(|draft| draft.value = 1);
        }));
        assert!(result.is_err());
        assert_eq!(store.get_state().value, 1);

        store.mutate(|draft| draft.step = 3);

        assert_eq!(*log.lock(), vec![(0, 1), (1, 5), (5, 5)]);
        assert_eq!(store.get_state().value, 5);
        assert_eq!(store.get_state().step, 3);
    }

    #[test]
    fn mutator_may_read_the_store() {
        let store = StateStore::new(counter());
        let reader = store.clone();

        store.mutate(move |draft| {
            let step = reader.get_state().step;
            draft.value += step;
        });

        assert_eq!(store.get_state().value, 1);
    }

    #[test]
    fn store_clone_shares_state() {
        let store1 = StateStore::new(counter());
        let store2 = store1.clone();

        store1.mutate(|draft| draft.value = 42);
        assert_eq!(store2.get_state().value, 42);
        assert_eq!(store1.id(), store2.id());
    }
}
