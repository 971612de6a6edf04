//! The state accessors handed to a model factory.

use std::fmt;
use std::sync::Arc;

use crate::state::{Draft, StateStore, Update};
use crate::sync::SyncChannel;

/// `get`, `set` and `sync` for one model.
///
/// Cheap to clone; surface closures usually capture their own copy.
pub struct Context<S>
where
    S: Clone + Send + Sync + 'static,
{
    store: StateStore<S>,
    sync: SyncChannel<S>,
}

impl<S> Context<S>
where
    S: Clone + Send + Sync + 'static,
{
    pub(crate) fn new(store: StateStore<S>, sync: SyncChannel<S>) -> Self {
        Self { store, sync }
    }

    /// The current snapshot.
    pub fn get(&self) -> Arc<S> {
        self.store.get_state()
    }

    pub fn set(&self, update: Update<S>) {
        self.store.set_state(update);
    }

    pub fn replace(&self, value: S) {
        self.store.replace(value);
    }

    pub fn mutate<F>(&self, mutator: F)
    where
        F: FnOnce(&mut Draft<'_, S>) + Send + 'static,
    {
        self.store.mutate(mutator);
    }

    pub fn mutate_with<F, A>(&self, mutator: F, args: A)
    where
        F: FnOnce(&mut Draft<'_, S>, A) + Send + 'static,
        A: Send + 'static,
    {
        self.store.mutate_with(mutator, args);
    }

    /// Snapshots confirmed by the host.
    pub fn sync(&self) -> &SyncChannel<S> {
        &self.sync
    }
}

impl<S> Clone for Context<S>
where
    S: Clone + Send + Sync + 'static,
{
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            sync: self.sync.clone(),
        }
    }
}

impl<S> fmt::Debug for Context<S>
where
    S: Clone + Send + Sync + 'static,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("store", &self.store.id())
            .field("sync", &self.sync)
            .finish()
    }
}
