//! Composed models.

use std::ops::Deref;
use std::sync::Arc;

use tracing::info;

use super::config::ModelOptions;
use super::context::Context;
use super::error::ModelError;
use super::factory::ModelFactory;
use crate::pipeline::Effector;
use crate::state::{StateStore, Subscription};
use crate::sync::SyncChannel;

/// A model ready to be handed to a host.
///
/// Derefs to the surface returned by the factory, and adds the host-facing
/// operations: [`get_state`](Self::get_state), [`subscribe`](Self::subscribe),
/// [`sync_state`](Self::sync_state) and [`sync_stop`](Self::sync_stop).
pub struct Model<S, M>
where
    S: Clone + Send + Sync + 'static,
{
    surface: M,
    store: StateStore<S>,
    sync: SyncChannel<S>,
    effector: Option<Effector>,
    options: ModelOptions,
}

impl<S, M> Model<S, M>
where
    S: Clone + Default + Send + Sync + 'static,
{
    /// Compose a model with default options.
    pub fn create(factory: ModelFactory<S, M>) -> Result<Self, ModelError> {
        Self::create_with(factory, ModelOptions::default())
    }

    /// Compose a model.
    ///
    /// The factory receives a live [`Context`] before it has produced the
    /// initial state, so the store needs a value to hold in the meantime:
    /// `S::default()`. Reads through the context during the factory call see
    /// that placeholder until the factory returns and its initial state is
    /// committed with a replace.
    pub fn create_with(
        factory: ModelFactory<S, M>,
        options: ModelOptions,
    ) -> Result<Self, ModelError> {
        options.validate()?;

        let store = StateStore::new(S::default());
        let sync = SyncChannel::new();
        let context = Context::new(store.clone(), sync.clone());

        let (parts, effector) = factory.build(context);
        store.replace(parts.state);

        info!(
            model = %options.name,
            store = store.id(),
            effector = ?effector.as_ref().map(Effector::id),
            "model created"
        );

        Ok(Self {
            surface: parts.surface,
            store,
            sync,
            effector,
            options,
        })
    }
}

impl<S, M> Model<S, M>
where
    S: Clone + Send + Sync + 'static,
{
    pub fn surface(&self) -> &M {
        &self.surface
    }

    pub fn get_state(&self) -> Arc<S> {
        self.store.get_state()
    }

    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&Arc<S>, &Arc<S>) + Send + Sync + 'static,
    {
        self.store.subscribe(callback)
    }

    /// Report that the host has rendered `snapshot`.
    pub fn sync_state(&self, snapshot: Arc<S>) {
        self.sync.sync_state(snapshot);
    }

    /// Close the sync channel. Called by the host at teardown.
    pub fn sync_stop(&self) {
        info!(model = %self.options.name, "model sync stopped");
        self.sync.sync_stop();
    }

    /// The effector handed to the factory, for models built with
    /// [`ModelFactory::with_executor`].
    pub fn effector(&self) -> Option<&Effector> {
        self.effector.as_ref()
    }

    pub fn options(&self) -> &ModelOptions {
        &self.options
    }
}

impl<S, M> Deref for Model<S, M>
where
    S: Clone + Send + Sync + 'static,
{
    type Target = M;

    fn deref(&self) -> &M {
        &self.surface
    }
}

impl<S, M> std::fmt::Debug for Model<S, M>
where
    S: Clone + Send + Sync + std::fmt::Debug + 'static,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Model")
            .field("name", &self.options.name)
            .field("state", &self.get_state())
            .field("effector", &self.effector)
            .finish()
    }
}
