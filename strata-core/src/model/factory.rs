//! Model factories.
//!
//! A factory receives the model's [`Context`] (and, if it asks for one, an
//! [`Effector`]) and returns the initial state plus the model's surface: the
//! operations the host calls. Which of the two shapes a factory has is
//! chosen explicitly when it is built.

use std::fmt;

use super::config::Config;
use super::context::Context;
use crate::pipeline::Effector;

/// What a factory hands back.
#[derive(Debug, Clone)]
pub struct ModelParts<S, M> {
    /// Initial snapshot.
    pub state: S,
    /// Named operations exposed to the host.
    pub surface: M,
}

impl<S, M> ModelParts<S, M> {
    pub fn new(state: S, surface: M) -> Self {
        Self { state, surface }
    }
}

type ContextFn<S, M> = Box<dyn FnOnce(Context<S>) -> ModelParts<S, M> + Send>;
type ContextAndExecutorFn<S, M> = Box<dyn FnOnce(Context<S>, Effector) -> ModelParts<S, M> + Send>;

/// A model definition, tagged with the context it needs.
pub enum ModelFactory<S, M>
where
    S: Clone + Send + Sync + 'static,
{
    /// Needs `get`/`set`/`sync` only.
    Context(ContextFn<S, M>),
    /// Also needs a cancellable pipeline executor.
    ContextAndExecutor(ContextAndExecutorFn<S, M>),
}

impl<S, M> ModelFactory<S, M>
where
    S: Clone + Send + Sync + 'static,
{
    pub fn context<F>(factory: F) -> Self
    where
        F: FnOnce(Context<S>) -> ModelParts<S, M> + Send + 'static,
    {
        Self::Context(Box::new(factory))
    }

    pub fn with_executor<F>(factory: F) -> Self
    where
        F: FnOnce(Context<S>, Effector) -> ModelParts<S, M> + Send + 'static,
    {
        Self::ContextAndExecutor(Box::new(factory))
    }

    /// Build a factory from a higher-order model definition.
    ///
    /// `config` is resolved once, here, and handed to `produce`:
    ///
    /// ```rust,ignore
    /// fn counter(step: i64) -> ModelFactory<Counter, CounterSurface> { ... }
    ///
    /// let factory = ModelFactory::configured(Config::value(10), counter);
    /// ```
    pub fn configured<C, P>(config: Config<C>, produce: P) -> Self
    where
        P: FnOnce(C) -> Self,
    {
        produce(config.resolve())
    }

    /// Whether the model gets an [`Effector`].
    pub fn needs_executor(&self) -> bool {
        matches!(self, Self::ContextAndExecutor(_))
    }

    /// Run the factory. Returns the effector it was given, if any.
    pub(crate) fn build(self, context: Context<S>) -> (ModelParts<S, M>, Option<Effector>) {
        match self {
            Self::Context(factory) => (factory(context), None),
            Self::ContextAndExecutor(factory) => {
                let effector = Effector::new();
                (factory(context, effector.clone()), Some(effector))
            }
        }
    }
}

impl<S, M> fmt::Debug for ModelFactory<S, M>
where
    S: Clone + Send + Sync + 'static,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Context(_) => f.write_str("ModelFactory::Context"),
            Self::ContextAndExecutor(_) => f.write_str("ModelFactory::ContextAndExecutor"),
        }
    }
}
