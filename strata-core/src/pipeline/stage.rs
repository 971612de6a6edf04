//! Pipeline stages.
//!
//! A [`Stage`] turns one input value into a stream of zero or more results.
//! Stages run in order: every value emitted by one stage is fed to the next,
//! and the next stage finishes with that value before the following upstream
//! value is taken (concat semantics).

use std::fmt;
use std::future::Future;
use std::time::Duration;

use futures_util::future;
use futures_util::stream::{self, BoxStream, Stream, StreamExt};

type StageFn<T, E> = dyn Fn(T) -> BoxStream<'static, Result<T, E>> + Send + Sync;

/// One step of a pipeline.
///
/// # Example
///
/// ```rust,ignore
/// let stages = vec![
///     Stage::tap(|_| ctx.mutate(|s| s.status = Status::Acting)),
///     Stage::delay(Duration::from_millis(100)),
///     Stage::then(move |value| service.login(value)),
/// ];
/// ```
pub struct Stage<T, E> {
    name: &'static str,
    run: Box<StageFn<T, E>>,
}

impl<T, E> Stage<T, E>
where
    T: Send + 'static,
    E: Send + 'static,
{
    /// A stage from any function returning a stream of results.
    pub fn from_fn<F, St>(run: F) -> Self
    where
        F: Fn(T) -> St + Send + Sync + 'static,
        St: Stream<Item = Result<T, E>> + Send + 'static,
    {
        Self {
            name: "from_fn",
            run: Box::new(move |value| run(value).boxed()),
        }
    }

    /// Replace each value with a whole stream of values.
    pub fn flat_map<F, St>(run: F) -> Self
    where
        F: Fn(T) -> St + Send + Sync + 'static,
        St: Stream<Item = Result<T, E>> + Send + 'static,
    {
        Self::from_fn(run).named("flat_map")
    }

    /// Run a side effect and pass the value through.
    pub fn tap<F>(effect: F) -> Self
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        Self {
            name: "tap",
            run: Box::new(move |value| {
                effect(&value);
                once(Ok(value))
            }),
        }
    }

    /// Like [`tap`](Self::tap), but the side effect may fail the run.
    pub fn try_tap<F>(effect: F) -> Self
    where
        F: Fn(&T) -> Result<(), E> + Send + Sync + 'static,
    {
        Self {
            name: "try_tap",
            run: Box::new(move |value| once(effect(&value).map(|()| value))),
        }
    }

    pub fn map<F>(f: F) -> Self
    where
        F: Fn(T) -> T + Send + Sync + 'static,
    {
        Self {
            name: "map",
            run: Box::new(move |value| once(Ok(f(value)))),
        }
    }

    pub fn try_map<F>(f: F) -> Self
    where
        F: Fn(T) -> Result<T, E> + Send + Sync + 'static,
    {
        Self {
            name: "try_map",
            run: Box::new(move |value| once(f(value))),
        }
    }

    /// Await an async operation and emit its output.
    pub fn then<F, Fut>(f: F) -> Self
    where
        F: Fn(T) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
    {
        Self {
            name: "then",
            run: Box::new(move |value| stream::once(f(value)).boxed()),
        }
    }

    /// Drop values the predicate rejects.
    pub fn filter<F>(predicate: F) -> Self
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        Self {
            name: "filter",
            run: Box::new(move |value| {
                if predicate(&value) {
                    once(Ok(value))
                } else {
                    stream::empty().boxed()
                }
            }),
        }
    }

    /// Hold each value for `duration` before passing it on.
    pub fn delay(duration: Duration) -> Self {
        Self {
            name: "delay",
            run: Box::new(move |value| {
                stream::once(async move {
                    tokio::time::sleep(duration).await;
                    Ok(value)
                })
                .boxed()
            }),
        }
    }

    /// Rename the stage for logging.
    pub fn named(mut self, name: &'static str) -> Self {
        self.name = name;
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub(crate) fn apply(&self, value: T) -> BoxStream<'static, Result<T, E>> {
        (self.run)(value)
    }
}

fn once<T, E>(item: Result<T, E>) -> BoxStream<'static, Result<T, E>>
where
    T: Send + 'static,
    E: Send + 'static,
{
    stream::once(future::ready(item)).boxed()
}

impl<T, E> fmt::Debug for Stage<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Stage").field("name", &self.name).finish()
    }
}
