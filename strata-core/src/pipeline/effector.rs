//! Cancellable pipelines.
//!
//! An [`Effector`] runs pipelines exactly like [`pipe`](super::pipe) but
//! attaches every run to a stop broadcast owned by the effector. A call to
//! [`Effector::stop_all_pipes`] cancels every run still in flight: the run
//! stops polling its stages right away (pending timers and awaited
//! operations are dropped) and resolves with the effector's [`StopError`].
//!
//! Stopping is not sticky. Runs started after a stop proceed normally until
//! the next one.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use tracing::debug;

use super::emissions::Emissions;
use super::error::PipeError;
use super::run::{assemble, drain};
use super::stage::Stage;
use super::stop::{next_executor_id, StopError, StopSignal};

struct EffectorInner {
    stop: StopSignal,
    sentinel: StopError,
}

/// Pipeline executor with a shared stop switch.
///
/// Clones share the same stop broadcast and the same [`StopError`].
#[derive(Clone)]
pub struct Effector {
    inner: Arc<EffectorInner>,
}

impl Effector {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(EffectorInner {
                stop: StopSignal::new(),
                sentinel: StopError::new(next_executor_id()),
            }),
        }
    }

    /// Get the effector's unique ID.
    pub fn id(&self) -> u64 {
        self.inner.sentinel.executor()
    }

    /// Run `stages` over `T::default()`.
    pub fn pipe<T, E>(
        &self,
        stages: Vec<Stage<T, E>>,
    ) -> impl Future<Output = Result<Emissions<T>, PipeError<E>>> + Send + 'static
    where
        T: Default + Send + 'static,
        E: Send + 'static,
    {
        self.pipe_from(T::default(), stages)
    }

    /// Run `stages` over `seed`.
    ///
    /// The run joins the stop broadcast when this method is called, not when
    /// the returned future is first polled.
    pub fn pipe_from<T, E>(
        &self,
        seed: T,
        stages: Vec<Stage<T, E>>,
    ) -> impl Future<Output = Result<Emissions<T>, PipeError<E>>> + Send + 'static
    where
        T: Send + 'static,
        E: Send + 'static,
    {
        let listener = (!stages.is_empty()).then(|| self.inner.stop.listen());
        let sentinel = self.inner.sentinel;

        async move {
            let Some(mut listener) = listener else {
                return Err(PipeError::NoStages);
            };
            debug!(
                executor = sentinel.executor(),
                stages = stages.len(),
                "pipe started"
            );

            let run = drain(assemble(seed, stages));
            tokio::select! {
                biased;
                generation = listener.stopped() => {
                    debug!(executor = sentinel.executor(), generation, "pipe stopped");
                    Err(PipeError::Stopped(sentinel))
                }
                result = run => {
                    debug!(executor = sentinel.executor(), ok = result.is_ok(), "pipe settled");
                    result
                }
            }
        }
    }

    /// Cancel every run currently in flight on this effector.
    ///
    /// Does nothing when no run is pending.
    pub fn stop_all_pipes(&self) {
        let in_flight = self.in_flight();
        let generation = self.inner.stop.broadcast();
        debug!(executor = self.id(), generation, in_flight, "stop broadcast");
    }

    /// Whether `err` is this effector's stop marker.
    ///
    /// Stop errors from other effectors are not recognised.
    pub fn is_stop_error<E>(&self, err: &PipeError<E>) -> bool {
        matches!(err, PipeError::Stopped(stop) if *stop == self.inner.sentinel)
    }

    /// Number of runs started and not yet settled (or dropped).
    pub fn in_flight(&self) -> usize {
        self.inner.stop.listeners()
    }
}

impl Default for Effector {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Effector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Effector")
            .field("id", &self.id())
            .field("in_flight", &self.in_flight())
            .finish()
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
