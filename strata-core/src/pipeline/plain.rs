//! Pipelines without cancellation.

use std::future::Future;

use tracing::debug;

use super::emissions::Emissions;
use super::error::PipeError;
use super::run::{assemble, drain};
use super::stage::Stage;

/// Run `stages` over `T::default()`.
pub fn pipe<T, E>(
    stages: Vec<Stage<T, E>>,
) -> impl Future<Output = Result<Emissions<T>, PipeError<E>>> + Send + 'static
where
    T: Default + Send + 'static,
    E: Send + 'static,
{
    pipe_from(T::default(), stages)
}

/// Run `stages` over `seed`.
///
/// Resolves with everything the last stage emitted, or with the first
/// stage error. Nothing runs when `stages` is empty.
pub fn pipe_from<T, E>(
    seed: T,
    stages: Vec<Stage<T, E>>,
) -> impl Future<Output = Result<Emissions<T>, PipeError<E>>> + Send + 'static
where
    T: Send + 'static,
    E: Send + 'static,
{
    async move {
        if stages.is_empty() {
            return Err(PipeError::NoStages);
        }
        debug!(stages = stages.len(), "pipe started");
        let result = drain(assemble(seed, stages)).await;
        debug!(ok = result.is_ok(), "pipe settled");
        result
    }
}
