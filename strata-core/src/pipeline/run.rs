//! Stage threading and emission collection shared by both executors.

use futures_util::future;
use futures_util::stream::{self, BoxStream, StreamExt};
use smallvec::SmallVec;

use super::emissions::Emissions;
use super::error::PipeError;
use super::stage::Stage;

/// Chain `stages` behind a stream that yields `seed` once.
pub(crate) fn assemble<T, E>(seed: T, stages: Vec<Stage<T, E>>) -> BoxStream<'static, Result<T, E>>
where
    T: Send + 'static,
    E: Send + 'static,
{
    let source = stream::once(future::ready(Ok(seed))).boxed();
    stages.into_iter().fold(source, |upstream, stage| {
        upstream
            .flat_map(move |item| match item {
                Ok(value) => stage.apply(value),
                Err(err) => stream::once(future::ready(Err(err))).boxed(),
            })
            .boxed()
    })
}

/// Poll the assembled stream to completion, stopping at the first error.
pub(crate) async fn drain<T, E>(
    mut stream: BoxStream<'static, Result<T, E>>,
) -> Result<Emissions<T>, PipeError<E>> {
    let mut emitted: SmallVec<[T; 2]> = SmallVec::new();
    while let Some(item) = stream.next().await {
        emitted.push(item.map_err(PipeError::Stage)?);
    }
    Ok(emitted.into_iter().collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicI32, Ordering};
    use std::sync::Arc;

    #[tokio::test]
    async fn every_emission_feeds_the_next_stage_in_order() {
        let stages: Vec<Stage<i32, ()>> = vec![
            Stage::flat_map(|_: i32| stream::iter(vec![Ok(1), Ok(2)])),
            Stage::flat_map(|v: i32| stream::iter(vec![Ok(v * 10), Ok(v * 10 + 1)])),
        ];

        let result = drain(assemble(0, stages)).await.unwrap();
        assert_eq!(result, Emissions::Many(vec![10, 11, 20, 21]));
    }

    #[tokio::test]
    async fn error_skips_remaining_stages() {
        let reached = Arc::new(AtomicI32::new(0));
        let reached_clone = reached.clone();
        let stages: Vec<Stage<i32, &'static str>> = vec![
            Stage::try_map(|_: i32| Err("boom")),
            Stage::tap(move |_: &i32| {
                reached_clone.fetch_add(1, Ordering::SeqCst);
            }),
        ];

        let err = drain(assemble(0, stages)).await.unwrap_err();
        assert_eq!(err.into_stage(), Some("boom"));
        assert_eq!(reached.load(Ordering::SeqCst), 0);
    }
}
