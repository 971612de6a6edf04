//! Stop broadcast shared by the runs of one [`Effector`](super::Effector).
//!
//! The signal is a generation counter on a `watch` channel. Every run
//! remembers the generation it started under; `stop_all_pipes` bumps the
//! generation and every run that sees a newer one aborts. Runs started after
//! the bump capture the new generation and are unaffected by it.

use std::sync::atomic::{AtomicU64, Ordering};

use thiserror::Error;
use tokio::sync::watch;

static EXECUTOR_ID_COUNTER: AtomicU64 = AtomicU64::new(0);

pub(crate) fn next_executor_id() -> u64 {
    EXECUTOR_ID_COUNTER.fetch_add(1, Ordering::Relaxed)
}

/// Cancellation marker for runs stopped by `stop_all_pipes`.
///
/// Each executor owns exactly one of these. Two stop errors are equal only
/// when they come from the same executor, which is what
/// [`Effector::is_stop_error`](super::Effector::is_stop_error) checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
#[error("pipe stopped by stop_all_pipes (executor {executor})")]
pub struct StopError {
    executor: u64,
}

impl StopError {
    pub(crate) fn new(executor: u64) -> Self {
        Self { executor }
    }

    /// ID of the executor that issued the stop.
    pub fn executor(&self) -> u64 {
        self.executor
    }
}

pub(crate) struct StopSignal {
    generation: watch::Sender<u64>,
}

impl StopSignal {
    pub(crate) fn new() -> Self {
        let (generation, _) = watch::channel(0);
        Self { generation }
    }

    /// Start listening for stops issued from now on.
    pub(crate) fn listen(&self) -> StopListener {
        let receiver = self.generation.subscribe();
        let started = *receiver.borrow();
        StopListener { receiver, started }
    }

    /// Publish a new generation. Returns it.
    pub(crate) fn broadcast(&self) -> u64 {
        self.generation.send_modify(|generation| *generation += 1);
        *self.generation.borrow()
    }

    /// Number of live listeners, i.e. runs not yet settled.
    pub(crate) fn listeners(&self) -> usize {
        self.generation.receiver_count()
    }
}

pub(crate) struct StopListener {
    receiver: watch::Receiver<u64>,
    started: u64,
}

impl StopListener {
    /// Resolves with the new generation once a stop is broadcast.
    ///
    /// Never resolves if the signal is dropped first.
    pub(crate) async fn stopped(&mut self) -> u64 {
        loop {
            let current = *self.receiver.borrow_and_update();
            if current != self.started {
                return current;
            }
            if self.receiver.changed().await.is_err() {
                return std::future::pending().await;
            }
        }
    }
}
