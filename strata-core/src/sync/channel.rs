use std::fmt;
use std::future::Future;
use std::sync::Arc;

use parking_lot::Mutex;
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{debug, trace};

/// Errors raised while reading from a [`SyncChannel`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SyncError {
    /// `sync_stop` was called and no more snapshots will arrive.
    #[error("sync channel closed")]
    Closed,
}

type Listener<S> = mpsc::UnboundedSender<Arc<S>>;

struct SyncInner<S> {
    /// One queue per receiver. `None` once the channel is closed.
    listeners: Mutex<Option<Vec<Listener<S>>>>,
}

/// Broadcast of snapshots the host has rendered.
///
/// Written by the host through [`sync_state`](Self::sync_state), read by
/// model logic through [`subscribe`](Self::subscribe) or
/// [`wait_for`](Self::wait_for). Every receiver gets every snapshot synced
/// after it subscribed, in order, however far behind it is.
pub struct SyncChannel<S> {
    inner: Arc<SyncInner<S>>,
}

impl<S> SyncChannel<S>
where
    S: Send + Sync + 'static,
{
    /// Create an open channel.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(SyncInner {
                listeners: Mutex::new(Some(Vec::new())),
            }),
        }
    }

    /// Publish a snapshot the host has observed.
    ///
    /// Ignored once the channel is closed.
    pub fn sync_state(&self, snapshot: Arc<S>) {
        let mut listeners = self.inner.listeners.lock();
        match listeners.as_mut() {
            Some(listeners) => {
                // Dropped receivers are pruned here.
                listeners.retain(|listener| listener.send(Arc::clone(&snapshot)).is_ok());
                trace!(delivered = listeners.len(), "snapshot synced");
            }
            None => debug!("sync_state after sync_stop ignored"),
        }
    }

    /// Close the channel for good.
    ///
    /// Receivers still get the snapshots already sent, then
    /// [`SyncError::Closed`].
    pub fn sync_stop(&self) {
        if let Some(listeners) = self.inner.listeners.lock().take() {
            debug!(receivers = listeners.len(), "sync channel closed");
        }
    }

    pub fn is_closed(&self) -> bool {
        self.inner.listeners.lock().is_none()
    }

    /// Receive snapshots synced from now on.
    pub fn subscribe(&self) -> SyncReceiver<S> {
        let receiver = self.inner.listeners.lock().as_mut().map(|listeners| {
            let (sender, receiver) = mpsc::unbounded_channel();
            listeners.push(sender);
            receiver
        });
        SyncReceiver { receiver }
    }

    /// Number of live receivers.
    pub fn receiver_count(&self) -> usize {
        self.inner.listeners.lock().as_ref().map_or(0, |listeners| {
            listeners.iter().filter(|listener| !listener.is_closed()).count()
        })
    }

    /// Resolve with the first synced snapshot matching `predicate`.
    ///
    /// Subscribes immediately, so snapshots synced after this call and
    /// before the future is polled are not missed. Fails with
    /// [`SyncError::Closed`] if the channel closes first.
    pub fn wait_for<F>(
        &self,
        mut predicate: F,
    ) -> impl Future<Output = Result<Arc<S>, SyncError>> + Send + 'static
    where
        F: FnMut(&S) -> bool + Send + 'static,
    {
        let mut receiver = self.subscribe();
        async move {
            loop {
                let snapshot = receiver.recv().await?;
                if predicate(&snapshot) {
                    return Ok(snapshot);
                }
            }
        }
    }
}

impl<S> Default for SyncChannel<S>
where
    S: Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<S> Clone for SyncChannel<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S> fmt::Debug for SyncChannel<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SyncChannel")
            .field("closed", &self.inner.listeners.lock().is_none())
            .finish()
    }
}

/// Read side of a [`SyncChannel`].
pub struct SyncReceiver<S> {
    receiver: Option<mpsc::UnboundedReceiver<Arc<S>>>,
}

impl<S> SyncReceiver<S>
where
    S: Send + Sync + 'static,
{
    /// The next synced snapshot.
    pub async fn recv(&mut self) -> Result<Arc<S>, SyncError> {
        let Some(receiver) = self.receiver.as_mut() else {
            return Err(SyncError::Closed);
        };
        receiver.recv().await.ok_or(SyncError::Closed)
    }
}

impl<S> fmt::Debug for SyncReceiver<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SyncReceiver")
            .field("closed", &self.receiver.is_none())
            .finish()
    }
}
