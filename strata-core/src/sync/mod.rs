//! Render Synchronization
//!
//! Committing state and showing it are two different moments. The host
//! that renders a model calls `sync_state` after a snapshot has actually
//! been displayed; model logic listens on the [`SyncChannel`] to continue
//! only once the outside world has caught up ("wait until the visible
//! counter reads 20").
//!
//! There is no replay: a receiver only sees snapshots synced after it
//! subscribed, but it sees all of them, in order. `sync_stop` closes the
//! channel at teardown, and anything still waiting fails with
//! [`SyncError::Closed`] instead of hanging.

mod channel;

pub use channel::{SyncChannel, SyncError, SyncReceiver};
