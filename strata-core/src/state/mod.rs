//! Model State
//!
//! This module implements the state container behind every model: one
//! immutable snapshot, replaced or mutated through [`Update`]s, with change
//! notification to `(prev, next)` subscribers.
//!
//! # Concepts
//!
//! ## Snapshots
//!
//! A snapshot is an `Arc<S>`. Once published it never changes, so a
//! subscriber may keep the `prev` it was handed for as long as it likes.
//!
//! ## Structural sharing
//!
//! Mutators edit a [`Draft`]. Only the paths that are written get rebuilt;
//! everything else is shared with the previous snapshot by pointer. Model
//! state types opt into nested sharing by holding sub-structures in `Arc`
//! fields. A mutator that writes nothing commits the previous `Arc` itself,
//! which makes "did anything change?" an O(1) `Arc::ptr_eq` check.
//!
//! ## Subscribers
//!
//! Every commit notifies every subscriber once, even when nothing changed.
//! Deciding whether a change matters is the subscriber's job.

mod draft;
mod store;
mod subscriber;
mod update;

pub use draft::Draft;
pub use store::StateStore;
pub use subscriber::{Callback, SubscriberId, Subscription};
pub use update::{Mutator, Update};
