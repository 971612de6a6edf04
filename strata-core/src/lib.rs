//! Strata Core
//!
//! This crate provides the runtime behind Strata models: business logic
//! written against an immutable state snapshot, driven by async pipelines,
//! and kept in step with whatever renders it.
//!
//! It implements:
//!
//! - A state store with structurally shared, copy-on-write updates
//! - `(prev, next)` change notification
//! - Async pipelines with cooperative, broadcast cancellation
//! - A sync channel that reports which snapshots a host has rendered
//!
//! # Architecture
//!
//! - `state`: snapshots, drafts and subscribers
//! - `pipeline`: stages, plain runs and the cancellable `Effector`
//! - `sync`: host-to-model render confirmation
//! - `model`: factories, context and the composed `Model`
//!
//! Binding a model to a UI framework is left to the host.
//!
//! # Example
//!
//! ```rust,ignore
//! use strata_core::model::{Model, ModelFactory, ModelParts};
//! use strata_core::state::Draft;
//!
//! let model = Model::create(ModelFactory::context(|ctx| {
//!     let inc = {
//!         let ctx = ctx.clone();
//!         move || ctx.mutate(|s: &mut Draft<'_, Counter>| s.value += 1)
//!     };
//!     ModelParts::new(Counter::default(), inc)
//! }))?;
//!
//! model.subscribe(|prev, next| println!("{} -> {}", prev.value, next.value));
//! (model.surface())(); // prints "0 -> 1"
//! ```

pub mod model;
pub mod pipeline;
pub mod state;
pub mod sync;

pub use model::{Config, Context, Model, ModelError, ModelFactory, ModelOptions, ModelParts};
pub use pipeline::{pipe, pipe_from, Effector, Emissions, PipeError, Stage, StopError};
pub use state::{Draft, StateStore, Subscription, Update};
pub use sync::{SyncChannel, SyncError, SyncReceiver};
