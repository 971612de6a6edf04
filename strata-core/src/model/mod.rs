//! Model Composition
//!
//! A model bundles a [`StateStore`](crate::state::StateStore), a
//! [`SyncChannel`](crate::sync::SyncChannel) and optionally an
//! [`Effector`](crate::pipeline::Effector) behind the surface its factory
//! defines.
//!
//! # Lifecycle
//!
//! 1. The host builds a [`ModelFactory`], either `context` (state only) or
//!    `with_executor` (state plus cancellable pipelines).
//! 2. [`Model::create`] runs the factory once and commits its initial
//!    state.
//! 3. The host subscribes to changes, renders, and reports every rendered
//!    snapshot back with `sync_state`.
//! 4. At teardown the host calls `sync_stop`.
//!
//! Higher-order models take a [`Config`] first and return the factory, which
//! keeps injected dependencies apart from the runtime context.

mod config;
mod context;
mod error;
mod factory;
mod instance;

pub use config::{Config, ModelOptions};
pub use context::Context;
pub use error::ModelError;
pub use factory::{ModelFactory, ModelParts};
pub use instance::Model;
