//! Async Pipelines
//!
//! Model logic is written as pipelines: an ordered list of [`Stage`]s that
//! threads one seed value through timers, service calls and state updates.
//!
//! # Running a pipeline
//!
//! 1. The seed is handed to the first stage.
//! 2. Each stage emits zero or more values; each emitted value goes through
//!    the remaining stages before the next one is taken.
//! 3. The values that leave the last stage are collected in order.
//! 4. The run resolves with an [`Emissions`]: `Empty`, `Single` or `Many`.
//!
//! The first stage error ends the run; the error is returned unchanged
//! inside [`PipeError::Stage`].
//!
//! # Executors
//!
//! - [`pipe`] / [`pipe_from`]: plain runs, no cancellation.
//! - [`Effector`]: the same runs attached to a stop broadcast, so
//!   [`Effector::stop_all_pipes`] can cancel everything in flight.

mod effector;
mod emissions;
mod error;
mod plain;
mod run;
mod stage;
mod stop;

pub use effector::Effector;
pub use emissions::Emissions;
pub use error::PipeError;
pub use plain::{pipe, pipe_from};
pub use stage::Stage;
pub use stop::StopError;
