use thiserror::Error;

use super::stop::StopError;

/// Why a pipeline run did not resolve.
#[derive(Debug, Error)]
pub enum PipeError<E> {
    /// `pipe` was called without any stage. Nothing ran.
    #[error("pipe needs at least one stage")]
    NoStages,
    /// The run was cancelled by `stop_all_pipes`.
    #[error(transparent)]
    Stopped(#[from] StopError),
    /// A stage failed. The stage's error value is carried as-is.
    #[error("stage failed: {0}")]
    Stage(E),
}

impl<E> PipeError<E> {
    pub fn is_stopped(&self) -> bool {
        matches!(self, Self::Stopped(_))
    }

    /// The stage error, if the run failed in a stage.
    pub fn stage(&self) -> Option<&E> {
        match self {
            Self::Stage(err) => Some(err),
            _ => None,
        }
    }

    pub fn into_stage(self) -> Option<E> {
        match self {
            Self::Stage(err) => Some(err),
            _ => None,
        }
    }
}
