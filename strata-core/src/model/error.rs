use thiserror::Error;

/// Errors raised while composing a model.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    #[error("invalid model options: {0}")]
    InvalidOptions(String),
}
