//! Model configuration.
//!
//! Two kinds of configuration reach a model:
//!
//! - [`ModelOptions`]: runtime knobs for the composition itself, loadable
//!   with serde.
//! - [`Config`]: a static value injected into a higher-order model before
//!   it becomes a factory (services, step sizes, feature switches).

use std::fmt;

use serde::{Deserialize, Serialize};

use super::error::ModelError;

/// Options for composing a model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelOptions {
    /// Name used in log events. Must not be blank.
    pub name: String,
}

impl ModelOptions {
    pub fn named(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn validate(&self) -> Result<(), ModelError> {
        if self.name.trim().is_empty() {
            return Err(ModelError::InvalidOptions(
                "name must not be blank".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for ModelOptions {
    fn default() -> Self {
        Self {
            name: "model".to_string(),
        }
    }
}

/// Static configuration for a higher-order model.
pub enum Config<C> {
    Value(C),
    /// Computed once, when the factory is produced.
    Thunk(Box<dyn FnOnce() -> C + Send>),
}

impl<C> Config<C> {
    pub fn value(config: C) -> Self {
        Self::Value(config)
    }

    pub fn thunk<F>(thunk: F) -> Self
    where
        F: FnOnce() -> C + Send + 'static,
    {
        Self::Thunk(Box::new(thunk))
    }

    pub fn resolve(self) -> C {
        match self {
            Self::Value(config) => config,
            Self::Thunk(thunk) => thunk(),
        }
    }
}

impl<C: fmt::Debug> fmt::Debug for Config<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Value(config) => f.debug_tuple("Config::Value").field(config).finish(),
            Self::Thunk(_) => f.write_str("Config::Thunk"),
        }
    }
}
