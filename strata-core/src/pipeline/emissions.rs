//! Aggregated pipeline output.

use serde::{Deserialize, Serialize};

/// Everything a finished pipeline run emitted, in emission order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Emissions<T> {
    /// The run finished without emitting.
    Empty,
    /// Exactly one value was emitted.
    Single(T),
    /// Two or more values were emitted.
    Many(Vec<T>),
}

impl<T> Emissions<T> {
    pub fn len(&self) -> usize {
        match self {
            Self::Empty => 0,
            Self::Single(_) => 1,
            Self::Many(values) => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    /// The value of a single-emission run.
    pub fn single(self) -> Option<T> {
        match self {
            Self::Single(value) => Some(value),
            _ => None,
        }
    }

    /// The last value emitted, if any.
    pub fn last(self) -> Option<T> {
        match self {
            Self::Empty => None,
            Self::Single(value) => Some(value),
            Self::Many(values) => values.into_iter().last(),
        }
    }

    pub fn into_vec(self) -> Vec<T> {
        match self {
            Self::Empty => Vec::new(),
            Self::Single(value) => vec![value],
            Self::Many(values) => values,
        }
    }
}

impl<T> FromIterator<T> for Emissions<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut iter = iter.into_iter();
        let Some(first) = iter.next() else {
            return Self::Empty;
        };
        let Some(second) = iter.next() else {
            return Self::Single(first);
        };
        let mut values = vec![first, second];
        values.extend(iter);
        Self::Many(values)
    }
}
