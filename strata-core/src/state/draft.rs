//! Copy-on-write drafts.
//!
//! A [`Draft`] wraps the current snapshot while a mutator runs. Reads go
//! straight to the base snapshot. The first mutable access clones the top
//! level of the state once; nested `Arc` fields are cloned by pointer, so
//! every sub-structure the mutator leaves alone is shared with the previous
//! snapshot. To write into a nested `Arc` field use [`Arc::make_mut`], which
//! rebuilds only that path.
//!
//! A draft that was never written commits the base `Arc` itself, so a no-op
//! mutation can be detected with [`Arc::ptr_eq`].

use std::ops::{Deref, DerefMut};
use std::sync::Arc;

/// A structurally shared, change-tracking view of a snapshot.
///
/// # Example
///
/// ```rust,ignore
/// store.mutate(|draft| {
///     Arc::make_mut(&mut draft.profile).nickname = "strata".into();
/// });
/// ```
pub struct Draft<'a, S> {
    base: &'a Arc<S>,
    written: Option<S>,
}

impl<'a, S: Clone> Draft<'a, S> {
    pub(crate) fn new(base: &'a Arc<S>) -> Self {
        Self {
            base,
            written: None,
        }
    }

    /// Whether the mutator has taken mutable access to the draft.
    pub fn is_modified(&self) -> bool {
        self.written.is_some()
    }

    /// The snapshot the draft was created from.
    pub fn base(&self) -> &Arc<S> {
        self.base
    }

    /// Produce the next snapshot.
    pub(crate) fn finish(self) -> Arc<S> {
        match self.written {
            Some(state) => Arc::new(state),
            None => Arc::clone(self.base),
        }
    }
}

impl<S> Deref for Draft<'_, S> {
    type Target = S;

    fn deref(&self) -> &S {
        match &self.written {
            Some(state) => state,
            None => &**self.base,
        }
    }
}

impl<S: Clone> DerefMut for Draft<'_, S> {
    fn deref_mut(&mut self) -> &mut S {
        let base = self.base;
        self.written.get_or_insert_with(|| S::clone(&**base))
    }
}
