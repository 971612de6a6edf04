//! State updates accepted by [`StateStore::set_state`](super::StateStore::set_state).

use std::fmt;
use std::sync::Arc;

use super::draft::Draft;

/// A boxed mutator run against a [`Draft`] of the current snapshot.
pub type Mutator<S> = Box<dyn for<'a> FnOnce(&mut Draft<'a, S>) + Send>;

/// One `set_state` request.
pub enum Update<S> {
    /// Replace the whole snapshot.
    Replace(S),
    /// Edit a draft of the current snapshot.
    Mutate(Mutator<S>),
}

impl<S: Clone> Update<S> {
    pub fn replace(value: S) -> Self {
        Self::Replace(value)
    }

    pub fn mutate<F>(mutator: F) -> Self
    where
        F: FnOnce(&mut Draft<'_, S>) + Send + 'static,
    {
        Self::Mutate(Box::new(mutator))
    }

    /// Mutate with extra arguments, passed to the mutator after the draft.
    ///
    /// Lets a model keep a table of named, reusable mutators:
    ///
    /// ```rust,ignore
    /// fn nickname_inputted(state: &mut Draft<'_, Login>, nickname: String) {
    ///     state.nickname = nickname;
    /// }
    ///
    /// ctx.set(Update::mutate_with(nickname_inputted, "strata".to_string()));
    /// ```
    pub fn mutate_with<F, A>(mutator: F, args: A) -> Self
    where
        F: FnOnce(&mut Draft<'_, S>, A) + Send + 'static,
        A: Send + 'static,
    {
        Self::Mutate(Box::new(move |draft: &mut Draft<'_, S>| mutator(draft, args)))
    }

    /// Compute the next snapshot from `current`.
    pub(crate) fn apply(self, current: &Arc<S>) -> Arc<S> {
        match self {
            Self::Replace(value) => Arc::new(value),
            Self::Mutate(mutator) => {
                let mut draft = Draft::new(current);
                mutator(&mut draft);
                draft.finish()
            }
        }
    }
}

impl<S> fmt::Debug for Update<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Replace(_) => f.write_str("Update::Replace"),
            Self::Mutate(_) => f.write_str("Update::Mutate"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Debug, PartialEq)]
    struct Counter {
        value: i64,
        step: i64,
    }

    #[test]
    fn replace_builds_a_fresh_snapshot() {
        let current = Arc::new(Counter { value: 1, step: 1 });
        let next = Update::replace(Counter { value: 1, step: 1 }).apply(&current);

        assert_eq!(*next, *current);
        assert!(!Arc::ptr_eq(&current, &next));
    }

    #[test]
    fn noop_mutation_keeps_identity() {
        let current = Arc::new(Counter { value: 1, step: 1 });
        let next = Update::mutate(|draft: &mut Draft<'_, Counter>| {
            let _ = draft.value;
        })
        .apply(&current);

        assert!(Arc::ptr_eq(&current, &next));
    }

    #[test]
    fn extra_args_follow_the_draft() {
        fn add(draft: &mut Draft<'_, Counter>, (times, extra): (i64, i64)) {
            let step = draft.step;
            draft.value += step * times + extra;
        }

        let current = Arc::new(Counter { value: 0, step: 2 });
        let next = Update::mutate_with(add, (3, 1)).apply(&current);

        assert_eq!(next.value, 7);
        assert_eq!(current.value, 0);
    }
}
