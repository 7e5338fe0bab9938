//! # Access Levels
//!
//! An access level is a named predicate over `(context, instance)` that
//! decides whether a role's grant for an action applies to one particular
//! resource instance. Each level also carries a non-negative priority, which
//! is stored as metadata only: evaluation always follows the order in which a
//! role lists its levels for an action.

use std::any::TypeId;
use std::sync::Arc;

use crate::resource::{Instance, Resource};

/// Type-erased access-level predicate.
pub type AccessPredicate<C> = Arc<dyn Fn(&C, Instance<'_>) -> bool + Send + Sync>;

/// A validated access level stored in the registry.
pub struct AccessLevel<C> {
    priority: u64,
    predicate: AccessPredicate<C>,
}

impl<C> AccessLevel<C> {
    pub(crate) fn new(priority: u64, predicate: AccessPredicate<C>) -> Self {
        Self { priority, predicate }
    }

    /// Priority recorded at definition time.
    pub fn priority(&self) -> u64 {
        self.priority
    }

    /// Evaluate the predicate.
    ///
    /// An instance of a type other than the one the level was written for
    /// never satisfies it.
    pub fn evaluate(&self, context: &C, instance: Instance<'_>) -> bool {
        (self.predicate)(context, instance)
    }
}

impl<C> Clone for AccessLevel<C> {
    fn clone(&self) -> Self {
        Self {
            priority: self.priority,
            predicate: Arc::clone(&self.predicate),
        }
    }
}

impl<C> std::fmt::Debug for AccessLevel<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessLevel")
            .field("priority", &self.priority)
            .finish_non_exhaustive()
    }
}

/// An access level as written in a resource definition, before validation.
pub(crate) struct AccessLevelDraft<C> {
    pub(crate) priority: i64,
    pub(crate) predicate: AccessPredicate<C>,
}

impl<C: 'static> AccessLevelDraft<C> {
    pub(crate) fn typed<R, F>(priority: i64, f: F) -> Self
    where
        R: Resource,
        F: Fn(&C, &R) -> bool + Send + Sync + 'static,
    {
        let expected = TypeId::of::<R>();
        let predicate = erase(move |ctx: &C, instance: Instance<'_>| {
            if instance.type_id() != expected {
                return false;
            }
            instance.downcast::<R>().map_or(false, |res| f(ctx, res))
        });
        Self { priority, predicate }
    }
}

fn erase<C, F>(f: F) -> AccessPredicate<C>
where
    F: for<'a> Fn(&C, Instance<'a>) -> bool + Send + Sync + 'static,
{
    Arc::new(f)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Ctx {
        user_id: String,
    }

    struct Note {
        author: String,
    }

    impl Resource for Note {
        fn fields() -> &'static [&'static str] {
            &["author"]
        }

        fn field_value(&self, field: &str) -> Option<String> {
            (field == "author").then(|| self.author.clone())
        }
    }

    struct Unrelated;

    impl Resource for Unrelated {
        fn fields() -> &'static [&'static str] {
            &[]
        }

        fn field_value(&self, _field: &str) -> Option<String> {
            None
        }
    }

    #[test]
    fn test_typed_predicate() {
        let draft = AccessLevelDraft::typed(2, |ctx: &Ctx, note: &Note| ctx.user_id == note.author);
        let level = AccessLevel::new(draft.priority as u64, draft.predicate);
        let ctx = Ctx { user_id: "u1".into() };

        assert_eq!(level.priority(), 2);
        assert!(level.evaluate(&ctx, Instance::of(&Note { author: "u1".into() })));
        assert!(!level.evaluate(&ctx, Instance::of(&Note { author: "u2".into() })));
    }

    #[test]
    fn test_wrong_type_never_matches() {
        let draft = AccessLevelDraft::typed(0, |_: &Ctx, _: &Note| true);
        let level = AccessLevel::new(0, draft.predicate);
        let ctx = Ctx { user_id: "u1".into() };

        assert!(!level.evaluate(&ctx, Instance::of(&Unrelated)));
    }
}
