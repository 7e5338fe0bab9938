//! # Global Checks
//!
//! Context-level predicates (for example "account is active") that gate every
//! resource check. They are evaluated top-to-bottom in registration order and
//! the first failing check stops evaluation.

use std::sync::Arc;

use crate::error::{require_identifier, RegistryResult};

/// Predicate over the resolved context.
pub type CheckPredicate<C> = Arc<dyn Fn(&C) -> bool + Send + Sync>;

/// A named context-level predicate.
///
/// # Example
///
/// ```
/// use warden_registry::GlobalCheck;
///
/// struct Ctx { active: bool }
///
/// let check = GlobalCheck::new("ActiveAccount", "account is not active", |c: &Ctx| c.active);
/// assert!(check.passes(&Ctx { active: true }));
/// assert!(!check.passes(&Ctx { active: false }));
/// ```
pub struct GlobalCheck<C> {
    name: String,
    message: String,
    predicate: CheckPredicate<C>,
}

impl<C> GlobalCheck<C> {
    /// Create a global check.
    pub fn new<F>(name: impl Into<String>, message: impl Into<String>, predicate: F) -> Self
    where
        F: Fn(&C) -> bool + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            message: message.into(),
            predicate: Arc::new(predicate),
        }
    }

    /// Check name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Message reported when the check fails.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Run the predicate.
    pub fn passes(&self, context: &C) -> bool {
        (self.predicate)(context)
    }

    fn validate(&self) -> RegistryResult<()> {
        require_identifier(&self.name, "Global check name")?;
        require_identifier(&self.message, "Global check message")
    }
}

impl<C> Clone for GlobalCheck<C> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            message: self.message.clone(),
            predicate: Arc::clone(&self.predicate),
        }
    }
}

impl<C> std::fmt::Debug for GlobalCheck<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GlobalCheck")
            .field("name", &self.name)
            .field("message", &self.message)
            .finish_non_exhaustive()
    }
}

/// Ordered list of global checks.
pub struct GlobalCheckSet<C> {
    checks: Vec<GlobalCheck<C>>,
}

impl<C> Default for GlobalCheckSet<C> {
    fn default() -> Self {
        Self { checks: Vec::new() }
    }
}

impl<C> GlobalCheckSet<C> {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the checks, validating each name and message.
    pub fn set(&mut self, checks: Vec<GlobalCheck<C>>) -> RegistryResult<()> {
        for check in &checks {
            check.validate()?;
        }
        self.checks = checks;
        Ok(())
    }

    /// Return the first check that fails, running checks in order.
    pub fn first_failure(&self, context: &C) -> Option<&GlobalCheck<C>> {
        self.checks.iter().find(|check| !check.passes(context))
    }

    /// Iterate over the checks in evaluation order.
    pub fn iter(&self) -> impl Iterator<Item = &GlobalCheck<C>> {
        self.checks.iter()
    }

    /// Number of checks.
    pub fn len(&self) -> usize {
        self.checks.len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.checks.is_empty()
    }
}

impl<C> std::fmt::Debug for GlobalCheckSet<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.checks.iter()).finish()
    }
}
