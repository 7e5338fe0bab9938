//! Per-call scope
//!
//! A [`Scope`] owns the context resolved for one logical call and exposes the
//! decision operations without making the caller pass the context around.
//! It lives as long as the call; dropping it discards the context.

use std::sync::Arc;

use warden_registry::{Instance, Resource};

use crate::context::AuthContext;
use crate::engine::DecisionEngine;
use crate::mapper::{DefaultDenialMapper, DenialMapper};

/// The resolved context of one call, bound to the shared engine.
pub struct Scope<C, M = DefaultDenialMapper> {
    engine: Arc<DecisionEngine<C, M>>,
    context: Option<C>,
}

impl<C: AuthContext, M: DenialMapper> Scope<C, M> {
    pub(crate) fn new(engine: Arc<DecisionEngine<C, M>>, context: Option<C>) -> Self {
        Self { engine, context }
    }

    /// Context of the call, if any.
    pub fn context(&self) -> Option<&C> {
        self.context.as_ref()
    }

    /// Take the context out of the scope.
    pub fn into_context(self) -> Option<C> {
        self.context
    }

    /// Engine the scope evaluates against.
    pub fn engine(&self) -> &DecisionEngine<C, M> {
        &self.engine
    }

    /// See [`DecisionEngine::has_permission`].
    pub fn has_permission(
        &self,
        resource: &str,
        action: &str,
        access_levels: &[&str],
    ) -> Result<(), M::Error> {
        self.engine
            .has_permission(self.context(), resource, action, access_levels)
    }

    /// See [`DecisionEngine::get_access_level`].
    pub fn get_access_level(
        &self,
        resource: &str,
        action: &str,
    ) -> Result<Option<Vec<String>>, M::Error> {
        self.engine.get_access_level(self.context(), resource, action)
    }

    /// See [`DecisionEngine::can_be`].
    pub fn can_be(&self, resource: &str, relationship: &str) -> Result<(), M::Error> {
        self.engine.can_be(self.context(), resource, relationship)
    }

    /// See [`DecisionEngine::can`].
    pub fn can<R: Resource>(&self, resource: &str, action: &str, instance: &R) -> Result<(), M::Error> {
        self.engine.can(self.context(), resource, action, instance)
    }

    /// See [`DecisionEngine::can_instance`].
    pub fn can_instance(
        &self,
        resource: &str,
        action: &str,
        instance: Instance<'_>,
    ) -> Result<(), M::Error> {
        self.engine
            .can_instance(self.context(), resource, action, instance)
    }
}

impl<C: std::fmt::Debug, M> std::fmt::Debug for Scope<C, M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scope")
            .field("context", &self.context)
            .finish_non_exhaustive()
    }
}
