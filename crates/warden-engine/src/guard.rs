//! Route admission
//!
//! Routes declare what they require in a [`RouteTable`]; the dispatch layer
//! calls [`RouteGuard::admit`] before running a handler. A route that is not
//! listed requires an authenticated caller.
//!
//! ```
//! use warden_engine::{RouteRequirement, RouteTable};
//!
//! let routes = RouteTable::new()
//!     .public("GET /health")
//!     .permission("GET /users", "User", "READ", ["ALL"]);
//!
//! assert_eq!(routes.requirement("GET /health"), &RouteRequirement::Public);
//! assert_eq!(routes.requirement("POST /logout"), &RouteRequirement::Authenticated);
//! ```

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::audit::{AuditDetail, AuditLog, AuditResult};
use crate::context::AuthContext;
use crate::engine::UNKNOWN_USER;
use crate::mapper::{DefaultDenialMapper, DenialMapper};
use crate::options::Warden;
use crate::scope::Scope;

/// What a route requires before its handler runs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RouteRequirement {
    /// Anyone may call the route
    Public,

    /// A resolved context is required
    #[default]
    Authenticated,

    /// A resolved context holding the permission is required
    #[serde(rename_all = "camelCase")]
    Permission {
        resource: String,
        action: String,
        #[serde(default)]
        access_levels: Vec<String>,
    },
}

static AUTHENTICATED: RouteRequirement = RouteRequirement::Authenticated;

/// Route key -> requirement.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RouteTable {
    routes: BTreeMap<String, RouteRequirement>,
}

impl RouteTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the requirement of a route.
    pub fn route(mut self, key: impl Into<String>, requirement: RouteRequirement) -> Self {
        self.routes.insert(key.into(), requirement);
        self
    }

    /// Mark a route public.
    pub fn public(self, key: impl Into<String>) -> Self {
        self.route(key, RouteRequirement::Public)
    }

    /// Mark a route as requiring authentication only.
    pub fn authenticated(self, key: impl Into<String>) -> Self {
        self.route(key, RouteRequirement::Authenticated)
    }

    /// Mark a route as requiring a permission.
    pub fn permission<I, S>(
        self,
        key: impl Into<String>,
        resource: impl Into<String>,
        action: impl Into<String>,
        access_levels: I,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.route(
            key,
            RouteRequirement::Permission {
                resource: resource.into(),
                action: action.into(),
                access_levels: access_levels.into_iter().map(Into::into).collect(),
            },
        )
    }

    /// Requirement of a route; unlisted routes require authentication.
    pub fn requirement(&self, key: &str) -> &RouteRequirement {
        self.routes.get(key).unwrap_or(&AUTHENTICATED)
    }

    /// Number of listed routes.
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

/// Admits calls to routes according to a [`RouteTable`].
pub struct RouteGuard<C, E: ?Sized, M = DefaultDenialMapper> {
    warden: Warden<C, E, M>,
    routes: Arc<RouteTable>,
}

impl<C, E: ?Sized, M> Clone for RouteGuard<C, E, M> {
    fn clone(&self) -> Self {
        Self {
            warden: self.warden.clone(),
            routes: Arc::clone(&self.routes),
        }
    }
}

impl<C: AuthContext, E: ?Sized, M: DenialMapper> RouteGuard<C, E, M> {
    pub(crate) fn new(warden: Warden<C, E, M>, routes: RouteTable) -> Self {
        Self {
            warden,
            routes: Arc::new(routes),
        }
    }

    /// Route table in use.
    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    /// Resolve the caller and check the route's requirement.
    ///
    /// Public routes admit anonymous callers; every other route needs a
    /// context, and permission routes additionally run `has_permission`.
    /// The returned scope carries the context for the rest of the call.
    pub fn admit(&self, route: &str, envelope: &E) -> Result<Scope<C, M>, M::Error> {
        let requirement = self.routes.requirement(route);
        let context = self.warden.resolve(envelope)?;

        if context.is_none() && *requirement != RouteRequirement::Public {
            let engine = self.warden.engine();
            let log = AuditLog::new(
                AuditDetail::Intercept,
                "authentication",
                UNKNOWN_USER,
                AuditResult::Deny,
                "Authentication required",
            );
            engine.record(&log);
            tracing::debug!(route = %route, "Anonymous call rejected");
            return Err(engine.mapper().authentication(&log));
        }

        let scope = self.warden.scope(context);
        if let RouteRequirement::Permission {
            resource,
            action,
            access_levels,
        } = requirement
        {
            if scope.context().is_some() {
                let levels: Vec<&str> = access_levels.iter().map(String::as_str).collect();
                scope.has_permission(resource, action, &levels)?;
            }
        }
        Ok(scope)
    }
}

impl<C, E: ?Sized, M> std::fmt::Debug for RouteGuard<C, E, M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RouteGuard")
            .field("routes", &self.routes)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_requirement_json() {
        let routes = RouteTable::new()
            .public("GET /health")
            .permission("DELETE /users/:id", "User", "DELETE", ["ALL"]);
        let json = serde_json::to_value(&routes).unwrap();

        assert_eq!(json["GET /health"]["kind"], "public");
        assert_eq!(json["DELETE /users/:id"]["kind"], "permission");
        assert_eq!(json["DELETE /users/:id"]["accessLevels"][0], "ALL");

        let parsed: RouteTable = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, routes);
    }

    #[test]
    fn test_unlisted_route_requires_authentication() {
        let routes = RouteTable::new().authenticated("GET /me");

        assert_eq!(routes.requirement("GET /me"), &RouteRequirement::Authenticated);
        assert_eq!(routes.requirement("GET /other"), &RouteRequirement::Authenticated);
        assert_eq!(routes.len(), 1);
    }
}
