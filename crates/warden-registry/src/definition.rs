//! # Resource Definitions
//!
//! A resource definition is the rulebook for one resource type: the field
//! that identifies an instance, the valid actions, the access levels (typed
//! predicates over the context and the instance), the valid relationships,
//! and per-role grants.
//!
//! Definitions are written against a concrete instance type and erased when
//! they are handed to the registry, so resources of different types can live
//! in one registry.
//!
//! ```
//! use warden_registry::{Resource, ResourceDefinition, RoleGrant};
//!
//! struct Ctx { user_id: String }
//! struct User { user_id: String }
//!
//! impl Resource for User {
//!     fn fields() -> &'static [&'static str] { &["user_id"] }
//!     fn field_value(&self, field: &str) -> Option<String> {
//!         (field == "user_id").then(|| self.user_id.clone())
//!     }
//! }
//!
//! let definition = ResourceDefinition::<Ctx, User>::new("user_id")
//!     .actions(["READ", "UPDATE"])
//!     .access_level("OWN", 2, |ctx, user| ctx.user_id == user.user_id)
//!     .relationships(["OWNER"])
//!     .role(
//!         "AGENT",
//!         RoleGrant::new()
//!             .permit("READ", ["OWN"])
//!             .permit("UPDATE", ["OWN"])
//!             .relationship("OWNER"),
//!     );
//! assert_eq!(definition.identifier(), "user_id");
//! ```

use std::any::TypeId;
use std::marker::PhantomData;

use crate::access::AccessLevelDraft;
use crate::resource::Resource;

/// What one role may do on a resource.
///
/// Permissions map an action to the ordered list of access levels under which
/// the role may perform it. The order is significant: it is the evaluation
/// order used when an instance is checked.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoleGrant {
    pub(crate) permissions: Vec<(String, Vec<String>)>,
    pub(crate) relationships: Vec<String>,
}

impl RoleGrant {
    /// Create an empty grant.
    pub fn new() -> Self {
        Self::default()
    }

    /// Allow `action` under the given access levels, in evaluation order.
    pub fn permit<I, S>(mut self, action: impl Into<String>, access_levels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.permissions.push((
            action.into(),
            access_levels.into_iter().map(Into::into).collect(),
        ));
        self
    }

    /// Add a relationship the role may hold with the resource.
    pub fn relationship(mut self, relationship: impl Into<String>) -> Self {
        self.relationships.push(relationship.into());
        self
    }
}

/// A resource definition written against instance type `R`.
pub struct ResourceDefinition<C, R> {
    identifier: String,
    actions: Vec<String>,
    access_levels: Vec<(String, AccessLevelDraft<C>)>,
    relationships: Vec<String>,
    roles: Vec<(String, RoleGrant)>,
    _resource: PhantomData<fn(&R)>,
}

impl<C: 'static, R: Resource> ResourceDefinition<C, R> {
    /// Start a definition whose instances are identified by `identifier`.
    pub fn new(identifier: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            actions: Vec::new(),
            access_levels: Vec::new(),
            relationships: Vec::new(),
            roles: Vec::new(),
            _resource: PhantomData,
        }
    }

    /// Identifier field name.
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    /// Add one valid action.
    pub fn action(mut self, action: impl Into<String>) -> Self {
        self.actions.push(action.into());
        self
    }

    /// Add several valid actions.
    pub fn actions<I, S>(mut self, actions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.actions.extend(actions.into_iter().map(Into::into));
        self
    }

    /// Add an access level with its priority and predicate.
    ///
    /// The priority must be non-negative; this is checked at registration.
    pub fn access_level<F>(mut self, name: impl Into<String>, priority: i64, predicate: F) -> Self
    where
        F: Fn(&C, &R) -> bool + Send + Sync + 'static,
    {
        self.access_levels
            .push((name.into(), AccessLevelDraft::typed(priority, predicate)));
        self
    }

    /// Add one valid relationship.
    pub fn relationship(mut self, relationship: impl Into<String>) -> Self {
        self.relationships.push(relationship.into());
        self
    }

    /// Add several valid relationships.
    pub fn relationships<I, S>(mut self, relationships: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.relationships
            .extend(relationships.into_iter().map(Into::into));
        self
    }

    /// Add the grant for one role.
    pub fn role(mut self, role: impl Into<String>, grant: RoleGrant) -> Self {
        self.roles.push((role.into(), grant));
        self
    }
}

/// A resource definition with its instance type erased.
///
/// Obtained from [`ResourceDefinition`] through `From`/`Into`.
pub struct ErasedDefinition<C> {
    pub(crate) identifier: String,
    pub(crate) fields: &'static [&'static str],
    pub(crate) type_id: TypeId,
    pub(crate) type_name: &'static str,
    pub(crate) actions: Vec<String>,
    pub(crate) access_levels: Vec<(String, AccessLevelDraft<C>)>,
    pub(crate) relationships: Vec<String>,
    pub(crate) roles: Vec<(String, RoleGrant)>,
}

impl<C: 'static, R: Resource> From<ResourceDefinition<C, R>> for ErasedDefinition<C> {
    fn from(definition: ResourceDefinition<C, R>) -> Self {
        Self {
            identifier: definition.identifier,
            fields: R::fields(),
            type_id: TypeId::of::<R>(),
            type_name: std::any::type_name::<R>(),
            actions: definition.actions,
            access_levels: definition.access_levels,
            relationships: definition.relationships,
            roles: definition.roles,
        }
    }
}

impl<C> std::fmt::Debug for ErasedDefinition<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ErasedDefinition")
            .field("identifier", &self.identifier)
            .field("type_name", &self.type_name)
            .field("actions", &self.actions)
            .field(
                "access_levels",
                &self.access_levels.iter().map(|(n, _)| n).collect::<Vec<_>>(),
            )
            .field("relationships", &self.relationships)
            .field("roles", &self.roles)
            .finish()
    }
}
