//! # Registry
//!
//! The [`Registry`] bundles the role registry, the resource registry and the
//! global check set into one value that is built during startup and then
//! shared read-only (typically behind an `Arc`) with every consumer.
//!
//! Registration takes `&mut self`: it is meant to run once, on one thread,
//! while the host boots. Once the registry is shared, no decision path can
//! mutate it, so concurrent readers need no synchronization.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::checks::{GlobalCheck, GlobalCheckSet};
use crate::definition::ErasedDefinition;
use crate::error::{RegistryError, RegistryResult};
use crate::resources::{ResourceMetadata, ResourceRegistry};
use crate::roles::{RoleDefinition, RoleRegistry};

/// A role's grants on one resource, as reported by [`Registry::role_info`].
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct RoleResourceInfo {
    /// Action -> access levels, in evaluation order.
    pub actions: BTreeMap<String, Vec<String>>,
    /// Relationships the role may hold.
    pub relationships: BTreeSet<String>,
}

/// Everything the registry knows about one role.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RoleInfo {
    /// Role identifier.
    pub role: String,
    /// Static role attributes.
    pub role_definition: RoleDefinition,
    /// Grants per defined resource.
    pub permissions: BTreeMap<String, RoleResourceInfo>,
}

/// Roles, resources and global checks for one context type `C`.
pub struct Registry<C> {
    roles: RoleRegistry,
    resources: ResourceRegistry<C>,
    global_checks: GlobalCheckSet<C>,
}

impl<C> Default for Registry<C> {
    fn default() -> Self {
        Self {
            roles: RoleRegistry::new(),
            resources: ResourceRegistry::new(),
            global_checks: GlobalCheckSet::new(),
        }
    }
}

impl<C> Registry<C> {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    // ------------------------------------------------------------------
    // Roles
    // ------------------------------------------------------------------

    /// Register a role. Re-registration of a known role is ignored.
    pub fn add_role(&mut self, role: &str, definition: RoleDefinition) -> RegistryResult<()> {
        self.roles.add_role(role, definition)
    }

    /// Set the default role; see [`RoleRegistry::set_default_role`].
    pub fn set_default_role(&mut self, role: &str, force: bool) -> RegistryResult<()> {
        self.roles.set_default_role(role, force)
    }

    /// Get all role identifiers.
    pub fn roles(&self) -> Vec<String> {
        self.roles.roles()
    }

    /// Get a role definition.
    pub fn role_definition(&self, role: &str) -> Option<&RoleDefinition> {
        self.roles.definition(role)
    }

    /// Get the default role, if set.
    pub fn default_role(&self) -> Option<&str> {
        self.roles.default_role()
    }

    /// Borrow the role registry.
    pub fn role_registry(&self) -> &RoleRegistry {
        &self.roles
    }

    // ------------------------------------------------------------------
    // Resources
    // ------------------------------------------------------------------

    /// Declare or define a resource; see [`ResourceRegistry::add_resource`].
    pub fn add_resource(
        &mut self,
        resource: &str,
        definition: Option<ErasedDefinition<C>>,
    ) -> RegistryResult<()> {
        self.resources
            .add_resource(&mut self.roles, resource, definition)
    }

    /// Declare a resource name without a definition.
    pub fn declare_resource(&mut self, resource: &str) -> RegistryResult<()> {
        self.add_resource(resource, None)
    }

    /// Supply the definition of a resource.
    pub fn define_resource(
        &mut self,
        resource: &str,
        definition: impl Into<ErasedDefinition<C>>,
    ) -> RegistryResult<()> {
        self.add_resource(resource, Some(definition.into()))
    }

    /// Get all resource names, declared or defined.
    pub fn resources(&self) -> Vec<String> {
        self.resources.resources()
    }

    /// Metadata of a defined resource.
    pub fn resource(&self, resource: &str) -> Option<&ResourceMetadata<C>> {
        self.resources.metadata(resource)
    }

    /// Check whether a resource name has been declared or defined.
    pub fn is_declared(&self, resource: &str) -> bool {
        self.resources.contains(resource)
    }

    /// Metadata of a defined resource, or `ResourceNotFound`.
    pub fn require_resource(&self, resource: &str) -> RegistryResult<&ResourceMetadata<C>> {
        self.resources
            .metadata(resource)
            .ok_or_else(|| RegistryError::ResourceNotFound(resource.to_string()))
    }

    /// Borrow the resource registry.
    pub fn resource_registry(&self) -> &ResourceRegistry<C> {
        &self.resources
    }

    // ------------------------------------------------------------------
    // Global checks
    // ------------------------------------------------------------------

    /// Replace the global checks.
    pub fn set_global_checks(&mut self, checks: Vec<GlobalCheck<C>>) -> RegistryResult<()> {
        self.global_checks.set(checks)
    }

    /// Global checks in evaluation order.
    pub fn global_checks(&self) -> &GlobalCheckSet<C> {
        &self.global_checks
    }

    // ------------------------------------------------------------------
    // Introspection
    // ------------------------------------------------------------------

    /// Describe a role: its definition and its grants on every defined resource.
    ///
    /// Returns `None` for an unknown role.
    pub fn role_info(&self, role: &str) -> Option<RoleInfo> {
        let role_definition = self.roles.definition(role)?.clone();

        let mut permissions = BTreeMap::new();
        for resource in self.roles.resources_for(role).into_iter().flatten() {
            let Some(grants) = self
                .resources
                .metadata(resource)
                .and_then(|metadata| metadata.role(role))
            else {
                continue;
            };
            permissions.insert(
                resource.clone(),
                RoleResourceInfo {
                    actions: grants.permissions.clone(),
                    relationships: grants.relationships.clone(),
                },
            );
        }

        Some(RoleInfo {
            role: role.to_string(),
            role_definition,
            permissions,
        })
    }
}

impl<C> std::fmt::Debug for Registry<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("roles", &self.roles)
            .field("resources", &self.resources)
            .field("global_checks", &self.global_checks)
            .finish()
    }
}
