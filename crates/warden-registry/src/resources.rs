//! # Resources
//!
//! Per-resource metadata and the two-phase resource registry.
//!
//! Resources can be *declared* by name first (typically by the root
//! configuration) and *defined* later (typically by the feature that owns
//! the resource). Declaring only stores a placeholder; defining validates the
//! definition against the role registry and stores the result. A definition
//! is immutable once stored.

use std::any::TypeId;
use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::access::AccessLevel;
use crate::definition::{ErasedDefinition, RoleGrant};
use crate::error::{require_identifier, RegistryError, RegistryResult};
use crate::roles::RoleRegistry;

/// A role's validated grants on one resource.
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct ResourcePermissions {
    /// Action -> access levels, in declared evaluation order.
    pub permissions: BTreeMap<String, Vec<String>>,
    /// Relationships the role may hold with the resource.
    pub relationships: BTreeSet<String>,
}

impl ResourcePermissions {
    /// Access levels granted for `action`, if any.
    pub fn access_levels(&self, action: &str) -> Option<&[String]> {
        self.permissions.get(action).map(Vec::as_slice)
    }
}

/// Validated metadata of a defined resource.
pub struct ResourceMetadata<C> {
    identifier: String,
    type_id: TypeId,
    type_name: &'static str,
    actions: BTreeSet<String>,
    access_levels: BTreeMap<String, AccessLevel<C>>,
    relationships: BTreeSet<String>,
    roles: BTreeMap<String, ResourcePermissions>,
}

impl<C> ResourceMetadata<C> {
    /// Field that identifies an instance.
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    /// Concrete instance type the definition was written for.
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// Rust type name of the instance type.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Valid actions.
    pub fn actions(&self) -> &BTreeSet<String> {
        &self.actions
    }

    /// Access levels by name.
    pub fn access_levels(&self) -> &BTreeMap<String, AccessLevel<C>> {
        &self.access_levels
    }

    /// Look up one access level.
    pub fn access_level(&self, name: &str) -> Option<&AccessLevel<C>> {
        self.access_levels.get(name)
    }

    /// Valid relationships.
    pub fn relationships(&self) -> &BTreeSet<String> {
        &self.relationships
    }

    /// Per-role grants.
    pub fn roles(&self) -> &BTreeMap<String, ResourcePermissions> {
        &self.roles
    }

    /// Grants of one role.
    pub fn role(&self, role: &str) -> Option<&ResourcePermissions> {
        self.roles.get(role)
    }
}

impl<C> std::fmt::Debug for ResourceMetadata<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceMetadata")
            .field("identifier", &self.identifier)
            .field("type_name", &self.type_name)
            .field("actions", &self.actions)
            .field("access_levels", &self.access_levels)
            .field("relationships", &self.relationships)
            .field("roles", &self.roles)
            .finish()
    }
}

/// Registration state of a resource.
pub enum ResourceEntry<C> {
    /// Name declared, rulebook not yet supplied.
    Declared,
    /// Fully defined and validated.
    Defined(ResourceMetadata<C>),
}

impl<C> std::fmt::Debug for ResourceEntry<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResourceEntry::Declared => f.write_str("Declared"),
            ResourceEntry::Defined(metadata) => f.debug_tuple("Defined").field(metadata).finish(),
        }
    }
}

impl<C> ResourceEntry<C> {
    /// Metadata if the resource is defined.
    pub fn metadata(&self) -> Option<&ResourceMetadata<C>> {
        match self {
            ResourceEntry::Declared => None,
            ResourceEntry::Defined(metadata) => Some(metadata),
        }
    }

    /// Check whether the resource has been defined.
    pub fn is_defined(&self) -> bool {
        matches!(self, ResourceEntry::Defined(_))
    }
}

/// Registry of declared and defined resources.
pub struct ResourceRegistry<C> {
    entries: BTreeMap<String, ResourceEntry<C>>,
}

impl<C> Default for ResourceRegistry<C> {
    fn default() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }
}

impl<C> ResourceRegistry<C> {
    /// Create an empty resource registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare or define a resource.
    ///
    /// - unknown name, no definition: stores a placeholder
    /// - unknown name, definition: validates and stores it
    /// - known name, no definition: rejected
    /// - declared name, definition: validates and replaces the placeholder
    /// - defined name, definition: rejected, definitions are immutable
    pub fn add_resource(
        &mut self,
        roles: &mut RoleRegistry,
        resource: &str,
        definition: Option<ErasedDefinition<C>>,
    ) -> RegistryResult<()> {
        require_identifier(resource, "Resource identifier")?;

        let Some(definition) = definition else {
            if self.entries.contains_key(resource) {
                return Err(RegistryError::invalid(
                    resource,
                    "Definition can't be null because the resource is already registered.",
                ));
            }
            self.entries
                .insert(resource.to_string(), ResourceEntry::Declared);
            tracing::debug!(resource = %resource, "Resource declared");
            return Ok(());
        };

        if self.entries.get(resource).is_some_and(ResourceEntry::is_defined) {
            return Err(RegistryError::invalid(
                resource,
                "Resource is already defined and definitions cannot be replaced.",
            ));
        }

        let metadata = validate(roles, resource, definition)?;
        for role in metadata.roles.keys() {
            roles.index_resource(role, resource);
        }
        tracing::debug!(
            resource = %resource,
            actions = metadata.actions.len(),
            roles = metadata.roles.len(),
            "Resource defined"
        );
        self.entries
            .insert(resource.to_string(), ResourceEntry::Defined(metadata));
        Ok(())
    }

    /// Get all resource names, declared or defined.
    pub fn resources(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }

    /// Get a resource entry.
    pub fn entry(&self, resource: &str) -> Option<&ResourceEntry<C>> {
        self.entries.get(resource)
    }

    /// Metadata of a defined resource.
    pub fn metadata(&self, resource: &str) -> Option<&ResourceMetadata<C>> {
        self.entries.get(resource).and_then(ResourceEntry::metadata)
    }

    /// Check whether a name has been declared or defined.
    pub fn contains(&self, resource: &str) -> bool {
        self.entries.contains_key(resource)
    }

    /// Names declared but never defined.
    pub fn undefined(&self) -> Vec<String> {
        self.entries
            .iter()
            .filter(|(_, entry)| !entry.is_defined())
            .map(|(name, _)| name.clone())
            .collect()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<C> std::fmt::Debug for ResourceRegistry<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_map().entries(self.entries.iter()).finish()
    }
}

fn validate<C>(
    roles: &RoleRegistry,
    resource: &str,
    definition: ErasedDefinition<C>,
) -> RegistryResult<ResourceMetadata<C>> {
    if definition.identifier.trim().is_empty() {
        return Err(RegistryError::invalid(
            resource,
            "Resource definition must have an identifier",
        ));
    }
    if !definition.fields.contains(&definition.identifier.as_str()) {
        return Err(RegistryError::invalid(
            resource,
            format!(
                "Identifier \"{}\" is not a field of {}",
                definition.identifier, definition.type_name
            ),
        ));
    }

    let actions: BTreeSet<String> = definition.actions.into_iter().collect();
    let relationships: BTreeSet<String> = definition.relationships.into_iter().collect();

    let mut access_levels = BTreeMap::new();
    for (name, draft) in definition.access_levels {
        if access_levels.contains_key(&name) {
            return Err(RegistryError::invalid(
                resource,
                format!("Access level \"{}\" is defined more than once", name),
            ));
        }
        let priority = u64::try_from(draft.priority).map_err(|_| {
            RegistryError::invalid(
                resource,
                format!("Access level priority \"{}\" must be a non-negative number", name),
            )
        })?;
        access_levels.insert(name, AccessLevel::new(priority, draft.predicate));
    }

    let mut role_map = BTreeMap::new();
    for (role, grant) in definition.roles {
        if role_map.contains_key(&role) {
            return Err(RegistryError::invalid(
                resource,
                format!("Grant for role \"{}\" is defined more than once", role),
            ));
        }
        if !roles.contains(&role) {
            return Err(RegistryError::RoleNotFound(role));
        }
        let permissions = validate_grant(resource, &grant, &actions, &access_levels, &relationships)?;
        role_map.insert(role, permissions);
    }

    Ok(ResourceMetadata {
        identifier: definition.identifier,
        type_id: definition.type_id,
        type_name: definition.type_name,
        actions,
        access_levels,
        relationships,
        roles: role_map,
    })
}

fn validate_grant<C>(
    resource: &str,
    grant: &RoleGrant,
    actions: &BTreeSet<String>,
    access_levels: &BTreeMap<String, AccessLevel<C>>,
    relationships: &BTreeSet<String>,
) -> RegistryResult<ResourcePermissions> {
    let mut permissions = BTreeMap::new();
    for (action, levels) in &grant.permissions {
        if !actions.contains(action) {
            return Err(RegistryError::invalid(
                resource,
                format!("Action \"{}\" is not defined for this resource", action),
            ));
        }
        if permissions.contains_key(action) {
            return Err(RegistryError::invalid(
                resource,
                format!("Action \"{}\" is permitted more than once", action),
            ));
        }
        if let Some(unknown) = levels.iter().find(|level| !access_levels.contains_key(*level)) {
            return Err(RegistryError::invalid(
                resource,
                format!("Access level \"{}\" is not defined for this resource", unknown),
            ));
        }
        permissions.insert(action.clone(), levels.clone());
    }

    let mut granted = BTreeSet::new();
    for relationship in &grant.relationships {
        if !relationships.contains(relationship) {
            return Err(RegistryError::invalid(
                resource,
                format!("Relationship \"{}\" is not defined for this resource", relationship),
            ));
        }
        granted.insert(relationship.clone());
    }

    Ok(ResourcePermissions {
        permissions,
        relationships: granted,
    })
}
