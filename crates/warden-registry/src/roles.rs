//! # Roles
//!
//! The role registry is the catalog of role identifiers and their static
//! definitions (rank, classification, invite-only flag and any extra
//! attributes the host wants to attach). It also keeps the default role and a
//! reverse index of the resources that grant something to each role.

use std::collections::{BTreeMap, BTreeSet};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{require_identifier, RegistryError, RegistryResult};

/// Static attributes of a role.
///
/// # Example
///
/// ```
/// use warden_registry::RoleDefinition;
///
/// let manager = RoleDefinition::new(2)
///     .with_classification("internal")
///     .invite_only(true);
/// assert_eq!(manager.rank, 2);
/// assert!(manager.invite_only);
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RoleDefinition {
    /// Ordinal rank (lower is more privileged).
    pub rank: u32,

    /// Classification tag (for example "internal" or "external").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub classification: Option<String>,

    /// Whether principals can only obtain this role by invitation.
    #[serde(default)]
    pub invite_only: bool,

    /// Additional host-defined attributes.
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

impl RoleDefinition {
    /// Create a definition with the given rank.
    pub fn new(rank: u32) -> Self {
        Self {
            rank,
            ..Self::default()
        }
    }

    /// Set the classification tag.
    pub fn with_classification(mut self, classification: impl Into<String>) -> Self {
        self.classification = Some(classification.into());
        self
    }

    /// Set the invite-only flag.
    pub fn invite_only(mut self, invite_only: bool) -> Self {
        self.invite_only = invite_only;
        self
    }

    /// Attach an extra attribute.
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Look up an extra attribute.
    pub fn attribute(&self, key: &str) -> Option<&Value> {
        self.attributes.get(key)
    }
}

/// Role definitions in declaration order, typically loaded from configuration.
///
/// # Example
///
/// ```
/// use warden_registry::RoleCatalog;
///
/// let catalog = RoleCatalog::from_json(r#"{
///     "ADMIN": { "rank": 1, "classification": "internal", "inviteOnly": true },
///     "SELLER": { "rank": 3, "classification": "external" }
/// }"#).unwrap();
///
/// assert_eq!(catalog.len(), 2);
/// assert_eq!(catalog.get("SELLER").unwrap().rank, 3);
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct RoleCatalog {
    roles: IndexMap<String, RoleDefinition>,
}

impl RoleCatalog {
    /// Create an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a role to the catalog (builder style).
    pub fn with_role(mut self, role: impl Into<String>, definition: RoleDefinition) -> Self {
        self.roles.insert(role.into(), definition);
        self
    }

    /// Parse a catalog from a JSON object of `role -> definition`.
    pub fn from_json(json: &str) -> RegistryResult<Self> {
        serde_json::from_str(json).map_err(|e| {
            RegistryError::ConfigValidation(format!("Roles definition is not valid JSON: {}", e))
        })
    }

    /// Get a definition by role.
    pub fn get(&self, role: &str) -> Option<&RoleDefinition> {
        self.roles.get(role)
    }

    /// Iterate over `(role, definition)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &RoleDefinition)> {
        self.roles.iter()
    }

    /// Number of roles.
    pub fn len(&self) -> usize {
        self.roles.len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.roles.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, RoleDefinition)> for RoleCatalog {
    fn from_iter<T: IntoIterator<Item = (K, RoleDefinition)>>(iter: T) -> Self {
        Self {
            roles: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

/// Registry of known roles.
#[derive(Debug, Clone, Default)]
pub struct RoleRegistry {
    definitions: IndexMap<String, RoleDefinition>,
    resources_by_role: BTreeMap<String, BTreeSet<String>>,
    default_role: Option<String>,
}

impl RoleRegistry {
    /// Create an empty role registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a role.
    ///
    /// Re-registering a known role is ignored; the first definition wins.
    pub fn add_role(&mut self, role: &str, definition: RoleDefinition) -> RegistryResult<()> {
        require_identifier(role, "Role identifier")?;

        if self.definitions.contains_key(role) {
            tracing::debug!(role = %role, "Role already registered, ignoring");
            return Ok(());
        }

        self.definitions.insert(role.to_string(), definition);
        self.resources_by_role.insert(role.to_string(), BTreeSet::new());
        tracing::debug!(role = %role, "Role registered");
        Ok(())
    }

    /// Set the default role.
    ///
    /// The role must already be registered. Once a default is set, later
    /// calls are no-ops unless `force` is true.
    pub fn set_default_role(&mut self, role: &str, force: bool) -> RegistryResult<()> {
        require_identifier(role, "Role identifier")?;

        if !self.definitions.contains_key(role) {
            return Err(RegistryError::RoleNotFound(role.to_string()));
        }
        if self.default_role.is_some() && !force {
            return Ok(());
        }

        tracing::debug!(role = %role, force, "Default role set");
        self.default_role = Some(role.to_string());
        Ok(())
    }

    /// Get the default role, if one was set.
    pub fn default_role(&self) -> Option<&str> {
        self.default_role.as_deref()
    }

    /// Get all role identifiers, in registration order.
    pub fn roles(&self) -> Vec<String> {
        self.definitions.keys().cloned().collect()
    }

    /// Get a role definition.
    pub fn definition(&self, role: &str) -> Option<&RoleDefinition> {
        self.definitions.get(role)
    }

    /// Check whether a role is registered.
    pub fn contains(&self, role: &str) -> bool {
        self.definitions.contains_key(role)
    }

    /// Resources that grant something to `role`.
    pub fn resources_for(&self, role: &str) -> Option<&BTreeSet<String>> {
        self.resources_by_role.get(role)
    }

    pub(crate) fn index_resource(&mut self, role: &str, resource: &str) {
        self.resources_by_role
            .entry(role.to_string())
            .or_default()
            .insert(resource.to_string());
    }

    /// Number of registered roles.
    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> RoleRegistry {
        let mut roles = RoleRegistry::new();
        roles.add_role("ADMIN", RoleDefinition::new(1)).unwrap();
        roles.add_role("SELLER", RoleDefinition::new(3)).unwrap();
        roles
    }

    #[test]
    fn test_add_role_is_idempotent() {
        let mut roles = registry();
        roles.add_role("ADMIN", RoleDefinition::new(9)).unwrap();

        assert_eq!(roles.len(), 2);
        assert_eq!(roles.definition("ADMIN").unwrap().rank, 1);
        assert!(roles.resources_for("ADMIN").unwrap().is_empty());
    }

    #[test]
    fn test_add_role_rejects_empty_identifier() {
        let mut roles = RoleRegistry::new();
        let err = roles.add_role("", RoleDefinition::new(0)).unwrap_err();
        assert!(matches!(err, RegistryError::ConfigValidation(_)));
    }

    #[test]
    fn test_default_role_not_overwritten_without_force() {
        let mut roles = registry();

        roles.set_default_role("SELLER", false).unwrap();
        roles.set_default_role("ADMIN", false).unwrap();
        assert_eq!(roles.default_role(), Some("SELLER"));

        roles.set_default_role("ADMIN", true).unwrap();
        assert_eq!(roles.default_role(), Some("ADMIN"));
    }

    #[test]
    fn test_default_role_must_exist() {
        let mut roles = registry();
        assert_eq!(
            roles.set_default_role("GHOST", false),
            Err(RegistryError::RoleNotFound("GHOST".into()))
        );
        assert_eq!(roles.default_role(), None);
    }

    #[test]
    fn test_roles_snapshot_is_stable() {
        let roles = registry();
        assert_eq!(roles.roles(), roles.roles());
        assert_eq!(roles.roles(), vec!["ADMIN".to_string(), "SELLER".to_string()]);
    }

    #[test]
    fn test_roles_keep_registration_order() {
        let mut roles = RoleRegistry::new();
        for role in ["SUPPORT", "ADMIN", "MEMBER"] {
            roles.add_role(role, RoleDefinition::new(1)).unwrap();
        }
        assert_eq!(roles.roles(), vec!["SUPPORT", "ADMIN", "MEMBER"]);

        let catalog = RoleCatalog::from_json(r#"{ "ZED": { "rank": 2 }, "ALPHA": { "rank": 1 } }"#).unwrap();
        let names: Vec<&String> = catalog.iter().map(|(role, _)| role).collect();
        assert_eq!(names, ["ZED", "ALPHA"]);
    }

    #[test]
    fn test_catalog_from_json_keeps_extra_attributes() {
        let catalog = RoleCatalog::from_json(
            r#"{ "AGENT": { "rank": 3, "inviteOnly": true, "region": "emea" } }"#,
        )
        .unwrap();
        let agent = catalog.get("AGENT").unwrap();

        assert!(agent.invite_only);
        assert_eq!(agent.classification, None);
        assert_eq!(agent.attribute("region"), Some(&Value::from("emea")));
    }

    #[test]
    fn test_catalog_from_invalid_json() {
        let err = RoleCatalog::from_json("[1, 2]").unwrap_err();
        assert!(matches!(err, RegistryError::ConfigValidation(_)));
    }
}
