//! # Decision Engine
//!
//! The [`DecisionEngine`] answers four questions about a resolved context:
//!
//! - [`has_permission`](DecisionEngine::has_permission): may the role perform
//!   an action on a resource at all (optionally under given access levels)?
//! - [`get_access_level`](DecisionEngine::get_access_level): which access
//!   levels does the role hold for an action?
//! - [`can_be`](DecisionEngine::can_be): may the role hold a relationship
//!   with a resource?
//! - [`can`](DecisionEngine::can): may the caller perform an action on one
//!   particular instance?
//!
//! Each call first validates the context (present, carries a role, passes
//! every global check in order), then evaluates against the read-only
//! registry, builds an [`AuditLog`], forwards it to the sink when audit
//! logging is enabled and, on deny, returns the error produced by the
//! [`DenialMapper`].
//!
//! The engine performs no I/O and holds no mutable state; one instance can be
//! shared by any number of concurrent callers.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use warden_registry::{
    Instance, Registry, Resource, ResourceMetadata, ResourcePermissions, RoleDefinition, RoleInfo,
};

use crate::audit::{AuditDetail, AuditLog, AuditResult, AuditSink, TracingAuditSink};
use crate::context::AuthContext;
use crate::mapper::{DefaultDenialMapper, DenialMapper};

/// User id reported when no context is available.
pub const UNKNOWN_USER: &str = "unknown";

/// Result of one resource-level evaluation.
struct Verdict<T> {
    value: T,
    allowed: bool,
    message: String,
    detail: Option<AuditDetail>,
}

impl<T> Verdict<T> {
    fn allow(value: T, message: impl Into<String>) -> Self {
        Self {
            value,
            allowed: true,
            message: message.into(),
            detail: None,
        }
    }

    fn deny(value: T, message: impl Into<String>) -> Self {
        Self {
            value,
            allowed: false,
            message: message.into(),
            detail: None,
        }
    }

    fn with_detail(mut self, detail: AuditDetail) -> Self {
        self.detail = Some(detail);
        self
    }
}

/// A context that passed validation.
struct Admitted<'c, C> {
    context: &'c C,
    role: &'c str,
    user_id: &'c str,
}

/// Why a context was rejected.
struct Rejected {
    user_id: String,
    message: String,
}

fn list(items: &[impl AsRef<str>]) -> String {
    items
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Stateless authorization evaluator over a shared registry.
pub struct DecisionEngine<C, M = DefaultDenialMapper> {
    registry: Arc<Registry<C>>,
    logging: bool,
    sink: Arc<dyn AuditSink>,
    mapper: M,
}

impl<C: AuthContext> DecisionEngine<C, DefaultDenialMapper> {
    /// Create an engine with the default mapper, audit logging off.
    pub fn new(registry: impl Into<Arc<Registry<C>>>) -> Self {
        Self::with_mapper(registry, DefaultDenialMapper)
    }
}

impl<C: AuthContext, M: DenialMapper> DecisionEngine<C, M> {
    /// Create an engine with a custom denial mapper.
    pub fn with_mapper(registry: impl Into<Arc<Registry<C>>>, mapper: M) -> Self {
        Self {
            registry: registry.into(),
            logging: false,
            sink: Arc::new(TracingAuditSink),
            mapper,
        }
    }

    /// Enable or disable audit logging.
    pub fn with_logging(mut self, enabled: bool) -> Self {
        self.logging = enabled;
        self
    }

    /// Replace the audit sink.
    pub fn with_sink(mut self, sink: Arc<dyn AuditSink>) -> Self {
        self.sink = sink;
        self
    }

    // ------------------------------------------------------------------
    // Registry reads
    // ------------------------------------------------------------------

    /// Registry the engine evaluates against.
    pub fn registry(&self) -> &Registry<C> {
        &self.registry
    }

    /// Get all role identifiers.
    pub fn roles(&self) -> Vec<String> {
        self.registry.roles()
    }

    /// Get one role's definition.
    pub fn role_definition(&self, role: &str) -> Option<&RoleDefinition> {
        self.registry.role_definition(role)
    }

    /// Get the default role together with its definition.
    pub fn default_role(&self) -> Option<(&str, &RoleDefinition)> {
        let role = self.registry.default_role()?;
        Some((role, self.registry.role_definition(role)?))
    }

    /// Get all resource names.
    pub fn resources(&self) -> Vec<String> {
        self.registry.resources()
    }

    /// Metadata of a defined resource.
    pub fn resource(&self, resource: &str) -> Option<&ResourceMetadata<C>> {
        self.registry.resource(resource)
    }

    /// Describe a role and its grants.
    pub fn role_info(&self, role: &str) -> Option<RoleInfo> {
        self.registry.role_info(role)
    }

    /// Check whether audit logging is enabled.
    pub fn logging_enabled(&self) -> bool {
        self.logging
    }

    /// Denial mapper in use.
    pub fn mapper(&self) -> &M {
        &self.mapper
    }

    // ------------------------------------------------------------------
    // Decisions
    // ------------------------------------------------------------------

    /// Check that the role may perform `action` on `resource`.
    ///
    /// With a non-empty `access_levels`, every requested level must be
    /// defined for the resource and granted to the role for the action.
    pub fn has_permission(
        &self,
        context: Option<&C>,
        resource: &str,
        action: &str,
        access_levels: &[&str],
    ) -> Result<(), M::Error> {
        let detail = AuditDetail::HasPermission {
            action: action.to_string(),
        };
        self.execute(context, resource, detail, true, |_, role| {
            let (metadata, grants) = match self.grants_for(resource, role) {
                Ok(found) => found,
                Err(message) => return Verdict::deny((), message),
            };

            let permitted = match grants.access_levels(action) {
                Some(levels) if !levels.is_empty() => levels,
                _ => {
                    return Verdict::deny(
                        (),
                        format!("Permission '{}' not granted for role '{}'", action, role),
                    )
                }
            };

            if access_levels.is_empty() {
                return Verdict::allow(
                    (),
                    format!(
                        "Permission '{}' granted with access levels: [{}]",
                        action,
                        list(permitted)
                    ),
                );
            }

            let invalid: Vec<&str> = access_levels
                .iter()
                .copied()
                .filter(|level| metadata.access_level(level).is_none())
                .collect();
            if !invalid.is_empty() {
                return Verdict::deny(
                    (),
                    format!("Invalid access levels requested: [{}]", list(invalid.as_slice())),
                );
            }

            let all_granted = access_levels
                .iter()
                .all(|requested| permitted.iter().any(|level| level == requested));
            if all_granted {
                Verdict::allow(
                    (),
                    format!(
                        "Requested access levels [{}] are granted for action '{}'",
                        list(access_levels),
                        action
                    ),
                )
            } else {
                Verdict::deny(
                    (),
                    format!(
                        "Not all requested access levels [{}] are granted. Available: [{}]",
                        list(access_levels),
                        list(permitted)
                    ),
                )
            }
        })
    }

    /// Get the access levels the role holds for `action` on `resource`.
    ///
    /// A missing resource, role entry or grant yields `Ok(None)` with a deny
    /// record; only context and global-check failures return an error.
    pub fn get_access_level(
        &self,
        context: Option<&C>,
        resource: &str,
        action: &str,
    ) -> Result<Option<Vec<String>>, M::Error> {
        let detail = AuditDetail::GetAccessLevel {
            action: action.to_string(),
            access_levels: None,
        };
        self.execute(context, resource, detail, false, |_, role| {
            let grants = match self.grants_for(resource, role) {
                Ok((_, grants)) => grants,
                Err(message) => return Verdict::deny(None, message),
            };

            match grants.access_levels(action) {
                Some(levels) if !levels.is_empty() => {
                    let levels = levels.to_vec();
                    let message = format!("Access levels found: {}", list(levels.as_slice()));
                    Verdict::allow(Some(levels.clone()), message).with_detail(
                        AuditDetail::GetAccessLevel {
                            action: action.to_string(),
                            access_levels: Some(levels),
                        },
                    )
                }
                _ => Verdict::deny(
                    None,
                    format!("No access levels found for action '{}'", action),
                ),
            }
        })
    }

    /// Check that the role may hold `relationship` with `resource`.
    pub fn can_be(
        &self,
        context: Option<&C>,
        resource: &str,
        relationship: &str,
    ) -> Result<(), M::Error> {
        let detail = AuditDetail::CanBe {
            relationship: relationship.to_string(),
        };
        self.execute(context, resource, detail, true, |_, role| {
            let grants = match self.grants_for(resource, role) {
                Ok((_, grants)) => grants,
                Err(message) => return Verdict::deny((), message),
            };

            if grants.relationships.contains(relationship) {
                Verdict::allow(
                    (),
                    format!(
                        "Relationship '{}' is allowed for role '{}'",
                        relationship, role
                    ),
                )
            } else {
                Verdict::deny(
                    (),
                    format!(
                        "Relationship '{}' is not allowed for role '{}'",
                        relationship, role
                    ),
                )
            }
        })
    }

    /// Check that the caller may perform `action` on one instance.
    pub fn can<R: Resource>(
        &self,
        context: Option<&C>,
        resource: &str,
        action: &str,
        instance: &R,
    ) -> Result<(), M::Error> {
        self.can_instance(context, resource, action, Instance::of(instance))
    }

    /// [`can`](Self::can) for an already type-erased instance.
    ///
    /// The role's access levels for the action are tried in the order the
    /// role lists them; the first one whose predicate holds grants access.
    /// The numeric priority of a level does not affect the order.
    pub fn can_instance(
        &self,
        context: Option<&C>,
        resource: &str,
        action: &str,
        instance: Instance<'_>,
    ) -> Result<(), M::Error> {
        let detail = AuditDetail::Can {
            action: action.to_string(),
            resource_id: None,
        };
        self.execute(context, resource, detail, true, |context, role| {
            let Some(metadata) = self.registry.resource(resource) else {
                return Verdict::deny((), format!("Resource '{}' not found", resource));
            };

            let resource_id = instance.field_value(metadata.identifier());
            let detail = AuditDetail::Can {
                action: action.to_string(),
                resource_id,
            };

            if instance.type_id() != metadata.type_id() {
                return Verdict::deny(
                    (),
                    format!(
                        "Instance of type '{}' does not match resource '{}' (expected '{}')",
                        instance.type_name(),
                        resource,
                        metadata.type_name()
                    ),
                )
                .with_detail(detail);
            }

            let Some(grants) = metadata.role(role) else {
                return Verdict::deny(
                    (),
                    format!(
                        "Role '{}' has no permissions defined for resource '{}'",
                        role, resource
                    ),
                )
                .with_detail(detail);
            };

            let levels = match grants.access_levels(action) {
                Some(levels) if !levels.is_empty() => levels,
                _ => {
                    return Verdict::deny(
                        (),
                        format!(
                            "No access levels defined for action '{}' on resource '{}'",
                            action, resource
                        ),
                    )
                    .with_detail(detail)
                }
            };

            for name in levels {
                let Some(level) = metadata.access_level(name) else {
                    continue;
                };
                match catch_unwind(AssertUnwindSafe(|| level.evaluate(context, instance))) {
                    Ok(true) => {
                        return Verdict::allow(
                            (),
                            format!("Access granted through access level '{}'", name),
                        )
                        .with_detail(detail)
                    }
                    Ok(false) => {}
                    Err(_) => {
                        tracing::error!(
                            resource = %resource,
                            action = %action,
                            access_level = %name,
                            "Access level predicate panicked"
                        );
                        return Verdict::deny(
                            (),
                            format!("Access level '{}' failed during evaluation", name),
                        )
                        .with_detail(detail);
                    }
                }
            }

            Verdict::deny(
                (),
                format!(
                    "None of the access levels [{}] granted permission",
                    list(levels)
                ),
            )
            .with_detail(detail)
        })
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    /// Forward a record to the sink when audit logging is enabled.
    pub(crate) fn record(&self, log: &AuditLog) {
        if self.logging {
            self.sink.record(log);
        }
    }

    fn grants_for(
        &self,
        resource: &str,
        role: &str,
    ) -> Result<(&ResourceMetadata<C>, &ResourcePermissions), String> {
        let metadata = self
            .registry
            .resource(resource)
            .ok_or_else(|| format!("Resource '{}' not found", resource))?;
        let grants = metadata.role(role).ok_or_else(|| {
            format!(
                "Role '{}' has no permissions defined for resource '{}'",
                role, resource
            )
        })?;
        Ok((metadata, grants))
    }

    fn admit<'c>(&self, context: Option<&'c C>) -> Result<Admitted<'c, C>, Rejected> {
        let Some(context) = context else {
            return Err(Rejected {
                user_id: UNKNOWN_USER.to_string(),
                message: "No context found".to_string(),
            });
        };
        let user_id = context.user_id().unwrap_or(UNKNOWN_USER);
        let Some(role) = context.role().filter(|role| !role.is_empty()) else {
            return Err(Rejected {
                user_id: user_id.to_string(),
                message: "No role defined in context".to_string(),
            });
        };

        let checks = self.registry.global_checks();
        match catch_unwind(AssertUnwindSafe(|| checks.first_failure(context))) {
            Ok(None) => Ok(Admitted {
                context,
                role,
                user_id,
            }),
            Ok(Some(check)) => Err(Rejected {
                user_id: user_id.to_string(),
                message: format!("Global check failed: {} - {}", check.name(), check.message()),
            }),
            Err(_) => {
                tracing::error!(user_id = %user_id, "Global check predicate panicked");
                Err(Rejected {
                    user_id: user_id.to_string(),
                    message: "Global check failed during evaluation".to_string(),
                })
            }
        }
    }

    fn execute<T>(
        &self,
        context: Option<&C>,
        resource: &str,
        detail: AuditDetail,
        raise_on_deny: bool,
        operation: impl FnOnce(&C, &str) -> Verdict<T>,
    ) -> Result<T, M::Error> {
        let admitted = match self.admit(context) {
            Ok(admitted) => admitted,
            Err(rejected) => {
                let log = AuditLog::new(
                    detail,
                    resource,
                    rejected.user_id,
                    AuditResult::Deny,
                    rejected.message,
                );
                self.record(&log);
                return Err(self.mapper.authentication(&log));
            }
        };

        let verdict = operation(admitted.context, admitted.role);
        let log = AuditLog::new(
            verdict.detail.unwrap_or(detail),
            resource,
            admitted.user_id,
            AuditResult::from_allowed(verdict.allowed),
            verdict.message,
        );
        self.record(&log);

        if !verdict.allowed && raise_on_deny {
            return Err(self.mapper.authorization(&log));
        }
        Ok(verdict.value)
    }
}

impl<C, M> std::fmt::Debug for DecisionEngine<C, M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DecisionEngine")
            .field("registry", &self.registry)
            .field("logging", &self.logging)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::MemoryAuditSink;
    use crate::context::Principal;
    use crate::error::Denial;
    use warden_registry::{GlobalCheck, ResourceDefinition, RoleGrant};

    struct Document {
        document_id: String,
        owner_id: String,
    }

    impl Resource for Document {
        fn fields() -> &'static [&'static str] {
            &["document_id", "owner_id"]
        }

        fn field_value(&self, field: &str) -> Option<String> {
            match field {
                "document_id" => Some(self.document_id.clone()),
                "owner_id" => Some(self.owner_id.clone()),
                _ => None,
            }
        }
    }

    struct Folder;

    impl Resource for Folder {
        fn fields() -> &'static [&'static str] {
            &["path"]
        }

        fn field_value(&self, _field: &str) -> Option<String> {
            None
        }
    }

    fn doc(owner: &str) -> Document {
        Document {
            document_id: "doc-1".into(),
            owner_id: owner.into(),
        }
    }

    fn registry() -> Registry<Principal> {
        let mut registry = Registry::new();
        registry.add_role("EDITOR", RoleDefinition::new(1)).unwrap();
        registry.add_role("VIEWER", RoleDefinition::new(2)).unwrap();
        registry.add_role("AUDITOR", RoleDefinition::new(3)).unwrap();
        registry.set_default_role("VIEWER", false).unwrap();
        registry
            .set_global_checks(vec![GlobalCheck::new(
                "ActiveAccount",
                "account is suspended",
                |p: &Principal| !p.attr::<bool>("suspended").unwrap_or(false),
            )])
            .unwrap();
        registry
            .define_resource(
                "Document",
                ResourceDefinition::<Principal, Document>::new("document_id")
                    .actions(["READ", "EDIT", "DELETE"])
                    .access_level("ALL", 0, |_, _| true)
                    .access_level("OWN", 1, |p: &Principal, d: &Document| p.user_id == d.owner_id)
                    .access_level("EXPLODE", 2, |_, _| panic!("predicate bug"))
                    .relationship("OWNER")
                    .role(
                        "EDITOR",
                        RoleGrant::new()
                            .permit("READ", ["ALL"])
                            .permit("EDIT", ["OWN"])
                            .permit("DELETE", ["EXPLODE", "ALL"])
                            .relationship("OWNER"),
                    )
                    .role("VIEWER", RoleGrant::new().permit("READ", ["OWN"]))
                    .role("AUDITOR", RoleGrant::new().permit("READ", Vec::<String>::new())),
            )
            .unwrap();
        registry
    }

    fn engine() -> (DecisionEngine<Principal>, Arc<MemoryAuditSink>) {
        let sink = Arc::new(MemoryAuditSink::new());
        let engine = DecisionEngine::new(registry())
            .with_logging(true)
            .with_sink(sink.clone());
        (engine, sink)
    }

    #[test]
    fn test_has_permission() {
        let (engine, sink) = engine();
        let editor = Principal::new("u1", "EDITOR");

        engine.has_permission(Some(&editor), "Document", "EDIT", &[]).unwrap();
        assert_eq!(
            sink.last().unwrap().message,
            "Permission 'EDIT' granted with access levels: [OWN]"
        );

        let viewer = Principal::new("u2", "VIEWER");
        let err = engine
            .has_permission(Some(&viewer), "Document", "EDIT", &[])
            .unwrap_err();
        assert_eq!(err.message(), "Permission 'EDIT' not granted for role 'VIEWER'");
        assert!(matches!(err, Denial::AuthorizationDenied(_)));
    }

    #[test]
    fn test_has_permission_with_access_levels() {
        let (engine, _) = engine();
        let editor = Principal::new("u1", "EDITOR");

        engine
            .has_permission(Some(&editor), "Document", "READ", &["ALL"])
            .unwrap();

        let err = engine
            .has_permission(Some(&editor), "Document", "READ", &["OWN"])
            .unwrap_err();
        assert_eq!(
            err.message(),
            "Not all requested access levels [OWN] are granted. Available: [ALL]"
        );

        let err = engine
            .has_permission(Some(&editor), "Document", "READ", &["ALL", "SHARED"])
            .unwrap_err();
        assert_eq!(err.message(), "Invalid access levels requested: [SHARED]");
    }

    #[test]
    fn test_empty_grant_is_not_a_permission() {
        let (engine, _) = engine();
        let auditor = Principal::new("u3", "AUDITOR");

        let err = engine
            .has_permission(Some(&auditor), "Document", "READ", &[])
            .unwrap_err();
        assert_eq!(err.message(), "Permission 'READ' not granted for role 'AUDITOR'");
    }

    #[test]
    fn test_unknown_resource_and_role_entry() {
        let (engine, _) = engine();
        let editor = Principal::new("u1", "EDITOR");

        let err = engine
            .has_permission(Some(&editor), "Invoice", "READ", &[])
            .unwrap_err();
        assert_eq!(err.message(), "Resource 'Invoice' not found");

        let stranger = Principal::new("u4", "STRANGER");
        let err = engine
            .can_be(Some(&stranger), "Document", "OWNER")
            .unwrap_err();
        assert_eq!(
            err.message(),
            "Role 'STRANGER' has no permissions defined for resource 'Document'"
        );
    }

    #[test]
    fn test_context_failures_are_authentication_denials() {
        let (engine, sink) = engine();

        let err = engine.has_permission(None, "Document", "READ", &[]).unwrap_err();
        assert!(matches!(err, Denial::AuthenticationDenied(_)));
        assert_eq!(err.audit().user_id, UNKNOWN_USER);
        assert_eq!(err.message(), "No context found");

        let roleless = Principal::without_role("u5");
        let err = engine
            .get_access_level(Some(&roleless), "Document", "READ")
            .unwrap_err();
        assert_eq!(err.message(), "No role defined in context");
        assert_eq!(err.audit().user_id, "u5");

        let suspended = Principal::new("u6", "EDITOR").with_attribute("suspended", true);
        let err = engine.can(Some(&suspended), "Document", "READ", &doc("u6")).unwrap_err();
        assert_eq!(
            err.message(),
            "Global check failed: ActiveAccount - account is suspended"
        );
        assert_eq!(err.audit().detail.action(), Some("READ"));

        assert_eq!(sink.len(), 3);
    }

    #[test]
    fn test_get_access_level() {
        let (engine, sink) = engine();
        let editor = Principal::new("u1", "EDITOR");

        assert_eq!(
            engine.get_access_level(Some(&editor), "Document", "DELETE").unwrap(),
            Some(vec!["EXPLODE".to_string(), "ALL".to_string()])
        );
        let log = sink.last().unwrap();
        assert_eq!(log.message, "Access levels found: EXPLODE, ALL");
        assert!(log.is_allowed());

        assert_eq!(
            engine.get_access_level(Some(&editor), "Document", "ARCHIVE").unwrap(),
            None
        );
        assert!(sink.last().unwrap().is_denied());

        assert_eq!(
            engine.get_access_level(Some(&editor), "Invoice", "READ").unwrap(),
            None
        );
    }

    #[test]
    fn test_can_be() {
        let (engine, _) = engine();

        engine
            .can_be(Some(&Principal::new("u1", "EDITOR")), "Document", "OWNER")
            .unwrap();
        let err = engine
            .can_be(Some(&Principal::new("u2", "VIEWER")), "Document", "OWNER")
            .unwrap_err();
        assert_eq!(
            err.message(),
            "Relationship 'OWNER' is not allowed for role 'VIEWER'"
        );
    }

    #[test]
    fn test_can_records_resource_id() {
        let (engine, sink) = engine();
        let viewer = Principal::new("u2", "VIEWER");

        engine.can(Some(&viewer), "Document", "READ", &doc("u2")).unwrap();
        let log = sink.last().unwrap();
        assert_eq!(
            log.detail,
            AuditDetail::Can {
                action: "READ".into(),
                resource_id: Some("doc-1".into()),
            }
        );
        assert_eq!(log.message, "Access granted through access level 'OWN'");

        let err = engine.can(Some(&viewer), "Document", "READ", &doc("u9")).unwrap_err();
        assert_eq!(err.message(), "None of the access levels [OWN] granted permission");
    }

    #[test]
    fn test_can_rejects_wrong_instance_type() {
        let (engine, _) = engine();
        let editor = Principal::new("u1", "EDITOR");

        let err = engine.can(Some(&editor), "Document", "READ", &Folder).unwrap_err();
        assert!(err.message().starts_with("Instance of type"));
        assert!(matches!(err, Denial::AuthorizationDenied(_)));
    }

    #[test]
    fn test_panicking_predicate_denies() {
        let (engine, _) = engine();
        let editor = Principal::new("u1", "EDITOR");

        let err = engine.can(Some(&editor), "Document", "DELETE", &doc("u1")).unwrap_err();
        assert_eq!(
            err.message(),
            "Access level 'EXPLODE' failed during evaluation"
        );
    }

    #[test]
    fn test_panicking_global_check_is_authentication_denial() {
        let mut registry = registry();
        registry
            .set_global_checks(vec![GlobalCheck::new(
                "TenantLookup",
                "tenant is unknown",
                |p: &Principal| p.attr::<String>("tenant").expect("tenant attribute") == "acme",
            )])
            .unwrap();
        let sink = Arc::new(MemoryAuditSink::new());
        let engine = DecisionEngine::new(registry)
            .with_logging(true)
            .with_sink(sink.clone());
        let editor = Principal::new("u1", "EDITOR");

        let err = engine.can(Some(&editor), "Document", "READ", &doc("u1")).unwrap_err();
        assert!(matches!(err, Denial::AuthenticationDenied(_)));
        assert_eq!(err.status_code(), 401);
        assert_eq!(err.message(), "Global check failed during evaluation");
        assert_eq!(err.audit().user_id, "u1");
        assert!(sink.last().unwrap().is_denied());

        let tenant = editor.with_attribute("tenant", "acme");
        engine.can(Some(&tenant), "Document", "READ", &doc("u1")).unwrap();
    }

    #[test]
    fn test_logging_disabled_skips_sink() {
        let sink = Arc::new(MemoryAuditSink::new());
        let engine = DecisionEngine::new(registry()).with_sink(sink.clone());

        assert!(engine.has_permission(None, "Document", "READ", &[]).is_err());
        assert!(sink.is_empty());
        assert!(!engine.logging_enabled());
    }

    #[test]
    fn test_default_role() {
        let (engine, _) = engine();
        let (role, definition) = engine.default_role().unwrap();

        assert_eq!(role, "VIEWER");
        assert_eq!(definition.rank, 2);
    }
}
