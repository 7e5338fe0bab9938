//! Boot configuration
//!
//! The host describes its authorization model in two layers:
//!
//! - [`RootOptions`]: the roles, the default role, the resource names, the
//!   context provider, the global checks and the audit/denial wiring.
//! - [`FeatureOptions`]: the full definition of resources, supplied by the
//!   feature that owns them. Every name must already be declared by the root
//!   options.
//!
//! [`Bootstrap`] applies both layers to a fresh registry. Any error aborts
//! startup. [`Bootstrap::finish`] freezes the registry and returns a
//! [`Warden`] handle that can be cloned into every worker.
//!
//! ```
//! use warden_engine::{
//!     Bootstrap, FeatureOptions, Principal, ResolveError, Resource, ResourceDefinition,
//!     RoleCatalog, RoleDefinition, RoleGrant, RootOptions,
//! };
//!
//! struct Report { report_id: String }
//!
//! impl Resource for Report {
//!     fn fields() -> &'static [&'static str] { &["report_id"] }
//!     fn field_value(&self, field: &str) -> Option<String> {
//!         (field == "report_id").then(|| self.report_id.clone())
//!     }
//! }
//!
//! let roles = RoleCatalog::new()
//!     .with_role("ANALYST", RoleDefinition::new(2));
//! let root = RootOptions::new(roles, "ANALYST", |token: &str| -> Result<Option<Principal>, ResolveError> {
//!     Ok(Some(Principal::new(token, "ANALYST")))
//! })
//! .resource("Report")
//! .logging(false);
//!
//! let feature = FeatureOptions::new().resource(
//!     "Report",
//!     ResourceDefinition::<Principal, Report>::new("report_id")
//!         .action("READ")
//!         .access_level("ALL", 0, |_, _| true)
//!         .role("ANALYST", RoleGrant::new().permit("READ", ["ALL"])),
//! );
//!
//! let warden = Bootstrap::new(root).unwrap().feature(feature).unwrap().finish();
//! let scope = warden.resolve_scope("u1").unwrap();
//! assert!(scope.has_permission("Report", "READ", &[]).is_ok());
//! ```

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use warden_registry::{
    ErasedDefinition, GlobalCheck, Registry, RegistryError, RegistryResult, RoleCatalog,
};

use crate::audit::{AuditDetail, AuditLog, AuditResult, AuditSink, TracingAuditSink};
use crate::context::AuthContext;
use crate::engine::{DecisionEngine, UNKNOWN_USER};
use crate::guard::{RouteGuard, RouteTable};
use crate::mapper::{DefaultDenialMapper, DenialMapper};
use crate::provider::ContextProvider;
use crate::scope::Scope;

/// Environment variable that enables audit logging.
pub const AUDIT_LOG_ENV: &str = "WARDEN_AUDIT_LOG";

/// Settings read from the environment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineSettings {
    /// Forward audit records to the sink
    pub audit_log: bool,
}

impl EngineSettings {
    /// Load settings from environment variables.
    ///
    /// `WARDEN_AUDIT_LOG` accepts `true`/`1`/`yes`/`on`; anything else, or an
    /// unset variable, leaves audit logging off.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let default = Self::default();

        Self {
            audit_log: lookup(AUDIT_LOG_ENV)
                .map(|s| matches!(s.trim().to_ascii_lowercase().as_str(), "true" | "1" | "yes" | "on"))
                .unwrap_or(default.audit_log),
        }
    }
}

/// Root authorization configuration.
pub struct RootOptions<C, E: ?Sized, M = DefaultDenialMapper> {
    roles: RoleCatalog,
    default_role: String,
    resources: Vec<String>,
    provider: Arc<dyn ContextProvider<E, C>>,
    global_checks: Vec<GlobalCheck<C>>,
    logging: Option<bool>,
    sink: Option<Arc<dyn AuditSink>>,
    mapper: M,
}

impl<C: AuthContext, E: ?Sized> RootOptions<C, E, DefaultDenialMapper> {
    /// Start root options from the role catalog, the default role and the
    /// context provider.
    pub fn new<P>(roles: RoleCatalog, default_role: impl Into<String>, provider: P) -> Self
    where
        P: ContextProvider<E, C> + 'static,
    {
        Self {
            roles,
            default_role: default_role.into(),
            resources: Vec::new(),
            provider: Arc::new(provider),
            global_checks: Vec::new(),
            logging: None,
            sink: None,
            mapper: DefaultDenialMapper,
        }
    }
}

impl<C: AuthContext, E: ?Sized, M: DenialMapper> RootOptions<C, E, M> {
    /// Declare one resource name.
    pub fn resource(mut self, name: impl Into<String>) -> Self {
        self.resources.push(name.into());
        self
    }

    /// Declare several resource names.
    pub fn resources<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.resources.extend(names.into_iter().map(Into::into));
        self
    }

    /// Append a global check. Checks run in the order they are added.
    pub fn global_check(mut self, check: GlobalCheck<C>) -> Self {
        self.global_checks.push(check);
        self
    }

    /// Replace the global checks.
    pub fn global_checks(mut self, checks: Vec<GlobalCheck<C>>) -> Self {
        self.global_checks = checks;
        self
    }

    /// Enable or disable audit logging, overriding the environment.
    pub fn logging(mut self, enabled: bool) -> Self {
        self.logging = Some(enabled);
        self
    }

    /// Use a custom audit sink.
    pub fn sink(mut self, sink: Arc<dyn AuditSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Use a custom denial mapper.
    pub fn mapper<M2: DenialMapper>(self, mapper: M2) -> RootOptions<C, E, M2> {
        RootOptions {
            roles: self.roles,
            default_role: self.default_role,
            resources: self.resources,
            provider: self.provider,
            global_checks: self.global_checks,
            logging: self.logging,
            sink: self.sink,
            mapper,
        }
    }

    fn validate(&self) -> RegistryResult<()> {
        if self.roles.is_empty() {
            return Err(RegistryError::ConfigValidation(
                "roles must define at least one role".to_string(),
            ));
        }
        if self.default_role.trim().is_empty() {
            return Err(RegistryError::ConfigValidation(
                "default role must be a non-empty string".to_string(),
            ));
        }
        Ok(())
    }
}

/// Resource definitions contributed by one feature.
pub struct FeatureOptions<C> {
    resources: Vec<(String, ErasedDefinition<C>)>,
}

impl<C> Default for FeatureOptions<C> {
    fn default() -> Self {
        Self {
            resources: Vec::new(),
        }
    }
}

impl<C> FeatureOptions<C> {
    /// Create empty feature options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add the definition of a declared resource.
    pub fn resource(
        mut self,
        name: impl Into<String>,
        definition: impl Into<ErasedDefinition<C>>,
    ) -> Self {
        self.resources.push((name.into(), definition.into()));
        self
    }
}

/// Registry under construction.
pub struct Bootstrap<C, E: ?Sized, M = DefaultDenialMapper> {
    registry: Registry<C>,
    provider: Arc<dyn ContextProvider<E, C>>,
    logging: bool,
    sink: Arc<dyn AuditSink>,
    mapper: M,
}

impl<C: AuthContext, E: ?Sized, M: DenialMapper> Bootstrap<C, E, M> {
    /// Apply root options, reading audit settings from the environment.
    pub fn new(root: RootOptions<C, E, M>) -> RegistryResult<Self> {
        Self::with_settings(root, &EngineSettings::from_env())
    }

    /// Apply root options with explicit settings.
    pub fn with_settings(root: RootOptions<C, E, M>, settings: &EngineSettings) -> RegistryResult<Self> {
        root.validate()?;

        let mut registry = Registry::new();
        for (role, definition) in root.roles.iter() {
            registry.add_role(role, definition.clone())?;
        }
        registry.set_default_role(&root.default_role, false)?;
        for resource in &root.resources {
            registry.declare_resource(resource)?;
        }
        registry.set_global_checks(root.global_checks)?;

        let logging = root.logging.unwrap_or(settings.audit_log);
        tracing::debug!(
            roles = registry.roles().len(),
            resources = registry.resources().len(),
            global_checks = registry.global_checks().len(),
            logging,
            "Root authorization options applied"
        );

        Ok(Self {
            registry,
            provider: root.provider,
            logging,
            sink: root.sink.unwrap_or_else(|| Arc::new(TracingAuditSink)),
            mapper: root.mapper,
        })
    }

    /// Apply one feature's resource definitions.
    ///
    /// Fails with `ResourceNotFound` for a name the root options never declared.
    pub fn feature(mut self, feature: FeatureOptions<C>) -> RegistryResult<Self> {
        for (name, definition) in feature.resources {
            if !self.registry.is_declared(&name) {
                return Err(RegistryError::ResourceNotFound(name));
            }
            self.registry.define_resource(&name, definition)?;
        }
        Ok(self)
    }

    /// Freeze the registry and build the shared engine.
    pub fn finish(self) -> Warden<C, E, M> {
        for resource in self.registry.resource_registry().undefined() {
            tracing::warn!(resource = %resource, "Resource declared but never defined");
        }
        tracing::info!(
            roles = self.registry.roles().len(),
            resources = self.registry.resources().len(),
            logging = self.logging,
            "Authorization engine ready"
        );

        let engine = DecisionEngine::with_mapper(self.registry, self.mapper)
            .with_logging(self.logging)
            .with_sink(self.sink);

        Warden {
            engine: Arc::new(engine),
            provider: self.provider,
        }
    }
}

/// Booted authorization engine plus the context provider.
///
/// Cheap to clone; all clones share the same read-only registry.
pub struct Warden<C, E: ?Sized, M = DefaultDenialMapper> {
    engine: Arc<DecisionEngine<C, M>>,
    provider: Arc<dyn ContextProvider<E, C>>,
}

impl<C, E: ?Sized, M> Clone for Warden<C, E, M> {
    fn clone(&self) -> Self {
        Self {
            engine: Arc::clone(&self.engine),
            provider: Arc::clone(&self.provider),
        }
    }
}

impl<C: AuthContext, E: ?Sized, M: DenialMapper> Warden<C, E, M> {
    /// Shared decision engine.
    pub fn engine(&self) -> &Arc<DecisionEngine<C, M>> {
        &self.engine
    }

    /// Resolve the context for a call envelope.
    ///
    /// A provider failure is reported as an authentication denial.
    pub fn resolve(&self, envelope: &E) -> Result<Option<C>, M::Error> {
        self.provider.resolve(envelope).map_err(|err| {
            tracing::warn!(error = %err, "Context provider failed");
            let log = AuditLog::new(
                AuditDetail::Intercept,
                "system",
                UNKNOWN_USER,
                AuditResult::Deny,
                "Failed to resolve context",
            );
            self.engine.record(&log);
            self.engine.mapper().authentication(&log)
        })
    }

    /// Open a scope for an already-resolved context.
    pub fn scope(&self, context: Option<C>) -> Scope<C, M> {
        Scope::new(Arc::clone(&self.engine), context)
    }

    /// Resolve the context for a call envelope and open a scope for it.
    pub fn resolve_scope(&self, envelope: &E) -> Result<Scope<C, M>, M::Error> {
        let context = self.resolve(envelope)?;
        Ok(self.scope(context))
    }

    /// Build a route guard over a route table.
    pub fn guard(&self, routes: RouteTable) -> RouteGuard<C, E, M> {
        RouteGuard::new(self.clone(), routes)
    }
}

impl<C, E: ?Sized, M> std::fmt::Debug for Bootstrap<C, E, M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Bootstrap")
            .field("registry", &self.registry)
            .field("logging", &self.logging)
            .finish_non_exhaustive()
    }
}

impl<C, E: ?Sized, M> std::fmt::Debug for Warden<C, E, M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Warden")
            .field("engine", &self.engine)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::Principal;
    use crate::error::ResolveError;
    use warden_registry::RoleDefinition;

    fn provider(token: &str) -> Result<Option<Principal>, ResolveError> {
        match token {
            "" => Ok(None),
            "broken" => Err(ResolveError::new("signature mismatch")),
            user => Ok(Some(Principal::new(user, "MEMBER"))),
        }
    }

    fn catalog() -> RoleCatalog {
        RoleCatalog::new()
            .with_role("OWNER", RoleDefinition::new(0))
            .with_role("MEMBER", RoleDefinition::new(1))
    }

    #[test]
    fn test_settings_from_lookup() {
        let on = EngineSettings::from_lookup(|_| Some("TRUE".to_string()));
        let off = EngineSettings::from_lookup(|_| Some("nope".to_string()));
        let unset = EngineSettings::from_lookup(|_| None);

        assert!(on.audit_log);
        assert!(!off.audit_log);
        assert_eq!(unset, EngineSettings::default());
    }

    #[test]
    fn test_explicit_logging_overrides_settings() {
        let settings = EngineSettings { audit_log: true };
        let root = RootOptions::new(catalog(), "MEMBER", provider).logging(false);

        let warden = Bootstrap::with_settings(root, &settings).unwrap().finish();
        assert!(!warden.engine().logging_enabled());

        let root = RootOptions::new(catalog(), "MEMBER", provider);
        let warden = Bootstrap::with_settings(root, &settings).unwrap().finish();
        assert!(warden.engine().logging_enabled());
    }

    #[test]
    fn test_root_validation() {
        let settings = EngineSettings::default();

        let err = Bootstrap::with_settings(RootOptions::new(RoleCatalog::new(), "MEMBER", provider), &settings)
            .unwrap_err();
        assert!(matches!(err, RegistryError::ConfigValidation(_)));

        let err = Bootstrap::with_settings(RootOptions::new(catalog(), " ", provider), &settings)
            .unwrap_err();
        assert!(matches!(err, RegistryError::ConfigValidation(_)));

        let err = Bootstrap::with_settings(RootOptions::new(catalog(), "GHOST", provider), &settings)
            .unwrap_err();
        assert_eq!(err, RegistryError::RoleNotFound("GHOST".into()));
    }

    #[test]
    fn test_bootstrap_debug_shows_pending_registry() {
        let root = RootOptions::new(catalog(), "MEMBER", provider).resource("Board").logging(true);
        let bootstrap = Bootstrap::with_settings(root, &EngineSettings::default()).unwrap();

        let rendered = format!("{bootstrap:?}");
        assert!(rendered.starts_with("Bootstrap"));
        assert!(rendered.contains("Board"));
        assert!(rendered.contains("logging: true"));
    }

    #[test]
    fn test_resolve_failure_is_authentication_denial() {
        let root = RootOptions::new(catalog(), "MEMBER", provider);
        let warden = Bootstrap::with_settings(root, &EngineSettings::default())
            .unwrap()
            .finish();

        let err = warden.resolve("broken").unwrap_err();
        assert_eq!(err.message(), "Failed to resolve context");
        assert_eq!(err.audit().resource, "system");
        assert_eq!(err.status_code(), 401);

        assert!(warden.resolve("").unwrap().is_none());
        assert_eq!(warden.resolve("u1").unwrap().unwrap().user_id, "u1");
    }
}
