//! # Warden Engine
//!
//! Run-time authorization decisions over a [`warden_registry::Registry`].
//!
//! ## Overview
//!
//! The warden-engine crate handles:
//! - **Decisions**: `has_permission`, `get_access_level`, `can_be`, `can`
//! - **Audit**: one structured [`AuditLog`] per decision, sent to an [`AuditSink`]
//! - **Denials**: mapping denied decisions to the host's error type
//! - **Boot**: root and feature options applied once at startup
//! - **Routes**: per-route requirements checked before a handler runs
//!
//! ## Flow
//!
//! ```text
//! boot:     RootOptions ─┐
//!           FeatureOptions ─> Bootstrap ─finish()─> Warden (Arc<DecisionEngine>)
//!
//! per call: envelope ─> ContextProvider ─> Scope ─> DecisionEngine
//!                                                    ├─ context + global checks
//!                                                    ├─ registry lookup
//!                                                    ├─ AuditSink (if enabled)
//!                                                    └─ DenialMapper on deny
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use std::sync::Arc;
//! use warden_engine::{
//!     Bootstrap, EngineSettings, FeatureOptions, MemoryAuditSink, Principal, ResolveError,
//!     Resource, ResourceDefinition, RoleCatalog, RoleDefinition, RoleGrant, RootOptions,
//! };
//!
//! struct User { user_id: String }
//!
//! impl Resource for User {
//!     fn fields() -> &'static [&'static str] { &["user_id"] }
//!     fn field_value(&self, field: &str) -> Option<String> {
//!         (field == "user_id").then(|| self.user_id.clone())
//!     }
//! }
//!
//! let sink = Arc::new(MemoryAuditSink::new());
//! let root = RootOptions::new(
//!     RoleCatalog::new().with_role("AGENT", RoleDefinition::new(3)),
//!     "AGENT",
//!     |user: &str| -> Result<Option<Principal>, ResolveError> {
//!         Ok(Some(Principal::new(user, "AGENT")))
//!     },
//! )
//! .resource("User")
//! .logging(true)
//! .sink(sink.clone());
//!
//! let warden = Bootstrap::with_settings(root, &EngineSettings::default())
//!     .unwrap()
//!     .feature(FeatureOptions::new().resource(
//!         "User",
//!         ResourceDefinition::<Principal, User>::new("user_id")
//!             .action("READ")
//!             .access_level("OWN", 0, |ctx, user| ctx.user_id == user.user_id)
//!             .role("AGENT", RoleGrant::new().permit("READ", ["OWN"])),
//!     ))
//!     .unwrap()
//!     .finish();
//!
//! let scope = warden.resolve_scope("u1").unwrap();
//! assert!(scope.can("User", "READ", &User { user_id: "u1".into() }).is_ok());
//! assert!(scope.can("User", "READ", &User { user_id: "u2".into() }).is_err());
//! assert_eq!(sink.len(), 2);
//! ```

pub mod audit;
pub mod context;
pub mod engine;
pub mod error;
pub mod guard;
pub mod mapper;
pub mod options;
pub mod provider;
pub mod scope;

// Re-export main types for convenience
pub use audit::{AuditDetail, AuditLog, AuditResult, AuditSink, MemoryAuditSink, TracingAuditSink};
pub use context::{AuthContext, Principal};
pub use engine::{DecisionEngine, UNKNOWN_USER};
pub use error::{Denial, ResolveError};
pub use guard::{RouteGuard, RouteRequirement, RouteTable};
pub use mapper::{DefaultDenialMapper, DenialMapper, FnDenialMapper};
pub use options::{Bootstrap, EngineSettings, FeatureOptions, RootOptions, Warden, AUDIT_LOG_ENV};
pub use provider::ContextProvider;
pub use scope::Scope;

pub use warden_registry::{
    AccessLevel, GlobalCheck, Instance, Registry, RegistryError, RegistryResult, Resource,
    ResourceDefinition, ResourceMetadata, ResourcePermissions, RoleCatalog, RoleDefinition,
    RoleGrant, RoleInfo,
};
