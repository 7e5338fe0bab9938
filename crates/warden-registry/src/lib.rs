//! # Warden Registry
//!
//! This crate holds the static side of the Warden authorization engine:
//! everything that is registered once at startup and read on every decision.
//!
//! ## Overview
//!
//! The warden-registry crate handles:
//! - **Roles**: Role identifiers with rank, classification and invite flags
//! - **Resources**: Identifier field, actions, access levels, relationships
//! - **Access Levels**: Named predicates over `(context, instance)` with a priority
//! - **Role Grants**: Per-role action -> access levels tables and relationships
//! - **Global Checks**: Ordered context-only predicates gating every check
//!
//! ## Architecture
//!
//! ```text
//! Registry<C>
//!   ├─ RoleRegistry        role -> RoleDefinition, default role, role -> resources
//!   ├─ ResourceRegistry<C> resource -> Declared | Defined(ResourceMetadata<C>)
//!   │                         ├─ identifier, actions, relationships
//!   │                         ├─ access levels (predicate + priority)
//!   │                         └─ roles -> ResourcePermissions
//!   └─ GlobalCheckSet<C>   ordered context predicates
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use warden_registry::{Registry, Resource, ResourceDefinition, RoleDefinition, RoleGrant};
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
//! let mut registry = Registry::<Ctx>::new();
//! registry.add_role("AGENT", RoleDefinition::new(3)).unwrap();
//! registry.set_default_role("AGENT", false).unwrap();
//!
//! // Root configuration declares the name...
//! registry.declare_resource("User").unwrap();
//!
//! // ...and the owning feature supplies the rulebook later.
//! registry.define_resource(
//!     "User",
//!     ResourceDefinition::<Ctx, User>::new("user_id")
//!         .actions(["READ"])
//!         .access_level("OWN", 0, |ctx, user| ctx.user_id == user.user_id)
//!         .role("AGENT", RoleGrant::new().permit("READ", ["OWN"])),
//! ).unwrap();
//!
//! assert!(registry.resource("User").is_some());
//! ```
//!
//! ## Errors
//!
//! Every [`RegistryError`] is a boot-time configuration failure and should
//! abort startup.

pub mod access;
pub mod checks;
pub mod definition;
pub mod error;
pub mod registry;
pub mod resource;
pub mod resources;
pub mod roles;

// Re-export main types for convenience
pub use access::{AccessLevel, AccessPredicate};
pub use checks::{CheckPredicate, GlobalCheck, GlobalCheckSet};
pub use definition::{ErasedDefinition, ResourceDefinition, RoleGrant};
pub use error::{RegistryError, RegistryResult};
pub use registry::{Registry, RoleInfo, RoleResourceInfo};
pub use resource::{Instance, Resource};
pub use resources::{ResourceEntry, ResourceMetadata, ResourcePermissions, ResourceRegistry};
pub use roles::{RoleCatalog, RoleDefinition, RoleRegistry};
