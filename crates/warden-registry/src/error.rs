//! Error types for registry configuration
//!
//! Every error in this module is a boot-time configuration failure. None of
//! them is recoverable: the host is expected to abort startup when one is
//! returned.

use thiserror::Error;

/// Registry configuration error types.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RegistryError {
    /// Malformed root or feature configuration (missing field, wrong shape).
    #[error("Configuration validation failed: {0}")]
    ConfigValidation(String),

    /// Reference to a role that was never added to the registry.
    #[error("Role \"{0}\" is not defined in the registry.")]
    RoleNotFound(String),

    /// Use of a resource name that was never declared.
    #[error("Resource \"{0}\" not found. Please make sure that the resource is declared in the root options.")]
    ResourceNotFound(String),

    /// Action, access level or relationship mismatch inside a resource definition.
    #[error("Invalid resource definition for \"{resource}\": {reason}")]
    InvalidResourceDefinition {
        /// Resource being defined.
        resource: String,
        /// What was wrong with the definition.
        reason: String,
    },
}

/// Result type for registry operations.
pub type RegistryResult<T> = Result<T, RegistryError>;

impl RegistryError {
    pub(crate) fn invalid(resource: &str, reason: impl Into<String>) -> Self {
        RegistryError::InvalidResourceDefinition {
            resource: resource.to_string(),
            reason: reason.into(),
        }
    }

    /// Get a stable error code for diagnostics.
    pub fn error_code(&self) -> &'static str {
        match self {
            RegistryError::ConfigValidation(_) => "CONFIG_VALIDATION",
            RegistryError::RoleNotFound(_) => "ROLE_NOT_FOUND",
            RegistryError::ResourceNotFound(_) => "RESOURCE_NOT_FOUND",
            RegistryError::InvalidResourceDefinition { .. } => "INVALID_RESOURCE_DEFINITION",
        }
    }
}

/// Reject empty or whitespace-only identifiers.
pub(crate) fn require_identifier(value: &str, name: &str) -> RegistryResult<()> {
    if value.trim().is_empty() {
        return Err(RegistryError::ConfigValidation(format!(
            "{} must be a non-empty string",
            name
        )));
    }
    Ok(())
}
