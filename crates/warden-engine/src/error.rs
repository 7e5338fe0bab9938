//! Error types for authorization decisions
//!
//! Configuration problems surface as [`RegistryError`](warden_registry::RegistryError)
//! during boot. At run time a call either succeeds or is denied; denials are
//! turned into the host's error type by a [`DenialMapper`](crate::DenialMapper),
//! and [`Denial`] is what the default mapper produces.

use thiserror::Error;

use crate::audit::AuditLog;

/// A denied decision, carrying its audit record.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum Denial {
    /// No usable context, or a global check failed
    #[error("Authentication denied: {}", .0.message)]
    AuthenticationDenied(AuditLog),

    /// A resource-level check failed
    #[error("Authorization denied: {}", .0.message)]
    AuthorizationDenied(AuditLog),
}

impl Denial {
    /// Audit record of the denied decision.
    pub fn audit(&self) -> &AuditLog {
        match self {
            Denial::AuthenticationDenied(log) | Denial::AuthorizationDenied(log) => log,
        }
    }

    /// Explanation of the denial.
    pub fn message(&self) -> &str {
        &self.audit().message
    }

    /// Get HTTP status code for this denial.
    pub fn status_code(&self) -> u16 {
        match self {
            Denial::AuthenticationDenied(_) => 401,
            Denial::AuthorizationDenied(_) => 403,
        }
    }

    /// Get error code for API responses.
    pub fn error_code(&self) -> &'static str {
        match self {
            Denial::AuthenticationDenied(_) => "AUTHN_ERROR",
            Denial::AuthorizationDenied(_) => "AUTHZ_ERROR",
        }
    }
}

/// Failure reported by a context provider.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Context resolution failed: {0}")]
pub struct ResolveError(pub String);

impl ResolveError {
    /// Create a resolve error.
    pub fn new(reason: impl Into<String>) -> Self {
        Self(reason.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::{AuditDetail, AuditResult};

    fn log(message: &str) -> AuditLog {
        AuditLog::new(
            AuditDetail::HasPermission {
                action: "READ".into(),
            },
            "User",
            "u1",
            AuditResult::Deny,
            message,
        )
    }

    #[test]
    fn test_status_and_codes() {
        let authn = Denial::AuthenticationDenied(log("No context found"));
        let authz = Denial::AuthorizationDenied(log("Permission 'READ' not granted for role 'AGENT'"));

        assert_eq!(authn.status_code(), 401);
        assert_eq!(authn.error_code(), "AUTHN_ERROR");
        assert_eq!(authz.status_code(), 403);
        assert_eq!(authz.error_code(), "AUTHZ_ERROR");
        assert_eq!(
            authz.to_string(),
            "Authorization denied: Permission 'READ' not granted for role 'AGENT'"
        );
        assert_eq!(authn.message(), "No context found");
    }

    #[test]
    fn test_resolve_error_display() {
        assert_eq!(
            ResolveError::new("bad token").to_string(),
            "Context resolution failed: bad token"
        );
    }
}
