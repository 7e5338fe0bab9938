//! Translation of denied decisions into caller-facing errors.

use std::sync::Arc;

use crate::audit::AuditLog;
use crate::error::Denial;

/// Turns a denied decision into the host's error type.
///
/// `authentication` is used when there is no usable context or a global
/// check failed; `authorization` when a resource-level check failed.
pub trait DenialMapper: Send + Sync {
    /// Error returned to the caller.
    type Error;

    /// Map a context or global-check failure.
    fn authentication(&self, log: &AuditLog) -> Self::Error;

    /// Map a resource-level failure.
    fn authorization(&self, log: &AuditLog) -> Self::Error;
}

/// Mapper producing [`Denial`].
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultDenialMapper;

impl DenialMapper for DefaultDenialMapper {
    type Error = Denial;

    fn authentication(&self, log: &AuditLog) -> Denial {
        Denial::AuthenticationDenied(log.clone())
    }

    fn authorization(&self, log: &AuditLog) -> Denial {
        Denial::AuthorizationDenied(log.clone())
    }
}

type MapFn<E> = Arc<dyn Fn(&AuditLog) -> E + Send + Sync>;

/// Mapper built from two closures.
///
/// ```
/// use warden_engine::{AuditDetail, AuditLog, AuditResult, DenialMapper, FnDenialMapper};
///
/// let mapper = FnDenialMapper::new(
///     |log: &AuditLog| (401, log.message.clone()),
///     |log: &AuditLog| (403, log.message.clone()),
/// );
/// let log = AuditLog::new(AuditDetail::Intercept, "system", "unknown", AuditResult::Deny, "nope");
/// assert_eq!(mapper.authorization(&log), (403, "nope".to_string()));
/// ```
pub struct FnDenialMapper<E> {
    authentication: MapFn<E>,
    authorization: MapFn<E>,
}

impl<E> FnDenialMapper<E> {
    /// Create a mapper from an authentication and an authorization factory.
    pub fn new<A, Z>(authentication: A, authorization: Z) -> Self
    where
        A: Fn(&AuditLog) -> E + Send + Sync + 'static,
        Z: Fn(&AuditLog) -> E + Send + Sync + 'static,
    {
        Self {
            authentication: Arc::new(authentication),
            authorization: Arc::new(authorization),
        }
    }
}

impl<E> Clone for FnDenialMapper<E> {
    fn clone(&self) -> Self {
        Self {
            authentication: Arc::clone(&self.authentication),
            authorization: Arc::clone(&self.authorization),
        }
    }
}

impl<E> std::fmt::Debug for FnDenialMapper<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnDenialMapper").finish_non_exhaustive()
    }
}

impl<E> DenialMapper for FnDenialMapper<E> {
    type Error = E;

    fn authentication(&self, log: &AuditLog) -> E {
        (self.authentication)(log)
    }

    fn authorization(&self, log: &AuditLog) -> E {
        (self.authorization)(log)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::{AuditDetail, AuditResult};

    #[test]
    fn test_default_mapper_keeps_record() {
        let log = AuditLog::new(
            AuditDetail::CanBe {
                relationship: "OWNER".into(),
            },
            "User",
            "u1",
            AuditResult::Deny,
            "Relationship 'OWNER' is not allowed for role 'AGENT'",
        );

        match DefaultDenialMapper.authorization(&log) {
            Denial::AuthorizationDenied(mapped) => assert_eq!(mapped.id, log.id),
            other => panic!("unexpected denial: {other:?}"),
        }
        assert!(matches!(
            DefaultDenialMapper.authentication(&log),
            Denial::AuthenticationDenied(_)
        ));
    }
}
