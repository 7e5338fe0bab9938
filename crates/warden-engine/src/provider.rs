//! Context resolution
//!
//! A [`ContextProvider`] turns whatever the host's call envelope is (an HTTP
//! request, an RPC metadata map, a job descriptor) into a resolved context.
//! It is called once per call; the result is then carried explicitly by a
//! [`Scope`](crate::Scope) instead of being stored in shared state.

use crate::error::ResolveError;

/// Resolves the caller's context from a call envelope.
///
/// `Ok(None)` means "anonymous"; `Err` means resolution itself failed.
pub trait ContextProvider<E: ?Sized, C>: Send + Sync {
    /// Resolve the context for one call.
    fn resolve(&self, envelope: &E) -> Result<Option<C>, ResolveError>;
}

impl<E, C, F> ContextProvider<E, C> for F
where
    E: ?Sized,
    F: Fn(&E) -> Result<Option<C>, ResolveError> + Send + Sync,
{
    fn resolve(&self, envelope: &E) -> Result<Option<C>, ResolveError> {
        self(envelope)
    }
}
