use std::{
    fmt::{self, Display, Formatter},
    sync::Arc,
};
use tracing::debug;

use crate::{bootstrapper::Bootstrapper, errors::ResolveErrorKind, resolver::Resolver};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ScopeId(pub(crate) u64);

impl Display for ScopeId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "scope#{}", self.0)
    }
}

/// A logical operation (request, job, ...) with its own set of scoped instances.
///
/// Scoped instances are finalized and dropped when the scope is dropped or [`Scope::close`]d.
pub struct Scope<'a> {
    bootstrapper: &'a dyn Bootstrapper,
    id: ScopeId,
}

impl<'a> Scope<'a> {
    /// Opens a new scope on the bootstrapper.
    ///
    /// # Errors
    /// Returns [`ResolveErrorKind::Disposed`] if the bootstrapper has been disposed.
    pub fn enter(bootstrapper: &'a dyn Bootstrapper) -> Result<Self, ResolveErrorKind> {
        let id = bootstrapper.begin_scope()?;
        debug!(scope = %id, "Scope entered");
        Ok(Self { bootstrapper, id })
    }

    #[inline]
    #[must_use]
    pub fn id(&self) -> ScopeId {
        self.id
    }

    #[inline]
    #[must_use]
    pub fn resolver(&self) -> Resolver<'a> {
        Resolver::new(self.bootstrapper, Some(self.id))
    }

    #[allow(clippy::missing_errors_doc)]
    #[inline]
    pub fn resolve<C: ?Sized + Send + Sync + 'static>(&self) -> Result<Arc<C>, ResolveErrorKind> {
        self.resolver().resolve()
    }

    #[allow(clippy::missing_errors_doc)]
    #[inline]
    pub fn resolve_named<C: ?Sized + Send + Sync + 'static>(&self, name: &str) -> Result<Arc<C>, ResolveErrorKind> {
        self.resolver().resolve_named(name)
    }

    #[allow(clippy::missing_errors_doc)]
    #[inline]
    pub fn resolve_all<C: ?Sized + Send + Sync + 'static>(&self) -> Result<Vec<Arc<C>>, ResolveErrorKind> {
        self.resolver().resolve_all()
    }

    /// Ends the scope now instead of at the end of the enclosing block.
    #[inline]
    pub fn close(self) {}
}

impl Drop for Scope<'_> {
    fn drop(&mut self) {
        self.bootstrapper.end_scope(self.id);
        debug!(scope = %self.id, "Scope closed");
    }
}
