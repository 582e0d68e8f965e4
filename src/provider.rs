use std::{
    fmt::{self, Debug, Formatter},
    sync::{Arc, Weak},
};

use crate::{bootstrapper::Bootstrapper, errors::ResolveErrorKind, resolver::Resolver};

/// Resolver handle the [`crate::Manager`] registers for itself as a singleton.
///
/// Components that need to resolve services lazily take it as an explicit dependency
/// (`Inject<ServiceProvider>`). It holds the bootstrapper weakly, so storing it in a
/// singleton doesn't keep the container alive.
#[derive(Clone)]
pub struct ServiceProvider {
    bootstrapper: Weak<dyn Bootstrapper>,
}

impl ServiceProvider {
    #[inline]
    #[must_use]
    pub fn new(bootstrapper: &Arc<dyn Bootstrapper>) -> Self {
        Self {
            bootstrapper: Arc::downgrade(bootstrapper),
        }
    }

    fn upgrade(&self) -> Result<Arc<dyn Bootstrapper>, ResolveErrorKind> {
        self.bootstrapper.upgrade().ok_or(ResolveErrorKind::Disposed)
    }

    #[allow(clippy::missing_errors_doc)]
    #[inline]
    pub fn resolve<C: ?Sized + Send + Sync + 'static>(&self) -> Result<Arc<C>, ResolveErrorKind> {
        self.resolve_named("")
    }

    #[allow(clippy::missing_errors_doc)]
    pub fn resolve_named<C: ?Sized + Send + Sync + 'static>(&self, name: &str) -> Result<Arc<C>, ResolveErrorKind> {
        let bootstrapper = self.upgrade()?;
        Resolver::new(&*bootstrapper, None).resolve_named(name)
    }

    #[allow(clippy::missing_errors_doc)]
    pub fn resolve_all<C: ?Sized + Send + Sync + 'static>(&self) -> Result<Vec<Arc<C>>, ResolveErrorKind> {
        let bootstrapper = self.upgrade()?;
        Resolver::new(&*bootstrapper, None).resolve_all()
    }
}

impl Debug for ServiceProvider {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self.bootstrapper.upgrade() {
            Some(bootstrapper) => f.debug_tuple("ServiceProvider").field(&bootstrapper.name()).finish(),
            None => f.write_str("ServiceProvider(<dropped>)"),
        }
    }
}
