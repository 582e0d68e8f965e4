use std::{any::type_name, sync::Arc};
use tracing::error;

use crate::{
    any::{AnyInstance, Key, TypeInfo},
    bootstrapper::Bootstrapper,
    errors::ResolveErrorKind,
    scope::ScopeId,
};

/// Resolution context handed to factories: the bootstrapper plus the scope the outer request runs in.
#[derive(Clone, Copy)]
pub struct Resolver<'a> {
    bootstrapper: &'a dyn Bootstrapper,
    scope: Option<ScopeId>,
}

impl<'a> Resolver<'a> {
    #[inline]
    #[must_use]
    pub fn new(bootstrapper: &'a dyn Bootstrapper, scope: Option<ScopeId>) -> Self {
        Self { bootstrapper, scope }
    }

    #[inline]
    #[must_use]
    pub fn bootstrapper(&self) -> &'a dyn Bootstrapper {
        self.bootstrapper
    }

    #[inline]
    #[must_use]
    pub fn scope(&self) -> Option<ScopeId> {
        self.scope
    }

    #[allow(clippy::missing_errors_doc)]
    #[inline]
    pub fn resolve<C: ?Sized + Send + Sync + 'static>(&self) -> Result<Arc<C>, ResolveErrorKind> {
        self.resolve_named::<C>("")
    }

    #[allow(clippy::missing_errors_doc)]
    pub fn resolve_named<C: ?Sized + Send + Sync + 'static>(&self, name: &str) -> Result<Arc<C>, ResolveErrorKind> {
        let instance = self.bootstrapper.resolve_erased(&Key::new::<C>(name), self.scope)?;
        downcast(&instance)
    }

    #[allow(clippy::missing_errors_doc)]
    pub fn resolve_all<C: ?Sized + Send + Sync + 'static>(&self) -> Result<Vec<Arc<C>>, ResolveErrorKind> {
        self.bootstrapper
            .resolve_all_erased(TypeInfo::of::<C>(), self.scope)?
            .iter()
            .map(downcast)
            .collect()
    }
}

pub(crate) fn downcast<C: ?Sized + Send + Sync + 'static>(instance: &AnyInstance) -> Result<Arc<C>, ResolveErrorKind> {
    match instance.downcast_ref::<Arc<C>>() {
        Some(instance) => Ok(instance.clone()),
        None => {
            let err = ResolveErrorKind::IncorrectType {
                expected: type_name::<C>(),
            };
            error!("{}", err);
            Err(err)
        }
    }
}
