use std::sync::Arc;

use crate::{any::TypeInfo, dependency_resolver::DependencyResolver, resolver::Resolver, ResolveErrorKind};

/// Resolves the default registration of `C` in the caller's scope.
pub struct Inject<C: ?Sized>(pub Arc<C>);

impl<C: ?Sized + Send + Sync + 'static> DependencyResolver for Inject<C> {
    type Error = ResolveErrorKind;

    fn resolve(resolver: &Resolver<'_>) -> Result<Self, Self::Error> {
        resolver.resolve().map(Self)
    }

    fn type_info() -> TypeInfo {
        TypeInfo::of::<C>()
    }
}

/// Resolves every registration of `C` (all names), in registration order.
pub struct InjectAll<C: ?Sized>(pub Vec<Arc<C>>);

impl<C: ?Sized + Send + Sync + 'static> DependencyResolver for InjectAll<C> {
    type Error = ResolveErrorKind;

    fn resolve(resolver: &Resolver<'_>) -> Result<Self, Self::Error> {
        resolver.resolve_all().map(Self)
    }

    fn type_info() -> TypeInfo {
        TypeInfo::of::<C>()
    }
}
