mod default;

pub use default::DefaultBootstrapper;

use std::sync::Arc;

use crate::{
    any::{AnyInstance, Key, TypeInfo},
    contract::Implements,
    dependency_resolver::DependencyResolver,
    descriptor::ServiceDescriptor,
    errors::{InstantiateErrorKind, ResolveErrorKind},
    instantiator::{Injectable, Instantiator},
    lifetime::Lifetime,
    resolver::downcast,
    scope::ScopeId,
    source::ModuleSource,
};

/// A DI container implementation the [`crate::Manager`] drives.
///
/// The trait is object safe and works on type-erased values; the typed surface
/// (`register*`, `resolve*`) lives in [`BootstrapperExt`], implemented for every bootstrapper.
///
/// Implementations must provide:
/// - last-write-wins registration under the same contract and name,
/// - singletons constructed at most once, even under concurrent resolution,
/// - scoped instances cached per [`ScopeId`] and finalized when the scope ends,
/// - idempotent [`Bootstrapper::dispose`], after which every operation fails with [`ResolveErrorKind::Disposed`].
pub trait Bootstrapper: Send + Sync + 'static {
    /// Constructor used by the [`crate::BootstrapperSelector`].
    ///
    /// `sources` are the module sources the manager runs with, so exported
    /// service descriptors can be picked up later by [`BootstrapperExt::register_all`].
    #[allow(clippy::missing_errors_doc)]
    fn create(sources: &[ModuleSource]) -> anyhow::Result<Self>
    where
        Self: Sized;

    /// Diagnostic name.
    fn name(&self) -> &str;

    #[allow(clippy::missing_errors_doc)]
    fn register_descriptor(&self, descriptor: ServiceDescriptor) -> Result<(), ResolveErrorKind>;

    /// Registers every exported descriptor with the given contract, each under its implementation type name.
    /// Returns how many distinct registrations were made; exports sharing a name count once.
    #[allow(clippy::missing_errors_doc)]
    fn register_all_erased(&self, contract: TypeInfo) -> Result<usize, ResolveErrorKind>;

    /// Resolves the registration under `key`. The returned value holds an `Arc<C>` for the key's contract.
    #[allow(clippy::missing_errors_doc)]
    fn resolve_erased(&self, key: &Key, scope: Option<ScopeId>) -> Result<AnyInstance, ResolveErrorKind>;

    /// Resolves every registration of `contract` regardless of its name, in registration order.
    #[allow(clippy::missing_errors_doc)]
    fn resolve_all_erased(&self, contract: TypeInfo, scope: Option<ScopeId>) -> Result<Vec<AnyInstance>, ResolveErrorKind>;

    #[allow(clippy::missing_errors_doc)]
    fn begin_scope(&self) -> Result<ScopeId, ResolveErrorKind>;

    /// Finalizes the scope's instances in LIFO order and drops them. Unknown or already ended scopes are ignored.
    fn end_scope(&self, scope: ScopeId);

    /// Finalizes every cached instance with a finalizer in LIFO order of resolution and clears the registry.
    /// Finalizer failures are logged and don't stop the release of the rest.
    ///
    /// # Warning
    /// Only the first call does anything.
    fn dispose(&self);

    fn is_disposed(&self) -> bool;
}

/// Typed registration and resolution on top of [`Bootstrapper`].
pub trait BootstrapperExt: Bootstrapper {
    /// Registers the concrete type `I` for the contract `C`.
    #[allow(clippy::missing_errors_doc)]
    #[inline]
    fn register<C, I>(&self, lifetime: Lifetime) -> Result<(), ResolveErrorKind>
    where
        C: ?Sized + Send + Sync + 'static,
        I: Injectable + Implements<C>,
    {
        self.register_descriptor(ServiceDescriptor::implementation::<C, I>(lifetime))
    }

    #[allow(clippy::missing_errors_doc)]
    #[inline]
    fn register_named<C, I>(&self, name: &str, lifetime: Lifetime) -> Result<(), ResolveErrorKind>
    where
        C: ?Sized + Send + Sync + 'static,
        I: Injectable + Implements<C>,
    {
        self.register_descriptor(ServiceDescriptor::implementation::<C, I>(lifetime).named(name))
    }

    /// Registers a factory for the contract `C`. Factory arguments are resolved from the container.
    #[allow(clippy::missing_errors_doc)]
    #[inline]
    fn register_factory<C, Inst, Deps>(&self, instantiator: Inst, lifetime: Lifetime) -> Result<(), ResolveErrorKind>
    where
        C: ?Sized + Send + Sync + 'static,
        Inst: Instantiator<Deps, Error = InstantiateErrorKind>,
        Inst::Provides: Implements<C>,
        Deps: DependencyResolver,
    {
        self.register_descriptor(ServiceDescriptor::factory::<C, Inst, Deps>(instantiator, lifetime))
    }

    #[allow(clippy::missing_errors_doc)]
    #[inline]
    fn register_factory_named<C, Inst, Deps>(&self, name: &str, instantiator: Inst, lifetime: Lifetime) -> Result<(), ResolveErrorKind>
    where
        C: ?Sized + Send + Sync + 'static,
        Inst: Instantiator<Deps, Error = InstantiateErrorKind>,
        Inst::Provides: Implements<C>,
        Deps: DependencyResolver,
    {
        self.register_descriptor(ServiceDescriptor::factory::<C, Inst, Deps>(instantiator, lifetime).named(name))
    }

    /// Registers a pre-built instance for the contract `C`.
    #[allow(clippy::missing_errors_doc)]
    #[inline]
    fn register_instance<C, I>(&self, instance: I, lifetime: Lifetime) -> Result<(), ResolveErrorKind>
    where
        C: ?Sized + Send + Sync + 'static,
        I: Implements<C>,
    {
        self.register_descriptor(ServiceDescriptor::instance::<C, I>(instance, lifetime))
    }

    #[allow(clippy::missing_errors_doc)]
    #[inline]
    fn register_instance_named<C, I>(&self, name: &str, instance: I, lifetime: Lifetime) -> Result<(), ResolveErrorKind>
    where
        C: ?Sized + Send + Sync + 'static,
        I: Implements<C>,
    {
        self.register_descriptor(ServiceDescriptor::instance::<C, I>(instance, lifetime).named(name))
    }

    /// Registers every exported implementation of `C` found in the module sources.
    #[allow(clippy::missing_errors_doc)]
    #[inline]
    fn register_all<C>(&self) -> Result<usize, ResolveErrorKind>
    where
        C: ?Sized + Send + Sync + 'static,
    {
        self.register_all_erased(TypeInfo::of::<C>())
    }

    /// Resolves the default registration of `C` outside of any scope.
    #[allow(clippy::missing_errors_doc)]
    #[inline]
    fn resolve<C>(&self) -> Result<Arc<C>, ResolveErrorKind>
    where
        C: ?Sized + Send + Sync + 'static,
    {
        self.resolve_named("")
    }

    #[allow(clippy::missing_errors_doc)]
    #[inline]
    fn resolve_named<C>(&self, name: &str) -> Result<Arc<C>, ResolveErrorKind>
    where
        C: ?Sized + Send + Sync + 'static,
    {
        downcast(&self.resolve_erased(&Key::new::<C>(name), None)?)
    }

    #[allow(clippy::missing_errors_doc)]
    #[inline]
    fn resolve_all<C>(&self) -> Result<Vec<Arc<C>>, ResolveErrorKind>
    where
        C: ?Sized + Send + Sync + 'static,
    {
        self.resolve_all_erased(TypeInfo::of::<C>(), None)?.iter().map(downcast).collect()
    }
}

impl<B: Bootstrapper + ?Sized> BootstrapperExt for B {}
