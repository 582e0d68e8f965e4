use std::{
    any::TypeId,
    fmt::{self, Debug, Formatter},
    sync::Arc,
};

use crate::{
    any::{AnyInstance, TypeInfo},
    contract::Implements,
    dependency_resolver::DependencyResolver,
    errors::InstantiateErrorKind,
    finalizer::{boxed_finalizer, BoxedFinalizer},
    instantiator::{boxed_instantiator, BoxedInstantiator, Injectable, InjectableInstantiator, Instantiator},
    lifetime::Lifetime,
};

#[derive(Clone)]
pub(crate) enum Implementation {
    Type {
        implementation: TypeInfo,
        instantiator: BoxedInstantiator,
    },
    Factory {
        provides: TypeInfo,
        instantiator: BoxedInstantiator,
    },
    Instance {
        implementation: TypeInfo,
        instance: AnyInstance,
    },
}

impl Implementation {
    #[inline]
    pub(crate) fn type_info(&self) -> TypeInfo {
        match self {
            Self::Type { implementation, .. } | Self::Instance { implementation, .. } => *implementation,
            Self::Factory { provides, .. } => *provides,
        }
    }
}

/// Which strategy a [`ServiceDescriptor`] uses to produce instances.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImplementationKind {
    Type,
    Factory,
    Instance,
}

/// An immutable description of one registration, independent of the bootstrapper that realizes it.
///
/// Exactly one strategy is set: a concrete type, a factory or a pre-built instance.
/// The conversion to the contract is captured when the descriptor is created,
/// so replaying descriptors needs no type information at the call site.
#[derive(Clone)]
pub struct ServiceDescriptor {
    pub(crate) contract: TypeInfo,
    pub(crate) name: String,
    pub(crate) lifetime: Lifetime,
    pub(crate) implementation: Implementation,
    pub(crate) finalizer: Option<BoxedFinalizer>,
    pub(crate) finalizer_mismatch: Option<TypeInfo>,
}

impl ServiceDescriptor {
    /// Concrete implementation type `I`, built through [`Injectable`].
    #[must_use]
    pub fn implementation<C, I>(lifetime: Lifetime) -> Self
    where
        C: ?Sized + Send + Sync + 'static,
        I: Injectable + Implements<C>,
    {
        Self {
            contract: TypeInfo::of::<C>(),
            name: String::new(),
            lifetime,
            implementation: Implementation::Type {
                implementation: TypeInfo::of::<I>(),
                instantiator: boxed_instantiator::<C, _, I::Deps>(InjectableInstantiator::<I>::new()),
            },
            finalizer: None,
            finalizer_mismatch: None,
        }
    }

    /// Factory whose arguments are resolved from the container.
    #[must_use]
    pub fn factory<C, Inst, Deps>(instantiator: Inst, lifetime: Lifetime) -> Self
    where
        C: ?Sized + Send + Sync + 'static,
        Inst: Instantiator<Deps, Error = InstantiateErrorKind>,
        Inst::Provides: Implements<C>,
        Deps: DependencyResolver,
    {
        Self {
            contract: TypeInfo::of::<C>(),
            name: String::new(),
            lifetime,
            implementation: Implementation::Factory {
                provides: TypeInfo::of::<Inst::Provides>(),
                instantiator: boxed_instantiator::<C, Inst, Deps>(instantiator),
            },
            finalizer: None,
            finalizer_mismatch: None,
        }
    }

    /// Pre-built instance. Every resolution returns it, whatever the lifetime.
    #[must_use]
    pub fn instance<C, I>(instance: I, lifetime: Lifetime) -> Self
    where
        C: ?Sized + Send + Sync + 'static,
        I: Implements<C>,
    {
        Self::shared::<C>(Implements::<C>::upcast(Arc::new(instance)), TypeInfo::of::<I>(), lifetime)
    }

    /// Pre-built instance that is already shared behind the contract.
    #[must_use]
    pub fn shared<C>(instance: Arc<C>, implementation: TypeInfo, lifetime: Lifetime) -> Self
    where
        C: ?Sized + Send + Sync + 'static,
    {
        Self {
            contract: TypeInfo::of::<C>(),
            name: String::new(),
            lifetime,
            implementation: Implementation::Instance {
                implementation,
                instance: Arc::new(instance),
            },
            finalizer: None,
            finalizer_mismatch: None,
        }
    }

    #[inline]
    #[must_use]
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Adds a release hook called when the cached instance is released: at the end of its scope
    /// for scoped registrations, on disposal for singletons and instances.
    ///
    /// # Warning
    /// Transient instances aren't cached, so their finalizer is never called.
    /// A finalizer for another contract than the descriptor's one makes the registration fail.
    #[must_use]
    pub fn with_finalizer<C>(mut self, finalizer: impl Fn(Arc<C>) -> anyhow::Result<()> + Send + Sync + 'static) -> Self
    where
        C: ?Sized + Send + Sync + 'static,
    {
        if self.contract.id == TypeId::of::<C>() {
            self.finalizer = Some(boxed_finalizer(finalizer));
            self.finalizer_mismatch = None;
        } else {
            self.finalizer = None;
            self.finalizer_mismatch = Some(TypeInfo::of::<C>());
        }
        self
    }

    #[inline]
    #[must_use]
    pub fn contract(&self) -> TypeInfo {
        self.contract
    }

    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    #[must_use]
    pub fn lifetime(&self) -> Lifetime {
        self.lifetime
    }

    #[inline]
    #[must_use]
    pub fn kind(&self) -> ImplementationKind {
        match self.implementation {
            Implementation::Type { .. } => ImplementationKind::Type,
            Implementation::Factory { .. } => ImplementationKind::Factory,
            Implementation::Instance { .. } => ImplementationKind::Instance,
        }
    }

    /// The implementation type, or the type the factory provides.
    #[inline]
    #[must_use]
    pub fn implementation_type(&self) -> TypeInfo {
        self.implementation.type_info()
    }

    #[inline]
    #[must_use]
    pub fn has_finalizer(&self) -> bool {
        self.finalizer.is_some()
    }
}

impl Debug for ServiceDescriptor {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceDescriptor")
            .field("contract", &self.contract.name)
            .field("name", &self.name)
            .field("lifetime", &self.lifetime)
            .field("kind", &self.kind())
            .field("implementation", &self.implementation_type().name)
            .field("finalizer", &self.finalizer.is_some())
            .field("finalizer_mismatch", &self.finalizer_mismatch.map(|finalizer| finalizer.name))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::{ImplementationKind, ServiceDescriptor};
    use crate::{
        any::TypeInfo,
        bootstrapper::{Bootstrapper as _, DefaultBootstrapper},
        errors::ResolveErrorKind,
        Inject, Injectable, InstantiatorResult, Lifetime,
    };

    use std::sync::Arc;
    use tracing_test::traced_test;

    trait Greeter: Send + Sync {}

    struct ConsoleGreeter;

    impl Greeter for ConsoleGreeter {}

    implements!(ConsoleGreeter => dyn Greeter);

    struct Config;

    struct Service(#[allow(dead_code)] Arc<Config>);

    impl Injectable for Service {
        type Deps = (Inject<Config>,);

        fn inject((Inject(config),): Self::Deps) -> InstantiatorResult<Self> {
            Ok(Self(config))
        }
    }

    #[test]
    fn test_descriptor_kinds() {
        let by_type = ServiceDescriptor::implementation::<Service, Service>(Lifetime::Scoped);
        let by_factory = ServiceDescriptor::factory::<dyn Greeter, _, _>(|| Ok(ConsoleGreeter), Lifetime::Transient).named("console");
        let by_instance = ServiceDescriptor::instance::<dyn Greeter, _>(ConsoleGreeter, Lifetime::Singleton);

        assert_eq!(by_type.kind(), ImplementationKind::Type);
        assert_eq!(by_type.contract(), TypeInfo::of::<Service>());
        assert_eq!(by_type.lifetime(), Lifetime::Scoped);

        assert_eq!(by_factory.kind(), ImplementationKind::Factory);
        assert_eq!(by_factory.contract(), TypeInfo::of::<dyn Greeter>());
        assert_eq!(by_factory.implementation_type(), TypeInfo::of::<ConsoleGreeter>());
        assert_eq!(by_factory.name(), "console");

        assert_eq!(by_instance.kind(), ImplementationKind::Instance);
        assert_eq!(by_instance.implementation_type(), TypeInfo::of::<ConsoleGreeter>());
    }

    #[test]
    #[traced_test]
    fn test_finalizer_contract_mismatch() {
        let descriptor = ServiceDescriptor::instance::<dyn Greeter, _>(ConsoleGreeter, Lifetime::Singleton)
            .with_finalizer(|_: Arc<ConsoleGreeter>| Ok(()));
        assert!(!descriptor.has_finalizer());

        match DefaultBootstrapper::new().register_descriptor(descriptor.clone()) {
            Err(ResolveErrorKind::FinalizerMismatch { contract, finalizer }) => {
                assert_eq!(contract, TypeInfo::of::<dyn Greeter>().name);
                assert_eq!(finalizer, TypeInfo::of::<ConsoleGreeter>().name);
            }
            _ => panic!("expected finalizer mismatch error"),
        }
        assert!(logs_contain("can't release"));

        // A matching finalizer replaces the rejected one
        let descriptor = descriptor.with_finalizer(|_: Arc<dyn Greeter>| Ok(()));
        assert!(descriptor.has_finalizer());
        assert!(DefaultBootstrapper::new().register_descriptor(descriptor).is_ok());
    }
}
