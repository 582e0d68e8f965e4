use std::{marker::PhantomData, sync::Arc};
use tracing::debug;

use super::{
    dependency_resolver::DependencyResolver,
    errors::{InstantiateErrorKind, InstantiatorErrorKind, ResolveErrorKind},
};
use crate::{any::AnyInstance, contract::Implements, resolver::Resolver};

pub trait Instantiator<Deps>: Clone + Send + Sync + 'static
where
    Deps: DependencyResolver,
{
    type Provides: Send + Sync + 'static;
    type Error: Into<InstantiateErrorKind>;

    fn instantiate(&mut self, dependencies: Deps) -> Result<Self::Provides, Self::Error>;
}

/// A concrete implementation type the container knows how to build.
///
/// `Deps` lists what the constructor needs; the container resolves them first,
/// so a missing dependency fails the whole construction.
///
/// ```rust
/// use ioc_bootstrap::{Inject, Injectable, InstantiatorResult};
/// use std::sync::Arc;
///
/// struct Config {
///     url: &'static str,
/// }
///
/// struct Database {
///     config: Arc<Config>,
/// }
///
/// impl Injectable for Database {
///     type Deps = (Inject<Config>,);
///
///     fn inject((Inject(config),): Self::Deps) -> InstantiatorResult<Self> {
///         Ok(Self { config })
///     }
/// }
/// ```
pub trait Injectable: Sized + Send + Sync + 'static {
    type Deps: DependencyResolver;

    #[allow(clippy::missing_errors_doc)]
    fn inject(dependencies: Self::Deps) -> Result<Self, InstantiateErrorKind>;
}

pub(crate) struct InjectableInstantiator<I>(PhantomData<fn() -> I>);

impl<I> InjectableInstantiator<I> {
    #[inline]
    #[must_use]
    pub(crate) const fn new() -> Self {
        Self(PhantomData)
    }
}

impl<I> Clone for InjectableInstantiator<I> {
    #[inline]
    fn clone(&self) -> Self {
        Self::new()
    }
}

impl<I: Injectable> Instantiator<I::Deps> for InjectableInstantiator<I> {
    type Provides = I;
    type Error = InstantiateErrorKind;

    #[inline]
    fn instantiate(&mut self, dependencies: I::Deps) -> Result<Self::Provides, Self::Error> {
        I::inject(dependencies)
    }
}

pub(crate) type BoxedInstantiatorError = InstantiatorErrorKind<ResolveErrorKind, InstantiateErrorKind>;

pub(crate) type BoxedInstantiator = Arc<dyn Fn(&Resolver<'_>) -> Result<AnyInstance, BoxedInstantiatorError> + Send + Sync>;

/// Erases an instantiator into a closure that resolves its dependencies, builds the value
/// and stores it as `Arc<C>` inside an [`AnyInstance`].
#[must_use]
pub(crate) fn boxed_instantiator<C, Inst, Deps>(instantiator: Inst) -> BoxedInstantiator
where
    C: ?Sized + Send + Sync + 'static,
    Inst: Instantiator<Deps>,
    Inst::Provides: Implements<C>,
    Deps: DependencyResolver,
{
    Arc::new(move |resolver: &Resolver<'_>| -> Result<AnyInstance, BoxedInstantiatorError> {
        let dependencies = match Deps::resolve(resolver) {
            Ok(dependencies) => dependencies,
            Err(err) => return Err(InstantiatorErrorKind::Deps(err.into())),
        };
        let provides = match instantiator.clone().instantiate(dependencies) {
            Ok(provides) => provides,
            Err(err) => return Err(InstantiatorErrorKind::Factory(err.into())),
        };

        debug!("Instantiated");

        let contract: Arc<C> = Implements::<C>::upcast(Arc::new(provides));
        Ok(Arc::new(contract) as AnyInstance)
    })
}

macro_rules! impl_instantiator {
    (
        [$($ty:ident),*]
    ) => {
        #[allow(non_snake_case)]
        impl<F, Response, Err, $($ty,)*> Instantiator<($($ty,)*)> for F
        where
            F: FnMut($($ty,)*) -> Result<Response, Err> + Clone + Send + Sync + 'static,
            Response: Send + Sync + 'static,
            Err: Into<InstantiateErrorKind>,
            $( $ty: DependencyResolver, )*
        {
            type Provides = Response;
            type Error = Err;

            fn instantiate(&mut self, ($($ty,)*): ($($ty,)*)) -> Result<Self::Provides, Self::Error> {
                self($($ty,)*)
            }
        }
    };
}

all_the_tuples!(impl_instantiator);

#[cfg(test)]
mod tests {
    use super::{boxed_instantiator, DependencyResolver, InstantiateErrorKind, Instantiator};
    use crate::{
        bootstrapper::{BootstrapperExt as _, DefaultBootstrapper},
        errors::InstantiatorErrorKind,
        inject::Inject,
        resolver::Resolver,
        Lifetime, ResolveErrorKind,
    };

    use std::sync::{
        atomic::{AtomicU8, Ordering},
        Arc,
    };
    use tracing::debug;
    use tracing_test::traced_test;

    struct Request(bool);
    struct Response(bool);

    #[test]
    #[allow(dead_code)]
    fn test_factory_helper() {
        fn resolver<Deps: DependencyResolver, F: Instantiator<Deps>>(_f: F) {}
        fn resolver_with_dep<Deps: DependencyResolver>() {
            resolver(|| Ok::<_, InstantiateErrorKind>(()));
        }
    }

    #[test]
    #[traced_test]
    fn test_boxed_instantiator() {
        let instantiator_request_call_count = Arc::new(AtomicU8::new(0));
        let instantiator_response_call_count = Arc::new(AtomicU8::new(0));

        let bootstrapper = DefaultBootstrapper::new();
        bootstrapper
            .register_factory::<Request, _, _>(
                {
                    let instantiator_request_call_count = instantiator_request_call_count.clone();
                    move || {
                        instantiator_request_call_count.fetch_add(1, Ordering::SeqCst);

                        debug!("Call instantiator request");
                        Ok(Request(true))
                    }
                },
                Lifetime::Singleton,
            )
            .unwrap();

        let instantiator_response = boxed_instantiator::<Response, _, _>({
            let instantiator_response_call_count = instantiator_response_call_count.clone();
            move |Inject(request_1): Inject<Request>, Inject(request_2): Inject<Request>| {
                assert_eq!(request_1.0, request_2.0);

                instantiator_response_call_count.fetch_add(1, Ordering::SeqCst);

                debug!("Call instantiator response");
                Ok::<_, InstantiateErrorKind>(Response(request_1.0))
            }
        });

        let resolver = Resolver::new(&bootstrapper, None);
        let response_1 = instantiator_response(&resolver).unwrap();
        let response_2 = instantiator_response(&resolver).unwrap();

        assert!(response_1.downcast_ref::<Arc<Response>>().unwrap().0);
        assert!(response_2.downcast_ref::<Arc<Response>>().unwrap().0);
        assert_eq!(instantiator_request_call_count.load(Ordering::SeqCst), 1);
        // Provides of the outer factory aren't cached here, caching is the bootstrapper's job
        assert_eq!(instantiator_response_call_count.load(Ordering::SeqCst), 2);
    }

    #[test]
    #[traced_test]
    fn test_boxed_instantiator_missing_dependency() {
        let bootstrapper = DefaultBootstrapper::new();
        let instantiator = boxed_instantiator::<Response, _, _>(|Inject(request): Inject<Request>| {
            Ok::<_, InstantiateErrorKind>(Response(request.0))
        });

        let resolver = Resolver::new(&bootstrapper, None);
        assert!(matches!(
            instantiator(&resolver),
            Err(InstantiatorErrorKind::Deps(ResolveErrorKind::Unresolved { .. }))
        ));
    }
}
