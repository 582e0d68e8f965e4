use std::{slice, vec};
use tracing::{debug, info_span};

use crate::{
    bootstrapper::Bootstrapper,
    contract::Implements,
    dependency_resolver::DependencyResolver,
    descriptor::ServiceDescriptor,
    errors::{InstantiateErrorKind, ResolveErrorKind},
    instantiator::{Injectable, Instantiator},
    lifetime::Lifetime,
};

/// Ordered list of service descriptors prepared by the host, applied before modules are loaded.
///
/// ```rust
/// use ioc_bootstrap::{Manager, ServiceCollection};
///
/// struct Settings {
///     debug: bool,
/// }
///
/// let services = ServiceCollection::new().add_instance::<Settings, _>(Settings { debug: true });
/// let manager = Manager::builder().services(services).build().unwrap();
///
/// assert!(manager.resolve::<Settings>().unwrap().debug);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ServiceCollection {
    descriptors: Vec<ServiceDescriptor>,
}

impl ServiceCollection {
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self { descriptors: Vec::new() }
    }

    #[inline]
    #[must_use]
    pub fn add(mut self, descriptor: ServiceDescriptor) -> Self {
        self.descriptors.push(descriptor);
        self
    }

    #[inline]
    #[must_use]
    pub fn add_singleton<C, I>(self) -> Self
    where
        C: ?Sized + Send + Sync + 'static,
        I: Injectable + Implements<C>,
    {
        self.add(ServiceDescriptor::implementation::<C, I>(Lifetime::Singleton))
    }

    #[inline]
    #[must_use]
    pub fn add_scoped<C, I>(self) -> Self
    where
        C: ?Sized + Send + Sync + 'static,
        I: Injectable + Implements<C>,
    {
        self.add(ServiceDescriptor::implementation::<C, I>(Lifetime::Scoped))
    }

    #[inline]
    #[must_use]
    pub fn add_transient<C, I>(self) -> Self
    where
        C: ?Sized + Send + Sync + 'static,
        I: Injectable + Implements<C>,
    {
        self.add(ServiceDescriptor::implementation::<C, I>(Lifetime::Transient))
    }

    #[inline]
    #[must_use]
    pub fn add_factory<C, Inst, Deps>(self, instantiator: Inst, lifetime: Lifetime) -> Self
    where
        C: ?Sized + Send + Sync + 'static,
        Inst: Instantiator<Deps, Error = InstantiateErrorKind>,
        Inst::Provides: Implements<C>,
        Deps: DependencyResolver,
    {
        self.add(ServiceDescriptor::factory::<C, Inst, Deps>(instantiator, lifetime))
    }

    /// Adds a pre-built instance, shared as a singleton.
    #[inline]
    #[must_use]
    pub fn add_instance<C, I>(self, instance: I) -> Self
    where
        C: ?Sized + Send + Sync + 'static,
        I: Implements<C>,
    {
        self.add(ServiceDescriptor::instance::<C, I>(instance, Lifetime::Singleton))
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    #[inline]
    pub fn iter(&self) -> slice::Iter<'_, ServiceDescriptor> {
        self.descriptors.iter()
    }

    /// Registers every descriptor on `bootstrapper`, in insertion order.
    /// Returns how many were registered.
    ///
    /// # Errors
    /// Returns the first registration error. Descriptors before it stay registered.
    pub fn populate(&self, bootstrapper: &dyn Bootstrapper) -> Result<usize, ResolveErrorKind> {
        let span = info_span!("populate", bootstrapper = bootstrapper.name());
        let _guard = span.enter();

        for descriptor in &self.descriptors {
            bootstrapper.register_descriptor(descriptor.clone())?;
        }

        debug!(count = self.descriptors.len(), "Services populated");
        Ok(self.descriptors.len())
    }
}

impl FromIterator<ServiceDescriptor> for ServiceCollection {
    fn from_iter<T: IntoIterator<Item = ServiceDescriptor>>(iter: T) -> Self {
        Self {
            descriptors: iter.into_iter().collect(),
        }
    }
}

impl Extend<ServiceDescriptor> for ServiceCollection {
    fn extend<T: IntoIterator<Item = ServiceDescriptor>>(&mut self, iter: T) {
        self.descriptors.extend(iter);
    }
}

impl IntoIterator for ServiceCollection {
    type Item = ServiceDescriptor;
    type IntoIter = vec::IntoIter<ServiceDescriptor>;

    fn into_iter(self) -> Self::IntoIter {
        self.descriptors.into_iter()
    }
}

impl<'a> IntoIterator for &'a ServiceCollection {
    type Item = &'a ServiceDescriptor;
    type IntoIter = slice::Iter<'a, ServiceDescriptor>;

    fn into_iter(self) -> Self::IntoIter {
        self.descriptors.iter()
    }
}
