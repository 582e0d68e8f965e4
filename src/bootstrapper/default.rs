use parking_lot::{Mutex, RwLock};
use std::{
    collections::{BTreeMap, BTreeSet},
    fmt::{self, Debug, Formatter},
    mem,
    sync::{
        atomic::{AtomicBool, AtomicU64, Ordering},
        Arc,
    },
};
use tracing::{debug, error, info_span, warn};

use super::Bootstrapper;
use crate::{
    any::{AnyInstance, Key, TypeInfo},
    cache::{Resolved, ResolvedSet, ScopedCache, Slot},
    descriptor::{Implementation, ServiceDescriptor},
    errors::{InstantiatorErrorKind, ResolveErrorKind},
    finalizer::BoxedFinalizer,
    guard::ResolutionGuard,
    lifetime::Lifetime,
    resolver::Resolver,
    scope::ScopeId,
    source::ModuleSource,
};

struct Registration {
    key: Key,
    lifetime: Lifetime,
    implementation: Implementation,
    finalizer: Option<BoxedFinalizer>,
    singleton: Slot,
    sequence: u64,
}

/// Built-in [`Bootstrapper`], used when no module source exports another one.
pub struct DefaultBootstrapper {
    exports: Vec<ServiceDescriptor>,
    registry: RwLock<BTreeMap<Key, Arc<Registration>>>,
    scopes: Mutex<ScopedCache>,
    resolved: Mutex<ResolvedSet>,
    next_scope: AtomicU64,
    sequence: AtomicU64,
    disposed: AtomicBool,
}

impl DefaultBootstrapper {
    const NAME: &'static str = "DefaultBootstrapper";

    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::with_exports(Vec::new())
    }

    /// Creates a bootstrapper whose [`crate::BootstrapperExt::register_all`] picks from `exports`.
    #[must_use]
    pub fn with_exports(exports: Vec<ServiceDescriptor>) -> Self {
        Self {
            exports,
            registry: RwLock::new(BTreeMap::new()),
            scopes: Mutex::new(ScopedCache::default()),
            resolved: Mutex::new(ResolvedSet::default()),
            next_scope: AtomicU64::new(1),
            sequence: AtomicU64::new(0),
            disposed: AtomicBool::new(false),
        }
    }

    /// Number of registrations.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.registry.read().len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn ensure_alive(&self) -> Result<(), ResolveErrorKind> {
        if self.disposed.load(Ordering::Acquire) {
            let err = ResolveErrorKind::Disposed;
            error!("{}", err);
            return Err(err);
        }
        Ok(())
    }

    fn resolve_registration(&self, registration: &Arc<Registration>, scope: Option<ScopeId>) -> Result<AnyInstance, ResolveErrorKind> {
        if let Implementation::Instance { instance, .. } = &registration.implementation {
            debug!("Instance registration");
            return Ok(instance.clone());
        }

        // Entered before any slot is locked, so a cycle is reported instead of blocking on its own slot
        let _guard = ResolutionGuard::enter(Arc::as_ptr(registration) as usize, registration.key.contract.name).map_err(|err| {
            error!("{}", err);
            err
        })?;

        match registration.lifetime {
            Lifetime::Transient => self.construct(registration, scope),
            Lifetime::Singleton => self.get_or_construct(registration, &registration.singleton, None),
            Lifetime::Scoped => {
                let slot = scope.and_then(|scope| self.scopes.lock().slot(scope, &registration.key));
                let (Some(scope), Some(slot)) = (scope, slot) else {
                    let err = ResolveErrorKind::NoScope {
                        contract: registration.key.contract.name,
                    };
                    error!("{}", err);
                    return Err(err);
                };
                self.get_or_construct(registration, &slot, Some(scope))
            }
        }
    }

    fn get_or_construct(&self, registration: &Registration, slot: &Slot, scope: Option<ScopeId>) -> Result<AnyInstance, ResolveErrorKind> {
        let mut cached = slot.lock();
        if let Some(instance) = cached.as_ref() {
            debug!("Found in cache");
            return Ok(instance.clone());
        }
        debug!("Not found in cache");

        let instance = self.construct(registration, scope)?;

        // Disposal drains the resolved set under the same lock, so it either releases this instance or is seen here
        let mut resolved = self.resolved.lock();
        if let Err(err) = self.ensure_alive() {
            drop(resolved);
            if let Some(finalizer) = &registration.finalizer {
                Self::finalize(Resolved {
                    key: registration.key.clone(),
                    scope,
                    instance,
                    finalizer: finalizer.clone(),
                });
            }
            return Err(err);
        }

        *cached = Some(instance.clone());
        debug!("Cached");

        if let Some(finalizer) = &registration.finalizer {
            resolved.push(Resolved {
                key: registration.key.clone(),
                scope,
                instance: instance.clone(),
                finalizer: finalizer.clone(),
            });
            debug!("Pushed to resolved set");
        }
        Ok(instance)
    }

    fn construct(&self, registration: &Registration, scope: Option<ScopeId>) -> Result<AnyInstance, ResolveErrorKind> {
        let instantiator = match &registration.implementation {
            Implementation::Type { instantiator, .. } | Implementation::Factory { instantiator, .. } => instantiator,
            Implementation::Instance { instance, .. } => return Ok(instance.clone()),
        };

        match instantiator(&Resolver::new(self, scope)) {
            Ok(instance) => Ok(instance),
            Err(InstantiatorErrorKind::Deps(err)) => {
                error!("{}", err);
                Err(ResolveErrorKind::Instantiator(InstantiatorErrorKind::Deps(Box::new(err))))
            }
            Err(InstantiatorErrorKind::Factory(err)) => {
                error!("{}", err);
                Err(ResolveErrorKind::Instantiator(InstantiatorErrorKind::Factory(err)))
            }
        }
    }

    fn finalize(resolved: Resolved) {
        let Resolved {
            key, instance, finalizer, ..
        } = resolved;
        match finalizer(instance) {
            Ok(()) => debug!(%key, "Finalizer called"),
            Err(err) => error!(%key, "Finalizer failed: {:#}", err),
        }
    }
}

impl Default for DefaultBootstrapper {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl Bootstrapper for DefaultBootstrapper {
    fn create(sources: &[ModuleSource]) -> anyhow::Result<Self> {
        Ok(Self::with_exports(
            sources.iter().flat_map(|source| source.services().iter().cloned()).collect(),
        ))
    }

    #[inline]
    fn name(&self) -> &str {
        Self::NAME
    }

    fn register_descriptor(&self, descriptor: ServiceDescriptor) -> Result<(), ResolveErrorKind> {
        self.ensure_alive()?;

        let ServiceDescriptor {
            contract,
            name,
            lifetime,
            implementation,
            finalizer,
            finalizer_mismatch,
        } = descriptor;

        if let Some(finalizer) = finalizer_mismatch {
            let err = ResolveErrorKind::FinalizerMismatch {
                contract: contract.name,
                finalizer: finalizer.name,
            };
            error!("{}", err);
            return Err(err);
        }

        let key = Key { contract, name };

        if let (Implementation::Instance { instance, .. }, Some(finalizer)) = (&implementation, &finalizer) {
            let mut resolved = self.resolved.lock();
            self.ensure_alive()?;

            // The same instance may come from several descriptors, it's released once
            if resolved.contains(instance) {
                debug!(%key, "Instance already in resolved set");
            } else {
                resolved.push(Resolved {
                    key: key.clone(),
                    scope: None,
                    instance: instance.clone(),
                    finalizer: finalizer.clone(),
                });
            }
        }

        let registration = Arc::new(Registration {
            key: key.clone(),
            lifetime,
            implementation,
            finalizer,
            singleton: Mutex::new(None),
            sequence: self.sequence.fetch_add(1, Ordering::Relaxed),
        });

        let replaced = self.registry.write().insert(key.clone(), registration);
        if replaced.is_some() {
            warn!(%key, %lifetime, "Registration overwritten");
        } else {
            debug!(%key, %lifetime, "Registered");
        }
        Ok(())
    }

    fn register_all_erased(&self, contract: TypeInfo) -> Result<usize, ResolveErrorKind> {
        let span = info_span!("register_all", contract = contract.name);
        let _guard = span.enter();

        let mut names = BTreeSet::new();
        for descriptor in self.exports.iter().filter(|descriptor| descriptor.contract == contract) {
            let descriptor = if descriptor.name.is_empty() {
                descriptor.clone().named(descriptor.implementation_type().name)
            } else {
                descriptor.clone()
            };
            names.insert(descriptor.name.clone());
            self.register_descriptor(descriptor)?;
        }

        // Exports sharing a name replace each other
        let count = names.len();
        debug!(count, "Exports registered");
        Ok(count)
    }

    fn resolve_erased(&self, key: &Key, scope: Option<ScopeId>) -> Result<AnyInstance, ResolveErrorKind> {
        let span = info_span!("resolve", contract = key.contract.name, name = key.name.as_str());
        let _guard = span.enter();

        self.ensure_alive()?;

        let Some(registration) = self.registry.read().get(key).cloned() else {
            let err = ResolveErrorKind::Unresolved {
                contract: key.contract.name,
                name: key.name.clone(),
            };
            error!("{}", err);
            return Err(err);
        };

        self.resolve_registration(&registration, scope)
    }

    fn resolve_all_erased(&self, contract: TypeInfo, scope: Option<ScopeId>) -> Result<Vec<AnyInstance>, ResolveErrorKind> {
        let span = info_span!("resolve_all", contract = contract.name);
        let _guard = span.enter();

        self.ensure_alive()?;

        let mut registrations = self
            .registry
            .read()
            .values()
            .filter(|registration| registration.key.contract == contract)
            .cloned()
            .collect::<Vec<_>>();
        registrations.sort_by_key(|registration| registration.sequence);

        debug!(count = registrations.len(), "Registrations found");

        registrations
            .iter()
            .map(|registration| self.resolve_registration(registration, scope))
            .collect()
    }

    fn begin_scope(&self) -> Result<ScopeId, ResolveErrorKind> {
        self.ensure_alive()?;

        let scope = ScopeId(self.next_scope.fetch_add(1, Ordering::Relaxed));
        self.scopes.lock().open(scope);
        Ok(scope)
    }

    fn end_scope(&self, scope: ScopeId) {
        if !self.scopes.lock().close(scope) {
            return;
        }

        let mut resolved = self.resolved.lock().take_scope(scope);
        while let Some(resolved) = resolved.pop() {
            Self::finalize(resolved);
        }
        debug!(%scope, "Scope ended");
    }

    fn dispose(&self) {
        if self.disposed.swap(true, Ordering::AcqRel) {
            debug!("Already disposed");
            return;
        }

        let span = info_span!("dispose", bootstrapper = Self::NAME);
        let _guard = span.enter();

        let mut resolved = mem::take(&mut *self.resolved.lock());
        debug!(count = resolved.len(), "Releasing resolved instances");
        while let Some(resolved) = resolved.pop() {
            Self::finalize(resolved);
        }

        // Instances are dropped outside of the locks
        let scopes = mem::take(&mut *self.scopes.lock());
        let registry = mem::take(&mut *self.registry.write());
        debug!(open_scopes = scopes.len(), registrations = registry.len(), "Clearing registry");
        drop(scopes);
        drop(registry);

        debug!("Disposed");
    }

    #[inline]
    fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::Acquire)
    }
}

impl Debug for DefaultBootstrapper {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct(Self::NAME)
            .field("registrations", &self.len())
            .field("exports", &self.exports.len())
            .field("disposed", &self.is_disposed())
            .finish_non_exhaustive()
    }
}

impl Drop for DefaultBootstrapper {
    fn drop(&mut self) {
        self.dispose();
    }
}
