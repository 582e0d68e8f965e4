use parking_lot::Mutex;
use std::{
    fmt::{self, Debug, Display, Formatter},
    sync::Arc,
};
use tracing::{debug, info_span, warn};

use crate::{
    bootstrapper::{Bootstrapper, BootstrapperExt as _},
    collection::ServiceCollection,
    config::Config,
    errors::{ManagerErrorKind, ResolveErrorKind},
    lifetime::Lifetime,
    loader::ModuleLoader,
    provider::ServiceProvider,
    scope::Scope,
    selector::BootstrapperSelector,
    source::ModuleSource,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManagerState {
    Uninitialized,
    Initializing,
    Ready,
    Disposed,
}

impl Display for ManagerState {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Uninitialized => "uninitialized",
            Self::Initializing => "initializing",
            Self::Ready => "ready",
            Self::Disposed => "disposed",
        })
    }
}

/// Builder for a [`Manager`] with host services and a non-default [`Config`].
#[derive(Debug, Default)]
pub struct ManagerBuilder {
    sources: Vec<ModuleSource>,
    services: ServiceCollection,
    config: Config,
}

impl ManagerBuilder {
    #[inline]
    #[must_use]
    pub fn source(mut self, source: ModuleSource) -> Self {
        self.sources.push(source);
        self
    }

    #[inline]
    #[must_use]
    pub fn sources(mut self, sources: impl IntoIterator<Item = ModuleSource>) -> Self {
        self.sources.extend(sources);
        self
    }

    /// Services registered after the [`ServiceProvider`] and before any module is loaded.
    #[inline]
    #[must_use]
    pub fn services(mut self, services: ServiceCollection) -> Self {
        self.services.extend(services);
        self
    }

    #[inline]
    #[must_use]
    pub fn config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    /// Selects the bootstrapper, registers the [`ServiceProvider`] and the host services and loads the modules.
    ///
    /// # Errors
    /// Returns the first failure. The bootstrapper created so far is disposed, nothing is kept.
    pub fn build(self) -> Result<Manager, ManagerErrorKind> {
        let Self {
            mut sources,
            services,
            config,
        } = self;

        let span = info_span!("manager_init", sources = sources.len());
        let _guard = span.enter();

        debug!(state = %ManagerState::Initializing);

        if config.include_builtin_source && !sources.iter().any(ModuleSource::is_internal) {
            sources.push(ModuleSource::builtin());
        }

        let bootstrapper = BootstrapperSelector::new(config.selection).select(&sources)?;
        let modules = match initialize(&bootstrapper, &sources, &services) {
            Ok(modules) => modules,
            Err(err) => {
                bootstrapper.dispose();
                debug!(state = %ManagerState::Uninitialized, "Initialization failed");
                return Err(err);
            }
        };

        debug!(state = %ManagerState::Ready, bootstrapper = bootstrapper.name(), modules = modules.len());

        Ok(Manager {
            bootstrapper,
            sources,
            modules,
            state: Mutex::new(ManagerState::Ready),
        })
    }
}

fn initialize(
    bootstrapper: &Arc<dyn Bootstrapper>,
    sources: &[ModuleSource],
    services: &ServiceCollection,
) -> Result<Vec<&'static str>, ManagerErrorKind> {
    bootstrapper.register_instance::<ServiceProvider, _>(ServiceProvider::new(bootstrapper), Lifetime::Singleton)?;
    services.populate(&**bootstrapper)?;
    ModuleLoader::load(sources, &**bootstrapper)
}

/// Entry point: owns the selected bootstrapper and exposes resolution to the application.
///
/// Call [`Manager::dispose`] at shutdown. Dropping an undisposed manager disposes it too, with a warning.
pub struct Manager {
    bootstrapper: Arc<dyn Bootstrapper>,
    sources: Vec<ModuleSource>,
    modules: Vec<&'static str>,
    state: Mutex<ManagerState>,
}

impl Manager {
    /// Builds a manager over `sources` with the default config.
    ///
    /// # Errors
    /// See [`ManagerBuilder::build`].
    #[inline]
    pub fn new(sources: impl IntoIterator<Item = ModuleSource>) -> Result<Self, ManagerErrorKind> {
        Self::builder().sources(sources).build()
    }

    #[inline]
    #[must_use]
    pub fn builder() -> ManagerBuilder {
        ManagerBuilder::default()
    }

    #[inline]
    #[must_use]
    pub fn bootstrapper(&self) -> &Arc<dyn Bootstrapper> {
        &self.bootstrapper
    }

    #[allow(clippy::missing_errors_doc)]
    #[inline]
    pub fn resolve<C: ?Sized + Send + Sync + 'static>(&self) -> Result<Arc<C>, ResolveErrorKind> {
        self.bootstrapper.resolve()
    }

    #[allow(clippy::missing_errors_doc)]
    #[inline]
    pub fn resolve_named<C: ?Sized + Send + Sync + 'static>(&self, name: &str) -> Result<Arc<C>, ResolveErrorKind> {
        self.bootstrapper.resolve_named(name)
    }

    #[allow(clippy::missing_errors_doc)]
    #[inline]
    pub fn resolve_all<C: ?Sized + Send + Sync + 'static>(&self) -> Result<Vec<Arc<C>>, ResolveErrorKind> {
        self.bootstrapper.resolve_all()
    }

    /// Opens a scope for scoped registrations.
    ///
    /// # Errors
    /// Returns [`ResolveErrorKind::Disposed`] after [`Manager::dispose`].
    #[inline]
    pub fn scope(&self) -> Result<Scope<'_>, ResolveErrorKind> {
        Scope::enter(&*self.bootstrapper)
    }

    /// Name of the selected bootstrapper.
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        self.bootstrapper.name()
    }

    /// Names of the loaded modules, in load order.
    #[inline]
    #[must_use]
    pub fn modules(&self) -> &[&'static str] {
        &self.modules
    }

    #[inline]
    #[must_use]
    pub fn sources(&self) -> &[ModuleSource] {
        &self.sources
    }

    #[inline]
    #[must_use]
    pub fn state(&self) -> ManagerState {
        *self.state.lock()
    }

    /// Disposes the bootstrapper, calling the finalizers of cached instances.
    ///
    /// # Warning
    /// Only the first call does anything. Resolution fails with [`ResolveErrorKind::Disposed`] afterwards.
    pub fn dispose(&self) {
        {
            let mut state = self.state.lock();
            if *state == ManagerState::Disposed {
                debug!("Manager already disposed");
                return;
            }
            *state = ManagerState::Disposed;
        }

        self.bootstrapper.dispose();
        debug!(bootstrapper = self.bootstrapper.name(), "Manager disposed");
    }
}

impl Display for Manager {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Debug for Manager {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Manager")
            .field("bootstrapper", &self.name())
            .field("sources", &self.sources.iter().map(ModuleSource::name).collect::<Vec<_>>())
            .field("modules", &self.modules)
            .field("state", &self.state())
            .finish()
    }
}

impl Drop for Manager {
    fn drop(&mut self) {
        if *self.state.get_mut() != ManagerState::Disposed {
            warn!(bootstrapper = self.bootstrapper.name(), "Manager dropped without being disposed");
            self.dispose();
        }
    }
}
