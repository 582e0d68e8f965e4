use std::{
    borrow::Cow,
    fmt::{self, Debug, Formatter},
    sync::Arc,
};

use crate::{
    any::TypeInfo,
    bootstrapper::{Bootstrapper, DefaultBootstrapper},
    descriptor::ServiceDescriptor,
    module::Module,
};

pub(crate) type ModuleConstructor = Arc<dyn Fn(&dyn Bootstrapper) -> anyhow::Result<Box<dyn Module>> + Send + Sync>;

pub(crate) type BootstrapperConstructor = fn(&[ModuleSource]) -> anyhow::Result<Arc<dyn Bootstrapper>>;

#[derive(Clone)]
pub(crate) struct ModuleExport {
    pub(crate) type_info: TypeInfo,
    pub(crate) construct: ModuleConstructor,
}

#[derive(Clone, Copy)]
pub(crate) struct BootstrapperExport {
    pub(crate) type_info: TypeInfo,
    pub(crate) construct: BootstrapperConstructor,
}

pub(crate) fn create_bootstrapper<B: Bootstrapper>(sources: &[ModuleSource]) -> anyhow::Result<Arc<dyn Bootstrapper>> {
    Ok(Arc::new(B::create(sources)?))
}

/// A named unit of discovery: the modules, bootstrappers and service descriptors one component exports.
///
/// Sources are passed to the [`crate::Manager`] in a stable order; discovery order of everything they export
/// follows it (source order first, then export order inside the source).
#[derive(Clone)]
pub struct ModuleSource {
    name: Cow<'static, str>,
    internal: bool,
    modules: Vec<ModuleExport>,
    bootstrappers: Vec<BootstrapperExport>,
    services: Vec<ServiceDescriptor>,
}

impl ModuleSource {
    #[inline]
    #[must_use]
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self {
            name: name.into(),
            internal: false,
            modules: Vec::new(),
            bootstrappers: Vec::new(),
            services: Vec::new(),
        }
    }

    /// The library's own source. It exports [`DefaultBootstrapper`], which the
    /// [`crate::BootstrapperSelector`] never picks as a candidate but falls back to.
    #[must_use]
    pub fn builtin() -> Self {
        let mut source = Self::new(env!("CARGO_PKG_NAME")).with_bootstrapper::<DefaultBootstrapper>();
        source.internal = true;
        source
    }

    /// Exports a module built with [`Default`].
    #[inline]
    #[must_use]
    pub fn with_module<M: Module + Default + 'static>(self) -> Self {
        self.with_module_fn(|_| Ok(M::default()))
    }

    /// Exports a module built by `construct`.
    /// The constructor receives the bootstrapper, so it can resolve services registered by modules loaded before.
    #[must_use]
    pub fn with_module_fn<M: Module + 'static>(
        mut self,
        construct: impl Fn(&dyn Bootstrapper) -> anyhow::Result<M> + Send + Sync + 'static,
    ) -> Self {
        self.modules.push(ModuleExport {
            type_info: TypeInfo::of::<M>(),
            construct: Arc::new(move |bootstrapper: &dyn Bootstrapper| -> anyhow::Result<Box<dyn Module>> {
                Ok(Box::new(construct(bootstrapper)?))
            }),
        });
        self
    }

    /// Exports a bootstrapper implementation, built through [`Bootstrapper::create`] if selected.
    #[inline]
    #[must_use]
    pub fn with_bootstrapper<B: Bootstrapper>(mut self) -> Self {
        self.bootstrappers.push(BootstrapperExport {
            type_info: TypeInfo::of::<B>(),
            construct: create_bootstrapper::<B>,
        });
        self
    }

    /// Exports a service descriptor, registered on demand by [`crate::BootstrapperExt::register_all`].
    #[inline]
    #[must_use]
    pub fn with_service(mut self, descriptor: ServiceDescriptor) -> Self {
        self.services.push(descriptor);
        self
    }

    /// Builds a source from everything exported to [`crate::autowired::EXPORTS`] in the final binary.
    ///
    /// Link order is unspecified, so modules, bootstrappers and services are sorted by type name.
    #[cfg(feature = "auto")]
    #[must_use]
    pub fn linked(name: impl Into<Cow<'static, str>>) -> Self {
        let mut source = crate::autowired::EXPORTS
            .iter()
            .fold(Self::new(name), |source, export| export(source));

        source.modules.sort_by_key(|export| export.type_info.name);
        source.bootstrappers.sort_by_key(|export| export.type_info.name);
        source
            .services
            .sort_by_key(|descriptor| (descriptor.contract.name, descriptor.implementation_type().name));
        source
    }

    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether the source belongs to this library.
    #[inline]
    #[must_use]
    pub fn is_internal(&self) -> bool {
        self.internal
    }

    #[inline]
    #[must_use]
    pub fn services(&self) -> &[ServiceDescriptor] {
        &self.services
    }

    #[inline]
    pub fn module_types(&self) -> impl Iterator<Item = TypeInfo> + '_ {
        self.modules.iter().map(|export| export.type_info)
    }

    #[inline]
    pub fn bootstrapper_types(&self) -> impl Iterator<Item = TypeInfo> + '_ {
        self.bootstrappers.iter().map(|export| export.type_info)
    }

    #[inline]
    pub(crate) fn modules(&self) -> &[ModuleExport] {
        &self.modules
    }

    #[inline]
    pub(crate) fn bootstrappers(&self) -> &[BootstrapperExport] {
        &self.bootstrappers
    }
}

impl Debug for ModuleSource {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModuleSource")
            .field("name", &self.name)
            .field("internal", &self.internal)
            .field("modules", &self.module_types().map(|type_info| type_info.name).collect::<Vec<_>>())
            .field(
                "bootstrappers",
                &self.bootstrapper_types().map(|type_info| type_info.name).collect::<Vec<_>>(),
            )
            .field("services", &self.services.len())
            .finish()
    }
}
