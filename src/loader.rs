use tracing::{debug, error, info_span};

use crate::{bootstrapper::Bootstrapper, errors::ManagerErrorKind, source::ModuleSource};

/// Discovers the modules exported by the sources and loads them against a bootstrapper.
pub struct ModuleLoader;

impl ModuleLoader {
    /// Instantiates every exported module, stable-sorts them by [`Module::order`]
    /// and calls [`Module::load`] on each in turn.
    ///
    /// Returns the names of the loaded modules, in load order.
    ///
    /// # Errors
    /// Returns [`ManagerErrorKind::ModuleLoad`] for the first module that fails to be built or loaded.
    /// Modules after it are not loaded.
    pub fn load(sources: &[ModuleSource], bootstrapper: &dyn Bootstrapper) -> Result<Vec<&'static str>, ManagerErrorKind> {
        let span = info_span!("load_modules", bootstrapper = bootstrapper.name());
        let _guard = span.enter();

        let mut modules = Vec::new();
        for export in sources.iter().flat_map(ModuleSource::modules) {
            match (export.construct)(bootstrapper) {
                Ok(module) => modules.push(module),
                Err(source) => {
                    error!(module = export.type_info.name, "Failed to build module: {:#}", source);
                    return Err(ManagerErrorKind::ModuleLoad {
                        module: export.type_info.name,
                        source,
                    });
                }
            }
        }

        // Stable, so modules with the same order keep their discovery order
        modules.sort_by_key(|module| module.order());
        debug!(count = modules.len(), "Modules discovered");

        let mut loaded = Vec::with_capacity(modules.len());
        for module in modules {
            let name = module.name();
            if let Err(source) = module.load(bootstrapper) {
                error!(module = name, "Failed to load module: {:#}", source);
                return Err(ManagerErrorKind::ModuleLoad { module: name, source });
            }
            debug!(module = name, order = module.order(), "Module loaded");
            loaded.push(name);
        }
        Ok(loaded)
    }
}
