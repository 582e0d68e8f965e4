use std::any::type_name;

use crate::bootstrapper::Bootstrapper;

/// A unit of registration logic.
///
/// Modules are discovered from [`crate::ModuleSource`]s, sorted by [`Module::order`] (ascending,
/// discovery order between equal values) and loaded once against the selected bootstrapper.
pub trait Module: Send + Sync {
    /// Load order, lower loads first.
    #[inline]
    fn order(&self) -> i32 {
        0
    }

    #[inline]
    fn name(&self) -> &'static str {
        type_name::<Self>()
    }

    /// Registers the module's services.
    ///
    /// # Errors
    /// Any error aborts the manager initialization.
    fn load(&self, bootstrapper: &dyn Bootstrapper) -> anyhow::Result<()>;
}
