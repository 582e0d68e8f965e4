use std::sync::Arc;
use tracing::{debug, error, info_span};

use crate::{
    any::TypeInfo,
    bootstrapper::{Bootstrapper, DefaultBootstrapper},
    config::SelectionPolicy,
    errors::ManagerErrorKind,
    source::{create_bootstrapper, BootstrapperConstructor, BootstrapperExport, ModuleSource},
};

/// Picks the bootstrapper implementation a [`crate::Manager`] runs with.
///
/// Candidates are the bootstrappers exported by non-internal sources, in discovery order
/// (or by type name with [`SelectionPolicy::ByTypeName`]). The first candidate wins;
/// several candidates are not an error. Without candidates, [`DefaultBootstrapper`] is used.
#[derive(Debug, Clone, Copy, Default)]
pub struct BootstrapperSelector {
    policy: SelectionPolicy,
}

impl BootstrapperSelector {
    #[inline]
    #[must_use]
    pub const fn new(policy: SelectionPolicy) -> Self {
        Self { policy }
    }

    fn candidates(&self, sources: &[ModuleSource]) -> Vec<BootstrapperExport> {
        let mut candidates = sources
            .iter()
            .filter(|source| !source.is_internal())
            .flat_map(|source| source.bootstrappers().iter().copied())
            .collect::<Vec<_>>();
        if self.policy == SelectionPolicy::ByTypeName {
            candidates.sort_by_key(|candidate| candidate.type_info.name);
        }
        candidates
    }

    /// Type of the bootstrapper [`Self::select`] would create.
    #[must_use]
    pub fn selected_type(&self, sources: &[ModuleSource]) -> TypeInfo {
        self.candidates(sources)
            .first()
            .map_or_else(TypeInfo::of::<DefaultBootstrapper>, |candidate| candidate.type_info)
    }

    /// Creates the selected bootstrapper.
    ///
    /// # Errors
    /// Returns [`ManagerErrorKind::Bootstrapper`] if its constructor fails.
    pub fn select(&self, sources: &[ModuleSource]) -> Result<Arc<dyn Bootstrapper>, ManagerErrorKind> {
        let span = info_span!("select_bootstrapper", policy = ?self.policy);
        let _guard = span.enter();

        let candidates = self.candidates(sources);
        if candidates.len() > 1 {
            debug!(
                candidates = ?candidates.iter().map(|candidate| candidate.type_info.name).collect::<Vec<_>>(),
                "Several bootstrappers exported, the first one is used"
            );
        }

        let (type_info, construct) = match candidates.first() {
            Some(candidate) => {
                debug!(bootstrapper = candidate.type_info.name, "Bootstrapper selected");
                (candidate.type_info, candidate.construct)
            }
            None => {
                debug!("No bootstrapper exported, default is used");
                let construct: BootstrapperConstructor = create_bootstrapper::<DefaultBootstrapper>;
                (TypeInfo::of::<DefaultBootstrapper>(), construct)
            }
        };

        construct(sources).map_err(|source| {
            error!(bootstrapper = type_info.name, "Failed to create bootstrapper: {:#}", source);
            ManagerErrorKind::Bootstrapper {
                bootstrapper: type_info.name,
                source,
            }
        })
    }
}
