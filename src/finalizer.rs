use std::{any::type_name, sync::Arc};

use crate::any::AnyInstance;

pub(crate) type BoxedFinalizer = Arc<dyn Fn(AnyInstance) -> anyhow::Result<()> + Send + Sync>;

#[must_use]
pub(crate) fn boxed_finalizer<C, Fin>(finalizer: Fin) -> BoxedFinalizer
where
    C: ?Sized + Send + Sync + 'static,
    Fin: Fn(Arc<C>) -> anyhow::Result<()> + Send + Sync + 'static,
{
    Arc::new(move |instance: AnyInstance| {
        let Some(instance) = instance.downcast_ref::<Arc<C>>() else {
            anyhow::bail!("Failed to downcast value in finalizer for `{}`", type_name::<C>());
        };
        finalizer(instance.clone())
    })
}
