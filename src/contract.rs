use std::sync::Arc;

/// Conversion of a shared implementation into the contract it is registered under.
///
/// Every type implements it for itself. Implementations for trait objects are usually written
/// with [`crate::implements!`].
pub trait Implements<C: ?Sized>: Send + Sync + 'static {
    fn upcast(self: Arc<Self>) -> Arc<C>;
}

impl<T: Send + Sync + 'static> Implements<T> for T {
    #[inline]
    fn upcast(self: Arc<Self>) -> Arc<T> {
        self
    }
}
