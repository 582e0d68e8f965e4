use super::resolve::ResolveErrorKind;

/// Error returned by a factory or an [`crate::Injectable`] constructor.
#[derive(thiserror::Error, Debug)]
pub enum InstantiateErrorKind {
    #[error(transparent)]
    Custom(#[from] anyhow::Error),
    /// A dependency resolved by hand inside the factory (through a [`crate::ServiceProvider`]) failed.
    #[error(transparent)]
    Resolve(Box<ResolveErrorKind>),
}

impl From<ResolveErrorKind> for InstantiateErrorKind {
    #[inline]
    fn from(err: ResolveErrorKind) -> Self {
        Self::Resolve(Box::new(err))
    }
}
