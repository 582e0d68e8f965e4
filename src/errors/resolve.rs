use super::{instantiate::InstantiateErrorKind, instantiator::InstantiatorErrorKind};

#[derive(thiserror::Error, Debug)]
pub enum ResolveErrorKind {
    #[error("No registration found for `{contract}` (name: {name:?})")]
    Unresolved { contract: &'static str, name: String },
    #[error("Scoped registration `{contract}` requested outside of an active scope")]
    NoScope { contract: &'static str },
    #[error("Incorrect instance type stored for `{expected}`")]
    IncorrectType { expected: &'static str },
    #[error("Finalizer for `{finalizer}` can't release `{contract}`")]
    FinalizerMismatch { contract: &'static str, finalizer: &'static str },
    #[error("Cyclic dependency detected: {path}")]
    CyclicDependency { path: String },
    #[error(transparent)]
    Instantiator(InstantiatorErrorKind<Box<ResolveErrorKind>, InstantiateErrorKind>),
    #[error("Bootstrapper has been disposed")]
    Disposed,
}

impl ResolveErrorKind {
    /// Walks through nested dependency failures and returns the error that started the chain.
    #[must_use]
    pub fn root(&self) -> &ResolveErrorKind {
        match self {
            Self::Instantiator(InstantiatorErrorKind::Deps(err))
            | Self::Instantiator(InstantiatorErrorKind::Factory(InstantiateErrorKind::Resolve(err))) => err.root(),
            _ => self,
        }
    }

    #[inline]
    #[must_use]
    pub fn is_unresolved(&self) -> bool {
        matches!(self.root(), Self::Unresolved { .. })
    }

    #[inline]
    #[must_use]
    pub fn is_disposed(&self) -> bool {
        matches!(self.root(), Self::Disposed)
    }
}
