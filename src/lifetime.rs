use std::fmt::{self, Display, Formatter};

/// Policy governing instance reuse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Lifetime {
    /// A new instance for every resolution.
    Transient,
    /// One instance per [`crate::Scope`].
    Scoped,
    /// One instance for the life of the bootstrapper.
    Singleton,
}

impl Display for Lifetime {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Lifetime::Transient => "transient",
            Lifetime::Scoped => "scoped",
            Lifetime::Singleton => "singleton",
        })
    }
}
