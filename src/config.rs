/// How the [`crate::BootstrapperSelector`] orders candidates before picking the first one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SelectionPolicy {
    /// Source enumeration order, then export order inside each source.
    #[default]
    FirstDiscovered,
    /// Stable sort by type name. Use it when the host cannot guarantee a stable source order.
    ByTypeName,
}

/// Config for a [`crate::Manager`]
/// ## Fields
/// - `selection`:
///   Ordering applied to bootstrapper candidates, see [`SelectionPolicy`].
///
/// - `include_builtin_source`:
///   If `true`, the library's own source (exporting [`crate::DefaultBootstrapper`]) is appended
///   when the host didn't pass it explicitly.
#[derive(Debug, Clone, Copy)]
pub struct Config {
    pub selection: SelectionPolicy,
    pub include_builtin_source: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            selection: SelectionPolicy::default(),
            include_builtin_source: true,
        }
    }
}
