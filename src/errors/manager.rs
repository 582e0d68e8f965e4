use super::resolve::ResolveErrorKind;

#[derive(thiserror::Error, Debug)]
pub enum ManagerErrorKind {
    #[error("Failed to create bootstrapper `{bootstrapper}`")]
    Bootstrapper {
        bootstrapper: &'static str,
        #[source]
        source: anyhow::Error,
    },
    #[error("Module `{module}` failed to load")]
    ModuleLoad {
        module: &'static str,
        #[source]
        source: anyhow::Error,
    },
    #[error("Registration failed during initialization")]
    Register(#[from] ResolveErrorKind),
}
