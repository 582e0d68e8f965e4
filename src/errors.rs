mod instantiate;
mod instantiator;
mod manager;
mod resolve;

pub use instantiate::InstantiateErrorKind;
pub use instantiator::InstantiatorErrorKind;
pub use manager::ManagerErrorKind;
pub use resolve::ResolveErrorKind;

pub type InstantiatorResult<T, Err = InstantiateErrorKind> = Result<T, Err>;
