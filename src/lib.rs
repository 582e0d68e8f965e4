//! Module-driven IoC bootstrapping.
//!
//! A [`Manager`] is built over an ordered list of [`ModuleSource`]s. It selects one [`Bootstrapper`]
//! (the DI container implementation), registers a [`ServiceProvider`] for itself, runs every discovered
//! [`Module`] in ascending [`Module::order`] and is then ready to resolve services.
//!
//! ```
//! use ioc_bootstrap::{implements, Bootstrapper, BootstrapperExt as _, Lifetime, Manager, Module, ModuleSource};
//!
//! trait Greeter: Send + Sync {
//!     fn greet(&self) -> String;
//! }
//!
//! struct ConsoleGreeter;
//!
//! impl Greeter for ConsoleGreeter {
//!     fn greet(&self) -> String {
//!         "Hello!".to_owned()
//!     }
//! }
//!
//! implements!(ConsoleGreeter => dyn Greeter);
//!
//! #[derive(Default)]
//! struct GreeterModule;
//!
//! impl Module for GreeterModule {
//!     fn load(&self, bootstrapper: &dyn Bootstrapper) -> anyhow::Result<()> {
//!         bootstrapper.register_factory::<dyn Greeter, _, _>(|| Ok(ConsoleGreeter), Lifetime::Singleton)?;
//!         Ok(())
//!     }
//! }
//!
//! let manager = Manager::new([ModuleSource::new("app").with_module::<GreeterModule>()]).unwrap();
//! let greeter = manager.resolve::<dyn Greeter>().unwrap();
//! assert_eq!(greeter.greet(), "Hello!");
//! manager.dispose();
//! ```

#[macro_use]
pub(crate) mod macros;

pub(crate) mod any;
pub(crate) mod bootstrapper;
pub(crate) mod cache;
pub(crate) mod collection;
pub(crate) mod config;
pub(crate) mod contract;
pub(crate) mod dependency_resolver;
pub(crate) mod descriptor;
pub(crate) mod errors;
pub(crate) mod finalizer;
pub(crate) mod guard;
pub(crate) mod inject;
pub(crate) mod instantiator;
pub(crate) mod lifetime;
pub(crate) mod loader;
pub(crate) mod manager;
pub(crate) mod module;
pub(crate) mod provider;
pub(crate) mod resolver;
pub(crate) mod scope;
pub(crate) mod selector;
pub(crate) mod source;

#[cfg(feature = "auto")]
pub mod autowired;

pub use any::{AnyInstance, Key, TypeInfo};
pub use bootstrapper::{Bootstrapper, BootstrapperExt, DefaultBootstrapper};
pub use collection::ServiceCollection;
pub use config::{Config, SelectionPolicy};
pub use contract::Implements;
pub use dependency_resolver::DependencyResolver;
pub use descriptor::{ImplementationKind, ServiceDescriptor};
pub use errors::{InstantiateErrorKind, InstantiatorErrorKind, InstantiatorResult, ManagerErrorKind, ResolveErrorKind};
pub use inject::{Inject, InjectAll};
pub use instantiator::{Injectable, Instantiator};
pub use lifetime::Lifetime;
pub use loader::ModuleLoader;
pub use manager::{Manager, ManagerBuilder, ManagerState};
pub use module::Module;
pub use provider::ServiceProvider;
pub use resolver::Resolver;
pub use scope::{Scope, ScopeId};
pub use selector::BootstrapperSelector;
pub use source::ModuleSource;
