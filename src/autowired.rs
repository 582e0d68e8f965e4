//! Link-time export of modules and bootstrappers, gathered by [`crate::ModuleSource::linked`].
//!
//! ```rust,ignore
//! use ioc_bootstrap::{autowired::{distributed_slice, EXPORTS}, ModuleSource};
//!
//! #[distributed_slice(EXPORTS)]
//! #[linkme(crate = ioc_bootstrap::autowired::linkme)]
//! static APP_MODULE: fn(ModuleSource) -> ModuleSource = |source| source.with_module::<AppModule>();
//! ```

use crate::source::ModuleSource;

pub use linkme::{self, distributed_slice};

#[distributed_slice]
pub static EXPORTS: [fn(ModuleSource) -> ModuleSource];
