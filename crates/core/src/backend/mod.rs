//! Backend contract and registry.
//!
//! A backend is an independently implemented data source (a package manager,
//! a metadata cache, a runtime store). Jobs fan operations out to every
//! registered backend that supports them.

mod error;
mod flags;
mod registry;
mod reporter;
mod static_catalog;
mod traits;

pub use error::BackendError;
pub use flags::*;
pub use registry::{BackendRegistry, RegistryError};
pub use reporter::{BackendEvent, OperationReporter, Report};
pub use static_catalog::StaticBackend;
pub use traits::{Backend, Capability};
