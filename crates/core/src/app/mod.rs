//! Catalog entries and ordered lists of them.
//!
//! An [`App`] is shared (`Arc<App>`) between the job layer, the backends and
//! the caller. Backends fill in details through interior mutability while a
//! job is running; the job layer only reads them.

mod entity;
mod list;
mod types;

pub use entity::{App, AppBuilder, AppSnapshot};
pub use list::{AppList, DedupeFlags};
pub use types::*;
