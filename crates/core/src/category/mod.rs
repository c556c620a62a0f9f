//! Category tree and the registry that owns it.

mod defaults;
mod manager;
mod types;

pub use manager::{CategoryManager, CategoryRegistry};
pub use types::Category;

pub(crate) use manager::sort_tree;
