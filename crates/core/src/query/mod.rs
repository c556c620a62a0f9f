//! Query description for list jobs.

mod app_query;
mod types;

pub use app_query::{AppFilterFn, AppQuery, AppQueryBuilder, AppSortFn};
pub use types::*;

pub use crate::app::DedupeFlags;
