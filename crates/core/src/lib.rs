//! Software catalog job layer.
//!
//! Backends (package managers, metadata stores, runtimes) each know part of
//! what is installable. A [`Catalog`] owns them, and [`job`]s fan a single
//! operation out to all of them, merge what comes back and post-process it
//! for display.

pub mod app;
pub mod backend;
pub mod catalog;
pub mod category;
pub mod config;
pub mod job;
pub mod query;
pub mod testing;

pub use app::{App, AppKind, AppList, AppState, Progress, Quirk, UserAction};
pub use backend::{Backend, BackendError, BackendRegistry, Capability, StaticBackend};
pub use catalog::Catalog;
pub use category::{Category, CategoryManager, CategoryRegistry};
pub use config::{load_config, load_config_from_str, validate_config, Config, ConfigError};
pub use job::{
    InstallAppsJob, Job, JobError, JobEvent, ListAppsJob, ListCategoriesJob,
    ListDistroUpgradesJob, RefineJob, RefreshMetadataJob, UninstallAppsJob, UpdateAppsJob,
};
pub use query::{AppQuery, AppQueryBuilder};
