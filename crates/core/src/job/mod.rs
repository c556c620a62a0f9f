//! Jobs: one-shot operations coordinated across all backends.
//!
//! Every job fans its operation out to the enabled backends that support
//! it, waits for all of them, and succeeds with whatever the successful
//! backends contributed. A backend failure is logged and dropped unless it
//! is a cancellation; only the first recorded error ends up on the job.
//!
//! Jobs are consumed by [`Job::run`], so each one runs exactly once.

mod error;
mod events;
mod fan_out;
mod list_apps;
mod list_categories;
mod list_distro_upgrades;
mod manage;
mod pipeline;
mod progress;
mod refine;
mod refresh_metadata;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::catalog::Catalog;

pub use error::JobError;
pub use events::{JobEvent, JobEventSender};
pub use list_apps::ListAppsJob;
pub use list_categories::ListCategoriesJob;
pub use list_distro_upgrades::{compare_versions, ListDistroUpgradesJob};
pub use manage::{InstallAppsJob, UninstallAppsJob, UpdateAppsJob};
pub use progress::ProgressAggregator;
pub use refine::RefineJob;
pub use refresh_metadata::RefreshMetadataJob;

/// A unit of work run against a [`Catalog`].
#[async_trait]
pub trait Job: Send + Sized {
    type Output: Send;

    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Run the job to completion.
    async fn run(
        self,
        catalog: &Catalog,
        cancellable: &CancellationToken,
    ) -> Result<Self::Output, JobError>;
}
