use std::sync::Arc;

use async_trait::async_trait;
use futures::FutureExt;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::events::JobEventSender;
use super::fan_out::FanOut;
use super::pipeline;
use super::refine::RefineJob;
use super::{Job, JobError};
use crate::app::AppList;
use crate::backend::{Capability, ListAppsFlags};
use crate::catalog::Catalog;
use crate::query::{AppQuery, RefineJobFlags};

/// Lists apps matching a query across all backends.
///
/// Results from every backend that answered are merged, refined if the
/// query needs extra metadata, then filtered, deduplicated, sorted and
/// truncated as the query describes.
#[derive(Debug)]
pub struct ListAppsJob {
    query: AppQuery,
    flags: ListAppsFlags,
    events: Option<JobEventSender>,
}

impl ListAppsJob {
    pub fn new(query: AppQuery, flags: ListAppsFlags) -> Self {
        Self {
            query,
            flags,
            events: None,
        }
    }

    /// Forward backend events to `events` while the job runs.
    pub fn with_events(mut self, events: JobEventSender) -> Self {
        self.events = Some(events);
        self
    }

    pub fn query(&self) -> &AppQuery {
        &self.query
    }
}

#[async_trait]
impl Job for ListAppsJob {
    type Output = AppList;

    fn name(&self) -> &'static str {
        "list-apps"
    }

    async fn run(
        self,
        catalog: &Catalog,
        cancellable: &CancellationToken,
    ) -> Result<AppList, JobError> {
        let flags = self.flags;
        let query = Arc::new(self.query);

        let merged = FanOut::new(Capability::ListApps)
            .with_events(self.events.as_ref())
            .run(
                catalog.backends(),
                cancellable,
                AppList::new(),
                |backend, _reporter, token| {
                    let query = Arc::clone(&query);
                    async move { backend.list_apps(&query, flags, &token).await }.boxed()
                },
                |acc: &mut AppList, backend, partial: AppList| {
                    debug!(backend, results = partial.len(), "merging list results");
                    acc.extend_from(partial);
                },
            )
            .await?;

        let required = pipeline::required_refine_flags(&query);
        let list = if !merged.is_empty() && !required.is_empty() {
            let job_flags = RefineJobFlags {
                interactive: flags.interactive || query.refine_job_flags().interactive,
                disable_filtering: true,
                ..query.refine_job_flags()
            };
            RefineJob::new(merged, job_flags, required)
                .run(catalog, cancellable)
                .await
                .map_err(|e| JobError::Refine(Box::new(e)))?
        } else {
            merged
        };

        Ok(pipeline::post_process(list, &query))
    }
}
