use std::sync::Arc;

use async_trait::async_trait;
use futures::FutureExt;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::fan_out::FanOut;
use super::pipeline;
use super::{Job, JobError};
use crate::app::AppList;
use crate::backend::Capability;
use crate::catalog::Catalog;
use crate::query::{RefineJobFlags, RefineRequireFlags};

/// Asks every backend to fill in metadata on a list of apps.
///
/// Apps are enriched in place; the job returns the same list, minus invalid
/// entries unless filtering is disabled. Having no backend that can refine
/// is not an error.
#[derive(Debug, Clone)]
pub struct RefineJob {
    list: AppList,
    job_flags: RefineJobFlags,
    require: RefineRequireFlags,
}

impl RefineJob {
    pub fn new(list: AppList, job_flags: RefineJobFlags, require: RefineRequireFlags) -> Self {
        Self {
            list,
            job_flags,
            require,
        }
    }
}

#[async_trait]
impl Job for RefineJob {
    type Output = AppList;

    fn name(&self) -> &'static str {
        "refine"
    }

    async fn run(
        self,
        catalog: &Catalog,
        cancellable: &CancellationToken,
    ) -> Result<AppList, JobError> {
        if self.list.is_empty() {
            return Ok(self.list);
        }

        let job_flags = self.job_flags;
        let list = Arc::new(self.list);
        let require = Arc::new(self.require);

        FanOut::new(Capability::Refine)
            .allow_no_backends()
            .run(
                catalog.backends(),
                cancellable,
                (),
                |backend, _reporter, token| {
                    let list = Arc::clone(&list);
                    let require = Arc::clone(&require);
                    async move { backend.refine(&list, job_flags, &require, &token).await }.boxed()
                },
                |_, _, ()| {},
            )
            .await?;

        let mut list = Arc::try_unwrap(list).unwrap_or_else(|shared| (*shared).clone());
        if !job_flags.disable_filtering {
            let before = list.len();
            list.retain(|app| pipeline::is_valid(app, job_flags));
            debug!(before, after = list.len(), "filtered refined apps");
        }
        Ok(list)
    }
}
