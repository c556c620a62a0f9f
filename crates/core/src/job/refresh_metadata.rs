//! Metadata refresh across all backends.

use std::time::Duration;

use async_trait::async_trait;
use futures::FutureExt;
use tokio_util::sync::CancellationToken;

use super::events::JobEventSender;
use super::fan_out::FanOut;
use super::{Job, JobError};
use crate::backend::{Capability, RefreshMetadataFlags};
use crate::catalog::Catalog;

/// Asks every capable backend to refresh metadata older than `cache_age`.
///
/// Progress is aggregated like install and update; a backend that fails to
/// refresh does not stop the others.
#[derive(Debug)]
pub struct RefreshMetadataJob {
    cache_age: Duration,
    flags: RefreshMetadataFlags,
    events: Option<JobEventSender>,
    progress_period: Option<Duration>,
}

impl RefreshMetadataJob {
    /// A zero `cache_age` refreshes unconditionally.
    pub fn new(cache_age: Duration, flags: RefreshMetadataFlags) -> Self {
        Self {
            cache_age,
            flags,
            events: None,
            progress_period: None,
        }
    }

    pub fn with_events(mut self, events: JobEventSender) -> Self {
        self.events = Some(events);
        self
    }

    pub fn with_progress_period(mut self, period: Duration) -> Self {
        self.progress_period = Some(period);
        self
    }

    pub fn cache_age(&self) -> Duration {
        self.cache_age
    }
}

#[async_trait]
impl Job for RefreshMetadataJob {
    type Output = ();

    fn name(&self) -> &'static str {
        "refresh-metadata"
    }

    async fn run(self, catalog: &Catalog, cancellable: &CancellationToken) -> Result<(), JobError> {
        let cache_age = self.cache_age;
        let flags = self.flags;
        let period = self
            .progress_period
            .unwrap_or_else(|| catalog.jobs_config().progress_update_period());

        FanOut::new(Capability::RefreshMetadata)
            .with_progress(period)
            .with_events(self.events.as_ref())
            .run(
                catalog.backends(),
                cancellable,
                (),
                move |backend, reporter, token| {
                    async move {
                        backend
                            .refresh_metadata(cache_age, flags, &reporter, &token)
                            .await
                    }
                    .boxed()
                },
                |_, _, ()| {},
            )
            .await
    }
}
