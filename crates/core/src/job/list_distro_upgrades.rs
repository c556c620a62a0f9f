use std::cmp::Ordering;

use async_trait::async_trait;
use futures::FutureExt;
use tokio_util::sync::CancellationToken;

use super::events::JobEventSender;
use super::fan_out::FanOut;
use super::refine::RefineJob;
use super::{Job, JobError};
use crate::app::AppList;
use crate::backend::{Capability, ListDistroUpgradesFlags};
use crate::catalog::Catalog;
use crate::query::{RefineJobFlags, RefineRequire, RefineRequireFlags};

/// Lists operating system upgrades offered by any backend, oldest first.
#[derive(Debug, Default)]
pub struct ListDistroUpgradesJob {
    flags: ListDistroUpgradesFlags,
    events: Option<JobEventSender>,
}

impl ListDistroUpgradesJob {
    pub fn new(flags: ListDistroUpgradesFlags) -> Self {
        Self {
            flags,
            events: None,
        }
    }

    pub fn with_events(mut self, events: JobEventSender) -> Self {
        self.events = Some(events);
        self
    }
}

#[async_trait]
impl Job for ListDistroUpgradesJob {
    type Output = AppList;

    fn name(&self) -> &'static str {
        "list-distro-upgrades"
    }

    async fn run(
        self,
        catalog: &Catalog,
        cancellable: &CancellationToken,
    ) -> Result<AppList, JobError> {
        let flags = self.flags;
        let merged = FanOut::new(Capability::ListDistroUpgrades)
            .with_events(self.events.as_ref())
            .run(
                catalog.backends(),
                cancellable,
                AppList::new(),
                |backend, _reporter, token| {
                    async move { backend.list_distro_upgrades(flags, &token).await }.boxed()
                },
                |acc: &mut AppList, _, partial: AppList| acc.extend_from(partial),
            )
            .await?;

        let mut list = if merged.is_empty() {
            merged
        } else {
            let job_flags = RefineJobFlags {
                interactive: flags.interactive,
                disable_filtering: true,
                allow_packages: false,
            };
            let require = RefineRequireFlags::from([RefineRequire::SetupAction]);
            RefineJob::new(merged, job_flags, require)
                .run(catalog, cancellable)
                .await
                .map_err(|e| JobError::Refine(Box::new(e)))?
        };

        list.sort_by(|a, b| {
            compare_versions(
                a.version().as_deref().unwrap_or_default(),
                b.version().as_deref().unwrap_or_default(),
            )
        });
        Ok(list)
    }
}

/// Compare dotted version strings, numerically where both parts are numbers.
pub fn compare_versions(a: &str, b: &str) -> Ordering {
    let mut left = a.split(['.', '-', '_', '~']);
    let mut right = b.split(['.', '-', '_', '~']);
    loop {
        match (left.next(), right.next()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(l), Some(r)) => {
                let ordering = match (l.parse::<u64>(), r.parse::<u64>()) {
                    (Ok(l), Ok(r)) => l.cmp(&r),
                    (Ok(_), Err(_)) => Ordering::Greater,
                    (Err(_), Ok(_)) => Ordering::Less,
                    (Err(_), Err(_)) => l.cmp(r),
                };
                if ordering != Ordering::Equal {
                    return ordering;
                }
            }
        }
    }
}
