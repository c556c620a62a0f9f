//! Install, uninstall and update jobs.
//!
//! All three fan the target list out to every capable backend; each backend
//! acts on the apps it manages and reports progress, which is aggregated
//! and forwarded to the caller's event channel.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::future::BoxFuture;
use futures::FutureExt;
use tokio_util::sync::CancellationToken;

use super::events::JobEventSender;
use super::fan_out::FanOut;
use super::{Job, JobError};
use crate::app::AppList;
use crate::backend::{
    Backend, BackendError, Capability, InstallAppsFlags, OperationReporter, UninstallAppsFlags,
    UpdateAppsFlags,
};
use crate::catalog::Catalog;

async fn run_operation<F>(
    catalog: &Catalog,
    capability: Capability,
    apps: AppList,
    progress_period: Option<Duration>,
    events: Option<&JobEventSender>,
    cancellable: &CancellationToken,
    call: F,
) -> Result<(), JobError>
where
    F: Fn(
            Arc<dyn Backend>,
            Arc<AppList>,
            OperationReporter,
            CancellationToken,
        ) -> BoxFuture<'static, Result<(), BackendError>>
        + Send,
{
    let period = progress_period.unwrap_or_else(|| catalog.jobs_config().progress_update_period());
    let apps = Arc::new(apps);
    FanOut::new(capability)
        .with_progress(period)
        .with_events(events)
        .run(
            catalog.backends(),
            cancellable,
            (),
            |backend, reporter, token| call(backend, Arc::clone(&apps), reporter, token),
            |_, _, ()| {},
        )
        .await
}

/// Installs a list of apps.
#[derive(Debug)]
pub struct InstallAppsJob {
    apps: AppList,
    flags: InstallAppsFlags,
    events: Option<JobEventSender>,
    progress_period: Option<Duration>,
}

impl InstallAppsJob {
    /// # Panics
    ///
    /// If both `no_download` and `no_apply` are set.
    pub fn new(apps: AppList, flags: InstallAppsFlags) -> Self {
        assert!(
            !(flags.no_download && flags.no_apply),
            "install flags no_download and no_apply are mutually exclusive"
        );
        Self {
            apps,
            flags,
            events: None,
            progress_period: None,
        }
    }

    pub fn with_events(mut self, events: JobEventSender) -> Self {
        self.events = Some(events);
        self
    }

    /// Override the configured progress update period.
    pub fn with_progress_period(mut self, period: Duration) -> Self {
        self.progress_period = Some(period);
        self
    }
}

#[async_trait]
impl Job for InstallAppsJob {
    type Output = ();

    fn name(&self) -> &'static str {
        "install-apps"
    }

    async fn run(self, catalog: &Catalog, cancellable: &CancellationToken) -> Result<(), JobError> {
        let flags = self.flags;
        run_operation(
            catalog,
            Capability::InstallApps,
            self.apps,
            self.progress_period,
            self.events.as_ref(),
            cancellable,
            move |backend, apps, reporter, token| {
                async move { backend.install_apps(&apps, flags, &reporter, &token).await }.boxed()
            },
        )
        .await
    }
}

/// Removes a list of apps.
#[derive(Debug)]
pub struct UninstallAppsJob {
    apps: AppList,
    flags: UninstallAppsFlags,
    events: Option<JobEventSender>,
    progress_period: Option<Duration>,
}

impl UninstallAppsJob {
    pub fn new(apps: AppList, flags: UninstallAppsFlags) -> Self {
        Self {
            apps,
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
}

#[async_trait]
impl Job for UninstallAppsJob {
    type Output = ();

    fn name(&self) -> &'static str {
        "uninstall-apps"
    }

    async fn run(self, catalog: &Catalog, cancellable: &CancellationToken) -> Result<(), JobError> {
        let flags = self.flags;
        run_operation(
            catalog,
            Capability::UninstallApps,
            self.apps,
            self.progress_period,
            self.events.as_ref(),
            cancellable,
            move |backend, apps, reporter, token| {
                async move { backend.uninstall_apps(&apps, flags, &reporter, &token).await }
                    .boxed()
            },
        )
        .await
    }
}

/// Updates a list of apps.
#[derive(Debug)]
pub struct UpdateAppsJob {
    apps: AppList,
    flags: UpdateAppsFlags,
    events: Option<JobEventSender>,
    progress_period: Option<Duration>,
}

impl UpdateAppsJob {
    /// # Panics
    ///
    /// If both `no_download` and `no_apply` are set.
    pub fn new(apps: AppList, flags: UpdateAppsFlags) -> Self {
        assert!(
            !(flags.no_download && flags.no_apply),
            "update flags no_download and no_apply are mutually exclusive"
        );
        Self {
            apps,
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
}

#[async_trait]
impl Job for UpdateAppsJob {
    type Output = ();

    fn name(&self) -> &'static str {
        "update-apps"
    }

    async fn run(self, catalog: &Catalog, cancellable: &CancellationToken) -> Result<(), JobError> {
        let flags = self.flags;
        run_operation(
            catalog,
            Capability::UpdateApps,
            self.apps,
            self.progress_period,
            self.events.as_ref(),
            cancellable,
            move |backend, apps, reporter, token| {
                async move { backend.update_apps(&apps, flags, &reporter, &token).await }.boxed()
            },
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[should_panic(expected = "mutually exclusive")]
    fn test_install_rejects_no_download_and_no_apply() {
        let _ = InstallAppsJob::new(
            AppList::new(),
            InstallAppsFlags {
                no_download: true,
                no_apply: true,
                ..Default::default()
            },
        );
    }

    #[test]
    #[should_panic(expected = "mutually exclusive")]
    fn test_update_rejects_no_download_and_no_apply() {
        let _ = UpdateAppsJob::new(
            AppList::new(),
            UpdateAppsFlags {
                no_download: true,
                no_apply: true,
                ..Default::default()
            },
        );
    }

    #[test]
    fn test_single_phase_flags_accepted() {
        let _ = InstallAppsJob::new(
            AppList::new(),
            InstallAppsFlags {
                no_apply: true,
                ..Default::default()
            },
        );
        let _ = UpdateAppsJob::new(
            AppList::new(),
            UpdateAppsFlags {
                no_download: true,
                ..Default::default()
            },
        );
    }
}
