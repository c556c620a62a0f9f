//! Mock backend for testing.

use std::collections::{BTreeSet, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;

use crate::app::{AppList, AppState, Progress, UserAction};
use crate::backend::{
    Backend, BackendError, BackendEvent, Capability, InstallAppsFlags, ListAppsFlags,
    ListDistroUpgradesFlags, OperationReporter, RefineCategoriesFlags, RefreshMetadataFlags,
    UninstallAppsFlags, UpdateAppsFlags,
};
use crate::category::Category;
use crate::query::{AppQuery, RefineJobFlags, RefineRequire, RefineRequireFlags};

/// A recorded backend call for test assertions.
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub capability: Capability,
    /// Number of apps passed in (0 for list operations).
    pub n_apps: usize,
    /// `n_properties_set()` of the query, for `list_apps`.
    pub n_properties: Option<usize>,
}

/// Mock implementation of the Backend trait.
///
/// Provides controllable behavior for testing:
/// - Return configurable apps and distro upgrades
/// - Fail any operation with a configured error
/// - Delay completion, or block until cancelled
/// - Report a scripted progress sequence, user actions and events
/// - Track calls for assertions
///
/// # Example
///
/// ```rust,ignore
/// use catalog_core::testing::{MockBackend, fixtures};
///
/// let backend = MockBackend::new("flatpak")
///     .with_apps(vec![fixtures::app("org.example.Editor")])
///     .with_error(Capability::InstallApps, BackendError::NoNetwork);
///
/// let catalog = fixtures::catalog(vec![Arc::new(backend)]);
/// ```
pub struct MockBackend {
    name: String,
    capabilities: BTreeSet<Capability>,
    run_after: Vec<String>,
    enabled: AtomicBool,
    wait_for_cancel: AtomicBool,
    apps: RwLock<AppList>,
    distro_upgrades: RwLock<AppList>,
    errors: RwLock<HashMap<Capability, BackendError>>,
    delay: RwLock<Duration>,
    progress_steps: RwLock<Vec<Progress>>,
    step_delay: RwLock<Duration>,
    user_action: RwLock<Option<UserAction>>,
    events: RwLock<Vec<BackendError>>,
    category_hits: RwLock<Vec<String>>,
    refresh_cache_ages: RwLock<Vec<Duration>>,
    calls: Arc<RwLock<Vec<RecordedCall>>>,
}

impl std::fmt::Debug for MockBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockBackend")
            .field("name", &self.name)
            .field("capabilities", &self.capabilities)
            .field("apps", &"<apps>")
            .field("errors", &"<errors>")
            .field("calls", &"<calls>")
            .finish()
    }
}

impl MockBackend {
    /// Create a mock supporting every capability and returning nothing.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            capabilities: Capability::ALL.into_iter().collect(),
            run_after: Vec::new(),
            enabled: AtomicBool::new(true),
            wait_for_cancel: AtomicBool::new(false),
            apps: RwLock::new(AppList::new()),
            distro_upgrades: RwLock::new(AppList::new()),
            errors: RwLock::new(HashMap::new()),
            delay: RwLock::new(Duration::ZERO),
            progress_steps: RwLock::new(Vec::new()),
            step_delay: RwLock::new(Duration::ZERO),
            user_action: RwLock::new(None),
            events: RwLock::new(Vec::new()),
            category_hits: RwLock::new(Vec::new()),
            refresh_cache_ages: RwLock::new(Vec::new()),
            calls: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Restrict the mock to `capabilities`.
    pub fn with_capabilities(mut self, capabilities: impl IntoIterator<Item = Capability>) -> Self {
        self.capabilities = capabilities.into_iter().collect();
        self
    }

    pub fn with_run_after(mut self, names: &[&str]) -> Self {
        self.run_after = names.iter().map(|s| s.to_string()).collect();
        self
    }

    /// Apps returned by `list_apps`.
    pub fn with_apps(mut self, apps: impl Into<AppList>) -> Self {
        *self.apps.get_mut() = apps.into();
        self
    }

    pub fn with_distro_upgrades(mut self, apps: impl Into<AppList>) -> Self {
        *self.distro_upgrades.get_mut() = apps.into();
        self
    }

    pub fn with_error(mut self, capability: Capability, error: BackendError) -> Self {
        self.errors.get_mut().insert(capability, error);
        self
    }

    /// Wait this long before completing every operation.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        *self.delay.get_mut() = delay;
        self
    }

    /// Report these values from install/uninstall/update and refresh, `step_delay` apart.
    pub fn with_progress_steps(mut self, steps: Vec<Progress>, step_delay: Duration) -> Self {
        *self.progress_steps.get_mut() = steps;
        *self.step_delay.get_mut() = step_delay;
        self
    }

    /// Ask for this action on the first target app of mutating operations.
    pub fn with_user_action(mut self, action: UserAction) -> Self {
        *self.user_action.get_mut() = Some(action);
        self
    }

    /// Report these errors as events from mutating operations.
    pub fn with_events(mut self, events: Vec<BackendError>) -> Self {
        *self.events.get_mut() = events;
        self
    }

    /// Categories to count one app in during `refine_categories`, as
    /// `parent` or `parent/child` paths.
    pub fn with_category_hits(mut self, paths: &[&str]) -> Self {
        *self.category_hits.get_mut() = paths.iter().map(|s| s.to_string()).collect();
        self
    }

    /// Make every operation block until the job is cancelled.
    pub fn waiting_for_cancel(self) -> Self {
        self.wait_for_cancel.store(true, Ordering::SeqCst);
        self
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::SeqCst);
    }

    pub async fn set_error(&self, capability: Capability, error: BackendError) {
        self.errors.write().await.insert(capability, error);
    }

    pub async fn clear_errors(&self) {
        self.errors.write().await.clear();
    }

    pub async fn set_apps(&self, apps: impl Into<AppList>) {
        *self.apps.write().await = apps.into();
    }

    /// Get all recorded calls.
    pub async fn recorded_calls(&self) -> Vec<RecordedCall> {
        self.calls.read().await.clone()
    }

    /// Cache ages passed to `refresh_metadata`, in call order.
    pub async fn refresh_cache_ages(&self) -> Vec<Duration> {
        self.refresh_cache_ages.read().await.clone()
    }

    /// Number of calls made for `capability`.
    pub async fn call_count(&self, capability: Capability) -> usize {
        self.calls
            .read()
            .await
            .iter()
            .filter(|c| c.capability == capability)
            .count()
    }

    async fn begin(
        &self,
        capability: Capability,
        n_apps: usize,
        n_properties: Option<usize>,
        cancellable: &CancellationToken,
    ) -> Result<(), BackendError> {
        self.calls.write().await.push(RecordedCall {
            capability,
            n_apps,
            n_properties,
        });

        if self.wait_for_cancel.load(Ordering::SeqCst) {
            cancellable.cancelled().await;
            return Err(BackendError::Cancelled);
        }
        Ok(())
    }

    async fn finish(
        &self,
        capability: Capability,
        cancellable: &CancellationToken,
    ) -> Result<(), BackendError> {
        let delay = *self.delay.read().await;
        if !delay.is_zero() {
            tokio::select! {
                _ = cancellable.cancelled() => return Err(BackendError::Cancelled),
                _ = tokio::time::sleep(delay) => {}
            }
        }
        match self.errors.read().await.get(&capability) {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }

    /// Run a reporting operation: user action, events, progress steps.
    async fn report_and_finish(
        &self,
        capability: Capability,
        apps: &AppList,
        reporter: &OperationReporter,
        cancellable: &CancellationToken,
    ) -> Result<(), BackendError> {
        self.begin(capability, apps.len(), None, cancellable).await?;

        if let (Some(action), Some(app)) = (self.user_action.read().await.clone(), apps.get(0)) {
            reporter.needs_user_action(Arc::clone(app), action);
        }
        for error in self.events.read().await.iter() {
            reporter.event(BackendEvent::new(error.clone()));
        }

        let step_delay = *self.step_delay.read().await;
        let steps = self.progress_steps.read().await.clone();
        for step in steps {
            match step {
                Progress::Unknown => reporter.progress_unknown(),
                Progress::Percent(p) => reporter.progress(p),
            }
            if !step_delay.is_zero() {
                tokio::time::sleep(step_delay).await;
            }
        }

        self.finish(capability, cancellable).await
    }

    async fn mutate(
        &self,
        capability: Capability,
        apps: &AppList,
        reporter: &OperationReporter,
        cancellable: &CancellationToken,
        done_state: AppState,
    ) -> Result<(), BackendError> {
        self.report_and_finish(capability, apps, reporter, cancellable)
            .await?;

        for app in apps {
            let mine = app
                .management_backend()
                .map(|owner| owner == self.name)
                .unwrap_or(true);
            if mine {
                app.set_state(done_state);
            }
        }
        Ok(())
    }
}

#[async_trait]
impl Backend for MockBackend {
    fn name(&self) -> &str {
        &self.name
    }

    fn enabled(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }

    fn supports(&self, capability: Capability) -> bool {
        self.capabilities.contains(&capability)
    }

    fn run_after(&self) -> Vec<String> {
        self.run_after.clone()
    }

    async fn list_apps(
        &self,
        query: &AppQuery,
        _flags: ListAppsFlags,
        cancellable: &CancellationToken,
    ) -> Result<AppList, BackendError> {
        self.begin(
            Capability::ListApps,
            0,
            Some(query.n_properties_set()),
            cancellable,
        )
        .await?;
        self.finish(Capability::ListApps, cancellable).await?;
        Ok(self.apps.read().await.clone())
    }

    async fn refine(
        &self,
        list: &AppList,
        _job_flags: RefineJobFlags,
        require: &RefineRequireFlags,
        cancellable: &CancellationToken,
    ) -> Result<(), BackendError> {
        self.begin(Capability::Refine, list.len(), None, cancellable)
            .await?;
        self.finish(Capability::Refine, cancellable).await?;
        for app in list {
            app.set_metadata(format!("refined-by::{}", self.name), "true");
            if require.contains(RefineRequire::License) && app.license().is_none() {
                app.set_license("LicenseRef-proprietary");
            }
        }
        Ok(())
    }

    async fn refine_categories(
        &self,
        categories: &[Arc<Category>],
        _flags: RefineCategoriesFlags,
        cancellable: &CancellationToken,
    ) -> Result<(), BackendError> {
        self.begin(Capability::RefineCategories, 0, None, cancellable)
            .await?;
        self.finish(Capability::RefineCategories, cancellable)
            .await?;

        for path in self.category_hits.read().await.iter() {
            let (parent_id, child_id) = match path.split_once('/') {
                Some((parent, child)) => (parent, Some(child)),
                None => (path.as_str(), None),
            };
            let Some(parent) = categories.iter().find(|c| c.id() == parent_id) else {
                continue;
            };
            parent.increment_size();
            if let Some(child) = child_id.and_then(|id| parent.find_child(id)) {
                child.increment_size();
            }
        }
        Ok(())
    }

    async fn install_apps(
        &self,
        apps: &AppList,
        _flags: InstallAppsFlags,
        reporter: &OperationReporter,
        cancellable: &CancellationToken,
    ) -> Result<(), BackendError> {
        self.mutate(
            Capability::InstallApps,
            apps,
            reporter,
            cancellable,
            AppState::Installed,
        )
        .await
    }

    async fn uninstall_apps(
        &self,
        apps: &AppList,
        _flags: UninstallAppsFlags,
        reporter: &OperationReporter,
        cancellable: &CancellationToken,
    ) -> Result<(), BackendError> {
        self.mutate(
            Capability::UninstallApps,
            apps,
            reporter,
            cancellable,
            AppState::Available,
        )
        .await
    }

    async fn update_apps(
        &self,
        apps: &AppList,
        _flags: UpdateAppsFlags,
        reporter: &OperationReporter,
        cancellable: &CancellationToken,
    ) -> Result<(), BackendError> {
        self.mutate(
            Capability::UpdateApps,
            apps,
            reporter,
            cancellable,
            AppState::Installed,
        )
        .await
    }

    async fn list_distro_upgrades(
        &self,
        _flags: ListDistroUpgradesFlags,
        cancellable: &CancellationToken,
    ) -> Result<AppList, BackendError> {
        self.begin(Capability::ListDistroUpgrades, 0, None, cancellable)
            .await?;
        self.finish(Capability::ListDistroUpgrades, cancellable)
            .await?;
        Ok(self.distro_upgrades.read().await.clone())
    }

    async fn refresh_metadata(
        &self,
        cache_age: Duration,
        _flags: RefreshMetadataFlags,
        reporter: &OperationReporter,
        cancellable: &CancellationToken,
    ) -> Result<(), BackendError> {
        self.refresh_cache_ages.write().await.push(cache_age);
        self.report_and_finish(
            Capability::RefreshMetadata,
            &AppList::new(),
            reporter,
            cancellable,
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::fixtures;

    #[tokio::test]
    async fn test_mock_returns_apps_and_records_calls() {
        let backend = MockBackend::new("mock").with_apps(vec![fixtures::app("a")]);
        let query = AppQuery::builder().is_installed(true).build();

        let list = backend
            .list_apps(&query, ListAppsFlags::default(), &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(list.ids(), vec!["a"]);
        let calls = backend.recorded_calls().await;
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].n_properties, Some(1));
    }

    #[tokio::test]
    async fn test_mock_configured_error() {
        let backend = MockBackend::new("mock");
        backend
            .set_error(Capability::ListApps, BackendError::NoNetwork)
            .await;

        let err = backend
            .list_apps(
                &AppQuery::default(),
                ListAppsFlags::default(),
                &CancellationToken::new(),
            )
            .await
            .unwrap_err();
        assert_eq!(err, BackendError::NoNetwork);
    }

    #[tokio::test]
    async fn test_mock_waits_for_cancel() {
        let backend = MockBackend::new("mock").waiting_for_cancel();
        let token = CancellationToken::new();
        let canceller = token.clone();
        tokio::spawn(async move { canceller.cancel() });

        let err = backend
            .list_apps(&AppQuery::default(), ListAppsFlags::default(), &token)
            .await
            .unwrap_err();
        assert!(err.is_cancelled());
    }
}
