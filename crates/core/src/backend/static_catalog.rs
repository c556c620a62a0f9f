//! A backend serving a fixed set of apps from configuration.
//!
//! Useful for demos and for exercising the job layer end to end. State
//! changes made by install/uninstall/update live in memory only.

use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::error::BackendError;
use super::flags::{
    InstallAppsFlags, ListAppsFlags, ListDistroUpgradesFlags, RefineCategoriesFlags,
    RefreshMetadataFlags, UninstallAppsFlags, UpdateAppsFlags,
};
use super::reporter::{BackendEvent, OperationReporter};
use super::traits::{Backend, Capability};
use crate::app::{App, AppKind, AppList, AppState, Quirk};
use crate::category::Category;
use crate::config::{BackendConfig, StaticAppConfig};
use crate::query::{AppQuery, RefineJobFlags, RefineRequire, RefineRequireFlags};

/// Steps each simulated download or apply is split into.
const STEPS: u32 = 4;

pub struct StaticBackend {
    name: String,
    enabled: bool,
    run_after: Vec<String>,
    run_before: Vec<String>,
    capabilities: BTreeSet<Capability>,
    step_delay: Duration,
    apps: Vec<Arc<App>>,
    featured: HashSet<String>,
    refreshed_at: Mutex<Option<Instant>>,
}

impl StaticBackend {
    pub fn from_config(config: &BackendConfig) -> Self {
        let apps = config
            .apps
            .iter()
            .map(|app| build_app(&config.name, config.priority, app))
            .collect();
        let featured = config
            .apps
            .iter()
            .filter(|app| app.featured)
            .map(|app| app.id.clone())
            .collect();

        Self {
            name: config.name.clone(),
            enabled: config.enabled,
            run_after: config.run_after.clone(),
            run_before: config.run_before.clone(),
            capabilities: config.capabilities.iter().copied().collect(),
            step_delay: Duration::from_millis(config.step_delay_ms),
            apps,
            featured,
            refreshed_at: Mutex::new(None),
        }
    }

    /// Every app this backend knows, including OS upgrades.
    pub fn apps(&self) -> &[Arc<App>] {
        &self.apps
    }

    /// Time since metadata was last refreshed, if it ever was.
    pub fn metadata_age(&self) -> Option<Duration> {
        self.refreshed_at.lock().map(|at| at.elapsed())
    }

    fn lookup(&self, id: &str) -> Option<&Arc<App>> {
        self.apps.iter().find(|app| app.id() == id)
    }

    fn owns(&self, app: &App) -> bool {
        app.management_backend() == Some(self.name.as_str())
    }

    fn matches(&self, query: &AppQuery, app: &App) -> Result<bool, BackendError> {
        if let Some(installed) = query.is_installed().as_bool() {
            return Ok(app.is_installed() == installed);
        }
        if let Some(for_update) = query.is_for_update().as_bool() {
            return Ok(app.is_updatable() == for_update);
        }
        if let Some(featured) = query.is_featured().as_bool() {
            return Ok(self.featured.contains(app.id()) == featured);
        }
        if let Some(category) = query.category() {
            return Ok(category_matches(category, app, self.featured.contains(app.id())));
        }
        if !query.keywords().is_empty() {
            return Ok(query.keywords().iter().all(|k| keyword_matches(app, k)));
        }
        if !query.developers().is_empty() {
            let developer = app.developer().unwrap_or_default();
            return Ok(query
                .developers()
                .iter()
                .any(|d| d.eq_ignore_ascii_case(&developer)));
        }
        if !query.component_kinds().is_empty() {
            return Ok(query.component_kinds().contains(&app.kind()));
        }
        if let Some(since) = query.released_since() {
            return Ok(app.release_date().is_some_and(|date| date >= since));
        }
        if query.n_properties_set() == 0 {
            return Ok(true);
        }
        Err(BackendError::NotSupported(format!(
            "{} cannot answer this query",
            self.name
        )))
    }

    async fn step(&self, cancellable: &CancellationToken) -> Result<(), BackendError> {
        if cancellable.is_cancelled() {
            return Err(BackendError::Cancelled);
        }
        if self.step_delay.is_zero() {
            return Ok(());
        }
        tokio::select! {
            _ = cancellable.cancelled() => Err(BackendError::Cancelled),
            _ = tokio::time::sleep(self.step_delay) => Ok(()),
        }
    }

    /// Walk `apps` through the download and apply phases, reporting overall
    /// progress. `apply` runs once an app is done.
    ///
    /// Each entry carries the state the app had before the operation. On
    /// failure every app not yet applied is put back into that state.
    async fn run_steps<F>(
        &self,
        apps: &[(Arc<App>, AppState)],
        download: bool,
        reporter: &OperationReporter,
        cancellable: &CancellationToken,
        mut apply: F,
    ) -> Result<(), BackendError>
    where
        F: FnMut(&App),
    {
        let total = (apps.len() as u32 * STEPS).max(1);
        let mut done = 0u32;
        for (index, (app, _)) in apps.iter().enumerate() {
            if download {
                app.set_state(AppState::Downloading);
            }
            for _ in 0..STEPS {
                if let Err(err) = self.step(cancellable).await {
                    recover_states(&apps[index..]);
                    return Err(err);
                }
                done += 1;
                reporter.progress((done * 100 / total) as u8);
            }
            apply(app.as_ref());
        }
        Ok(())
    }

    /// Apps from `apps` owned by this backend, paired with their current state.
    fn owned_with_state<'a>(
        &self,
        apps: impl Iterator<Item = &'a Arc<App>>,
    ) -> Vec<(Arc<App>, AppState)> {
        apps.filter(|a| self.owns(a))
            .map(|a| (Arc::clone(a), a.state()))
            .collect()
    }
}

fn recover_states(pending: &[(Arc<App>, AppState)]) {
    for (app, previous) in pending {
        app.set_state(*previous);
    }
    if !pending.is_empty() {
        debug!(apps = pending.len(), "restored app states after failure");
    }
}

#[async_trait]
impl Backend for StaticBackend {
    fn name(&self) -> &str {
        &self.name
    }

    fn enabled(&self) -> bool {
        self.enabled
    }

    fn supports(&self, capability: Capability) -> bool {
        self.capabilities.contains(&capability)
    }

    fn run_after(&self) -> Vec<String> {
        self.run_after.clone()
    }

    fn run_before(&self) -> Vec<String> {
        self.run_before.clone()
    }

    async fn list_apps(
        &self,
        query: &AppQuery,
        _flags: ListAppsFlags,
        cancellable: &CancellationToken,
    ) -> Result<AppList, BackendError> {
        if query.n_properties_set() > 1 {
            return Err(BackendError::NotSupported(format!(
                "{} handles one query criterion at a time",
                self.name
            )));
        }
        if cancellable.is_cancelled() {
            return Err(BackendError::Cancelled);
        }

        let mut list = AppList::new();
        for app in &self.apps {
            if app.kind() == AppKind::OsUpgrade {
                continue;
            }
            if self.matches(query, app)? {
                list.push(Arc::clone(app));
            }
        }
        debug!(backend = %self.name, results = list.len(), "listed apps");
        Ok(list)
    }

    async fn refine(
        &self,
        list: &AppList,
        _job_flags: RefineJobFlags,
        require: &RefineRequireFlags,
        cancellable: &CancellationToken,
    ) -> Result<(), BackendError> {
        for app in list {
            if cancellable.is_cancelled() {
                return Err(BackendError::Cancelled);
            }
            let Some(known) = self.lookup(app.id()) else {
                continue;
            };
            if Arc::ptr_eq(known, app) {
                continue;
            }
            if require.contains(RefineRequire::License) && app.license().is_none() {
                if let Some(license) = known.license() {
                    app.set_license(license);
                    app.set_license_is_free(known.license_is_free());
                }
            }
            if require.contains(RefineRequire::Version) && app.version().is_none() {
                if let Some(version) = known.version() {
                    app.set_version(version);
                }
            }
            if require.contains(RefineRequire::Origin) && app.origin().is_none() {
                app.set_origin(known.origin().unwrap_or_else(|| self.name.clone()));
            }
            if require.contains(RefineRequire::Developer)
                && known.has_quirk(Quirk::DeveloperVerified)
            {
                app.add_quirk(Quirk::DeveloperVerified);
            }
            if app.name().is_none() {
                if let Some(name) = known.name() {
                    app.set_name(name);
                }
            }
            if app.summary().is_none() {
                if let Some(summary) = known.summary() {
                    app.set_summary(summary);
                }
            }
        }
        Ok(())
    }

    async fn refine_categories(
        &self,
        categories: &[Arc<Category>],
        flags: RefineCategoriesFlags,
        cancellable: &CancellationToken,
    ) -> Result<(), BackendError> {
        if !flags.size {
            return Ok(());
        }
        for parent in categories {
            if cancellable.is_cancelled() {
                return Err(BackendError::Cancelled);
            }
            let children = parent.children();
            for app in &self.apps {
                let featured = self.featured.contains(app.id());
                let mut matched_any = false;
                for child in &children {
                    if category_matches(child, app, featured) {
                        child.increment_size();
                        matched_any = true;
                    }
                }
                if matched_any {
                    parent.increment_size();
                }
            }
        }
        Ok(())
    }

    async fn install_apps(
        &self,
        apps: &AppList,
        flags: InstallAppsFlags,
        reporter: &OperationReporter,
        cancellable: &CancellationToken,
    ) -> Result<(), BackendError> {
        let mine = self.owned_with_state(apps.iter());
        self.run_steps(&mine, !flags.no_download, reporter, cancellable, |app| {
            if flags.no_apply {
                app.set_metadata("download-state", "downloaded");
                app.set_state(AppState::Available);
            } else {
                app.set_state(AppState::Installed);
            }
        })
        .await
    }

    async fn uninstall_apps(
        &self,
        apps: &AppList,
        _flags: UninstallAppsFlags,
        reporter: &OperationReporter,
        cancellable: &CancellationToken,
    ) -> Result<(), BackendError> {
        let mut mine = Vec::new();
        for app in apps.iter().filter(|a| self.owns(a)) {
            if app.has_quirk(Quirk::Compulsory) {
                reporter.event(BackendEvent::for_app(
                    Arc::clone(app),
                    BackendError::failed(format!("{} cannot be removed", app.id())),
                ));
                continue;
            }
            mine.push((Arc::clone(app), app.state()));
            app.set_state(AppState::Removing);
        }
        self.run_steps(&mine, false, reporter, cancellable, |app| {
            app.set_state(AppState::Available);
        })
        .await
    }

    async fn update_apps(
        &self,
        apps: &AppList,
        flags: UpdateAppsFlags,
        reporter: &OperationReporter,
        cancellable: &CancellationToken,
    ) -> Result<(), BackendError> {
        let mine = self.owned_with_state(apps.iter().filter(|a| a.is_updatable()));
        self.run_steps(&mine, !flags.no_download, reporter, cancellable, |app| {
            if flags.no_apply {
                app.set_metadata("download-state", "downloaded");
                app.set_state(AppState::Updatable);
                return;
            }
            if let Some(version) = app.update_version() {
                app.set_version(version);
            }
            app.set_state(AppState::Installed);
        })
        .await
    }

    async fn list_distro_upgrades(
        &self,
        _flags: ListDistroUpgradesFlags,
        cancellable: &CancellationToken,
    ) -> Result<AppList, BackendError> {
        if cancellable.is_cancelled() {
            return Err(BackendError::Cancelled);
        }
        Ok(self
            .apps
            .iter()
            .filter(|app| app.kind() == AppKind::OsUpgrade)
            .cloned()
            .collect())
    }

    async fn refresh_metadata(
        &self,
        cache_age: Duration,
        _flags: RefreshMetadataFlags,
        reporter: &OperationReporter,
        cancellable: &CancellationToken,
    ) -> Result<(), BackendError> {
        if let Some(age) = self.metadata_age() {
            if !cache_age.is_zero() && age < cache_age {
                debug!(
                    backend = %self.name,
                    age_ms = age.as_millis() as u64,
                    "metadata is fresh enough"
                );
                reporter.progress(100);
                return Ok(());
            }
        }

        for done in 1..=STEPS {
            self.step(cancellable).await?;
            reporter.progress((done * 100 / STEPS) as u8);
        }
        *self.refreshed_at.lock() = Some(Instant::now());
        debug!(backend = %self.name, "refreshed metadata");
        Ok(())
    }
}

impl std::fmt::Debug for StaticBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StaticBackend")
            .field("name", &self.name)
            .field("enabled", &self.enabled)
            .field("apps", &self.apps.len())
            .finish()
    }
}

fn build_app(backend: &str, priority: i32, config: &StaticAppConfig) -> Arc<App> {
    let mut builder = App::builder(&config.id)
        .kind(config.kind)
        .state(config.state)
        .priority(priority);
    if let Some(name) = &config.name {
        builder = builder.name(name);
    }
    if let Some(summary) = &config.summary {
        builder = builder.summary(summary);
    }
    if let Some(version) = &config.version {
        builder = builder.version(version);
    }
    if let Some(source) = &config.source {
        builder = builder.default_source(source);
    }
    if let Some(origin) = &config.origin {
        builder = builder.origin(origin);
    }
    if let Some(license) = &config.license {
        builder = builder.license(license, config.license_free);
    }
    if let Some(developer) = &config.developer {
        builder = builder.developer(developer);
    }
    if config.developer_verified {
        builder = builder.quirk(Quirk::DeveloperVerified);
    }
    if let Some(arch) = &config.arch {
        builder = builder.arch(arch);
    }
    if let Some(released) = config.released {
        builder = builder.release_date(released);
    }
    for category in &config.categories {
        builder = builder.category(category);
    }
    for keyword in &config.keywords {
        builder = builder.keyword(keyword);
    }

    let app = builder.build();
    if let Some(update_version) = &config.update_version {
        app.set_update_version(update_version);
    }
    app.claim(backend);
    app
}

/// Whether `app` falls into `category`, checking children of top-level nodes.
///
/// Groups of the form `Group::Featured` only match featured apps.
fn category_matches(category: &Category, app: &App, featured: bool) -> bool {
    let own = category.desktop_groups().iter().any(|group| {
        match group.strip_suffix("::Featured") {
            Some(base) => featured && app.has_category(base),
            None => app.has_category(group),
        }
    });
    own || category
        .children()
        .iter()
        .any(|child| category_matches(child, app, featured))
}

fn keyword_matches(app: &App, keyword: &str) -> bool {
    let keyword = keyword.to_lowercase();
    let contains = |text: Option<String>| {
        text.map(|t| t.to_lowercase().contains(&keyword))
            .unwrap_or(false)
    };
    app.id().to_lowercase().contains(&keyword)
        || contains(app.name())
        || contains(app.summary())
        || app.keywords().iter().any(|k| k.to_lowercase() == keyword)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::load_config_from_str;
    use crate::query::AppQuery;

    const CATALOG: &str = r#"
[[backends]]
name = "static"
priority = 5

[[backends.apps]]
id = "org.example.Editor"
name = "Editor"
summary = "Edit text files"
state = "installed"
categories = ["Utility", "TextEditor"]
license = "GPL-3.0-or-later"
license_free = true

[[backends.apps]]
id = "org.example.Paint"
name = "Paint"
summary = "Draw pictures"
state = "updatable"
version = "1.0"
update_version = "1.1"
categories = ["Graphics"]
featured = true

[[backends.apps]]
id = "org.example.Os"
name = "Example OS 42"
summary = "Next release"
kind = "os_upgrade"
version = "42"
"#;

    fn backend() -> StaticBackend {
        let config = load_config_from_str(CATALOG).unwrap();
        StaticBackend::from_config(&config.backends[0])
    }

    #[tokio::test]
    async fn test_list_installed() {
        let backend = backend();
        let query = AppQuery::builder().is_installed(true).build();
        let list = backend
            .list_apps(&query, ListAppsFlags::default(), &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(list.ids(), vec!["org.example.Editor"]);
        assert_eq!(list.get(0).unwrap().management_backend(), Some("static"));
        assert_eq!(list.get(0).unwrap().priority(), 5);
    }

    #[tokio::test]
    async fn test_two_criteria_not_supported() {
        let backend = backend();
        let query = AppQuery::builder()
            .is_installed(true)
            .keywords(["edit"])
            .build();
        let err = backend
            .list_apps(&query, ListAppsFlags::default(), &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(err.is_not_supported());
    }

    #[tokio::test]
    async fn test_unhandled_criterion_not_supported() {
        let backend = backend();
        let query = AppQuery::builder().is_curated(true).build();
        let err = backend
            .list_apps(&query, ListAppsFlags::default(), &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(err.is_not_supported());
    }

    #[tokio::test]
    async fn test_keyword_search() {
        let backend = backend();
        let query = AppQuery::builder().keywords(["DRAW"]).build();
        let list = backend
            .list_apps(&query, ListAppsFlags::default(), &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(list.ids(), vec!["org.example.Paint"]);
    }

    #[tokio::test]
    async fn test_update_moves_to_new_version() {
        let backend = backend();
        let paint = Arc::clone(backend.lookup("org.example.Paint").unwrap());
        let list: AppList = vec![Arc::clone(&paint)].into();

        backend
            .update_apps(
                &list,
                UpdateAppsFlags::default(),
                &OperationReporter::discard("test"),
                &CancellationToken::new(),
            )
            .await
            .unwrap();

        assert_eq!(paint.state(), AppState::Installed);
        assert_eq!(paint.version().as_deref(), Some("1.1"));
    }

    #[tokio::test]
    async fn test_install_cancelled() {
        let backend = backend();
        let editor = Arc::clone(backend.lookup("org.example.Editor").unwrap());
        let token = CancellationToken::new();
        token.cancel();

        let err = backend
            .install_apps(
                &AppList::from(vec![editor]),
                InstallAppsFlags::default(),
                &OperationReporter::discard("test"),
                &token,
            )
            .await
            .unwrap_err();
        assert!(err.is_cancelled());
    }

    fn slow_backend() -> StaticBackend {
        let config = load_config_from_str(
            r#"
[[backends]]
name = "slow"
step_delay_ms = 50

[[backends.apps]]
id = "org.example.Game"
name = "Game"
summary = "Play a game"
state = "available"

[[backends.apps]]
id = "org.example.Chess"
name = "Chess"
summary = "Play chess"
state = "available"

[[backends.apps]]
id = "org.example.Editor"
name = "Editor"
summary = "Edit text files"
state = "installed"

[[backends.apps]]
id = "org.example.Viewer"
name = "Viewer"
summary = "View images"
state = "installed"
"#,
        )
        .unwrap();
        StaticBackend::from_config(&config.backends[0])
    }

    fn cancel_after(token: &CancellationToken, millis: u64) {
        let token = token.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(millis)).await;
            token.cancel();
        });
    }

    #[tokio::test(start_paused = true)]
    async fn test_install_cancelled_mid_download_restores_state() {
        let backend = slow_backend();
        let game = Arc::clone(backend.lookup("org.example.Game").unwrap());
        let chess = Arc::clone(backend.lookup("org.example.Chess").unwrap());
        let token = CancellationToken::new();
        cancel_after(&token, 60);

        let err = backend
            .install_apps(
                &AppList::from(vec![Arc::clone(&game), Arc::clone(&chess)]),
                InstallAppsFlags::default(),
                &OperationReporter::discard("test"),
                &token,
            )
            .await
            .unwrap_err();

        assert!(err.is_cancelled());
        assert_eq!(game.state(), AppState::Available);
        assert_eq!(chess.state(), AppState::Available);
    }

    #[tokio::test(start_paused = true)]
    async fn test_install_cancelled_keeps_finished_apps() {
        let backend = slow_backend();
        let game = Arc::clone(backend.lookup("org.example.Game").unwrap());
        let chess = Arc::clone(backend.lookup("org.example.Chess").unwrap());
        let token = CancellationToken::new();
        cancel_after(&token, 260);

        let err = backend
            .install_apps(
                &AppList::from(vec![Arc::clone(&game), Arc::clone(&chess)]),
                InstallAppsFlags::default(),
                &OperationReporter::discard("test"),
                &token,
            )
            .await
            .unwrap_err();

        assert!(err.is_cancelled());
        assert_eq!(game.state(), AppState::Installed);
        assert_eq!(chess.state(), AppState::Available);
    }

    #[tokio::test(start_paused = true)]
    async fn test_uninstall_cancelled_restores_every_app() {
        let backend = slow_backend();
        let editor = Arc::clone(backend.lookup("org.example.Editor").unwrap());
        let viewer = Arc::clone(backend.lookup("org.example.Viewer").unwrap());
        let token = CancellationToken::new();
        cancel_after(&token, 60);

        let err = backend
            .uninstall_apps(
                &AppList::from(vec![Arc::clone(&editor), Arc::clone(&viewer)]),
                UninstallAppsFlags::default(),
                &OperationReporter::discard("test"),
                &token,
            )
            .await
            .unwrap_err();

        assert!(err.is_cancelled());
        assert_eq!(editor.state(), AppState::Installed);
        assert_eq!(viewer.state(), AppState::Installed);
    }

    #[tokio::test(start_paused = true)]
    async fn test_refresh_skipped_while_cache_is_fresh() {
        let backend = slow_backend();
        let reporter = OperationReporter::discard("test");
        let token = CancellationToken::new();
        let cache_age = Duration::from_secs(3600);
        assert_eq!(backend.metadata_age(), None);

        let started = Instant::now();
        backend
            .refresh_metadata(cache_age, RefreshMetadataFlags::default(), &reporter, &token)
            .await
            .unwrap();
        assert!(started.elapsed() >= Duration::from_millis(200));
        assert_eq!(backend.metadata_age(), Some(Duration::ZERO));

        tokio::time::advance(Duration::from_secs(60)).await;
        let started = Instant::now();
        backend
            .refresh_metadata(cache_age, RefreshMetadataFlags::default(), &reporter, &token)
            .await
            .unwrap();
        assert_eq!(started.elapsed(), Duration::ZERO);
        assert_eq!(backend.metadata_age(), Some(Duration::from_secs(60)));

        backend
            .refresh_metadata(Duration::ZERO, RefreshMetadataFlags::default(), &reporter, &token)
            .await
            .unwrap();
        assert_eq!(backend.metadata_age(), Some(Duration::ZERO));
    }

    #[tokio::test(start_paused = true)]
    async fn test_refresh_cancelled_keeps_old_timestamp() {
        let backend = slow_backend();
        let token = CancellationToken::new();
        cancel_after(&token, 60);

        let err = backend
            .refresh_metadata(
                Duration::ZERO,
                RefreshMetadataFlags::default(),
                &OperationReporter::discard("test"),
                &token,
            )
            .await
            .unwrap_err();
        assert!(err.is_cancelled());
        assert_eq!(backend.metadata_age(), None);
    }

    #[tokio::test]
    async fn test_install_skips_foreign_apps() {
        let backend = backend();
        let foreign = App::builder("org.other.App")
            .state(AppState::Available)
            .build();
        foreign.claim("elsewhere");

        backend
            .install_apps(
                &AppList::from(vec![Arc::clone(&foreign)]),
                InstallAppsFlags::default(),
                &OperationReporter::discard("test"),
                &CancellationToken::new(),
            )
            .await
            .unwrap();
        assert_eq!(foreign.state(), AppState::Available);
    }

    #[tokio::test]
    async fn test_distro_upgrades() {
        let backend = backend();
        let list = backend
            .list_distro_upgrades(ListDistroUpgradesFlags::default(), &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(list.ids(), vec!["org.example.Os"]);
    }

    #[tokio::test]
    async fn test_refine_fills_missing_license() {
        let backend = backend();
        let bare = App::builder("org.example.Editor").build();
        let require = RefineRequireFlags::from([RefineRequire::License, RefineRequire::Origin]);

        backend
            .refine(
                &AppList::from(vec![Arc::clone(&bare)]),
                RefineJobFlags::default(),
                &require,
                &CancellationToken::new(),
            )
            .await
            .unwrap();

        assert_eq!(bare.license().as_deref(), Some("GPL-3.0-or-later"));
        assert!(bare.license_is_free());
        assert_eq!(bare.origin().as_deref(), Some("static"));
        assert_eq!(bare.name().as_deref(), Some("Editor"));
    }
}
