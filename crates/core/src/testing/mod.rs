//! Testing utilities and a mock backend for job tests.
//!
//! # Example
//!
//! ```rust,ignore
//! use catalog_core::testing::{fixtures, MockBackend};
//!
//! let backend = MockBackend::new("flatpak")
//!     .with_apps(vec![fixtures::installed_app("org.example.Editor")]);
//!
//! let catalog = fixtures::catalog(vec![Arc::new(backend)]);
//! let apps = catalog.run(ListAppsJob::new(query, flags), &token).await?;
//! ```

mod mock_backend;

pub use mock_backend::{MockBackend, RecordedCall};

/// Test fixtures and helper functions.
pub mod fixtures {
    use std::sync::Arc;
    use std::time::Duration;

    use crate::app::{App, AppKind, AppState};
    use crate::backend::{Backend, BackendRegistry};
    use crate::catalog::Catalog;
    use crate::category::CategoryManager;
    use crate::config::JobsConfig;

    /// A complete desktop app that passes every validity filter.
    pub fn app(id: &str) -> Arc<App> {
        App::builder(id)
            .kind(AppKind::DesktopApp)
            .state(AppState::Available)
            .name(id)
            .summary(format!("Summary of {}", id))
            .build()
    }

    pub fn installed_app(id: &str) -> Arc<App> {
        let app = app(id);
        app.set_state(AppState::Installed);
        app
    }

    /// An installed app with an update available.
    pub fn updatable_app(id: &str) -> Arc<App> {
        let app = app(id);
        app.set_state(AppState::Updatable);
        app.set_version("1.0");
        app.set_update_version("1.1");
        app
    }

    /// Catalog over `backends` with the default category tree.
    ///
    /// Panics if the backends' ordering hints form a cycle.
    pub fn catalog(backends: Vec<Arc<dyn Backend>>) -> Catalog {
        catalog_with_progress_period(backends, Duration::from_millis(300))
    }

    pub fn catalog_with_progress_period(
        backends: Vec<Arc<dyn Backend>>,
        period: Duration,
    ) -> Catalog {
        let registry = BackendRegistry::new(backends).expect("backend ordering");
        Catalog::new(registry, Arc::new(CategoryManager::with_defaults())).with_jobs_config(
            JobsConfig {
                progress_update_period_ms: period.as_millis() as u64,
            },
        )
    }
}
