use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::app::{AppKind, AppState};
use crate::backend::Capability;

/// Root configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub jobs: JobsConfig,
    /// Category tree; the built-in table is used when empty.
    #[serde(default)]
    pub categories: Vec<CategoryConfig>,
    /// Statically defined backends, in registration order.
    #[serde(default)]
    pub backends: Vec<BackendConfig>,
}

/// Job runner configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct JobsConfig {
    /// How often aggregated progress is recomputed (default: 300 ms)
    #[serde(default = "default_progress_update_period_ms")]
    pub progress_update_period_ms: u64,
}

impl JobsConfig {
    pub fn progress_update_period(&self) -> Duration {
        Duration::from_millis(self.progress_update_period_ms)
    }
}

impl Default for JobsConfig {
    fn default() -> Self {
        Self {
            progress_update_period_ms: default_progress_update_period_ms(),
        }
    }
}

fn default_progress_update_period_ms() -> u64 {
    300
}

/// A category and, for top-level entries, its children.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CategoryConfig {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub score: i32,
    /// Desktop categories matched by this entry
    #[serde(default)]
    pub desktop_groups: Vec<String>,
    #[serde(default)]
    pub children: Vec<CategoryConfig>,
}

/// A backend serving a fixed set of apps.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BackendConfig {
    pub name: String,
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Priority given to apps from this backend when deduplicating
    #[serde(default)]
    pub priority: i32,
    /// Backends that must be dispatched before this one
    #[serde(default)]
    pub run_after: Vec<String>,
    /// Backends that must be dispatched after this one
    #[serde(default)]
    pub run_before: Vec<String>,
    /// Operations the backend implements (default: all)
    #[serde(default = "default_capabilities")]
    pub capabilities: Vec<Capability>,
    /// Simulated duration of each install/uninstall/update step (default: 0)
    #[serde(default)]
    pub step_delay_ms: u64,
    #[serde(default)]
    pub apps: Vec<StaticAppConfig>,
}

fn default_true() -> bool {
    true
}

fn default_capabilities() -> Vec<Capability> {
    Capability::ALL.to_vec()
}

/// An app served by a static backend.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StaticAppConfig {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default = "default_kind")]
    pub kind: AppKind,
    #[serde(default = "default_state")]
    pub state: AppState,
    #[serde(default)]
    pub version: Option<String>,
    /// Version offered when the app is updatable
    #[serde(default)]
    pub update_version: Option<String>,
    /// Package name
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub origin: Option<String>,
    #[serde(default)]
    pub license: Option<String>,
    #[serde(default)]
    pub license_free: bool,
    #[serde(default)]
    pub developer: Option<String>,
    #[serde(default)]
    pub developer_verified: bool,
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub featured: bool,
    #[serde(default)]
    pub arch: Option<String>,
    #[serde(default)]
    pub released: Option<DateTime<Utc>>,
}

fn default_kind() -> AppKind {
    AppKind::DesktopApp
}

fn default_state() -> AppState {
    AppState::Available
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_empty_config_uses_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.jobs.progress_update_period_ms, 300);
        assert_eq!(
            config.jobs.progress_update_period(),
            Duration::from_millis(300)
        );
        assert!(config.categories.is_empty());
        assert!(config.backends.is_empty());
    }

    #[test]
    fn test_deserialize_backend_with_apps() {
        let toml = r#"
[[backends]]
name = "flatpak"
priority = 10
run_after = ["appstream"]
capabilities = ["list_apps", "install_apps"]

[[backends.apps]]
id = "org.example.Editor"
name = "Editor"
summary = "Edit text"
state = "installed"
license = "GPL-3.0-or-later"
license_free = true
categories = ["Utility", "TextEditor"]
"#;
        let config: Config = toml::from_str(toml).unwrap();
        let backend = &config.backends[0];
        assert_eq!(backend.name, "flatpak");
        assert!(backend.enabled);
        assert_eq!(backend.priority, 10);
        assert_eq!(
            backend.capabilities,
            vec![Capability::ListApps, Capability::InstallApps]
        );

        let app = &backend.apps[0];
        assert_eq!(app.kind, AppKind::DesktopApp);
        assert_eq!(app.state, AppState::Installed);
        assert!(app.license_free);
    }

    #[test]
    fn test_backend_defaults_to_all_capabilities() {
        let toml = r#"
[[backends]]
name = "dummy"
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.backends[0].capabilities.len(), Capability::ALL.len());
    }

    #[test]
    fn test_deserialize_category_tree() {
        let toml = r#"
[[categories]]
id = "create"
name = "Create"
score = 100

[[categories.children]]
id = "graphics"
name = "Graphics"
desktop_groups = ["Graphics"]
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.categories[0].children[0].desktop_groups, vec!["Graphics"]);
    }
}
