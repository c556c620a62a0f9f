use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::{Arc, OnceLock};

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::Serialize;

use super::types::{AppKind, AppState, Progress, Quirk};

/// A catalog entry shared between jobs, backends and callers.
///
/// Apps are always handled as `Arc<App>`: several backends may enrich the
/// same value concurrently, so every mutable field sits behind a lock. The
/// catalog ID is the app's identity and never changes.
pub struct App {
    id: String,
    management_backend: OnceLock<String>,
    data: RwLock<AppData>,
}

#[derive(Debug, Clone, Default)]
struct AppData {
    kind: AppKind,
    state: AppState,
    name: Option<String>,
    summary: Option<String>,
    version: Option<String>,
    update_version: Option<String>,
    default_source: Option<String>,
    origin: Option<String>,
    license: Option<String>,
    license_is_free: bool,
    developer: Option<String>,
    quirks: BTreeSet<Quirk>,
    categories: Vec<String>,
    keywords: Vec<String>,
    priority: i32,
    arch: Option<String>,
    release_date: Option<DateTime<Utc>>,
    progress: Progress,
    metadata: BTreeMap<String, String>,
}

macro_rules! string_accessors {
    ($($get:ident, $set:ident;)*) => {
        $(
            pub fn $get(&self) -> Option<String> {
                self.data.read().$get.clone()
            }

            pub fn $set(&self, value: impl Into<String>) {
                self.data.write().$get = Some(value.into());
            }
        )*
    };
}

impl App {
    /// Start building an app with the given catalog ID.
    pub fn builder(id: impl Into<String>) -> AppBuilder {
        AppBuilder {
            id: id.into(),
            data: AppData::default(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn kind(&self) -> AppKind {
        self.data.read().kind
    }

    pub fn set_kind(&self, kind: AppKind) {
        self.data.write().kind = kind;
    }

    pub fn state(&self) -> AppState {
        self.data.read().state
    }

    pub fn set_state(&self, state: AppState) {
        self.data.write().state = state;
    }

    pub fn is_installed(&self) -> bool {
        self.state().is_installed()
    }

    pub fn is_updatable(&self) -> bool {
        self.state().is_updatable()
    }

    string_accessors! {
        name, set_name;
        summary, set_summary;
        version, set_version;
        update_version, set_update_version;
        default_source, set_default_source;
        origin, set_origin;
        license, set_license;
        developer, set_developer;
        arch, set_arch;
    }

    /// The backend that owns this app, if one has claimed it.
    pub fn management_backend(&self) -> Option<&str> {
        self.management_backend.get().map(String::as_str)
    }

    /// Claim the app for a backend.
    ///
    /// Only the first claim sticks; returns whether this call made it.
    pub fn claim(&self, backend: &str) -> bool {
        self.management_backend.set(backend.to_string()).is_ok()
    }

    pub fn license_is_free(&self) -> bool {
        self.data.read().license_is_free
    }

    pub fn set_license_is_free(&self, free: bool) {
        self.data.write().license_is_free = free;
    }

    pub fn has_quirk(&self, quirk: Quirk) -> bool {
        self.data.read().quirks.contains(&quirk)
    }

    pub fn add_quirk(&self, quirk: Quirk) {
        self.data.write().quirks.insert(quirk);
    }

    pub fn remove_quirk(&self, quirk: Quirk) {
        self.data.write().quirks.remove(&quirk);
    }

    /// Desktop categories the app belongs to (e.g. "Graphics", "Utility").
    pub fn categories(&self) -> Vec<String> {
        self.data.read().categories.clone()
    }

    pub fn has_category(&self, category: &str) -> bool {
        self.data
            .read()
            .categories
            .iter()
            .any(|c| c.eq_ignore_ascii_case(category))
    }

    pub fn add_category(&self, category: impl Into<String>) {
        let category = category.into();
        let mut data = self.data.write();
        if !data.categories.contains(&category) {
            data.categories.push(category);
        }
    }

    pub fn keywords(&self) -> Vec<String> {
        self.data.read().keywords.clone()
    }

    pub fn priority(&self) -> i32 {
        self.data.read().priority
    }

    pub fn set_priority(&self, priority: i32) {
        self.data.write().priority = priority;
    }

    pub fn release_date(&self) -> Option<DateTime<Utc>> {
        self.data.read().release_date
    }

    pub fn set_release_date(&self, date: DateTime<Utc>) {
        self.data.write().release_date = Some(date);
    }

    pub fn progress(&self) -> Progress {
        self.data.read().progress
    }

    pub fn set_progress(&self, progress: Progress) {
        self.data.write().progress = progress;
    }

    pub fn metadata(&self, key: &str) -> Option<String> {
        self.data.read().metadata.get(key).cloned()
    }

    pub fn set_metadata(&self, key: impl Into<String>, value: impl Into<String>) {
        self.data.write().metadata.insert(key.into(), value.into());
    }

    /// Key used to group duplicates: `id[:source][:version]`.
    ///
    /// Returns `None` when none of the requested parts are known, in which
    /// case the app can never be a duplicate of anything.
    pub fn compound_key(&self, id: bool, source: bool, version: bool) -> Option<String> {
        let data = self.data.read();
        let mut parts: Vec<&str> = Vec::new();
        if id && !self.id.is_empty() {
            parts.push(&self.id);
        }
        if source {
            if let Some(s) = data.default_source.as_deref() {
                parts.push(s);
            }
        }
        if version {
            if let Some(v) = data.version.as_deref() {
                parts.push(v);
            }
        }
        if parts.is_empty() {
            None
        } else {
            Some(parts.join(":"))
        }
    }

    /// A plain-data copy suitable for printing or serializing.
    pub fn snapshot(&self) -> AppSnapshot {
        let data = self.data.read();
        AppSnapshot {
            id: self.id.clone(),
            kind: data.kind,
            state: data.state,
            name: data.name.clone(),
            summary: data.summary.clone(),
            version: data.version.clone(),
            origin: data.origin.clone(),
            license: data.license.clone(),
            management_backend: self.management_backend.get().cloned(),
            progress: data.progress.as_percent(),
            metadata: data.metadata.clone(),
        }
    }
}

impl fmt::Debug for App {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let data = self.data.read();
        f.debug_struct("App")
            .field("id", &self.id)
            .field("kind", &data.kind)
            .field("state", &data.state)
            .field("management_backend", &self.management_backend.get())
            .finish_non_exhaustive()
    }
}

/// Serializable view of an [`App`].
#[derive(Debug, Clone, Serialize)]
pub struct AppSnapshot {
    pub id: String,
    pub kind: AppKind,
    pub state: AppState,
    pub name: Option<String>,
    pub summary: Option<String>,
    pub version: Option<String>,
    pub origin: Option<String>,
    pub license: Option<String>,
    pub management_backend: Option<String>,
    pub progress: Option<u8>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, String>,
}

/// Builder for [`App`].
#[derive(Debug, Clone)]
pub struct AppBuilder {
    id: String,
    data: AppData,
}

impl AppBuilder {
    pub fn kind(mut self, kind: AppKind) -> Self {
        self.data.kind = kind;
        self
    }

    pub fn state(mut self, state: AppState) -> Self {
        self.data.state = state;
        self
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.data.name = Some(name.into());
        self
    }

    pub fn summary(mut self, summary: impl Into<String>) -> Self {
        self.data.summary = Some(summary.into());
        self
    }

    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.data.version = Some(version.into());
        self
    }

    pub fn default_source(mut self, source: impl Into<String>) -> Self {
        self.data.default_source = Some(source.into());
        self
    }

    pub fn origin(mut self, origin: impl Into<String>) -> Self {
        self.data.origin = Some(origin.into());
        self
    }

    pub fn license(mut self, license: impl Into<String>, is_free: bool) -> Self {
        self.data.license = Some(license.into());
        self.data.license_is_free = is_free;
        self
    }

    pub fn developer(mut self, developer: impl Into<String>) -> Self {
        self.data.developer = Some(developer.into());
        self
    }

    pub fn quirk(mut self, quirk: Quirk) -> Self {
        self.data.quirks.insert(quirk);
        self
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.data.categories.push(category.into());
        self
    }

    pub fn keyword(mut self, keyword: impl Into<String>) -> Self {
        self.data.keywords.push(keyword.into());
        self
    }

    pub fn priority(mut self, priority: i32) -> Self {
        self.data.priority = priority;
        self
    }

    pub fn arch(mut self, arch: impl Into<String>) -> Self {
        self.data.arch = Some(arch.into());
        self
    }

    pub fn release_date(mut self, date: DateTime<Utc>) -> Self {
        self.data.release_date = Some(date);
        self
    }

    pub fn metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.data.metadata.insert(key.into(), value.into());
        self
    }

    pub fn build(self) -> Arc<App> {
        Arc::new(App {
            id: self.id,
            management_backend: OnceLock::new(),
            data: RwLock::new(self.data),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_claim_only_once() {
        let app = App::builder("org.example.Editor").build();
        assert!(app.claim("flatpak"));
        assert!(!app.claim("packagekit"));
        assert_eq!(app.management_backend(), Some("flatpak"));
    }

    #[test]
    fn test_compound_key() {
        let app = App::builder("org.example.Editor")
            .default_source("editor")
            .version("1.2")
            .build();

        assert_eq!(
            app.compound_key(true, true, true).as_deref(),
            Some("org.example.Editor:editor:1.2")
        );
        assert_eq!(
            app.compound_key(true, false, true).as_deref(),
            Some("org.example.Editor:1.2")
        );
        assert_eq!(app.compound_key(false, false, false), None);
    }

    #[test]
    fn test_compound_key_missing_parts() {
        let app = App::builder("").build();
        assert_eq!(app.compound_key(true, true, true), None);
    }

    #[test]
    fn test_shared_mutation_visible_through_clones() {
        let app = App::builder("org.example.Editor")
            .state(AppState::Available)
            .build();
        let other = Arc::clone(&app);

        other.set_state(AppState::Installed);
        other.set_metadata("refined-by", "static");

        assert!(app.is_installed());
        assert_eq!(app.metadata("refined-by").as_deref(), Some("static"));
    }

    #[test]
    fn test_snapshot_serializes() {
        let app = App::builder("org.example.Editor")
            .kind(AppKind::DesktopApp)
            .state(AppState::Installed)
            .name("Editor")
            .build();
        app.set_progress(Progress::Percent(40));

        let json = serde_json::to_value(app.snapshot()).unwrap();
        assert_eq!(json["id"], "org.example.Editor");
        assert_eq!(json["kind"], "desktop_app");
        assert_eq!(json["progress"], 40);
        assert!(json.get("metadata").is_none());
    }
}
