use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chrono::Datelike;
use sha2::{Digest, Sha256};
use tracing::debug;

use super::entity::App;

/// Which parts of an app make up its identity when removing duplicates.
///
/// The key is `id[:source][:version]` built from the enabled parts.
/// An empty set means "do not dedupe".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct DedupeFlags {
    pub id: bool,
    pub default_source: bool,
    pub version: bool,
    /// Between duplicates, an installed app beats one that is not.
    pub prefer_installed: bool,
}

impl DedupeFlags {
    pub const NONE: DedupeFlags = DedupeFlags {
        id: false,
        default_source: false,
        version: false,
        prefer_installed: false,
    };

    /// The flags callers usually want: id, default source and version.
    pub const fn default_for_callers() -> Self {
        DedupeFlags {
            id: true,
            default_source: true,
            version: true,
            prefer_installed: false,
        }
    }

    pub fn is_empty(&self) -> bool {
        !(self.id || self.default_source || self.version || self.prefer_installed)
    }
}

/// An ordered list of shared apps.
///
/// Merging lists concatenates them; duplicates are only removed by an
/// explicit [`AppList::filter_duplicates`].
#[derive(Debug, Clone, Default)]
pub struct AppList {
    apps: Vec<Arc<App>>,
    truncated: bool,
    randomized: bool,
}

impl AppList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.apps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.apps.is_empty()
    }

    pub fn push(&mut self, app: Arc<App>) {
        self.apps.push(app);
    }

    /// Append every app of `other`, keeping order.
    pub fn extend_from(&mut self, other: AppList) {
        self.apps.extend(other.apps);
    }

    pub fn get(&self, index: usize) -> Option<&Arc<App>> {
        self.apps.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Arc<App>> {
        self.apps.iter()
    }

    /// Find the first app with the given catalog ID.
    pub fn lookup(&self, id: &str) -> Option<&Arc<App>> {
        self.apps.iter().find(|app| app.id() == id)
    }

    pub fn ids(&self) -> Vec<String> {
        self.apps.iter().map(|app| app.id().to_string()).collect()
    }

    pub fn is_truncated(&self) -> bool {
        self.truncated
    }

    pub fn is_randomized(&self) -> bool {
        self.randomized
    }

    /// Keep only the apps for which `keep` returns true.
    pub fn retain<F>(&mut self, mut keep: F)
    where
        F: FnMut(&App) -> bool,
    {
        self.apps.retain(|app| keep(app.as_ref()));
    }

    pub fn sort_by<F>(&mut self, mut compare: F)
    where
        F: FnMut(&App, &App) -> Ordering,
    {
        self.apps.sort_by(|a, b| compare(a.as_ref(), b.as_ref()));
    }

    /// Keep at most `max` apps, dropping from the end.
    pub fn truncate(&mut self, max: usize) {
        if self.apps.len() > max {
            self.apps.truncate(max);
            self.truncated = true;
        }
    }

    /// Remove duplicates, keeping the best representative of each group.
    ///
    /// Apps are grouped by their compound key. Within a group an app replaces
    /// the current representative when it is installed and the
    /// representative is not (only with `prefer_installed`), or when it has
    /// a strictly higher priority. Apps without a key are always kept. The
    /// surviving apps keep their original relative order.
    pub fn filter_duplicates(&mut self, flags: DedupeFlags) {
        if flags.is_empty() {
            return;
        }

        let mut representatives: HashMap<String, usize> = HashMap::new();
        let mut kept: HashSet<usize> = HashSet::new();

        for (index, app) in self.apps.iter().enumerate() {
            let key = match app.compound_key(flags.id, flags.default_source, flags.version) {
                Some(key) => key,
                None => {
                    kept.insert(index);
                    continue;
                }
            };

            let Some(&found_index) = representatives.get(&key) else {
                representatives.insert(key, index);
                kept.insert(index);
                continue;
            };

            let found = &self.apps[found_index];
            if is_better(app, found, flags) {
                debug!(key = %key, "preferring later duplicate");
                representatives.insert(key, index);
                kept.remove(&found_index);
                kept.insert(index);
            } else {
                debug!(key = %key, "dropping duplicate");
            }
        }

        let mut index = 0;
        self.apps.retain(|_| {
            let keep = kept.contains(&index);
            index += 1;
            keep
        });
    }

    /// Shuffle the list with an order that stays the same for the whole day.
    pub fn randomize(&mut self) {
        let day = chrono::Local::now().ordinal();
        self.randomize_with_seed(day);
    }

    /// Shuffle deterministically: the same seed and the same apps always
    /// give the same order, regardless of the input order.
    pub fn randomize_with_seed(&mut self, seed: u32) {
        self.apps.sort_by_cached_key(|app| {
            let mut hasher = Sha256::new();
            hasher.update(seed.to_le_bytes());
            hasher.update(app.id().as_bytes());
            if let Some(source) = app.default_source() {
                hasher.update(source.as_bytes());
            }
            let digest = hasher.finalize();
            let mut key = [0u8; 8];
            key.copy_from_slice(&digest[..8]);
            u64::from_be_bytes(key)
        });
        self.randomized = true;
    }

    pub fn into_vec(self) -> Vec<Arc<App>> {
        self.apps
    }
}

fn is_better(candidate: &App, current: &App, flags: DedupeFlags) -> bool {
    if flags.prefer_installed {
        match (candidate.is_installed(), current.is_installed()) {
            (true, false) => return true,
            (false, true) => return false,
            _ => {}
        }
    }
    candidate.priority() > current.priority()
}

impl FromIterator<Arc<App>> for AppList {
    fn from_iter<I: IntoIterator<Item = Arc<App>>>(iter: I) -> Self {
        AppList {
            apps: iter.into_iter().collect(),
            ..Default::default()
        }
    }
}

impl From<Vec<Arc<App>>> for AppList {
    fn from(apps: Vec<Arc<App>>) -> Self {
        AppList {
            apps,
            ..Default::default()
        }
    }
}

impl IntoIterator for AppList {
    type Item = Arc<App>;
    type IntoIter = std::vec::IntoIter<Arc<App>>;

    fn into_iter(self) -> Self::IntoIter {
        self.apps.into_iter()
    }
}

impl<'a> IntoIterator for &'a AppList {
    type Item = &'a Arc<App>;
    type IntoIter = std::slice::Iter<'a, Arc<App>>;

    fn into_iter(self) -> Self::IntoIter {
        self.apps.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::AppState;

    fn app(id: &str, source: &str, priority: i32) -> Arc<App> {
        App::builder(id)
            .default_source(source)
            .priority(priority)
            .build()
    }

    #[test]
    fn test_merge_is_concatenation() {
        let mut a: AppList = vec![app("a", "a", 0)].into();
        let b: AppList = vec![app("a", "a", 0), app("b", "b", 0)].into();
        a.extend_from(b);
        assert_eq!(a.ids(), vec!["a", "a", "b"]);
    }

    #[test]
    fn test_dedupe_keeps_first_on_equal_priority() {
        let first = app("a", "pkg", 0);
        let mut list: AppList = vec![Arc::clone(&first), app("a", "pkg", 0)].into();

        list.filter_duplicates(DedupeFlags::default_for_callers());

        assert_eq!(list.len(), 1);
        assert!(Arc::ptr_eq(list.get(0).unwrap(), &first));
    }

    #[test]
    fn test_dedupe_prefers_higher_priority_and_keeps_order() {
        let low = app("a", "pkg", 0);
        let high = app("a", "pkg", 10);
        let mut list: AppList = vec![low, app("b", "b", 0), Arc::clone(&high)].into();

        list.filter_duplicates(DedupeFlags::default_for_callers());

        assert_eq!(list.ids(), vec!["b", "a"]);
        assert!(Arc::ptr_eq(list.get(1).unwrap(), &high));
    }

    #[test]
    fn test_dedupe_prefer_installed_beats_priority() {
        let installed = App::builder("a")
            .state(AppState::Installed)
            .priority(0)
            .build();
        let available = App::builder("a")
            .state(AppState::Available)
            .priority(100)
            .build();
        let mut list: AppList = vec![Arc::clone(&installed), available].into();

        let flags = DedupeFlags {
            id: true,
            prefer_installed: true,
            ..DedupeFlags::NONE
        };
        list.filter_duplicates(flags);

        assert_eq!(list.len(), 1);
        assert!(Arc::ptr_eq(list.get(0).unwrap(), &installed));
    }

    #[test]
    fn test_dedupe_keyless_apps_always_kept() {
        let mut list: AppList = vec![App::builder("").build(), App::builder("").build()].into();
        list.filter_duplicates(DedupeFlags::default_for_callers());
        assert_eq!(list.len(), 2);
    }

    #[test]
    fn test_dedupe_version_distinguishes() {
        let mut list: AppList = vec![
            App::builder("a").version("1").build(),
            App::builder("a").version("2").build(),
        ]
        .into();
        list.filter_duplicates(DedupeFlags::default_for_callers());
        assert_eq!(list.len(), 2);

        list.filter_duplicates(DedupeFlags {
            id: true,
            ..DedupeFlags::NONE
        });
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn test_dedupe_twice_is_unchanged() {
        let installed = App::builder("a")
            .default_source("pkg")
            .state(AppState::Installed)
            .priority(0)
            .build();
        let mut list: AppList = vec![
            app("a", "pkg", 50),
            app("b", "pkg", 0),
            App::builder("").build(),
            Arc::clone(&installed),
            app("b", "pkg", 5),
            App::builder("").build(),
            app("c", "flatpak", 0),
            app("c", "pkg", 0),
        ]
        .into();
        let flags = DedupeFlags {
            id: true,
            default_source: true,
            prefer_installed: true,
            ..DedupeFlags::NONE
        };

        list.filter_duplicates(flags);
        let first: Vec<Arc<App>> = list.iter().cloned().collect();
        assert_eq!(list.ids(), vec!["", "a", "b", "", "c", "c"]);
        assert!(Arc::ptr_eq(&first[1], &installed));

        list.filter_duplicates(flags);
        assert_eq!(list.len(), first.len());
        for (again, before) in list.iter().zip(&first) {
            assert!(Arc::ptr_eq(again, before));
        }
    }

    #[test]
    fn test_empty_flags_do_nothing() {
        let mut list: AppList = vec![app("a", "a", 0), app("a", "a", 0)].into();
        list.filter_duplicates(DedupeFlags::NONE);
        assert_eq!(list.len(), 2);
    }

    #[test]
    fn test_truncate_sets_flag_only_when_shortened() {
        let mut list: AppList = (0..5).map(|i| app(&i.to_string(), "s", 0)).collect();
        list.truncate(10);
        assert!(!list.is_truncated());
        list.truncate(3);
        assert!(list.is_truncated());
        assert_eq!(list.ids(), vec!["0", "1", "2"]);
    }

    #[test]
    fn test_randomize_is_stable_for_seed() {
        let apps: Vec<Arc<App>> = (0..20).map(|i| app(&format!("app{}", i), "s", 0)).collect();

        let mut a: AppList = apps.clone().into();
        let mut reversed = apps;
        reversed.reverse();
        let mut b: AppList = reversed.into();

        a.randomize_with_seed(123);
        b.randomize_with_seed(123);

        assert_eq!(a.ids(), b.ids());
        assert!(a.is_randomized());
    }

    #[test]
    fn test_randomize_differs_between_seeds() {
        let apps: Vec<Arc<App>> = (0..20).map(|i| app(&format!("app{}", i), "s", 0)).collect();
        let mut a: AppList = apps.clone().into();
        let mut b: AppList = apps.into();

        a.randomize_with_seed(1);
        b.randomize_with_seed(2);

        assert_ne!(a.ids(), b.ids());
    }
}
