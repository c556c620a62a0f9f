use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};

use super::types::{
    DeveloperVerifiedType, LicenseType, ProvidesType, RefineJobFlags, RefineRequireFlags,
    Tristate,
};
use crate::app::{App, AppKind, DedupeFlags};
use crate::category::Category;

/// Caller-supplied ordering for list results.
pub type AppSortFn = Arc<dyn Fn(&App, &App) -> Ordering + Send + Sync>;

/// Caller-supplied predicate; apps for which it returns false are dropped.
pub type AppFilterFn = Arc<dyn Fn(&App) -> bool + Send + Sync>;

/// Immutable description of which apps a list job should return.
///
/// Every criterion defaults to unset. Build one with [`AppQuery::builder`].
/// Cloning is cheap; referenced apps, categories and callbacks are shared.
#[derive(Clone, Default)]
pub struct AppQuery {
    is_curated: Tristate,
    is_featured: Tristate,
    is_installed: Tristate,
    is_for_update: Tristate,
    is_historical_update: Tristate,
    category: Option<Arc<Category>>,
    keywords: Vec<String>,
    developers: Vec<String>,
    provides_tag: Option<String>,
    provides_type: ProvidesType,
    released_since: Option<DateTime<Utc>>,
    alternate_of: Option<Arc<App>>,
    license_type: LicenseType,
    developer_verified_type: DeveloperVerifiedType,
    is_langpack_for_locale: Option<String>,
    component_kinds: Vec<AppKind>,
    max_results: usize,
    dedupe_flags: DedupeFlags,
    sort_func: Option<AppSortFn>,
    filter_func: Option<AppFilterFn>,
    refine_job_flags: RefineJobFlags,
    refine_require_flags: RefineRequireFlags,
}

impl AppQuery {
    pub fn builder() -> AppQueryBuilder {
        AppQueryBuilder::default()
    }

    pub fn is_curated(&self) -> Tristate {
        self.is_curated
    }

    pub fn is_featured(&self) -> Tristate {
        self.is_featured
    }

    pub fn is_installed(&self) -> Tristate {
        self.is_installed
    }

    pub fn is_for_update(&self) -> Tristate {
        self.is_for_update
    }

    pub fn is_historical_update(&self) -> Tristate {
        self.is_historical_update
    }

    pub fn category(&self) -> Option<&Arc<Category>> {
        self.category.as_ref()
    }

    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    pub fn developers(&self) -> &[String] {
        &self.developers
    }

    /// The provides-tag and what kind of thing it names.
    pub fn provides(&self) -> Option<(ProvidesType, &str)> {
        self.provides_tag
            .as_deref()
            .map(|tag| (self.provides_type, tag))
    }

    pub fn released_since(&self) -> Option<DateTime<Utc>> {
        self.released_since
    }

    pub fn alternate_of(&self) -> Option<&Arc<App>> {
        self.alternate_of.as_ref()
    }

    pub fn license_type(&self) -> LicenseType {
        self.license_type
    }

    pub fn developer_verified_type(&self) -> DeveloperVerifiedType {
        self.developer_verified_type
    }

    pub fn is_langpack_for_locale(&self) -> Option<&str> {
        self.is_langpack_for_locale.as_deref()
    }

    pub fn component_kinds(&self) -> &[AppKind] {
        &self.component_kinds
    }

    /// Maximum number of results; 0 means unlimited.
    pub fn max_results(&self) -> usize {
        self.max_results
    }

    pub fn dedupe_flags(&self) -> DedupeFlags {
        self.dedupe_flags
    }

    pub fn sort_func(&self) -> Option<&AppSortFn> {
        self.sort_func.as_ref()
    }

    pub fn filter_func(&self) -> Option<&AppFilterFn> {
        self.filter_func.as_ref()
    }

    pub fn refine_job_flags(&self) -> RefineJobFlags {
        self.refine_job_flags
    }

    pub fn refine_require_flags(&self) -> &RefineRequireFlags {
        &self.refine_require_flags
    }

    /// Number of result-determining criteria that are set.
    ///
    /// Backends that only handle one kind of query use this to reject
    /// anything more complex. Result shaping (limits, dedupe, sort, filter,
    /// license and verification filters, refine flags) is not counted.
    pub fn n_properties_set(&self) -> usize {
        [
            self.is_curated.is_set(),
            self.is_featured.is_set(),
            self.is_installed.is_set(),
            self.is_for_update.is_set(),
            self.is_historical_update.is_set(),
            self.category.is_some(),
            !self.keywords.is_empty(),
            !self.developers.is_empty(),
            self.provides_tag.is_some(),
            self.released_since.is_some(),
            self.alternate_of.is_some(),
            self.is_langpack_for_locale.is_some(),
            !self.component_kinds.is_empty(),
        ]
        .into_iter()
        .filter(|set| *set)
        .count()
    }
}

impl fmt::Debug for AppQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppQuery")
            .field("is_curated", &self.is_curated)
            .field("is_featured", &self.is_featured)
            .field("is_installed", &self.is_installed)
            .field("is_for_update", &self.is_for_update)
            .field("is_historical_update", &self.is_historical_update)
            .field("category", &self.category.as_ref().map(|c| c.id().to_string()))
            .field("keywords", &self.keywords)
            .field("developers", &self.developers)
            .field("provides_tag", &self.provides_tag)
            .field("provides_type", &self.provides_type)
            .field("released_since", &self.released_since)
            .field("alternate_of", &self.alternate_of.as_ref().map(|a| a.id().to_string()))
            .field("license_type", &self.license_type)
            .field("developer_verified_type", &self.developer_verified_type)
            .field("is_langpack_for_locale", &self.is_langpack_for_locale)
            .field("component_kinds", &self.component_kinds)
            .field("max_results", &self.max_results)
            .field("dedupe_flags", &self.dedupe_flags)
            .field("sort_func", &self.sort_func.as_ref().map(|_| "<fn>"))
            .field("filter_func", &self.filter_func.as_ref().map(|_| "<fn>"))
            .field("refine_job_flags", &self.refine_job_flags)
            .field("refine_require_flags", &self.refine_require_flags)
            .finish()
    }
}

/// Builder for [`AppQuery`].
#[derive(Default)]
pub struct AppQueryBuilder {
    query: AppQuery,
}

impl AppQueryBuilder {
    pub fn is_curated(mut self, value: impl Into<Tristate>) -> Self {
        self.query.is_curated = value.into();
        self
    }

    pub fn is_featured(mut self, value: impl Into<Tristate>) -> Self {
        self.query.is_featured = value.into();
        self
    }

    pub fn is_installed(mut self, value: impl Into<Tristate>) -> Self {
        self.query.is_installed = value.into();
        self
    }

    pub fn is_for_update(mut self, value: impl Into<Tristate>) -> Self {
        self.query.is_for_update = value.into();
        self
    }

    pub fn is_historical_update(mut self, value: impl Into<Tristate>) -> Self {
        self.query.is_historical_update = value.into();
        self
    }

    pub fn category(mut self, category: Arc<Category>) -> Self {
        self.query.category = Some(category);
        self
    }

    pub fn keywords<I, S>(mut self, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.query.keywords = keywords.into_iter().map(Into::into).collect();
        self
    }

    pub fn developers<I, S>(mut self, developers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.query.developers = developers.into_iter().map(Into::into).collect();
        self
    }

    pub fn provides(mut self, provides_type: ProvidesType, tag: impl Into<String>) -> Self {
        self.query.provides_type = provides_type;
        self.query.provides_tag = Some(tag.into());
        self
    }

    pub fn released_since(mut self, since: DateTime<Utc>) -> Self {
        self.query.released_since = Some(since);
        self
    }

    pub fn alternate_of(mut self, app: Arc<App>) -> Self {
        self.query.alternate_of = Some(app);
        self
    }

    pub fn license_type(mut self, license_type: LicenseType) -> Self {
        self.query.license_type = license_type;
        self
    }

    pub fn developer_verified_type(mut self, verified: DeveloperVerifiedType) -> Self {
        self.query.developer_verified_type = verified;
        self
    }

    pub fn is_langpack_for_locale(mut self, locale: impl Into<String>) -> Self {
        self.query.is_langpack_for_locale = Some(locale.into());
        self
    }

    pub fn component_kinds(mut self, kinds: impl IntoIterator<Item = AppKind>) -> Self {
        self.query.component_kinds = kinds.into_iter().collect();
        self
    }

    pub fn max_results(mut self, max: usize) -> Self {
        self.query.max_results = max;
        self
    }

    pub fn dedupe_flags(mut self, flags: DedupeFlags) -> Self {
        self.query.dedupe_flags = flags;
        self
    }

    pub fn sort_func<F>(mut self, sort: F) -> Self
    where
        F: Fn(&App, &App) -> Ordering + Send + Sync + 'static,
    {
        self.query.sort_func = Some(Arc::new(sort));
        self
    }

    pub fn filter_func<F>(mut self, filter: F) -> Self
    where
        F: Fn(&App) -> bool + Send + Sync + 'static,
    {
        self.query.filter_func = Some(Arc::new(filter));
        self
    }

    pub fn refine_job_flags(mut self, flags: RefineJobFlags) -> Self {
        self.query.refine_job_flags = flags;
        self
    }

    pub fn refine_require_flags(mut self, flags: RefineRequireFlags) -> Self {
        self.query.refine_require_flags = flags;
        self
    }

    pub fn build(self) -> AppQuery {
        self.query
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_query_has_no_properties() {
        let query = AppQuery::builder().build();
        assert_eq!(query.n_properties_set(), 0);
        assert_eq!(query.max_results(), 0);
        assert!(query.dedupe_flags().is_empty());
    }

    #[test]
    fn test_n_properties_counts_criteria_only() {
        let query = AppQuery::builder()
            .is_for_update(true)
            .keywords(["editor"])
            .max_results(10)
            .license_type(LicenseType::FossOnly)
            .dedupe_flags(DedupeFlags::default_for_callers())
            .build();
        assert_eq!(query.n_properties_set(), 2);
    }

    #[test]
    fn test_false_tristate_counts_as_set() {
        let query = AppQuery::builder().is_installed(false).build();
        assert_eq!(query.n_properties_set(), 1);
        assert_eq!(query.is_installed(), Tristate::False);
    }

    #[test]
    fn test_empty_keywords_not_counted() {
        let query = AppQuery::builder()
            .keywords(Vec::<String>::new())
            .build();
        assert_eq!(query.n_properties_set(), 0);
    }

    #[test]
    fn test_provides_accessor() {
        let query = AppQuery::builder()
            .provides(ProvidesType::MimeHandler, "image/png")
            .build();
        assert_eq!(
            query.provides(),
            Some((ProvidesType::MimeHandler, "image/png"))
        );
        assert_eq!(query.n_properties_set(), 1);
    }
}
