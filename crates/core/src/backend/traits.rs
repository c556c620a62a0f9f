//! Trait definitions for the backend module.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use super::error::BackendError;
use super::flags::{
    InstallAppsFlags, ListAppsFlags, ListDistroUpgradesFlags, RefineCategoriesFlags,
    RefreshMetadataFlags, UninstallAppsFlags, UpdateAppsFlags,
};
use super::reporter::OperationReporter;
use crate::app::AppList;
use crate::category::Category;
use crate::query::{AppQuery, RefineJobFlags, RefineRequireFlags};

/// Operations a backend may implement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    ListApps,
    Refine,
    RefineCategories,
    InstallApps,
    UninstallApps,
    UpdateApps,
    ListDistroUpgrades,
    RefreshMetadata,
}

impl Capability {
    pub const ALL: [Capability; 8] = [
        Capability::ListApps,
        Capability::Refine,
        Capability::RefineCategories,
        Capability::InstallApps,
        Capability::UninstallApps,
        Capability::UpdateApps,
        Capability::ListDistroUpgrades,
        Capability::RefreshMetadata,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Capability::ListApps => "list_apps",
            Capability::Refine => "refine",
            Capability::RefineCategories => "refine_categories",
            Capability::InstallApps => "install_apps",
            Capability::UninstallApps => "uninstall_apps",
            Capability::UpdateApps => "update_apps",
            Capability::ListDistroUpgrades => "list_distro_upgrades",
            Capability::RefreshMetadata => "refresh_metadata",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A data source that can answer catalog queries and manage apps.
///
/// Every operation is optional. Jobs only dispatch an operation to backends
/// whose [`Backend::supports`] returns true for it; the default bodies
/// return [`BackendError::NotSupported`].
///
/// Backends are shared between concurrently running jobs and must tolerate
/// concurrent calls.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Returns the unique name of this backend.
    fn name(&self) -> &str;

    /// Whether the backend is usable right now.
    fn enabled(&self) -> bool {
        true
    }

    /// Whether the backend implements `capability`.
    fn supports(&self, capability: Capability) -> bool;

    /// Names of backends that must be dispatched before this one.
    fn run_after(&self) -> Vec<String> {
        Vec::new()
    }

    /// Names of backends that must be dispatched after this one.
    fn run_before(&self) -> Vec<String> {
        Vec::new()
    }

    /// Returns the apps matching `query`.
    async fn list_apps(
        &self,
        _query: &AppQuery,
        _flags: ListAppsFlags,
        _cancellable: &CancellationToken,
    ) -> Result<AppList, BackendError> {
        Err(BackendError::not_supported(self.name(), "list_apps"))
    }

    /// Fills in the metadata named by `require` on the apps of `list`.
    async fn refine(
        &self,
        _list: &AppList,
        _job_flags: RefineJobFlags,
        _require: &RefineRequireFlags,
        _cancellable: &CancellationToken,
    ) -> Result<(), BackendError> {
        Err(BackendError::not_supported(self.name(), "refine"))
    }

    /// Adds this backend's counts to the category sizes.
    async fn refine_categories(
        &self,
        _categories: &[Arc<Category>],
        _flags: RefineCategoriesFlags,
        _cancellable: &CancellationToken,
    ) -> Result<(), BackendError> {
        Err(BackendError::not_supported(self.name(), "refine_categories"))
    }

    /// Installs the apps of `apps` this backend manages.
    async fn install_apps(
        &self,
        _apps: &AppList,
        _flags: InstallAppsFlags,
        _reporter: &OperationReporter,
        _cancellable: &CancellationToken,
    ) -> Result<(), BackendError> {
        Err(BackendError::not_supported(self.name(), "install_apps"))
    }

    /// Removes the apps of `apps` this backend manages.
    async fn uninstall_apps(
        &self,
        _apps: &AppList,
        _flags: UninstallAppsFlags,
        _reporter: &OperationReporter,
        _cancellable: &CancellationToken,
    ) -> Result<(), BackendError> {
        Err(BackendError::not_supported(self.name(), "uninstall_apps"))
    }

    /// Updates the apps of `apps` this backend manages.
    async fn update_apps(
        &self,
        _apps: &AppList,
        _flags: UpdateAppsFlags,
        _reporter: &OperationReporter,
        _cancellable: &CancellationToken,
    ) -> Result<(), BackendError> {
        Err(BackendError::not_supported(self.name(), "update_apps"))
    }

    /// Returns the operating system upgrades available.
    async fn list_distro_upgrades(
        &self,
        _flags: ListDistroUpgradesFlags,
        _cancellable: &CancellationToken,
    ) -> Result<AppList, BackendError> {
        Err(BackendError::not_supported(self.name(), "list_distro_upgrades"))
    }

    /// Brings cached metadata up to date if it is older than `cache_age`.
    ///
    /// A zero `cache_age` forces a refresh.
    async fn refresh_metadata(
        &self,
        _cache_age: Duration,
        _flags: RefreshMetadataFlags,
        _reporter: &OperationReporter,
        _cancellable: &CancellationToken,
    ) -> Result<(), BackendError> {
        Err(BackendError::not_supported(self.name(), "refresh_metadata"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct ListOnly;

    #[async_trait]
    impl Backend for ListOnly {
        fn name(&self) -> &str {
            "list-only"
        }

        fn supports(&self, capability: Capability) -> bool {
            capability == Capability::ListApps
        }

        async fn list_apps(
            &self,
            _query: &AppQuery,
            _flags: ListAppsFlags,
            _cancellable: &CancellationToken,
        ) -> Result<AppList, BackendError> {
            Ok(AppList::new())
        }
    }

    #[tokio::test]
    async fn test_unimplemented_operations_are_not_supported() {
        let backend = ListOnly;
        let token = CancellationToken::new();

        assert!(backend.supports(Capability::ListApps));
        assert!(!backend.supports(Capability::InstallApps));
        assert!(backend.enabled());

        let listed = backend
            .list_apps(&AppQuery::default(), ListAppsFlags::default(), &token)
            .await;
        assert!(listed.is_ok());

        let err = backend
            .list_distro_upgrades(ListDistroUpgradesFlags::default(), &token)
            .await
            .unwrap_err();
        assert!(err.is_not_supported());

        let err = backend
            .refresh_metadata(
                Duration::ZERO,
                RefreshMetadataFlags::default(),
                &OperationReporter::discard("list-only"),
                &token,
            )
            .await
            .unwrap_err();
        assert!(err.is_not_supported());
    }

    #[test]
    fn test_capability_serde_names_match_display() {
        for capability in Capability::ALL {
            let json = serde_json::to_string(&capability).unwrap();
            assert_eq!(json, format!("\"{}\"", capability));
        }
    }
}
