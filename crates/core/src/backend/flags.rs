/// Flags for `list_apps`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ListAppsFlags {
    pub interactive: bool,
}

/// Flags for `refine_categories`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefineCategoriesFlags {
    pub interactive: bool,
    /// Count apps per category.
    pub size: bool,
}

impl Default for RefineCategoriesFlags {
    fn default() -> Self {
        Self {
            interactive: false,
            size: true,
        }
    }
}

/// Flags for `install_apps`.
///
/// `no_download` and `no_apply` are mutually exclusive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InstallAppsFlags {
    pub interactive: bool,
    /// Only apply what was downloaded earlier.
    pub no_download: bool,
    /// Only download; apply later.
    pub no_apply: bool,
}

/// Flags for `uninstall_apps`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UninstallAppsFlags {
    pub interactive: bool,
}

/// Flags for `update_apps`.
///
/// `no_download` and `no_apply` are mutually exclusive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpdateAppsFlags {
    pub interactive: bool,
    pub no_download: bool,
    pub no_apply: bool,
}

/// Flags for `list_distro_upgrades`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ListDistroUpgradesFlags {
    pub interactive: bool,
}

/// Flags for `refresh_metadata`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RefreshMetadataFlags {
    pub interactive: bool,
}
