//! Post-processing applied to merged list-apps results.

use tracing::debug;

use crate::app::{App, AppKind, AppList, AppState, Quirk};
use crate::query::{
    AppQuery, DeveloperVerifiedType, LicenseType, RefineJobFlags, RefineRequire,
    RefineRequireFlags,
};

/// Desktop IDs of Qt/KDE apps superseded by other entries in the catalog.
const SUPERSEDED_IDS: &[&str] = &[
    "transmission-qt.desktop",
    "nntpgrab_qt.desktop",
    "gimagereader-qt4.desktop",
    "gimagereader-qt5.desktop",
    "nntpgrab_server_qt.desktop",
    "hotot-qt.desktop",
    "qalculate_kde.desktop",
    "kid3.desktop",
    "kchmviewer.desktop",
];

/// Apps that must never be shown, whatever their metadata says.
const IGNORED_IDS: &[&str] = &["gnome-system-monitor-kde.desktop"];

/// Refine requirements for a list-apps query.
///
/// A FOSS-only query needs license data to filter on, so it is requested
/// even when the caller did not ask for it.
pub(crate) fn required_refine_flags(query: &AppQuery) -> RefineRequireFlags {
    let mut flags = query.refine_require_flags().clone();
    if query.license_type() != LicenseType::Any && !flags.contains(RefineRequire::License) {
        flags.insert(RefineRequire::License);
    }
    flags
}

/// Whether an app is complete and appropriate enough to show.
pub(crate) fn is_valid(app: &App, flags: RefineJobFlags) -> bool {
    let kind = app.kind();
    let state = app.state();

    if kind == AppKind::Addon || kind == AppKind::ConsoleApp {
        return false;
    }
    if state == AppState::Unknown {
        return false;
    }
    if kind == AppKind::Unknown {
        return false;
    }
    if app.has_category("Blocklisted") {
        return false;
    }
    if app.has_quirk(Quirk::ParentalFilter) && !app.is_installed() {
        return false;
    }
    if app.has_quirk(Quirk::IsSource) {
        return false;
    }
    if kind == AppKind::Generic && !flags.allow_packages {
        return false;
    }
    if app.name().is_none() || app.summary().is_none() {
        return false;
    }
    if IGNORED_IDS.contains(&app.id()) {
        return false;
    }
    true
}

/// Whether an app can run on this machine.
pub(crate) fn is_compatible(app: &App) -> bool {
    match app.arch() {
        None => true,
        Some(arch) => matches!(arch.as_str(), "noarch" | "all") || arch == std::env::consts::ARCH,
    }
}

fn is_superseded(app: &App) -> bool {
    SUPERSEDED_IDS.contains(&app.id())
}

/// Non-application components and installed or updatable apps pass; other
/// apps need a free license.
pub(crate) fn is_foss(app: &App) -> bool {
    if !app.kind().is_application() {
        return true;
    }
    if matches!(
        app.state(),
        AppState::Installed | AppState::Updatable | AppState::UpdatableLive
    ) {
        return true;
    }
    app.license_is_free()
}

/// Whether an app belongs in an updates list: updatable, or mid-update.
pub(crate) fn is_for_update(app: &App) -> bool {
    app.is_updatable() || matches!(app.state(), AppState::Downloading | AppState::Installing)
}

/// Run the filter, dedupe, sort and truncate steps over a merged list.
pub(crate) fn post_process(mut list: AppList, query: &AppQuery) -> AppList {
    let job_flags = query.refine_job_flags();
    let before = list.len();

    if !job_flags.disable_filtering {
        list.retain(|app| is_valid(app, job_flags));
        list.retain(|app| !is_superseded(app) && is_compatible(app));

        if query.license_type() == LicenseType::FossOnly {
            list.retain(is_foss);
        }
        if query.developer_verified_type() == DeveloperVerifiedType::VerifiedOnly {
            list.retain(|app| app.has_quirk(Quirk::DeveloperVerified));
        }
    }

    if let Some(for_update) = query.is_for_update().as_bool() {
        if for_update {
            list.retain(is_for_update);
        } else {
            list.retain(|app| !app.is_updatable());
        }
    }

    if let Some(filter) = query.filter_func() {
        list.retain(|app| filter(app));
    }

    let dedupe_flags = query.dedupe_flags();
    if !dedupe_flags.is_empty() {
        list.filter_duplicates(dedupe_flags);
    }

    match query.sort_func() {
        Some(sort) => list.sort_by(|a, b| sort(a, b)),
        None => list.randomize(),
    }

    let max = query.max_results();
    if max > 0 && list.len() > max {
        list.truncate(max);
    }

    debug!(before, after = list.len(), "post-processed list results");
    list
}
