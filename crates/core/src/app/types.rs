use std::fmt;

use serde::{Deserialize, Serialize};

/// Installation state of an app.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppState {
    #[default]
    Unknown,
    Installed,
    Available,
    AvailableLocal,
    Updatable,
    UpdatableLive,
    Unavailable,
    Queued,
    Downloading,
    Installing,
    Removing,
    PendingInstall,
    PendingRemove,
}

impl AppState {
    /// Whether the app is present on the system, possibly with an update pending.
    pub fn is_installed(&self) -> bool {
        matches!(
            self,
            AppState::Installed
                | AppState::Updatable
                | AppState::UpdatableLive
                | AppState::Removing
                | AppState::PendingRemove
        )
    }

    /// Whether an update is available for the app.
    pub fn is_updatable(&self) -> bool {
        matches!(self, AppState::Updatable | AppState::UpdatableLive)
    }

    /// Whether an operation is currently running on the app.
    pub fn is_busy(&self) -> bool {
        matches!(
            self,
            AppState::Queued | AppState::Downloading | AppState::Installing | AppState::Removing
        )
    }
}

impl fmt::Display for AppState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AppState::Unknown => "unknown",
            AppState::Installed => "installed",
            AppState::Available => "available",
            AppState::AvailableLocal => "available-local",
            AppState::Updatable => "updatable",
            AppState::UpdatableLive => "updatable-live",
            AppState::Unavailable => "unavailable",
            AppState::Queued => "queued",
            AppState::Downloading => "downloading",
            AppState::Installing => "installing",
            AppState::Removing => "removing",
            AppState::PendingInstall => "pending-install",
            AppState::PendingRemove => "pending-remove",
        };
        f.pad(s)
    }
}

/// Component kind of an app.
///
/// Also used by queries to restrict results to a set of kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppKind {
    #[default]
    Unknown,
    /// A bare package that has not been matched to app metadata.
    Generic,
    DesktopApp,
    ConsoleApp,
    WebApp,
    Addon,
    Font,
    Codec,
    InputMethod,
    Firmware,
    Driver,
    Localization,
    Runtime,
    Repository,
    OsUpgrade,
}

impl AppKind {
    /// Kinds a user would think of as "an application".
    pub fn is_application(&self) -> bool {
        matches!(
            self,
            AppKind::Generic | AppKind::DesktopApp | AppKind::ConsoleApp | AppKind::WebApp
        )
    }
}

/// Extra per-app markers set by backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Quirk {
    /// The developer identity has been verified by the app's source.
    DeveloperVerified,
    /// Hidden by the parental controls policy.
    ParentalFilter,
    /// The entry describes source code rather than something installable.
    IsSource,
    /// Cannot be removed.
    Compulsory,
}

/// Progress of an operation: a percentage or the unknown sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Progress {
    #[default]
    Unknown,
    Percent(u8),
}

impl Progress {
    /// Build a percentage, clamping to 100.
    pub fn percent(value: u8) -> Self {
        Progress::Percent(value.min(100))
    }

    pub fn as_percent(&self) -> Option<u8> {
        match self {
            Progress::Unknown => None,
            Progress::Percent(p) => Some(*p),
        }
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, Progress::Unknown)
    }
}

impl fmt::Display for Progress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Progress::Unknown => write!(f, "unknown"),
            Progress::Percent(p) => write!(f, "{}%", p),
        }
    }
}

/// Something the user has to do before an operation can continue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "action")]
pub enum UserAction {
    /// Insert removable media with the given label.
    InsertMedia { label: String },
    /// Restart the system to finish applying changes.
    Reboot,
    /// Accept a license agreement.
    AcceptLicense { license: String },
    /// Free-form instruction from the backend.
    Other { message: String },
}

impl fmt::Display for UserAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UserAction::InsertMedia { label } => write!(f, "insert media '{}'", label),
            UserAction::Reboot => write!(f, "reboot"),
            UserAction::AcceptLicense { license } => write!(f, "accept license {}", license),
            UserAction::Other { message } => write!(f, "{}", message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_installed_states() {
        assert!(AppState::Installed.is_installed());
        assert!(AppState::Updatable.is_installed());
        assert!(AppState::UpdatableLive.is_installed());
        assert!(!AppState::Available.is_installed());
        assert!(!AppState::Unknown.is_installed());
    }

    #[test]
    fn test_progress_clamps() {
        assert_eq!(Progress::percent(150), Progress::Percent(100));
        assert_eq!(Progress::percent(42).as_percent(), Some(42));
        assert_eq!(Progress::Unknown.as_percent(), None);
    }

    #[test]
    fn test_state_serde_snake_case() {
        let json = serde_json::to_string(&AppState::UpdatableLive).unwrap();
        assert_eq!(json, "\"updatable_live\"");
    }
}
