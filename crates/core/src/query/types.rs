use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Three-valued query criterion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tristate {
    #[default]
    Unset,
    False,
    True,
}

impl Tristate {
    pub fn is_set(&self) -> bool {
        !matches!(self, Tristate::Unset)
    }

    /// `None` when unset.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Tristate::Unset => None,
            Tristate::False => Some(false),
            Tristate::True => Some(true),
        }
    }
}

impl From<bool> for Tristate {
    fn from(value: bool) -> Self {
        if value {
            Tristate::True
        } else {
            Tristate::False
        }
    }
}

impl From<Option<bool>> for Tristate {
    fn from(value: Option<bool>) -> Self {
        value.map(Tristate::from).unwrap_or_default()
    }
}

/// What a provides-tag refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProvidesType {
    #[default]
    PackageName,
    Codec,
    Font,
    MimeHandler,
    Driver,
    PlasmaId,
}

impl fmt::Display for ProvidesType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ProvidesType::PackageName => "package-name",
            ProvidesType::Codec => "codec",
            ProvidesType::Font => "font",
            ProvidesType::MimeHandler => "mime-handler",
            ProvidesType::Driver => "driver",
            ProvidesType::PlasmaId => "plasma-id",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LicenseType {
    #[default]
    Any,
    FossOnly,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeveloperVerifiedType {
    #[default]
    Any,
    VerifiedOnly,
}

/// Flags controlling how a refine runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct RefineJobFlags {
    /// The user is waiting on the result.
    pub interactive: bool,
    /// Skip the validity filter after refining.
    pub disable_filtering: bool,
    /// Keep bare packages that were not matched to app metadata.
    pub allow_packages: bool,
}

/// A piece of app metadata a refine can be asked to fill in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RefineRequire {
    Id,
    License,
    Url,
    Description,
    Size,
    Rating,
    Version,
    History,
    SetupAction,
    UpdateDetails,
    Origin,
    Icon,
    Categories,
    Developer,
    Permissions,
}

/// Set of metadata requirements for a refine.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct RefineRequireFlags(BTreeSet<RefineRequire>);

impl RefineRequireFlags {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, require: RefineRequire) -> Self {
        self.0.insert(require);
        self
    }

    pub fn insert(&mut self, require: RefineRequire) {
        self.0.insert(require);
    }

    pub fn contains(&self, require: RefineRequire) -> bool {
        self.0.contains(&require)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = RefineRequire> + '_ {
        self.0.iter().copied()
    }

    pub fn union(&self, other: &RefineRequireFlags) -> RefineRequireFlags {
        RefineRequireFlags(self.0.union(&other.0).copied().collect())
    }
}

impl FromIterator<RefineRequire> for RefineRequireFlags {
    fn from_iter<I: IntoIterator<Item = RefineRequire>>(iter: I) -> Self {
        RefineRequireFlags(iter.into_iter().collect())
    }
}

impl<const N: usize> From<[RefineRequire; N]> for RefineRequireFlags {
    fn from(flags: [RefineRequire; N]) -> Self {
        flags.into_iter().collect()
    }
}
