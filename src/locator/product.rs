//! Product kinds and their on-disk layout.
//!
//! Every product kind is fully described by its filter set, the root it lives under,
//! and a handful of templates and regexes from [`crate::constants`]:
//!
//! | Kind        | Root  | Directory                           | File name                                                |
//! |-------------|-------|-------------------------------------|----------------------------------------------------------|
//! | `pfsDesign` | data  | `pfsDesign`                         | `pfsDesign-0x{pfsDesignId}.fits`                         |
//! | `pfsConfig` | data  | `pfsConfig/{date}`                  | `pfsConfig-0x{pfsDesignId}-{visit}.fits`                 |
//! | `pfsSingle` | rerun | `pfsSingle/{catId}/{tract}/{patch}` | `pfsSingle-{catId}-{tract}-{patch}-{objId}-{visit}.fits` |
//!
//! The `pfsConfig` observation date only appears in the directory name. Its path regex
//! therefore spans the parent directory, and a bare file name falls back to a regex
//! that extracts the remaining fields.

use crate::constants::{
    PFSCONFIG_DIR_FORMAT, PFSCONFIG_DIR_GLOB, PFSCONFIG_FILENAME_FORMAT, PFSCONFIG_FILENAME_GLOB,
    PFSCONFIG_FILENAME_REGEX, PFSCONFIG_PATH_REGEX, PFSDESIGN_DIR_FORMAT, PFSDESIGN_DIR_GLOB,
    PFSDESIGN_FILENAME_FORMAT, PFSDESIGN_FILENAME_GLOB, PFSDESIGN_FILENAME_REGEX,
    PFSSINGLE_DIR_FORMAT, PFSSINGLE_DIR_GLOB, PFSSINGLE_FILENAME_FORMAT, PFSSINGLE_FILENAME_GLOB,
    PFSSINGLE_FILENAME_REGEX,
};
use crate::core::{FinderError, Result};
use crate::filter::{Filter, FilterSet};
use crate::identity::Identity;
use crate::pattern::PathPattern;
use crate::template;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Which configured root directory a product lives under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RootKind {
    /// Raw and configuration products
    Data,
    /// Products of a reduction run
    Rerun,
}

impl fmt::Display for RootKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Data => "data",
            Self::Rerun => "rerun",
        })
    }
}

/// A data product kind known to the repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProductKind {
    #[serde(rename = "pfsDesign")]
    PfsDesign,
    #[serde(rename = "pfsConfig")]
    PfsConfig,
    #[serde(rename = "pfsSingle")]
    PfsSingle,
}

impl ProductKind {
    pub const ALL: [Self; 3] = [Self::PfsDesign, Self::PfsConfig, Self::PfsSingle];

    /// Canonical product name as it appears in directory and file names.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::PfsDesign => "pfsDesign",
            Self::PfsConfig => "pfsConfig",
            Self::PfsSingle => "pfsSingle",
        }
    }

    #[must_use]
    pub const fn root(self) -> RootKind {
        match self {
            Self::PfsDesign | Self::PfsConfig => RootKind::Data,
            Self::PfsSingle => RootKind::Rerun,
        }
    }

    /// Fresh, unconstrained filters for every identity field of this kind.
    #[must_use]
    pub fn filters(self) -> FilterSet {
        match self {
            Self::PfsDesign => FilterSet::new().with(Filter::hex("pfsDesignId", Some(16))),
            Self::PfsConfig => FilterSet::new()
                .with(Filter::hex("pfsDesignId", Some(16)))
                .with(Filter::int("visit", Some(6)))
                .with(Filter::date("date")),
            Self::PfsSingle => FilterSet::new()
                .with(Filter::int("catId", Some(5)))
                .with(Filter::int("tract", Some(5)))
                .with(Filter::string("patch"))
                .with(Filter::hex("objId", Some(16)))
                .with(Filter::int("visit", Some(6))),
        }
    }

    /// Filters recoverable from the file name alone, without its directory.
    #[must_use]
    pub fn filename_filters(self) -> FilterSet {
        match self {
            Self::PfsConfig => self.filters().iter().filter(|f| f.name() != "date").cloned().collect(),
            Self::PfsDesign | Self::PfsSingle => self.filters(),
        }
    }

    /// Look up a field by name across every product kind.
    #[must_use]
    pub fn field(name: &str) -> Option<Filter> {
        Self::ALL.iter().find_map(|kind| kind.filters().get(name).cloned())
    }

    #[must_use]
    pub const fn dir_glob(self) -> &'static str {
        match self {
            Self::PfsDesign => PFSDESIGN_DIR_GLOB,
            Self::PfsConfig => PFSCONFIG_DIR_GLOB,
            Self::PfsSingle => PFSSINGLE_DIR_GLOB,
        }
    }

    #[must_use]
    pub const fn dir_format(self) -> &'static str {
        match self {
            Self::PfsDesign => PFSDESIGN_DIR_FORMAT,
            Self::PfsConfig => PFSCONFIG_DIR_FORMAT,
            Self::PfsSingle => PFSSINGLE_DIR_FORMAT,
        }
    }

    #[must_use]
    pub const fn filename_glob(self) -> &'static str {
        match self {
            Self::PfsDesign => PFSDESIGN_FILENAME_GLOB,
            Self::PfsConfig => PFSCONFIG_FILENAME_GLOB,
            Self::PfsSingle => PFSSINGLE_FILENAME_GLOB,
        }
    }

    #[must_use]
    pub const fn filename_format(self) -> &'static str {
        match self {
            Self::PfsDesign => PFSDESIGN_FILENAME_FORMAT,
            Self::PfsConfig => PFSCONFIG_FILENAME_FORMAT,
            Self::PfsSingle => PFSSINGLE_FILENAME_FORMAT,
        }
    }

    #[must_use]
    pub const fn filename_regex(self) -> &'static str {
        match self {
            Self::PfsDesign => PFSDESIGN_FILENAME_REGEX,
            Self::PfsConfig => PFSCONFIG_FILENAME_REGEX,
            Self::PfsSingle => PFSSINGLE_FILENAME_REGEX,
        }
    }

    /// Regex applied to discovered paths: it captures every field of [`filters`](Self::filters).
    #[must_use]
    pub const fn search_regex(self) -> &'static str {
        match self {
            Self::PfsConfig => PFSCONFIG_PATH_REGEX,
            Self::PfsDesign | Self::PfsSingle => self.filename_regex(),
        }
    }

    pub fn search_pattern(self) -> Result<PathPattern> {
        PathPattern::new(self.search_regex())
    }

    /// Extract the identity encoded in `path`.
    ///
    /// A path with a directory component is matched with the search regex; a bare
    /// `pfsConfig` file name only yields the fields its name carries. A non-matching
    /// path fails with [`FinderError::FormatMismatch`].
    pub fn parse(self, path: &Path) -> Result<Identity> {
        let text = path.to_string_lossy();
        let bare = path.parent().is_none_or(|p| p.as_os_str().is_empty());

        let (pattern, filters) = if bare {
            (PathPattern::new(self.filename_regex())?, self.filename_filters())
        } else {
            (self.search_pattern()?, self.filters())
        };

        pattern.extract(&text, &filters, true)?.ok_or(FinderError::FormatMismatch {
            path: text.into_owned(),
        })
    }

    /// Render the directory, relative to the product's root, for a complete identity.
    pub fn dir_name(self, identity: &Identity) -> Result<String> {
        template::render(self.dir_format(), &self.formatted(identity)?)
    }

    /// Render the file name for an identity.
    pub fn file_name(self, identity: &Identity) -> Result<String> {
        template::render(self.filename_format(), &self.formatted(identity)?)
    }

    /// Names of this kind's fields that `identity` lacks.
    #[must_use]
    pub fn missing_fields(self, identity: &Identity) -> Vec<String> {
        self.filters().names().filter(|n| !identity.contains(n)).map(str::to_string).collect()
    }

    fn formatted(self, identity: &Identity) -> Result<HashMap<String, String>> {
        let mut values = HashMap::new();
        for filter in &self.filters() {
            if let Some(value) = identity.get(filter.name()) {
                values.insert(filter.name().to_string(), filter.format_value(value)?);
            }
        }
        Ok(values)
    }
}

impl fmt::Display for ProductKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ProductKind {
    type Err = FinderError;

    /// Accepts the canonical name case-insensitively, with or without the `pfs` prefix.
    fn from_str(s: &str) -> Result<Self> {
        let lower = s.trim().to_ascii_lowercase();
        let short = lower.strip_prefix("pfs").unwrap_or(&lower);
        match short {
            "design" => Ok(Self::PfsDesign),
            "config" => Ok(Self::PfsConfig),
            "single" => Ok(Self::PfsSingle),
            _ => Err(FinderError::invalid_query(format!(
                "unknown product '{s}' (expected one of pfsDesign, pfsConfig, pfsSingle)"
            ))),
        }
    }
}
