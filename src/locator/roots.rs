//! Resolution of the data and rerun root directories.
//!
//! A root is resolved with a fixed precedence:
//!
//! 1. An explicit directory given for the call
//! 2. A directory inferred from a reference path: the path is scanned for a known
//!    anchor directory (`pfsConfig`, `pfsSingle`, ...) and everything before the first
//!    occurrence is taken as the root. Anchors are tried in list order.
//! 3. The configured default
//!
//! When inference from a reference path fails and the caller required it, resolution
//! fails with [`FinderError::DirectoryInference`]; otherwise a warning is logged and the
//! default is used.

use crate::constants::{DEFAULT_DATA_ANCHORS, DEFAULT_RERUN_ANCHORS};
use crate::core::{FinderError, Result};
use crate::locator::product::RootKind;
use crate::utils::absolutize;
use std::ffi::OsStr;
use std::path::{Component, Path, PathBuf};
use tracing::debug;

/// Configured roots and anchor directory lists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Roots {
    datadir: Option<PathBuf>,
    rerundir: Option<PathBuf>,
    data_anchors: Vec<String>,
    rerun_anchors: Vec<String>,
}

impl Default for Roots {
    fn default() -> Self {
        Self {
            datadir: None,
            rerundir: None,
            data_anchors: DEFAULT_DATA_ANCHORS.iter().map(ToString::to_string).collect(),
            rerun_anchors: DEFAULT_RERUN_ANCHORS.iter().map(ToString::to_string).collect(),
        }
    }
}

impl Roots {
    /// Roots with the given defaults and the standard anchor lists.
    ///
    /// A relative `rerundir` is interpreted relative to the data root in effect.
    pub fn new(datadir: Option<PathBuf>, rerundir: Option<PathBuf>) -> Self {
        Self {
            datadir,
            rerundir,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_data_anchors<I, S>(mut self, anchors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.data_anchors = anchors.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_rerun_anchors<I, S>(mut self, anchors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.rerun_anchors = anchors.into_iter().map(Into::into).collect();
        self
    }

    pub fn default_datadir(&self) -> Option<&Path> {
        self.datadir.as_deref()
    }

    pub fn default_rerundir(&self) -> Option<&Path> {
        self.rerundir.as_deref()
    }

    pub fn data_anchors(&self) -> &[String] {
        &self.data_anchors
    }

    pub fn rerun_anchors(&self) -> &[String] {
        &self.rerun_anchors
    }

    /// Resolve the data root.
    pub fn datadir(
        &self,
        explicit: Option<&Path>,
        reference: Option<&Path>,
        required: bool,
    ) -> Result<PathBuf> {
        if let Some(dir) = explicit {
            return Ok(absolutize(dir)?);
        }

        if let Some(root) = self.infer(RootKind::Data, reference, required)? {
            return Ok(root);
        }

        match &self.datadir {
            Some(dir) => Ok(absolutize(dir)?),
            None => Err(FinderError::DirectoryInference {
                root: RootKind::Data.to_string(),
                reason: "no data directory given and no default configured".to_string(),
            }),
        }
    }

    /// Resolve the rerun root.
    ///
    /// `explicit_datadir` is the data root given for the same call; a relative default
    /// rerun directory is joined onto it, or onto the default data root.
    pub fn rerundir(
        &self,
        explicit: Option<&Path>,
        explicit_datadir: Option<&Path>,
        reference: Option<&Path>,
        required: bool,
    ) -> Result<PathBuf> {
        if let Some(dir) = explicit {
            return Ok(absolutize(dir)?);
        }

        if let Some(root) = self.infer(RootKind::Rerun, reference, required)? {
            return Ok(root);
        }

        let Some(rerundir) = &self.rerundir else {
            return Err(FinderError::DirectoryInference {
                root: RootKind::Rerun.to_string(),
                reason: "no rerun directory given and no default configured".to_string(),
            });
        };

        if rerundir.is_absolute() {
            return Ok(rerundir.clone());
        }

        let base = match explicit_datadir.or(self.datadir.as_deref()) {
            Some(base) => base,
            None => {
                return Err(FinderError::DirectoryInference {
                    root: RootKind::Rerun.to_string(),
                    reason: format!(
                        "rerun directory '{}' is relative and no data directory is configured",
                        rerundir.display()
                    ),
                });
            }
        };
        Ok(absolutize(&base.join(rerundir))?)
    }

    fn infer(&self, root: RootKind, reference: Option<&Path>, required: bool) -> Result<Option<PathBuf>> {
        let Some(reference) = reference else {
            return Ok(None);
        };

        let anchors = match root {
            RootKind::Data => &self.data_anchors,
            RootKind::Rerun => &self.rerun_anchors,
        };

        if let Some(found) = infer_root(reference, anchors) {
            let found = absolutize(&found)?;
            debug!("Inferred {root} directory {} from {}", found.display(), reference.display());
            return Ok(Some(found));
        }

        let error = FinderError::DirectoryInference {
            root: root.to_string(),
            reason: format!(
                "none of [{}] appears in '{}'",
                anchors.join(", "),
                reference.display()
            ),
        };
        let inferred = error.soften(required)?;
        debug!("Falling back to the default {root} directory");
        Ok(inferred)
    }
}

/// The part of `reference` before the first occurrence of an anchor directory.
///
/// Anchors are tried in order; the first anchor present in the path wins even if a later
/// anchor occurs earlier in it. Returns `None` when no anchor occurs.
#[must_use]
pub fn infer_root(reference: &Path, anchors: &[String]) -> Option<PathBuf> {
    let components: Vec<Component<'_>> = reference.components().collect();

    anchors.iter().find_map(|anchor| {
        let position = components
            .iter()
            .position(|c| matches!(c, Component::Normal(name) if *name == OsStr::new(anchor)))?;
        Some(components[..position].iter().collect())
    })
}
