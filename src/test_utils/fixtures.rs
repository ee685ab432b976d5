//! On-disk repository fixtures

use crate::constants::DATE_FORMAT;
use crate::filter::FieldValue;
use crate::identity::Identity;
use crate::locator::ProductKind;
use anyhow::{Context, Result};
use chrono::NaiveDate;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Temporary data repository.
///
/// Product files are created empty at the path the locator renders for their identity,
/// so a fixture and a lookup always agree on the layout. Rerun products live under
/// `<root>/rerun/<name>`.
#[derive(Debug)]
pub struct DataTree {
    temp: TempDir,
}

impl DataTree {
    pub fn new() -> Result<Self> {
        Ok(Self {
            temp: TempDir::new().context("Failed to create temporary data tree")?,
        })
    }

    /// The data root.
    #[must_use]
    pub fn root(&self) -> &Path {
        self.temp.path()
    }

    /// Root of the named rerun.
    #[must_use]
    pub fn rerun(&self, name: &str) -> PathBuf {
        self.root().join("rerun").join(name)
    }

    /// Create an empty file at `rel` below the data root, with its parents.
    pub fn touch(&self, rel: impl AsRef<Path>) -> Result<PathBuf> {
        let path = self.root().join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        fs::write(&path, "").with_context(|| format!("Failed to create {}", path.display()))?;
        Ok(path)
    }

    /// Create the file of a product below `base`.
    pub fn product(&self, base: &Path, kind: ProductKind, identity: &Identity) -> Result<PathBuf> {
        let rel = Path::new(&kind.dir_name(identity)?).join(kind.file_name(identity)?);
        let path = base.strip_prefix(self.root()).unwrap_or(base).join(rel);
        self.touch(path)
    }

    pub fn design(&self, pfs_design_id: u64) -> Result<PathBuf> {
        let identity = Identity::new().with("pfsDesignId", FieldValue::Hex(pfs_design_id));
        self.product(self.root(), ProductKind::PfsDesign, &identity)
    }

    /// `date` is `YYYY-MM-DD`.
    pub fn config(&self, date: &str, pfs_design_id: u64, visit: i64) -> Result<PathBuf> {
        let date = NaiveDate::parse_from_str(date, DATE_FORMAT)
            .with_context(|| format!("Invalid fixture date '{date}'"))?;
        let identity = Identity::new()
            .with("pfsDesignId", FieldValue::Hex(pfs_design_id))
            .with("visit", visit)
            .with("date", date);
        self.product(self.root(), ProductKind::PfsConfig, &identity)
    }

    pub fn single(
        &self,
        rerun: &str,
        cat_id: i64,
        tract: i64,
        patch: &str,
        obj_id: u64,
        visit: i64,
    ) -> Result<PathBuf> {
        let identity = Identity::new()
            .with("catId", cat_id)
            .with("tract", tract)
            .with("patch", patch)
            .with("objId", FieldValue::Hex(obj_id))
            .with("visit", visit);
        self.product(&self.rerun(rerun), ProductKind::PfsSingle, &identity)
    }
}
