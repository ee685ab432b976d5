//! Boundary between locating a product and reading it.
//!
//! The locator resolves *where* a product lives; what is done with the file is up to a
//! [`ProductLoader`]. Reading FITS contents is outside this crate, so the built-in
//! [`PathLoader`] simply hands back the resolved path.

use crate::identity::Identity;
use crate::locator::product::ProductKind;
use anyhow::Result;
use std::path::PathBuf;

/// Everything a loader needs to read one product.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadRequest {
    pub kind: ProductKind,
    /// Directory holding the file
    pub dir: PathBuf,
    /// Bare file name
    pub file_name: String,
    /// Complete identity of the product
    pub identity: Identity,
}

impl LoadRequest {
    #[must_use]
    pub fn path(&self) -> PathBuf {
        self.dir.join(&self.file_name)
    }
}

/// Reads a located product into some in-memory representation.
pub trait ProductLoader {
    type Output;

    fn load(&self, request: &LoadRequest) -> Result<Self::Output>;
}

/// Loader that returns the resolved path without touching the file.
#[derive(Debug, Clone, Copy, Default)]
pub struct PathLoader;

impl ProductLoader for PathLoader {
    type Output = PathBuf;

    fn load(&self, request: &LoadRequest) -> Result<PathBuf> {
        Ok(request.path())
    }
}

/// Loader that fails unless the resolved file exists.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExistingPathLoader;

impl ProductLoader for ExistingPathLoader {
    type Output = PathBuf;

    fn load(&self, request: &LoadRequest) -> Result<PathBuf> {
        let path = request.path();
        if !path.is_file() {
            anyhow::bail!("{} file does not exist: {}", request.kind, path.display());
        }
        Ok(path)
    }
}
