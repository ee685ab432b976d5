//! `parse` command

use super::common::{OutputFormat, print_identity};
use crate::locator::{ProductKind, Repository};
use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;

/// Show the identity encoded in a product path.
#[derive(Args, Debug, Clone)]
pub struct ParseCommand {
    /// Product kind: pfsDesign, pfsConfig or pfsSingle
    pub kind: ProductKind,

    /// File name or path to parse; the file need not exist
    pub path: PathBuf,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

impl ParseCommand {
    pub fn execute(self, repository: &Repository) -> Result<()> {
        let identity = repository
            .parse(self.kind, &self.path)
            .with_context(|| format!("Cannot parse {} as a {} path", self.path.display(), self.kind))?;
        print_identity(&identity, self.format)
    }
}
