//! `load` command

use super::common::{FieldArgs, OutputFormat, print_located};
use crate::locator::{PathLoader, ProductKind, Repository};
use anyhow::Result;
use clap::Args;
use std::path::PathBuf;

/// Resolve a product from a file name or from its identity.
///
/// Exactly one of `--file` and the field flags must be given. A `pfsConfig` identity
/// may omit `--date`; it is recovered from the directory tree.
#[derive(Args, Debug, Clone)]
pub struct LoadCommand {
    /// Product kind: pfsDesign, pfsConfig or pfsSingle
    pub kind: ProductKind,

    /// File name or path of the product
    #[arg(long, value_name = "PATH")]
    pub file: Option<PathBuf>,

    #[command(flatten)]
    pub fields: FieldArgs,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

impl LoadCommand {
    pub fn execute(self, repository: &Repository) -> Result<()> {
        let identity = self.fields.identity(self.kind)?;
        let (path, identity) =
            repository.load(self.kind, self.file.as_deref(), identity.as_ref(), &PathLoader)?;
        print_located(&path, &identity, self.format)
    }
}
