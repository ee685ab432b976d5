//! `find` and `locate` commands

use super::common::{FieldArgs, OutputFormat, print_discovery, print_located};
use crate::locator::{FindQuery, ProductKind, Repository};
use anyhow::Result;
use clap::Args;
use std::path::PathBuf;

/// Search arguments shared by `find` and `locate`.
#[derive(Args, Debug, Clone)]
pub struct SearchArgs {
    /// Product kind: pfsDesign, pfsConfig or pfsSingle
    pub kind: ProductKind,

    #[command(flatten)]
    pub fields: FieldArgs,

    /// Infer the root directory from this path
    #[arg(long, value_name = "PATH")]
    pub reference: Option<PathBuf>,

    /// Fail instead of falling back to the default root when --reference has no
    /// recognizable anchor directory
    #[arg(long, requires = "reference")]
    pub require_inference: bool,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

impl SearchArgs {
    fn query(&self) -> Result<FindQuery> {
        Ok(FindQuery {
            reference_path: self.reference.clone(),
            require_inference: self.require_inference,
            fields: self.fields.overrides(self.kind)?,
            ..FindQuery::default()
        })
    }
}

/// List every product file matching a query.
#[derive(Args, Debug, Clone)]
pub struct FindCommand {
    #[command(flatten)]
    pub search: SearchArgs,
}

impl FindCommand {
    pub fn execute(self, repository: &Repository) -> Result<()> {
        let found = repository.find(self.search.kind, &self.search.query()?)?;
        print_discovery(self.search.kind, &found, self.search.format)
    }
}

/// Find exactly one product file matching a query.
#[derive(Args, Debug, Clone)]
pub struct LocateCommand {
    #[command(flatten)]
    pub search: SearchArgs,
}

impl LocateCommand {
    pub fn execute(self, repository: &Repository) -> Result<()> {
        let (path, identity) = repository.locate(self.search.kind, &self.search.query()?)?;
        print_located(&path, &identity, self.search.format)
    }
}
