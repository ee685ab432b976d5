//! Arguments and output helpers shared by the CLI commands

use crate::core::FinderError;
use crate::discovery::{Discovery, QueryOverrides};
use crate::filter::Filter;
use crate::identity::Identity;
use crate::locator::ProductKind;
use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use serde::Serialize;
use std::path::Path;

/// Output format of a command.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// One line per file: path followed by its identity
    #[default]
    Text,
    /// Pretty-printed JSON
    Json,
}

/// Per-field query flags.
///
/// Each flag takes the textual query syntax. Flags are mapped to the field names used
/// in product paths (`--obj-id` is `objId`).
#[derive(Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldArgs {
    /// Design id (hex, `0x` prefix optional)
    #[arg(long, value_name = "QUERY")]
    pub pfs_design_id: Option<String>,

    /// Catalog id
    #[arg(long, value_name = "QUERY")]
    pub cat_id: Option<String>,

    /// Sky tract
    #[arg(long, value_name = "QUERY")]
    pub tract: Option<String>,

    /// Sky patch, e.g. `1,1` (matched literally)
    #[arg(long, value_name = "QUERY")]
    pub patch: Option<String>,

    /// Object id (hex, `0x` prefix optional)
    #[arg(long, value_name = "QUERY")]
    pub obj_id: Option<String>,

    /// Visit number
    #[arg(long, value_name = "QUERY")]
    pub visit: Option<String>,

    /// Observation date (YYYY-MM-DD)
    #[arg(long, value_name = "QUERY")]
    pub date: Option<String>,
}

impl FieldArgs {
    /// `(field name, flag, text)` for every flag that was given.
    fn given(&self) -> impl Iterator<Item = (&'static str, &'static str, &str)> {
        [
            ("pfsDesignId", "--pfs-design-id", &self.pfs_design_id),
            ("catId", "--cat-id", &self.cat_id),
            ("tract", "--tract", &self.tract),
            ("patch", "--patch", &self.patch),
            ("objId", "--obj-id", &self.obj_id),
            ("visit", "--visit", &self.visit),
            ("date", "--date", &self.date),
        ]
        .into_iter()
        .filter_map(|(name, flag, text)| text.as_deref().map(|t| (name, flag, t)))
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.given().next().is_none()
    }

    fn filter(kind: ProductKind, name: &str, flag: &str) -> Result<Filter> {
        kind.filters().get(name).cloned().ok_or_else(|| {
            FinderError::invalid_query(format!("{flag} does not apply to {kind} files")).into()
        })
    }

    /// Query overrides for a search over `kind`.
    pub fn overrides(&self, kind: ProductKind) -> Result<QueryOverrides> {
        let mut overrides = QueryOverrides::new();
        for (name, flag, text) in self.given() {
            let filter = Self::filter(kind, name, flag)?;
            let query = filter.parse_query(text).with_context(|| format!("Invalid {flag}"))?;
            overrides.insert(name.to_string(), query);
        }
        Ok(overrides)
    }

    /// Identity made of single values, or `None` when no flag was given.
    pub fn identity(&self, kind: ProductKind) -> Result<Option<Identity>> {
        if self.is_empty() {
            return Ok(None);
        }

        let mut identity = Identity::new();
        for (name, flag, text) in self.given() {
            let filter = Self::filter(kind, name, flag)?;
            let value = filter.parse_value(text).with_context(|| format!("Invalid {flag}"))?;
            identity.insert(name, value);
        }
        Ok(Some(identity))
    }
}

#[derive(Serialize)]
struct LocatedOutput<'a> {
    path: &'a Path,
    identity: &'a Identity,
}

/// Print a discovery result.
pub fn print_discovery(kind: ProductKind, found: &Discovery, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(found)?);
        }
        OutputFormat::Text => {
            if found.is_empty() {
                eprintln!("{}", format!("No {kind} files found").yellow());
            }
            for (path, identity) in found.iter() {
                println!("{}  {}", path.display(), identity.to_string().dimmed());
            }
        }
    }
    Ok(())
}

/// Print one located file.
pub fn print_located(path: &Path, identity: &Identity, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            let output = LocatedOutput {
                path,
                identity,
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Text => {
            println!("{}  {}", path.display(), identity.to_string().dimmed());
        }
    }
    Ok(())
}

/// Print an identity, one `name = value` per line.
pub fn print_identity(identity: &Identity, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(identity)?);
        }
        OutputFormat::Text => {
            for (name, value) in identity.iter() {
                println!("{} = {value}", name.bold());
            }
        }
    }
    Ok(())
}
