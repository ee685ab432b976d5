//! Command-line interface for pfsfind.
//!
//! # Available Commands
//!
//! - `find` - List every product file matching a query
//! - `locate` - Find exactly one product file, failing on zero or several matches
//! - `parse` - Show the identity encoded in a product path
//! - `load` - Resolve a product from a file name or a complete identity
//!
//! # Usage
//!
//! ```bash
//! # All pfsConfig files of a visit range
//! pfsfind --datadir /data/pfs find pfsConfig --visit 100..105
//!
//! # The single pfsSingle file of an object, rooted next to a reference file
//! pfsfind locate pfsSingle --obj-id 0x2a --visit 123 \
//!     --reference /data/pfs/rerun/v1/pfsArm/2024-05-01/pfsArm-000123-b1.fits
//!
//! # Identity of a file as JSON
//! pfsfind parse pfsDesign pfsDesign-0x0000000000001234.fits --format json
//! ```
//!
//! Field flags take the textual query syntax: `*` for any value, `a,b,c` for a set,
//! `min..max` for an inclusive range, anything else for a single value.
//!
//! # Configuration
//!
//! Roots and defaults come from the configuration file, then `GAPIPE_DATADIR` /
//! `GAPIPE_RERUNDIR`, then `--datadir` / `--rerundir`; see [`crate::config`].

mod common;
mod find;
mod load;
mod parse;

pub use common::{FieldArgs, OutputFormat};
pub use find::{FindCommand, LocateCommand, SearchArgs};
pub use load::LoadCommand;
pub use parse::ParseCommand;

use crate::config::Settings;
use crate::locator::Repository;
use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Runtime configuration derived from the global flags.
///
/// Keeping it separate from [`Cli`] lets tests drive a command with an explicit
/// configuration instead of the process arguments.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    /// Tracing filter directive; `None` disables logging
    pub log_level: Option<String>,

    /// Configuration file to load instead of the default location
    pub config_path: Option<PathBuf>,

    /// Data root overriding configuration and environment
    pub datadir: Option<PathBuf>,

    /// Rerun root overriding configuration and environment
    pub rerundir: Option<PathBuf>,
}

impl CliConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Install the global tracing subscriber, writing to stderr.
    ///
    /// Only the first call in a process has an effect.
    pub fn init_logging(&self) {
        let Some(level) = &self.log_level else {
            return;
        };

        let filter = EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("warn"));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .try_init();
    }

    /// Load settings, layer the environment and the flags on top, and build the
    /// repository.
    pub fn load_repository(&self) -> Result<Repository> {
        let mut settings = Settings::load_with_optional(self.config_path.as_deref())?;
        settings.apply_env();

        if let Some(datadir) = &self.datadir {
            settings.datadir = Some(datadir.to_string_lossy().into_owned());
        }
        if let Some(rerundir) = &self.rerundir {
            settings.rerundir = Some(rerundir.to_string_lossy().into_owned());
        }

        debug!(
            "Data directory: {}, rerun directory: {}",
            settings.datadir.as_deref().unwrap_or("<unset>"),
            settings.rerundir.as_deref().unwrap_or("<unset>")
        );
        settings.repository()
    }
}

/// Locate PFS data products on disk.
#[derive(Parser, Debug)]
#[command(
    name = "pfsfind",
    about = "Locate PFS data products by their identity",
    version,
    long_about = "pfsfind searches a PFS data repository for design, configuration and \
                  single-object spectrum files by the identity encoded in their paths."
)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Show debug logging (glob expressions, candidate counts, root inference)
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Disable logging entirely
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Path to the configuration file
    ///
    /// Defaults to `$PFSFIND_CONFIG`, then `<config_dir>/pfsfind/config.toml`.
    #[arg(short, long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Data root directory (overrides config and GAPIPE_DATADIR)
    #[arg(long, global = true, value_name = "DIR")]
    datadir: Option<PathBuf>,

    /// Rerun root directory, absolute or relative to the data root (overrides config and
    /// GAPIPE_RERUNDIR)
    #[arg(long, global = true, value_name = "DIR")]
    rerundir: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List every product file matching a query
    Find(FindCommand),

    /// Find exactly one product file matching a query
    Locate(LocateCommand),

    /// Show the identity encoded in a product path
    Parse(ParseCommand),

    /// Resolve a product from a file name or a complete identity
    Load(LoadCommand),
}

impl Cli {
    /// Execute the parsed command with configuration from the global flags.
    pub fn execute(self) -> Result<()> {
        let config = self.build_config();
        self.execute_with_config(config)
    }

    /// Translate the global flags into a [`CliConfig`].
    ///
    /// `--verbose` selects `debug`, `--quiet` disables logging, otherwise `RUST_LOG` is
    /// honored with `warn` as the fallback.
    #[must_use]
    pub fn build_config(&self) -> CliConfig {
        let log_level = if self.verbose {
            Some("debug".to_string())
        } else if self.quiet {
            None
        } else {
            Some(
                std::env::var("RUST_LOG")
                    .ok()
                    .filter(|v| !v.is_empty())
                    .unwrap_or_else(|| "warn".to_string()),
            )
        };

        CliConfig {
            log_level,
            config_path: self.config.clone(),
            datadir: self.datadir.clone(),
            rerundir: self.rerundir.clone(),
        }
    }

    /// Execute with an explicit configuration.
    pub fn execute_with_config(self, config: CliConfig) -> Result<()> {
        config.init_logging();

        let repository = config.load_repository()?;
        match self.command {
            Commands::Find(cmd) => cmd.execute(&repository),
            Commands::Locate(cmd) => cmd.execute(&repository),
            Commands::Parse(cmd) => cmd.execute(&repository),
            Commands::Load(cmd) => cmd.execute(&repository),
        }
    }
}
