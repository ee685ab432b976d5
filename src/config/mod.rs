//! User configuration for pfsfind.
//!
//! Settings come from three layers, later layers overriding earlier ones:
//!
//! 1. The configuration file (`<config_dir>/pfsfind/config.toml`, or the file named by
//!    `PFSFIND_CONFIG`)
//! 2. The environment: `GAPIPE_DATADIR` and `GAPIPE_RERUNDIR`
//! 3. Command-line flags, applied by the CLI
//!
//! A missing default configuration file is not an error; every key is optional.
//!
//! # File Format
//!
//! ```toml
//! datadir = "~/pfs/data"
//! # Relative rerun directories are resolved against the data directory
//! rerundir = "rerun/weekly"
//!
//! data_anchors = ["rerun", "pfsConfig", "pfsDesign"]
//! rerun_anchors = ["pfsArm", "pfsMerged", "pfsSingle", "pfsObject", "pfsGAObject"]
//!
//! # Default queries applied to every search, in the textual query syntax
//! [defaults]
//! catId = "1"
//! visit = "100..200"
//! ```
//!
//! Paths go through `~/` and `$VAR` expansion before use.

use crate::constants::{
    CONFIG_PATH_ENV, DATADIR_ENV, DEFAULT_DATA_ANCHORS, DEFAULT_RERUN_ANCHORS, RERUNDIR_ENV,
};
use crate::core::FinderError;
use crate::locator::{FieldDefaults, ProductKind, Repository, Roots};
use crate::utils::expand_path;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

fn default_data_anchors() -> Vec<String> {
    DEFAULT_DATA_ANCHORS.iter().map(ToString::to_string).collect()
}

fn default_rerun_anchors() -> Vec<String> {
    DEFAULT_RERUN_ANCHORS.iter().map(ToString::to_string).collect()
}

/// Contents of the configuration file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    /// Default data root
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub datadir: Option<String>,

    /// Default rerun root; relative values are joined onto the data root
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rerundir: Option<String>,

    /// Directory names marking the level directly below the data root
    #[serde(default = "default_data_anchors")]
    pub data_anchors: Vec<String>,

    /// Directory names marking the level directly below a rerun root
    #[serde(default = "default_rerun_anchors")]
    pub rerun_anchors: Vec<String>,

    /// Default query per field name, in the textual query syntax
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub defaults: BTreeMap<String, String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            datadir: None,
            rerundir: None,
            data_anchors: default_data_anchors(),
            rerun_anchors: default_rerun_anchors(),
            defaults: BTreeMap::new(),
        }
    }
}

impl Settings {
    /// Load the configuration from its default location, or defaults if there is no file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load() -> Result<Self> {
        let path = Self::default_path()?;
        if path.exists() {
            Self::load_from(&path)
        } else {
            debug!("No configuration file at {}; using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Load from an explicitly named file, or from the default location when `None`.
    ///
    /// Unlike the default location, an explicitly named file must exist.
    pub fn load_with_optional(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load_from(path),
            None => Self::load(),
        }
    }

    /// Load the configuration from a specific file.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read configuration from {}", path.display()))?;

        let settings = toml::from_str(&content)
            .with_context(|| format!("Failed to parse configuration from {}", path.display()))?;
        debug!("Loaded configuration from {}", path.display());
        Ok(settings)
    }

    /// Location of the configuration file: `PFSFIND_CONFIG` if set, otherwise
    /// `<config_dir>/pfsfind/config.toml`.
    pub fn default_path() -> Result<PathBuf> {
        if let Some(path) = std::env::var_os(CONFIG_PATH_ENV).filter(|p| !p.is_empty()) {
            return Ok(PathBuf::from(path));
        }

        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Unable to determine configuration directory"))?;
        Ok(config_dir.join("pfsfind").join("config.toml"))
    }

    /// Override the roots from `GAPIPE_DATADIR` and `GAPIPE_RERUNDIR`.
    pub fn apply_env(&mut self) {
        self.apply_env_with(|name| std::env::var(name).ok());
    }

    /// Override the roots from an arbitrary variable lookup. Empty values are ignored.
    pub fn apply_env_with(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let lookup = |name: &str| lookup(name).filter(|v| !v.is_empty());

        if let Some(datadir) = lookup(DATADIR_ENV) {
            debug!("Using data directory from {DATADIR_ENV}");
            self.datadir = Some(datadir);
        }
        if let Some(rerundir) = lookup(RERUNDIR_ENV) {
            debug!("Using rerun directory from {RERUNDIR_ENV}");
            self.rerundir = Some(rerundir);
        }
    }

    /// Root directories with `~` and environment variables expanded.
    pub fn roots(&self) -> Result<Roots> {
        let datadir = self.datadir.as_deref().map(expand_path).transpose()?;
        let rerundir = self.rerundir.as_deref().map(expand_path).transpose()?;

        Ok(Roots::new(datadir, rerundir)
            .with_data_anchors(self.data_anchors.iter().cloned())
            .with_rerun_anchors(self.rerun_anchors.iter().cloned()))
    }

    /// Parse the `[defaults]` table.
    ///
    /// Every key must name a field of some product kind and every value must parse
    /// with that field's type.
    pub fn field_defaults(&self) -> Result<FieldDefaults> {
        let mut defaults = FieldDefaults::new();

        for (name, text) in &self.defaults {
            let mut filter = ProductKind::field(name).ok_or_else(|| FinderError::Config {
                message: format!("unknown field '{name}' in [defaults]"),
            })?;
            let query = filter
                .parse_query(text)
                .with_context(|| format!("Invalid default for field '{name}'"))?;
            filter
                .set_query(query.clone())
                .with_context(|| format!("Invalid default for field '{name}'"))?;
            defaults.set(name.clone(), query);
        }

        Ok(defaults)
    }

    /// Build a repository from these settings.
    pub fn repository(&self) -> Result<Repository> {
        Ok(Repository::new(self.roots()?).with_defaults(self.field_defaults()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::Query;
    use std::collections::HashMap;
    use tempfile::TempDir;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert!(settings.datadir.is_none());
        assert_eq!(settings.data_anchors, vec!["rerun", "pfsConfig", "pfsDesign"]);
        assert_eq!(settings.rerun_anchors.len(), 5);
        assert!(settings.field_defaults().unwrap().is_empty());
    }

    #[test]
    fn test_load_from_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        fs::write(
            &path,
            r#"
datadir = "/data/pfs"
rerundir = "rerun/v1"
data_anchors = ["raw"]

[defaults]
visit = "100..105"
"#,
        )
        .unwrap();

        let settings = Settings::load_from(&path).unwrap();
        assert_eq!(settings.datadir.as_deref(), Some("/data/pfs"));
        assert_eq!(settings.data_anchors, vec!["raw"]);
        // Omitted lists keep their defaults
        assert_eq!(settings.rerun_anchors.len(), 5);

        let defaults = settings.field_defaults().unwrap();
        assert_eq!(defaults.get("visit"), Some(&Query::range(100, 105)));

        let roots = settings.roots().unwrap();
        assert_eq!(roots.default_datadir(), Some(Path::new("/data/pfs")));
        assert_eq!(roots.data_anchors(), &["raw".to_string()]);
    }

    #[test]
    fn test_load_with_optional_requires_explicit_file() {
        let temp = TempDir::new().unwrap();
        let missing = temp.path().join("missing.toml");
        assert!(Settings::load_with_optional(Some(&missing)).is_err());
    }

    #[test]
    fn test_invalid_toml() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        fs::write(&path, "datadir = [").unwrap();
        let err = Settings::load_from(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse configuration"));
    }

    #[test]
    fn test_unknown_key_rejected() {
        let err = toml::from_str::<Settings>("datdir = \"/x\"").unwrap_err();
        assert!(err.to_string().contains("datdir"));
    }

    #[test]
    fn test_env_overrides() {
        let mut settings = Settings {
            datadir: Some("/from/file".to_string()),
            ..Settings::default()
        };
        let env: HashMap<&str, &str> =
            HashMap::from([(DATADIR_ENV, "/from/env"), (RERUNDIR_ENV, "")]);

        settings.apply_env_with(|k| env.get(k).map(ToString::to_string));
        assert_eq!(settings.datadir.as_deref(), Some("/from/env"));
        assert!(settings.rerundir.is_none());
    }

    #[test]
    fn test_bad_defaults() {
        let mut settings = Settings::default();
        settings.defaults.insert("nope".to_string(), "1".to_string());
        assert!(settings.field_defaults().is_err());

        let mut settings = Settings::default();
        settings.defaults.insert("visit".to_string(), "105..100".to_string());
        assert!(settings.field_defaults().is_err());

        let mut settings = Settings::default();
        settings.defaults.insert("date".to_string(), "yesterday".to_string());
        assert!(settings.field_defaults().is_err());
    }

    #[test]
    fn test_star_default_is_unconstrained() {
        let mut settings = Settings::default();
        settings.defaults.insert("visit".to_string(), "*".to_string());
        assert!(settings.field_defaults().unwrap().is_empty());
    }
}
