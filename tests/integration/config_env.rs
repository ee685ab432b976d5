//! Configuration file and environment layering
//!
//! These tests modify process-wide environment variables and run serially.

use anyhow::Result;
use pfs_finder::config::Settings;
use pfs_finder::constants::{CONFIG_PATH_ENV, DATADIR_ENV, RERUNDIR_ENV};
use pfs_finder::filter::Query;
use pfs_finder::locator::{FindQuery, ProductKind};
use pfs_finder::test_utils::DataTree;
use serial_test::serial;
use std::ffi::OsString;
use std::fs;
use std::path::Path;

/// Sets environment variables for the lifetime of the guard, restoring the previous
/// values on drop.
struct EnvGuard {
    saved: Vec<(&'static str, Option<OsString>)>,
}

impl EnvGuard {
    fn set(vars: &[(&'static str, &str)]) -> Self {
        let saved = vars.iter().map(|(name, _)| (*name, std::env::var_os(name))).collect();
        for (name, value) in vars {
            // SAFETY: tests touching the environment are #[serial]
            unsafe { std::env::set_var(name, value) };
        }
        Self {
            saved,
        }
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        for (name, previous) in self.saved.iter().rev() {
            // SAFETY: see EnvGuard::set
            unsafe {
                match previous {
                    Some(value) => std::env::set_var(name, value),
                    None => std::env::remove_var(name),
                }
            }
        }
    }
}

fn write_config(dir: &Path, content: &str) -> Result<std::path::PathBuf> {
    let path = dir.join("config.toml");
    fs::write(&path, content)?;
    Ok(path)
}

#[test]
#[serial]
fn test_config_path_from_environment() -> Result<()> {
    let tree = DataTree::new()?;
    tree.design(0x1234)?;
    let config = write_config(
        tree.root(),
        &format!("datadir = {:?}\n", tree.root().to_string_lossy()),
    )?;
    let _env = EnvGuard::set(&[(CONFIG_PATH_ENV, &*config.to_string_lossy())]);

    assert_eq!(Settings::default_path()?, config);
    let repo = Settings::load()?.repository()?;
    assert_eq!(repo.find(ProductKind::PfsDesign, &FindQuery::new())?.len(), 1);
    Ok(())
}

#[test]
#[serial]
fn test_missing_default_config_yields_defaults() -> Result<()> {
    let tree = DataTree::new()?;
    let missing = tree.root().join("nope.toml");
    let _env = EnvGuard::set(&[(CONFIG_PATH_ENV, &*missing.to_string_lossy())]);

    assert_eq!(Settings::load()?, Settings::default());
    Ok(())
}

#[test]
#[serial]
fn test_environment_overrides_file() -> Result<()> {
    let tree = DataTree::new()?;
    tree.single("env", 1, 2, "1,1", 0x2a, 123)?;
    tree.single("file", 1, 2, "1,1", 0x2b, 123)?;

    let config = write_config(
        tree.root(),
        "datadir = \"/not/used\"\nrerundir = \"rerun/file\"\n",
    )?;
    let _env = EnvGuard::set(&[
        (DATADIR_ENV, &*tree.root().to_string_lossy()),
        (RERUNDIR_ENV, "rerun/env"),
    ]);

    let mut settings = Settings::load_from(&config)?;
    settings.apply_env();
    assert_eq!(settings.rerundir.as_deref(), Some("rerun/env"));

    let repo = settings.repository()?;
    let (_, id) = repo.locate(ProductKind::PfsSingle, &FindQuery::new())?;
    assert_eq!(id.hex("objId")?, 0x2a);
    Ok(())
}

#[test]
#[serial]
fn test_paths_expand_environment_variables() -> Result<()> {
    let tree = DataTree::new()?;
    tree.design(0x1234)?;
    let _env = EnvGuard::set(&[("PFSFIND_TEST_ROOT", &*tree.root().to_string_lossy())]);

    let settings: Settings = toml::from_str("datadir = \"$PFSFIND_TEST_ROOT\"")?;
    let repo = settings.repository()?;
    assert_eq!(repo.roots().default_datadir(), Some(tree.root()));
    Ok(())
}

#[test]
fn test_defaults_table_drives_queries() -> Result<()> {
    let tree = DataTree::new()?;
    tree.config("2024-05-01", 0x1234, 99)?;
    tree.config("2024-05-01", 0x1234, 100)?;
    tree.config("2024-05-03", 0x1234, 101)?;

    let config = write_config(
        tree.root(),
        &format!(
            "datadir = {:?}\n\n[defaults]\ndate = \"2024-05-01\"\nvisit = \"100..200\"\n",
            tree.root().to_string_lossy()
        ),
    )?;
    let repo = Settings::load_from(&config)?.repository()?;

    let (_, id) = repo.locate(ProductKind::PfsConfig, &FindQuery::new())?;
    assert_eq!(id.int("visit")?, 100);

    let found = repo.find(
        ProductKind::PfsConfig,
        &FindQuery::new().with_field("date", Query::Any).with_field("visit", Query::Any),
    )?;
    assert_eq!(found.len(), 3);
    Ok(())
}

#[test]
#[serial]
fn test_env_guard_restores_previous_value() {
    let _outer = EnvGuard::set(&[(RERUNDIR_ENV, "/outer")]);
    {
        let _inner = EnvGuard::set(&[(RERUNDIR_ENV, "/inner")]);
        assert_eq!(std::env::var(RERUNDIR_ENV).as_deref(), Ok("/inner"));
    }
    assert_eq!(std::env::var(RERUNDIR_ENV).as_deref(), Ok("/outer"));
}
