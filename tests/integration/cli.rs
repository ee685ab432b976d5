//! End-to-end tests of the `pfsfind` binary

use anyhow::Result;
use assert_cmd::Command;
use pfs_finder::test_utils::DataTree;
use predicates::prelude::*;
use std::fs;

/// A `pfsfind` invocation isolated from the user's configuration and environment.
fn pfsfind(tree: &DataTree) -> Command {
    let mut cmd = Command::cargo_bin("pfsfind").unwrap();
    cmd.env("PFSFIND_CONFIG", tree.root().join("no-config.toml"))
        .env("NO_COLOR", "1")
        .env_remove("GAPIPE_DATADIR")
        .env_remove("GAPIPE_RERUNDIR")
        .env_remove("RUST_LOG")
        .arg("--datadir")
        .arg(tree.root());
    cmd
}

fn populated() -> Result<DataTree> {
    let tree = DataTree::new()?;
    tree.design(0x1234)?;
    tree.design(0x5678)?;
    tree.config("2024-05-01", 0x1234, 100)?;
    tree.config("2024-05-02", 0x1234, 105)?;
    tree.single("v1", 1, 2, "1,1", 0x2a, 123)?;
    Ok(tree)
}

#[test]
fn test_find_text_output() -> Result<()> {
    let tree = populated()?;
    pfsfind(&tree)
        .args(["find", "pfsConfig", "--visit", "100..105"])
        .assert()
        .success()
        .stdout(predicate::str::contains("pfsConfig-0x0000000000001234-000100.fits"))
        .stdout(predicate::str::contains("pfsConfig-0x0000000000001234-000105.fits"))
        .stdout(predicate::str::contains("date=2024-05-02"));
    Ok(())
}

#[test]
fn test_find_json_output() -> Result<()> {
    let tree = populated()?;
    let output = pfsfind(&tree)
        .args(["find", "pfsDesign", "--format", "json"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let json: serde_json::Value = serde_json::from_slice(&output)?;
    assert_eq!(json["paths"].as_array().map(Vec::len), Some(2));
    assert_eq!(json["ids"]["pfsDesignId"], serde_json::json!([0x1234, 0x5678]));
    Ok(())
}

#[test]
fn test_find_nothing_reports_on_stderr() -> Result<()> {
    let tree = populated()?;
    pfsfind(&tree)
        .args(["find", "pfsConfig", "--visit", "999"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("No pfsConfig files found"));
    Ok(())
}

#[test]
fn test_locate_single_file() -> Result<()> {
    let tree = populated()?;
    pfsfind(&tree)
        .args(["--rerundir", "rerun/v1", "locate", "pfsSingle", "--obj-id", "0x2a"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "pfsSingle-00001-00002-1,1-000000000000002a-000123.fits",
        ))
        .stdout(predicate::str::contains("patch=1,1"));
    Ok(())
}

#[test]
fn test_locate_ambiguous_fails() -> Result<()> {
    let tree = populated()?;
    pfsfind(&tree)
        .args(["locate", "pfsDesign"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Multiple pfsDesign files"));
    Ok(())
}

#[test]
fn test_locate_not_found_fails() -> Result<()> {
    let tree = populated()?;
    pfsfind(&tree)
        .args(["locate", "pfsDesign", "--pfs-design-id", "0xdead"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No pfsDesign file found"));
    Ok(())
}

#[test]
fn test_parse_json() -> Result<()> {
    let tree = DataTree::new()?;
    let output = pfsfind(&tree)
        .args([
            "parse",
            "pfsSingle",
            "pfsSingle-00001-00002-1,1-000000000000002a-000123.fits",
            "--format",
            "json",
        ])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let json: serde_json::Value = serde_json::from_slice(&output)?;
    assert_eq!(json["catId"], 1);
    assert_eq!(json["patch"], "1,1");
    assert_eq!(json["objId"], 42);
    Ok(())
}

#[test]
fn test_parse_mismatch_fails() -> Result<()> {
    let tree = DataTree::new()?;
    pfsfind(&tree)
        .args(["parse", "pfsDesign", "random.fits"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("does not match"));
    Ok(())
}

#[test]
fn test_load_config_by_identity() -> Result<()> {
    let tree = populated()?;
    pfsfind(&tree)
        .args(["load", "pfsConfig", "--pfs-design-id", "1234", "--visit", "105"])
        .assert()
        .success()
        .stdout(predicate::str::contains("pfsConfig/2024-05-02/pfsConfig-0x0000000000001234-000105.fits"));
    Ok(())
}

#[test]
fn test_load_requires_exactly_one_input() -> Result<()> {
    let tree = populated()?;
    pfsfind(&tree)
        .args(["load", "pfsDesign"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid query"));

    pfsfind(&tree)
        .args([
            "load",
            "pfsDesign",
            "--file",
            "pfsDesign-0x0000000000001234.fits",
            "--pfs-design-id",
            "0x1234",
        ])
        .assert()
        .failure();
    Ok(())
}

#[test]
fn test_field_flag_not_applicable() -> Result<()> {
    let tree = populated()?;
    pfsfind(&tree)
        .args(["find", "pfsDesign", "--visit", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--visit does not apply to pfsDesign"));
    Ok(())
}

#[test]
fn test_invalid_range_rejected() -> Result<()> {
    let tree = populated()?;
    pfsfind(&tree)
        .args(["find", "pfsConfig", "--visit", "105..100"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid query"));
    Ok(())
}

#[test]
fn test_config_file_defaults() -> Result<()> {
    let tree = populated()?;
    let config = tree.root().join("pfsfind.toml");
    fs::write(&config, "[defaults]\npfsDesignId = \"0x5678\"\n")?;

    pfsfind(&tree)
        .arg("--config")
        .arg(&config)
        .args(["locate", "pfsDesign"])
        .assert()
        .success()
        .stdout(predicate::str::contains("pfsDesign-0x0000000000005678.fits"));
    Ok(())
}

#[test]
fn test_missing_explicit_config_fails() -> Result<()> {
    let tree = populated()?;
    pfsfind(&tree)
        .args(["--config", "/definitely/missing/pfsfind.toml", "find", "pfsDesign"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read configuration"));
    Ok(())
}

#[test]
fn test_verbose_logs_glob() -> Result<()> {
    let tree = populated()?;
    pfsfind(&tree)
        .args(["--verbose", "find", "pfsDesign"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Searching with glob"));
    Ok(())
}

#[test]
fn test_datadir_from_environment() -> Result<()> {
    let tree = populated()?;
    let mut cmd = Command::cargo_bin("pfsfind")?;
    cmd.env("PFSFIND_CONFIG", tree.root().join("no-config.toml"))
        .env("GAPIPE_DATADIR", tree.root())
        .env_remove("GAPIPE_RERUNDIR")
        .args(["find", "pfsDesign"])
        .assert()
        .success()
        .stdout(predicate::str::contains("pfsDesign-0x0000000000001234.fits"));
    Ok(())
}
