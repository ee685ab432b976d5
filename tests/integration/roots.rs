//! Root resolution through `find`

use anyhow::Result;
use pfs_finder::core::FinderError;
use pfs_finder::filter::Query;
use pfs_finder::locator::{FindQuery, ProductKind, Repository, Roots};
use pfs_finder::test_utils::DataTree;
use std::path::PathBuf;

#[test]
fn test_data_root_inferred_from_reference() -> Result<()> {
    let tree = DataTree::new()?;
    tree.design(0x1234)?;
    let config = tree.config("2024-05-01", 0x1234, 100)?;

    // No default data root configured at all
    let repo = Repository::default();
    let (path, _) = repo.locate(ProductKind::PfsDesign, &FindQuery::new().with_reference(&config))?;
    assert_eq!(path, tree.root().join("pfsDesign/pfsDesign-0x0000000000001234.fits"));
    Ok(())
}

#[test]
fn test_rerun_root_inferred_from_reference() -> Result<()> {
    let tree = DataTree::new()?;
    tree.single("v1", 1, 2, "1,1", 0x2a, 123)?;
    tree.single("v2", 1, 2, "1,1", 0x2a, 123)?;

    // A file of another product inside the v2 rerun
    let reference = tree.touch("rerun/v2/pfsArm/2024-05-01/pfsArm-000123-b1.fits")?;

    let repo = Repository::new(Roots::new(Some(tree.root().to_path_buf()), Some("rerun/v1".into())));
    let (path, _) = repo.locate(
        ProductKind::PfsSingle,
        &FindQuery::new().with_reference(&reference).with_field("visit", Query::single(123)),
    )?;
    assert!(path.starts_with(tree.rerun("v2")));
    Ok(())
}

#[test]
fn test_soft_inference_falls_back_to_default() -> Result<()> {
    let tree = DataTree::new()?;
    tree.design(0x1234)?;
    let repo = Repository::new(Roots::new(Some(tree.root().to_path_buf()), None));

    let found = repo.find(
        ProductKind::PfsDesign,
        &FindQuery::new().with_reference("/somewhere/else/file.fits"),
    )?;
    assert_eq!(found.len(), 1);
    Ok(())
}

#[test]
fn test_required_inference_fails_hard() -> Result<()> {
    let tree = DataTree::new()?;
    let repo = Repository::new(Roots::new(Some(tree.root().to_path_buf()), None));

    let err = repo
        .find(
            ProductKind::PfsDesign,
            &FindQuery::new().with_reference("/somewhere/else/file.fits").require_inference(true),
        )
        .unwrap_err();
    assert!(matches!(err, FinderError::DirectoryInference { .. }));
    Ok(())
}

#[test]
fn test_explicit_root_beats_reference_and_default() -> Result<()> {
    let tree = DataTree::new()?;
    tree.design(0x1234)?;
    let other = DataTree::new()?;
    let reference = other.config("2024-05-01", 0x1, 1)?;

    let repo = Repository::new(Roots::new(Some(PathBuf::from("/nonexistent")), None));
    let found = repo.find(
        ProductKind::PfsDesign,
        &FindQuery::new().with_datadir(tree.root()).with_reference(reference),
    )?;
    assert_eq!(found.len(), 1);
    Ok(())
}

#[test]
fn test_no_root_at_all() {
    let err = Repository::default().find(ProductKind::PfsDesign, &FindQuery::new()).unwrap_err();
    assert!(matches!(err, FinderError::DirectoryInference { .. }));
}

#[test]
fn test_repository_root_accessors() -> Result<()> {
    let tree = DataTree::new()?;
    let reference = tree.touch("rerun/v3/pfsMerged/pfsMerged-000123.fits")?;
    let repo = Repository::new(Roots::new(Some(tree.root().to_path_buf()), None));

    assert_eq!(repo.datadir(Some(&reference), true)?, tree.root());
    assert_eq!(repo.rerundir(Some(&reference), true)?, tree.rerun("v3"));
    assert!(repo.rerundir(None, false).is_err());
    Ok(())
}
