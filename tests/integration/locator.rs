//! Repository scenarios over a populated data tree

use anyhow::Result;
use chrono::NaiveDate;
use pfs_finder::core::FinderError;
use pfs_finder::filter::{FieldValue, Query};
use pfs_finder::identity::Identity;
use pfs_finder::locator::{
    ExistingPathLoader, FieldDefaults, FindQuery, LoadRequest, PathLoader, ProductKind,
    ProductLoader, Repository, Roots,
};
use pfs_finder::test_utils::{DataTree, init_test_logging};
use std::fs;

fn populated() -> Result<DataTree> {
    init_test_logging(None);

    let tree = DataTree::new()?;
    tree.design(0x1234)?;
    tree.design(0x5678)?;
    tree.config("2024-05-01", 0x1234, 99)?;
    tree.config("2024-05-01", 0x1234, 100)?;
    tree.config("2024-05-02", 0x5678, 105)?;
    tree.config("2024-05-02", 0x5678, 106)?;
    tree.single("v1", 1, 2, "1,1", 0x2a, 123)?;
    tree.single("v1", 1, 2, "1,1", 0x2b, 123)?;
    tree.single("v1", 1, 3, "0,2", 0x2c, 124)?;
    tree.single("v2", 1, 2, "1,1", 0x2a, 123)?;
    Ok(tree)
}

fn repository(tree: &DataTree) -> Repository {
    Repository::new(Roots::new(Some(tree.root().to_path_buf()), Some("rerun/v1".into())))
}

#[test]
fn test_find_by_visit_returns_aligned_identities() -> Result<()> {
    let tree = populated()?;
    let repo = repository(&tree);

    let found = repo.find(
        ProductKind::PfsSingle,
        &FindQuery::new().with_field("visit", Query::single(123)),
    )?;

    assert_eq!(found.len(), 2);
    assert_eq!(found.ids.column("objId").unwrap(), &[FieldValue::Hex(0x2a), FieldValue::Hex(0x2b)]);
    assert_eq!(found.ids.column("visit").unwrap(), &[FieldValue::Int(123), FieldValue::Int(123)]);
    for (path, id) in found.iter() {
        assert!(path.starts_with(tree.rerun("v1")));
        assert_eq!(id.string("patch")?, "1,1");
    }
    Ok(())
}

#[test]
fn test_locate_narrowed_by_object() -> Result<()> {
    let tree = populated()?;
    let repo = repository(&tree);

    let (path, id) = repo.locate(
        ProductKind::PfsSingle,
        &FindQuery::new()
            .with_field("visit", Query::single(123))
            .with_field("objId", Query::single(42)),
    )?;

    assert!(path.ends_with("pfsSingle-00001-00002-1,1-000000000000002a-000123.fits"));
    assert_eq!(id.hex("objId")?, 42);
    assert_eq!(id.int("tract")?, 2);
    Ok(())
}

#[test]
fn test_range_boundaries_are_inclusive() -> Result<()> {
    let tree = populated()?;
    let repo = repository(&tree);

    let found =
        repo.find(ProductKind::PfsConfig, &FindQuery::new().with_field("visit", Query::range(100, 105)))?;

    assert_eq!(found.ids.column("visit").unwrap(), &[FieldValue::Int(100), FieldValue::Int(105)]);
    assert_eq!(
        found.ids.column("date").unwrap(),
        &[
            FieldValue::Date(NaiveDate::from_ymd_opt(2024, 5, 1).unwrap()),
            FieldValue::Date(NaiveDate::from_ymd_opt(2024, 5, 2).unwrap()),
        ]
    );
    Ok(())
}

#[test]
fn test_set_and_date_queries() -> Result<()> {
    let tree = populated()?;
    let repo = repository(&tree);

    let by_set = repo.find(
        ProductKind::PfsConfig,
        &FindQuery::new().with_field("visit", Query::set([99, 106])),
    )?;
    assert_eq!(by_set.len(), 2);

    let by_date = repo.find(
        ProductKind::PfsConfig,
        &FindQuery::new()
            .with_field("date", Query::single(NaiveDate::from_ymd_opt(2024, 5, 2).unwrap())),
    )?;
    assert_eq!(by_date.ids.column("visit").unwrap(), &[FieldValue::Int(105), FieldValue::Int(106)]);
    Ok(())
}

#[test]
fn test_locate_failures() -> Result<()> {
    let tree = populated()?;
    let repo = repository(&tree);

    let err = repo
        .locate(ProductKind::PfsDesign, &FindQuery::new().with_field("pfsDesignId", Query::single(1)))
        .unwrap_err();
    assert!(matches!(err, FinderError::NotFound { .. }));

    let err = repo.locate(ProductKind::PfsDesign, &FindQuery::new()).unwrap_err();
    assert!(matches!(err, FinderError::AmbiguousResult { count: 2, .. }));
    Ok(())
}

#[test]
fn test_stray_files_are_ignored() -> Result<()> {
    let tree = populated()?;
    tree.touch("pfsDesign/pfsDesign-0x00000000000000zz.fits")?;
    tree.touch("pfsDesign/notes.txt")?;
    tree.touch("pfsConfig/not-a-date/pfsConfig-0x0000000000001234-000100.fits")?;
    let repo = repository(&tree);

    assert_eq!(repo.find(ProductKind::PfsDesign, &FindQuery::new())?.len(), 2);
    assert_eq!(repo.find(ProductKind::PfsConfig, &FindQuery::new())?.len(), 4);
    Ok(())
}

#[test]
fn test_rerun_selection() -> Result<()> {
    let tree = populated()?;
    let repo = repository(&tree);

    let v2 = repo.find(ProductKind::PfsSingle, &FindQuery::new().with_rerundir(tree.rerun("v2")))?;
    assert_eq!(v2.len(), 1);
    assert!(v2.paths[0].starts_with(tree.rerun("v2")));
    Ok(())
}

#[test]
fn test_defaults_apply_until_overridden() -> Result<()> {
    let tree = populated()?;
    let repo = repository(&tree)
        .with_defaults(FieldDefaults::new().with("pfsDesignId", Query::single(0x5678_u64)));

    assert_eq!(repo.find(ProductKind::PfsConfig, &FindQuery::new())?.len(), 2);
    assert_eq!(repo.find(ProductKind::PfsDesign, &FindQuery::new())?.len(), 1);

    let overridden = repo.find(
        ProductKind::PfsConfig,
        &FindQuery::new().with_field("pfsDesignId", Query::single(0x1234_u64)),
    )?;
    assert_eq!(overridden.ids.column("visit").unwrap(), &[FieldValue::Int(99), FieldValue::Int(100)]);
    Ok(())
}

#[test]
fn test_repeated_find_is_identical() -> Result<()> {
    let tree = populated()?;
    let repo = repository(&tree);
    let query = FindQuery::new().with_field("visit", Query::range(0, 1000));

    let first = repo.find(ProductKind::PfsConfig, &query)?;
    let second = repo.find(ProductKind::PfsConfig, &query)?;
    assert_eq!(first, second);
    Ok(())
}

#[test]
fn test_load_config_by_file_name_recovers_date() -> Result<()> {
    let tree = populated()?;
    let repo = repository(&tree);

    let (path, id) = repo.load(
        ProductKind::PfsConfig,
        Some("pfsConfig-0x0000000000005678-000106.fits".as_ref()),
        None,
        &ExistingPathLoader,
    )?;

    assert_eq!(path, tree.root().join("pfsConfig/2024-05-02/pfsConfig-0x0000000000005678-000106.fits"));
    assert_eq!(id.date("date")?, NaiveDate::from_ymd_opt(2024, 5, 2).unwrap());
    Ok(())
}

#[test]
fn test_load_by_identity_and_by_name_agree() -> Result<()> {
    let tree = populated()?;
    let repo = repository(&tree);

    let identity = Identity::new()
        .with("catId", 1)
        .with("tract", 3)
        .with("patch", "0,2")
        .with("objId", FieldValue::Hex(0x2c))
        .with("visit", 124);
    let (by_id, _) = repo.load(ProductKind::PfsSingle, None, Some(&identity), &ExistingPathLoader)?;

    let (by_name, parsed) = repo.load(
        ProductKind::PfsSingle,
        Some("pfsSingle-00001-00003-0,2-000000000000002c-000124.fits".as_ref()),
        None,
        &PathLoader,
    )?;

    assert_eq!(by_id, by_name);
    assert_eq!(parsed, identity);
    Ok(())
}

#[test]
fn test_load_argument_validation() -> Result<()> {
    let tree = populated()?;
    let repo = repository(&tree);
    let identity = Identity::new().with("pfsDesignId", FieldValue::Hex(0x1234));

    let err = repo
        .load(
            ProductKind::PfsDesign,
            Some("pfsDesign-0x0000000000001234.fits".as_ref()),
            Some(&identity),
            &PathLoader,
        )
        .unwrap_err();
    assert!(matches!(err.downcast_ref::<FinderError>(), Some(FinderError::InvalidQuery { .. })));

    let err = repo.load(ProductKind::PfsDesign, None, None, &PathLoader).unwrap_err();
    assert!(matches!(err.downcast_ref::<FinderError>(), Some(FinderError::InvalidQuery { .. })));
    Ok(())
}

#[test]
fn test_custom_loader_receives_request() -> Result<()> {
    struct SizeLoader;

    impl ProductLoader for SizeLoader {
        type Output = (String, u64);

        fn load(&self, request: &LoadRequest) -> Result<Self::Output> {
            let size = fs::metadata(request.path())?.len();
            Ok((request.file_name.clone(), size))
        }
    }

    let tree = populated()?;
    fs::write(tree.root().join("pfsDesign/pfsDesign-0x0000000000001234.fits"), "SIMPLE")?;
    let repo = repository(&tree);
    let identity = Identity::new().with("pfsDesignId", FieldValue::Hex(0x1234));

    let ((name, size), _) = repo.load(ProductKind::PfsDesign, None, Some(&identity), &SizeLoader)?;
    assert_eq!(name, "pfsDesign-0x0000000000001234.fits");
    assert_eq!(size, 6);
    Ok(())
}

#[test]
fn test_parse_caller_paths() -> Result<()> {
    let repo = Repository::default();

    let id = repo.parse(
        ProductKind::PfsConfig,
        "/anywhere/pfsConfig/2024-05-01/pfsConfig-0x0000000000001234-000100.fits".as_ref(),
    )?;
    assert_eq!(id.to_string(), "pfsDesignId=0x1234 visit=100 date=2024-05-01");

    let err = repo.parse(ProductKind::PfsDesign, "pfsDesign-0xnothex.fits".as_ref()).unwrap_err();
    assert!(matches!(err, FinderError::FormatMismatch { .. }));
    Ok(())
}
