//! pfs-finder - locate PFS data products by their identity
//!
//! Data products of the Prime Focus Spectrograph pipeline are files whose directory
//! and file names encode their identity: a design id, a visit number, an observation
//! date, a catalog/tract/patch/object tuple. This crate finds those files on disk from
//! typed queries over the identity fields, and reads the identity back out of a path.
//! File contents are never opened.
//!
//! # Architecture Overview
//!
//! The crate is built in layers, each usable on its own:
//!
//! - [`filter`] - Typed value filters (`Int`, `Hex`, `Date`, `Str`). One filter knows how
//!   to format a value into a path, which glob fragment it contributes, how to parse a
//!   token from a file name and whether a value satisfies its query.
//! - [`pattern`] - Named-group regexes that turn a path into a typed [`Identity`]
//! - [`discovery`] - The glob-then-regex-then-filter search over a directory tree
//! - [`locator`] - Product kinds (`pfsDesign`, `pfsConfig`, `pfsSingle`) and the
//!   [`Repository`](locator::Repository) exposing `find`, `locate`, `parse` and `load`
//!
//! Around them sit the ambient pieces:
//!
//! - [`config`] - TOML settings with environment overrides
//! - [`core`] - [`FinderError`](core::FinderError) and user-facing error formatting
//! - [`cli`] - The `pfsfind` command-line interface
//!
//! # Example
//!
//! ```rust,no_run
//! use pfs_finder::filter::Query;
//! use pfs_finder::locator::{FindQuery, ProductKind, Repository, Roots};
//!
//! # fn example() -> pfs_finder::core::Result<()> {
//! let repo = Repository::new(Roots::new(Some("/data/pfs".into()), None));
//! let (path, id) = repo.locate(
//!     ProductKind::PfsConfig,
//!     &FindQuery::new()
//!         .with_field("pfsDesignId", Query::single(0x1234_u64))
//!         .with_field("visit", Query::single(123)),
//! )?;
//! println!("{} was observed on {}", path.display(), id.date("date")?);
//! # Ok(())
//! # }
//! ```
//!
//! # Command-Line Usage
//!
//! ```bash
//! pfsfind --datadir /data/pfs find pfsConfig --visit 100..105
//! pfsfind locate pfsDesign --pfs-design-id 0x1234 --format json
//! pfsfind parse pfsSingle pfsSingle-00001-00002-1,1-000000000000002a-000123.fits
//! pfsfind load pfsConfig --pfs-design-id 0x1234 --visit 123
//! ```

pub mod cli;
pub mod config;
pub mod constants;
pub mod core;
pub mod discovery;
pub mod filter;
pub mod identity;
pub mod locator;
pub mod pattern;
pub mod template;
pub mod utils;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use identity::{Identity, IdentityColumns};
