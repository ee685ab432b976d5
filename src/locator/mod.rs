//! Repository locator: `find`, `locate`, `parse` and `load` per product kind.
//!
//! A [`Repository`] holds the instance-level state of a data repository: the default
//! data and rerun roots, the anchor directory lists used to infer roots from a reference
//! path, and per-field default queries ([`FieldDefaults`]). Everything else is per call.
//!
//! # Query resolution
//!
//! For every field of the product being searched, the query in effect is, in order:
//!
//! 1. The per-call override in [`FindQuery::fields`]
//! 2. The instance default for that field name
//! 3. Unconstrained
//!
//! Overrides and defaults naming a field the product lacks are ignored.
//!
//! # Examples
//!
//! ```rust,no_run
//! use pfs_finder::filter::Query;
//! use pfs_finder::locator::{FindQuery, ProductKind, Repository, Roots};
//!
//! # fn example() -> pfs_finder::core::Result<()> {
//! let repo = Repository::new(Roots::new(Some("/data/pfs".into()), Some("rerun/v1".into())));
//!
//! let found = repo.find(
//!     ProductKind::PfsConfig,
//!     &FindQuery::new().with_field("visit", Query::range(100, 105)),
//! )?;
//! for (path, id) in found.iter() {
//!     println!("{} {id}", path.display());
//! }
//!
//! let (path, id) = repo.locate(
//!     ProductKind::PfsDesign,
//!     &FindQuery::new().with_field("pfsDesignId", Query::single(0x1234_u64)),
//! )?;
//! # Ok(())
//! # }
//! ```
//!
//! # Thread safety
//!
//! A `Repository` is a plain value. Mutating its defaults between calls is supported;
//! sharing one instance across threads while mutating it is the caller's business.

pub mod loader;
pub mod product;
pub mod roots;

pub use loader::{ExistingPathLoader, LoadRequest, PathLoader, ProductLoader};
pub use product::{ProductKind, RootKind};
pub use roots::Roots;

use crate::core::{FinderError, Result};
use crate::discovery::{self, Discovery, GlobPart, QueryOverrides};
use crate::filter::{FilterSet, Query};
use crate::identity::Identity;
use anyhow::Context;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Instance-level default queries keyed by field name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldDefaults {
    queries: BTreeMap<String, Query>,
}

impl FieldDefaults {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the default for a field; [`Query::Any`] removes it.
    pub fn set(&mut self, name: impl Into<String>, query: Query) {
        let name = name.into();
        if query.is_any() {
            self.queries.remove(&name);
        } else {
            self.queries.insert(name, query);
        }
    }

    #[must_use]
    pub fn with(mut self, name: impl Into<String>, query: Query) -> Self {
        self.set(name, query);
        self
    }

    pub fn get(&self, name: &str) -> Option<&Query> {
        self.queries.get(name)
    }

    pub fn remove(&mut self, name: &str) -> Option<Query> {
        self.queries.remove(name)
    }

    pub fn clear(&mut self) {
        self.queries.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Query)> {
        self.queries.iter().map(|(k, v)| (k.as_str(), v))
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.queries.is_empty()
    }

    /// Apply the defaults to the filters that carry a matching name.
    fn apply(&self, filters: &mut FilterSet) -> Result<()> {
        for (name, query) in &self.queries {
            if let Some(filter) = filters.get_mut(name) {
                filter.set_query(query.clone())?;
            }
        }
        Ok(())
    }
}

/// Per-call arguments of [`Repository::find`] and [`Repository::locate`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FindQuery {
    /// Data root for this call only
    pub datadir: Option<PathBuf>,
    /// Rerun root for this call only
    pub rerundir: Option<PathBuf>,
    /// Path from which the root is inferred
    pub reference_path: Option<PathBuf>,
    /// Fail instead of warning when the root cannot be inferred from `reference_path`
    pub require_inference: bool,
    /// Per-field query overrides
    pub fields: QueryOverrides,
}

impl FindQuery {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_field(mut self, name: impl Into<String>, query: Query) -> Self {
        self.fields.insert(name.into(), query);
        self
    }

    #[must_use]
    pub fn with_reference(mut self, path: impl Into<PathBuf>) -> Self {
        self.reference_path = Some(path.into());
        self
    }

    #[must_use]
    pub fn with_datadir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.datadir = Some(dir.into());
        self
    }

    #[must_use]
    pub fn with_rerundir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.rerundir = Some(dir.into());
        self
    }

    #[must_use]
    pub fn require_inference(mut self, required: bool) -> Self {
        self.require_inference = required;
        self
    }

    /// Single-value overrides for every field of `identity`.
    #[must_use]
    pub fn from_identity(identity: &Identity) -> Self {
        identity.iter().fold(Self::new(), |query, (name, value)| {
            query.with_field(name, Query::Single(value.clone()))
        })
    }
}

/// Where a product lives, and under which identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved {
    pub kind: ProductKind,
    pub dir: PathBuf,
    pub file_name: String,
    pub identity: Identity,
}

impl Resolved {
    #[must_use]
    pub fn path(&self) -> PathBuf {
        self.dir.join(&self.file_name)
    }

    fn into_request(self) -> LoadRequest {
        LoadRequest {
            kind: self.kind,
            dir: self.dir,
            file_name: self.file_name,
            identity: self.identity,
        }
    }
}

/// A data repository rooted at a data directory and a rerun directory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Repository {
    roots: Roots,
    defaults: FieldDefaults,
}

impl Repository {
    #[must_use]
    pub fn new(roots: Roots) -> Self {
        Self {
            roots,
            defaults: FieldDefaults::new(),
        }
    }

    #[must_use]
    pub fn with_defaults(mut self, defaults: FieldDefaults) -> Self {
        self.defaults = defaults;
        self
    }

    pub fn roots(&self) -> &Roots {
        &self.roots
    }

    pub fn defaults(&self) -> &FieldDefaults {
        &self.defaults
    }

    pub fn defaults_mut(&mut self) -> &mut FieldDefaults {
        &mut self.defaults
    }

    /// Resolve the data root for a reference path, failing hard when `required`.
    pub fn datadir(&self, reference: Option<&Path>, required: bool) -> Result<PathBuf> {
        self.roots.datadir(None, reference, required)
    }

    /// Resolve the rerun root for a reference path, failing hard when `required`.
    pub fn rerundir(&self, reference: Option<&Path>, required: bool) -> Result<PathBuf> {
        self.roots.rerundir(None, None, reference, required)
    }

    /// Root directory of `kind` for one call.
    pub fn root_for(&self, kind: ProductKind, query: &FindQuery) -> Result<PathBuf> {
        let reference = query.reference_path.as_deref();
        match kind.root() {
            RootKind::Data => {
                self.roots.datadir(query.datadir.as_deref(), reference, query.require_inference)
            }
            RootKind::Rerun => self.roots.rerundir(
                query.rerundir.as_deref(),
                query.datadir.as_deref(),
                reference,
                query.require_inference,
            ),
        }
    }

    /// Filters of `kind` with the instance defaults applied.
    pub fn filters(&self, kind: ProductKind) -> Result<FilterSet> {
        let mut filters = kind.filters();
        self.defaults.apply(&mut filters)?;
        Ok(filters)
    }

    /// Every file of `kind` matching the query.
    pub fn find(&self, kind: ProductKind, query: &FindQuery) -> Result<Discovery> {
        let root = self.root_for(kind, query)?;
        debug!("Searching {kind} under {}", root.display());

        let parts = [
            GlobPart::Root(root),
            GlobPart::template(kind.dir_glob()),
            GlobPart::template(kind.filename_glob()),
        ];
        let mut filters = self.filters(kind)?;
        discovery::discover(&parts, &mut filters, &kind.search_pattern()?, &query.fields)
    }

    /// The single file of `kind` matching the query.
    ///
    /// Fails with [`FinderError::NotFound`] or [`FinderError::AmbiguousResult`] unless
    /// exactly one file matches.
    pub fn locate(&self, kind: ProductKind, query: &FindQuery) -> Result<(PathBuf, Identity)> {
        self.find(kind, query)?.into_single(kind.name())
    }

    /// Identity encoded in a caller-supplied path. Parse failures propagate.
    pub fn parse(&self, kind: ProductKind, path: &Path) -> Result<Identity> {
        kind.parse(path)
    }

    /// Canonical file name of a product.
    pub fn file_name(&self, kind: ProductKind, identity: &Identity) -> Result<String> {
        kind.file_name(identity)
    }

    /// Work out the directory, file name and complete identity of one product.
    ///
    /// Exactly one of `filename` and `identity` must be given. Fields that cannot be
    /// derived from the input (the `pfsConfig` date is only encoded in the directory
    /// tree) are recovered with a [`locate`](Self::locate) round-trip.
    pub fn resolve(
        &self,
        kind: ProductKind,
        filename: Option<&Path>,
        identity: Option<&Identity>,
    ) -> Result<Resolved> {
        match (filename, identity) {
            (Some(_), Some(_)) => Err(FinderError::invalid_query(
                "give either a file name or an identity, not both",
            )),
            (None, None) => Err(FinderError::invalid_query("give a file name or an identity")),
            (Some(filename), None) => self.resolve_filename(kind, filename),
            (None, Some(identity)) => self.resolve_identity(kind, identity),
        }
    }

    /// Resolve a product and hand it to `loader`.
    ///
    /// Returns the loaded object together with the resolved identity.
    pub fn load<L: ProductLoader>(
        &self,
        kind: ProductKind,
        filename: Option<&Path>,
        identity: Option<&Identity>,
        loader: &L,
    ) -> anyhow::Result<(L::Output, Identity)> {
        let resolved = self.resolve(kind, filename, identity)?;
        let identity = resolved.identity.clone();
        let path = resolved.path();

        let output = loader
            .load(&resolved.into_request())
            .with_context(|| format!("Failed to load {kind} from {}", path.display()))?;
        Ok((output, identity))
    }

    fn resolve_filename(&self, kind: ProductKind, filename: &Path) -> Result<Resolved> {
        let identity = kind.parse(filename)?;

        if kind == ProductKind::PfsConfig {
            // Recover the directory (and date) from the tree
            let query = FindQuery::from_identity(&identity).with_reference(filename);
            let (path, identity) = self.locate(kind, &query)?;
            return Ok(Self::split(kind, &path, identity));
        }

        let dir = match filename.parent().filter(|p| !p.as_os_str().is_empty()) {
            Some(parent) => parent.to_path_buf(),
            None => self.product_dir(kind, &identity, &FindQuery::new())?,
        };
        let file_name = kind.file_name(&identity)?;

        Ok(Resolved {
            kind,
            dir,
            file_name,
            identity,
        })
    }

    fn resolve_identity(&self, kind: ProductKind, identity: &Identity) -> Result<Resolved> {
        let missing = kind.missing_fields(identity);
        if missing.is_empty() {
            let dir = self.product_dir(kind, identity, &FindQuery::new())?;
            return Ok(Resolved {
                kind,
                dir,
                file_name: kind.file_name(identity)?,
                identity: identity.clone(),
            });
        }

        debug!("Identity lacks [{}]; locating {kind} on disk", missing.join(", "));
        let (path, identity) = self.locate(kind, &FindQuery::from_identity(identity))?;
        Ok(Self::split(kind, &path, identity))
    }

    fn product_dir(&self, kind: ProductKind, identity: &Identity, query: &FindQuery) -> Result<PathBuf> {
        Ok(self.root_for(kind, query)?.join(kind.dir_name(identity)?))
    }

    fn split(kind: ProductKind, path: &Path, identity: Identity) -> Resolved {
        Resolved {
            kind,
            dir: path.parent().map(Path::to_path_buf).unwrap_or_default(),
            file_name: path.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default(),
            identity,
        }
    }
}
