//! Glob-then-regex-then-filter discovery of data products.
//!
//! Discovery turns a set of filters (each carrying a query) into the list of files that
//! satisfy every query:
//!
//! 1. Per-call query overrides are applied to the filters; filters without an override
//!    keep their current state.
//! 2. Every filter contributes a glob fragment (an exact value for single-value queries,
//!    a wildcard otherwise); the fragments are substituted into the path templates and
//!    joined into one glob expression.
//! 3. The glob is expanded against the filesystem. Files are never opened.
//! 4. Each candidate is matched against the path regex, its fields are parsed and
//!    tested. The glob over-approximates; the regex and the queries are the precise
//!    filter. Candidates that do not match, or that carry a malformed token, are
//!    dropped silently so a stray file never aborts a scan.
//!
//! Results keep the listing order of the glob expansion, which is sorted, so repeated
//! calls over an unchanged tree return identical results.
//!
//! # Examples
//!
//! ```rust,no_run
//! use pfs_finder::discovery::{discover, GlobPart, QueryOverrides};
//! use pfs_finder::filter::{Filter, FilterSet, Query};
//! use pfs_finder::pattern::PathPattern;
//!
//! # fn example() -> pfs_finder::core::Result<()> {
//! let mut filters = FilterSet::new()
//!     .with(Filter::int("catId", Some(5)))
//!     .with(Filter::hex("objId", Some(16)))
//!     .with(Filter::int("visit", Some(6)));
//! let parts = [
//!     GlobPart::root("/data"),
//!     GlobPart::template("{catId}"),
//!     GlobPart::template("objId_{objId}_visit_{visit}.ext"),
//! ];
//! let pattern = PathPattern::new(
//!     r"(?P<catId>[0-9]{5})[/\\]objId_(?P<objId>[0-9a-f]{16})_visit_(?P<visit>[0-9]{6})\.ext$",
//! )?;
//!
//! let mut overrides = QueryOverrides::new();
//! overrides.insert("visit".to_string(), Query::single(123));
//!
//! let found = discover(&parts, &mut filters, &pattern, &overrides)?;
//! for (path, id) in found.iter() {
//!     println!("{} {id}", path.display());
//! }
//! # Ok(())
//! # }
//! ```

use crate::core::{FinderError, Result};
use crate::filter::{FilterSet, Query};
use crate::identity::{Identity, IdentityColumns};
use crate::pattern::PathPattern;
use crate::template;
use glob::MatchOptions;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Per-call queries keyed by field name. Fields without an entry keep their filter's
/// current query; entries naming a field the filter set lacks are ignored.
pub type QueryOverrides = BTreeMap<String, Query>;

/// One component of a discovery glob.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GlobPart {
    /// A literal directory, e.g. the data root; glob metacharacters in it are escaped
    Root(PathBuf),
    /// A path fragment with `{name}` placeholders for filter names
    Template(String),
}

impl GlobPart {
    pub fn root(path: impl Into<PathBuf>) -> Self {
        Self::Root(path.into())
    }

    pub fn template(template: impl Into<String>) -> Self {
        Self::Template(template.into())
    }
}

/// Matched paths plus their identities, positionally aligned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Discovery {
    pub paths: Vec<PathBuf>,
    pub ids: IdentityColumns,
}

impl Discovery {
    /// Empty result whose identity columns are the filter names.
    #[must_use]
    pub fn empty(filters: &FilterSet) -> Self {
        Self {
            paths: Vec::new(),
            ids: IdentityColumns::new(filters.names()),
        }
    }

    fn push(&mut self, path: PathBuf, identity: &Identity) -> Result<()> {
        self.ids.push(identity)?;
        self.paths.push(path);
        Ok(())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Iterate over `(path, identity)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&Path, Identity)> + '_ {
        self.paths.iter().map(PathBuf::as_path).zip(self.ids.rows())
    }

    /// Collapse to exactly one file.
    ///
    /// Zero results fail with [`FinderError::NotFound`], more than one with
    /// [`FinderError::AmbiguousResult`]; one file is never picked out of several.
    pub fn into_single(self, product: &str) -> Result<(PathBuf, Identity)> {
        match self.paths.len() {
            0 => Err(FinderError::NotFound {
                product: product.to_string(),
            }),
            1 => {
                let identity = self.ids.row(0).unwrap_or_default();
                let path = self.paths.into_iter().next().unwrap_or_default();
                Ok((path, identity))
            }
            count => Err(FinderError::AmbiguousResult {
                product: product.to_string(),
                count,
            }),
        }
    }
}

/// Build the glob expression for the filters' current queries.
pub fn glob_expression(parts: &[GlobPart], filters: &FilterSet) -> Result<String> {
    let fragments = filters
        .iter()
        .map(|f| Ok((f.name().to_string(), f.glob_fragment()?)))
        .collect::<Result<HashMap<_, _>>>()?;

    let mut path = PathBuf::new();
    for part in parts {
        match part {
            GlobPart::Root(root) => path.push(glob::Pattern::escape(&root.to_string_lossy())),
            GlobPart::Template(t) => path.push(template::render(t, &fragments)?),
        }
    }
    Ok(path.to_string_lossy().into_owned())
}

/// Find the files whose names satisfy every filter.
///
/// `overrides` are applied to `filters` first (replacing their query); the filters keep
/// those queries after the call. Filesystem errors during listing propagate
/// immediately.
pub fn discover(
    parts: &[GlobPart],
    filters: &mut FilterSet,
    pattern: &PathPattern,
    overrides: &QueryOverrides,
) -> Result<Discovery> {
    for (name, query) in overrides {
        match filters.get_mut(name) {
            Some(filter) => filter.set_query(query.clone())?,
            None => debug!("Ignoring query on '{name}': not a field of this product"),
        }
    }

    pattern.ensure_groups(filters)?;

    let expression = glob_expression(parts, filters)?;
    debug!("Searching with glob '{expression}'");

    let options = MatchOptions {
        case_sensitive: true,
        require_literal_separator: true,
        require_literal_leading_dot: false,
    };
    let entries = glob::glob_with(&expression, options).map_err(|e| FinderError::InvalidPattern {
        pattern: expression.clone(),
        reason: e.to_string(),
    })?;

    let mut found = Discovery::empty(filters);
    let mut candidates = 0usize;
    for entry in entries {
        let path = entry.map_err(glob::GlobError::into_error)?;
        candidates += 1;

        if let Some(identity) = pattern.accept(&path.to_string_lossy(), filters) {
            found.push(path, &identity)?;
        }
    }

    debug!("Kept {} of {candidates} candidates for '{expression}'", found.len());
    Ok(found)
}
