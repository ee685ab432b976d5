//! File-name and path pattern matching.
//!
//! A [`PathPattern`] wraps a regular expression with one named capture group per filter
//! of a product kind. Applying it to a path extracts the token for every filter name and
//! hands it to that filter's parser, producing a typed [`Identity`].
//!
//! Matching is a *search*, not a full match: the regex may describe just the file name
//! (`pfsDesign-0x(?P<pfsDesignId>[0-9a-f]{16})\.fits$`) or a file name plus the parent
//! directory segment that carries an extra field such as the observation date.
//!
//! # Examples
//!
//! ```rust
//! use pfs_finder::filter::{Filter, FilterSet};
//! use pfs_finder::pattern::PathPattern;
//!
//! # fn example() -> pfs_finder::core::Result<()> {
//! let filters = FilterSet::new()
//!     .with(Filter::hex("objId", Some(16)))
//!     .with(Filter::int("visit", Some(6)));
//! let pattern = PathPattern::new(r"objId_(?P<objId>[0-9a-f]{16})_visit_(?P<visit>[0-9]{6})\.ext$")?;
//!
//! let id = pattern
//!     .extract("/data/00001/objId_000000000000002a_visit_000123.ext", &filters, true)?
//!     .expect("required match");
//! assert_eq!(id.hex("objId")?, 42);
//! assert_eq!(id.int("visit")?, 123);
//! # Ok(())
//! # }
//! ```

use crate::core::{FinderError, Result};
use crate::filter::FilterSet;
use crate::identity::Identity;
use regex::{Captures, Regex};
use tracing::trace;

/// Compiled file-name or path pattern.
#[derive(Debug, Clone)]
pub struct PathPattern {
    regex: Regex,
    original_pattern: String,
}

impl PathPattern {
    /// Compile a pattern. Invalid regex syntax is an [`FinderError::InvalidPattern`].
    pub fn new(pattern_str: &str) -> Result<Self> {
        let regex = Regex::new(pattern_str).map_err(|e| FinderError::InvalidPattern {
            pattern: pattern_str.to_string(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            regex,
            original_pattern: pattern_str.to_string(),
        })
    }

    /// Returns the original pattern string.
    #[must_use]
    pub fn pattern(&self) -> &str {
        &self.original_pattern
    }

    /// Whether the pattern matches anywhere in `path`.
    #[must_use]
    pub fn is_match(&self, path: &str) -> bool {
        self.regex.is_match(path)
    }

    /// Check that every filter has a capture group of the same name.
    pub fn ensure_groups(&self, filters: &FilterSet) -> Result<()> {
        for name in filters.names() {
            if !self.regex.capture_names().flatten().any(|g| g == name) {
                return Err(FinderError::InvalidPattern {
                    pattern: self.original_pattern.clone(),
                    reason: format!("no capture group named '{name}'"),
                });
            }
        }
        Ok(())
    }

    /// Extract a typed identity from `path`.
    ///
    /// When the pattern does not match, a `required` extraction fails with
    /// [`FinderError::FormatMismatch`]; otherwise a warning is logged and `Ok(None)`
    /// returned. Parse failures of individual fields always propagate as
    /// [`FinderError::Parse`].
    pub fn extract(&self, path: &str, filters: &FilterSet, required: bool) -> Result<Option<Identity>> {
        self.ensure_groups(filters)?;

        let Some(caps) = self.regex.captures(path) else {
            return FinderError::FormatMismatch {
                path: path.to_string(),
            }
            .soften(required);
        };

        self.parse_captures(&caps, filters).map(Some)
    }

    /// Match and parse a discovered candidate and test it against every filter's query.
    ///
    /// Returns `None` for candidates that do not match the regex, that have a token
    /// failing to parse, or whose values fall outside a query. Groups must have been
    /// checked with [`ensure_groups`](Self::ensure_groups).
    pub(crate) fn accept(&self, path: &str, filters: &FilterSet) -> Option<Identity> {
        let Some(caps) = self.regex.captures(path) else {
            trace!("Rejected {path}: does not match {}", self.original_pattern);
            return None;
        };

        let identity = match self.parse_captures(&caps, filters) {
            Ok(identity) => identity,
            Err(e) => {
                trace!("Rejected {path}: {e}");
                return None;
            }
        };

        for filter in filters {
            // parse_captures produced a value for every filter name
            let matched = identity.get(filter.name()).is_some_and(|v| filter.matches(v));
            if !matched {
                trace!("Rejected {path}: field '{}' outside query {}", filter.name(), filter.query());
                return None;
            }
        }

        trace!("Accepted {path}");
        Some(identity)
    }

    fn parse_captures(&self, caps: &Captures<'_>, filters: &FilterSet) -> Result<Identity> {
        let mut identity = Identity::new();
        for filter in filters {
            // An optional group that did not participate parses as an empty token
            let raw = caps.name(filter.name()).map_or("", |m| m.as_str());
            identity.insert(filter.name(), filter.parse_value(raw)?);
        }
        Ok(identity)
    }
}
