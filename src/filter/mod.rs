//! Typed value filters.
//!
//! A [`Filter`] describes one named identity dimension of a data product (a visit
//! number, an object id, an observation date, ...). The same filter is used in three
//! projections of a value:
//!
//! - **Render**: [`Filter::format_value`] writes a value the way it appears in a path
//!   (zero padding, hexadecimal digits, ISO dates)
//! - **Wildcard**: [`Filter::glob_fragment`] produces the text the filter contributes to
//!   a filesystem glob expression
//! - **Parse and match**: [`Filter::parse_value`] reads a token captured from a file name
//!   and [`Filter::matches`] tests it against the current [`Query`]
//!
//! Keeping all of them in one type means the padding used when writing a path is the
//! padding expected when parsing it back.
//!
//! # Variants
//!
//! | Kind     | Format            | Wildcard           | Parse         |
//! |----------|-------------------|--------------------|---------------|
//! | `Int`    | `{:0w}`           | `[0-9]` x w or `*` | base 10       |
//! | `Hex`    | `{:0wx}`          | `[0-9a-f]` x w     | base 16       |
//! | `Date`   | `%Y-%m-%d`        | `????-??-??`       | `%Y-%m-%d`    |
//! | `Str`    | verbatim          | `*`                | identity      |
//!
//! # Examples
//!
//! ```rust
//! use pfs_finder::filter::{Filter, Query, FieldValue};
//!
//! # fn example() -> pfs_finder::core::Result<()> {
//! let mut visit = Filter::int("visit", Some(6));
//! assert_eq!(visit.glob_fragment()?, "[0-9][0-9][0-9][0-9][0-9][0-9]");
//!
//! visit.set_query(Query::range(100, 105))?;
//! assert!(visit.matches(&visit.parse_value("000100")?));
//! assert!(!visit.matches(&visit.parse_value("000106")?));
//!
//! visit.set_query(Query::single(123))?;
//! assert_eq!(visit.glob_fragment()?, "000123");
//! # Ok(())
//! # }
//! ```

mod query;
mod set;
mod value;

pub use query::{Query, QueryArgs};
pub use set::FilterSet;
pub use value::FieldValue;

use crate::constants::{DATE_FORMAT, DATE_GLOB};
use crate::core::{FinderError, Result};
use chrono::NaiveDate;
use std::fmt;

/// Value domain of a filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterKind {
    Int,
    Hex,
    Date,
    Str,
}

impl fmt::Display for FilterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Int => "integer",
            Self::Hex => "hex integer",
            Self::Date => "date",
            Self::Str => "string",
        })
    }
}

/// A named, typed identity dimension together with the caller's query on it.
///
/// Filters are built fresh, unconstrained, for every call. Setting a query replaces the
/// previous one entirely.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filter {
    name: String,
    kind: FilterKind,
    width: Option<usize>,
    query: Query,
}

impl Filter {
    /// Generic constructor. `width` is the zero-padded digit count for numeric kinds and
    /// is ignored for dates and strings.
    pub fn new(name: impl Into<String>, kind: FilterKind, width: Option<usize>) -> Self {
        let width = match kind {
            FilterKind::Int | FilterKind::Hex => width,
            FilterKind::Date | FilterKind::Str => None,
        };
        Self {
            name: name.into(),
            kind,
            width,
            query: Query::Any,
        }
    }

    pub fn int(name: impl Into<String>, width: Option<usize>) -> Self {
        Self::new(name, FilterKind::Int, width)
    }

    pub fn hex(name: impl Into<String>, width: Option<usize>) -> Self {
        Self::new(name, FilterKind::Hex, width)
    }

    pub fn date(name: impl Into<String>) -> Self {
        Self::new(name, FilterKind::Date, None)
    }

    pub fn string(name: impl Into<String>) -> Self {
        Self::new(name, FilterKind::Str, None)
    }

    /// Builder-style variant of [`set_query`](Self::set_query).
    pub fn with_query(mut self, query: Query) -> Result<Self> {
        self.set_query(query)?;
        Ok(self)
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub const fn kind(&self) -> FilterKind {
        self.kind
    }

    #[must_use]
    pub const fn width(&self) -> Option<usize> {
        self.width
    }

    #[must_use]
    pub const fn query(&self) -> &Query {
        &self.query
    }

    /// Replace the query state.
    ///
    /// Values are converted into the filter's domain first (a non-negative integer is a
    /// valid hex id and vice versa). Fails with [`FinderError::InvalidQuery`] when a
    /// value does not belong to the domain, when a set is empty, or when a range has
    /// `min > max`. On failure the previous query is left untouched.
    pub fn set_query(&mut self, query: Query) -> Result<()> {
        let query = match query {
            Query::Any => Query::Any,
            Query::Single(v) => Query::Single(self.coerce_query_value(v)?),
            Query::Set(values) => {
                if values.is_empty() {
                    return Err(FinderError::invalid_query(format!(
                        "empty set of values for field '{}'",
                        self.name
                    )));
                }
                Query::Set(
                    values
                        .into_iter()
                        .map(|v| self.coerce_query_value(v))
                        .collect::<Result<Vec<_>>>()?,
                )
            }
            Query::Range {
                min,
                max,
            } => {
                let min = self.coerce_query_value(min)?;
                let max = self.coerce_query_value(max)?;
                if min > max {
                    return Err(FinderError::invalid_query(format!(
                        "range {min}..{max} for field '{}' is empty",
                        self.name
                    )));
                }
                Query::Range {
                    min,
                    max,
                }
            }
        };
        self.query = query;
        Ok(())
    }

    /// Set the query from loose keyword-style input; fails when more than one mode is
    /// populated.
    pub fn set_query_args(&mut self, args: QueryArgs) -> Result<()> {
        self.set_query(Query::try_from(args)?)
    }

    /// Parse the textual query syntax: `*` (or empty) for any value, `a,b,c` for a set,
    /// `min..max` for an inclusive range, anything else for a single value.
    pub fn parse_query(&self, text: &str) -> Result<Query> {
        let text = text.trim();
        if text.is_empty() || text == "*" {
            return Ok(Query::Any);
        }

        let invalid = |e: FinderError| {
            FinderError::invalid_query(format!("'{text}' for field '{}': {e}", self.name))
        };

        if let Some((min, max)) = text.split_once("..") {
            let min = self.parse_value(min.trim()).map_err(invalid)?;
            let max = self.parse_value(max.trim()).map_err(invalid)?;
            return Ok(Query::Range {
                min,
                max,
            });
        }

        // Strings may legitimately contain commas (patch names such as "1,1")
        if self.kind != FilterKind::Str && text.contains(',') {
            let values = text
                .split(',')
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(|t| self.parse_value(t))
                .collect::<Result<Vec<_>>>()
                .map_err(invalid)?;
            return Ok(Query::Set(values));
        }

        Ok(Query::Single(self.parse_value(text).map_err(invalid)?))
    }

    /// Render a concrete value the way it appears in a path.
    pub fn format_value(&self, value: &FieldValue) -> Result<String> {
        let value = self.coerce(value).ok_or_else(|| FinderError::Formatting {
            field: self.name.clone(),
            reason: format!("expected a {} value, got {} '{value}'", self.kind, value.type_name()),
        })?;

        let text = match (&value, self.width) {
            (FieldValue::Int(v), Some(w)) => format!("{v:0w$}"),
            (FieldValue::Int(v), None) => v.to_string(),
            (FieldValue::Hex(v), Some(w)) => format!("{v:0w$x}"),
            (FieldValue::Hex(v), None) => format!("{v:x}"),
            (FieldValue::Date(d), _) => d.format(DATE_FORMAT).to_string(),
            (FieldValue::Str(s), _) => {
                if s.contains(['/', '\\']) {
                    return Err(FinderError::Formatting {
                        field: self.name.clone(),
                        reason: format!("'{s}' contains a path separator"),
                    });
                }
                s.clone()
            }
        };
        Ok(text)
    }

    /// Text this filter contributes to a glob expression.
    ///
    /// A single-value query yields the exact formatted value so the glob itself narrows
    /// the listing. Every other mode yields a wildcard covering the kind's value space,
    /// sized to the fixed width when there is one.
    pub fn glob_fragment(&self) -> Result<String> {
        if let Query::Single(value) = &self.query {
            return Ok(glob::Pattern::escape(&self.format_value(value)?));
        }

        Ok(match (self.kind, self.width) {
            (FilterKind::Int, Some(w)) => "[0-9]".repeat(w),
            (FilterKind::Hex, Some(w)) => "[0-9a-f]".repeat(w),
            (FilterKind::Int | FilterKind::Hex | FilterKind::Str, _) => "*".to_string(),
            (FilterKind::Date, _) => DATE_GLOB.to_string(),
        })
    }

    /// Convert a raw token taken from a file name into a typed value.
    pub fn parse_value(&self, raw: &str) -> Result<FieldValue> {
        let parse_error = |reason: String| FinderError::Parse {
            field: self.name.clone(),
            raw: raw.to_string(),
            reason,
        };

        match self.kind {
            FilterKind::Int => {
                raw.trim().parse::<i64>().map(FieldValue::Int).map_err(|e| parse_error(e.to_string()))
            }
            FilterKind::Hex => {
                let digits = raw.trim();
                let digits = digits
                    .strip_prefix("0x")
                    .or_else(|| digits.strip_prefix("0X"))
                    .unwrap_or(digits);
                u64::from_str_radix(digits, 16)
                    .map(FieldValue::Hex)
                    .map_err(|e| parse_error(e.to_string()))
            }
            FilterKind::Date => NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT)
                .map(FieldValue::Date)
                .map_err(|e| parse_error(e.to_string())),
            FilterKind::Str => Ok(FieldValue::Str(raw.to_string())),
        }
    }

    /// Whether `value` satisfies the current query. Ranges are inclusive at both ends.
    #[must_use]
    pub fn matches(&self, value: &FieldValue) -> bool {
        let Some(value) = self.coerce(value) else {
            return false;
        };

        match &self.query {
            Query::Any => true,
            Query::Single(q) => *q == value,
            Query::Set(values) => values.contains(&value),
            Query::Range {
                min,
                max,
            } => *min <= value && value <= *max,
        }
    }

    /// Convert a value into this filter's domain, if it has a lossless representation
    /// there.
    fn coerce(&self, value: &FieldValue) -> Option<FieldValue> {
        match (self.kind, value) {
            (FilterKind::Int, FieldValue::Int(_))
            | (FilterKind::Hex, FieldValue::Hex(_))
            | (FilterKind::Date, FieldValue::Date(_))
            | (FilterKind::Str, FieldValue::Str(_)) => Some(value.clone()),
            (FilterKind::Int, FieldValue::Hex(v)) => i64::try_from(*v).ok().map(FieldValue::Int),
            (FilterKind::Hex, FieldValue::Int(v)) => u64::try_from(*v).ok().map(FieldValue::Hex),
            _ => None,
        }
    }

    fn coerce_query_value(&self, value: FieldValue) -> Result<FieldValue> {
        self.coerce(&value).ok_or_else(|| {
            FinderError::invalid_query(format!(
                "field '{}' expects a {} value, got {} '{value}'",
                self.name,
                self.kind,
                value.type_name()
            ))
        })
    }
}
