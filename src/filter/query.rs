//! Query state of a filter.

use super::FieldValue;
use crate::core::{FinderError, Result};
use std::fmt;

/// What a filter accepts. Exactly one mode is active at a time.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Query {
    /// Accepts every value
    #[default]
    Any,
    /// Accepts one value
    Single(FieldValue),
    /// Accepts any member of a discrete set
    Set(Vec<FieldValue>),
    /// Accepts `min <= v <= max`
    Range {
        /// Inclusive lower bound
        min: FieldValue,
        /// Inclusive upper bound
        max: FieldValue,
    },
}

impl Query {
    pub fn single(value: impl Into<FieldValue>) -> Self {
        Self::Single(value.into())
    }

    pub fn set<I, V>(values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<FieldValue>,
    {
        Self::Set(values.into_iter().map(Into::into).collect())
    }

    pub fn range(min: impl Into<FieldValue>, max: impl Into<FieldValue>) -> Self {
        Self::Range {
            min: min.into(),
            max: max.into(),
        }
    }

    #[must_use]
    pub const fn is_any(&self) -> bool {
        matches!(self, Self::Any)
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Any => f.write_str("*"),
            Self::Single(v) => write!(f, "{v}"),
            Self::Set(values) => {
                let parts: Vec<String> = values.iter().map(ToString::to_string).collect();
                f.write_str(&parts.join(","))
            }
            Self::Range {
                min,
                max,
            } => write!(f, "{min}..{max}"),
        }
    }
}

/// Loose query input, one optional slot per mode.
///
/// This is the shape callers fill from keyword-style arguments. Converting it into a
/// [`Query`] fails when more than one slot is populated; no slot at all means
/// [`Query::Any`].
#[derive(Debug, Clone, Default)]
pub struct QueryArgs {
    pub value: Option<FieldValue>,
    pub values: Option<Vec<FieldValue>>,
    pub range: Option<(FieldValue, FieldValue)>,
}

impl TryFrom<QueryArgs> for Query {
    type Error = FinderError;

    fn try_from(args: QueryArgs) -> Result<Self> {
        let given = usize::from(args.value.is_some())
            + usize::from(args.values.is_some())
            + usize::from(args.range.is_some());
        if given > 1 {
            return Err(FinderError::invalid_query(
                "only one of a single value, a set of values or a range can be given",
            ));
        }

        Ok(match (args.value, args.values, args.range) {
            (Some(v), _, _) => Self::Single(v),
            (_, Some(vs), _) => Self::Set(vs),
            (_, _, Some((min, max))) => Self::Range {
                min,
                max,
            },
            _ => Self::Any,
        })
    }
}
