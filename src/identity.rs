//! Identifier records.
//!
//! An [`Identity`] is the ordered mapping from field name to typed value that identifies
//! one data product. [`IdentityColumns`] is the column-oriented form returned by
//! discovery: one value list per field, positionally aligned with the list of matched
//! paths.

use crate::core::{FinderError, Result};
use crate::filter::FieldValue;
use chrono::NaiveDate;
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::fmt;

/// Typed identity of a single data product.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Identity {
    fields: Vec<(String, FieldValue)>,
}

impl Identity {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            fields: Vec::new(),
        }
    }

    /// Set a field, keeping the position of an existing field with the same name.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<FieldValue>) {
        let name = name.into();
        let value = value.into();
        if let Some(slot) = self.fields.iter_mut().find(|(n, _)| *n == name) {
            slot.1 = value;
        } else {
            self.fields.push((name, value));
        }
    }

    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.insert(name, value);
        self
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Integer field; hex values that fit are accepted.
    pub fn int(&self, name: &str) -> Result<i64> {
        match self.require(name)? {
            FieldValue::Int(v) => Ok(*v),
            FieldValue::Hex(v) => i64::try_from(*v).map_err(|_| self.type_error(name, "integer")),
            _ => Err(self.type_error(name, "integer")),
        }
    }

    /// Hex id field; non-negative integers are accepted.
    pub fn hex(&self, name: &str) -> Result<u64> {
        match self.require(name)? {
            FieldValue::Hex(v) => Ok(*v),
            FieldValue::Int(v) => u64::try_from(*v).map_err(|_| self.type_error(name, "hex id")),
            _ => Err(self.type_error(name, "hex id")),
        }
    }

    pub fn date(&self, name: &str) -> Result<NaiveDate> {
        self.require(name)?.as_date().ok_or_else(|| self.type_error(name, "date"))
    }

    pub fn string(&self, name: &str) -> Result<&str> {
        self.require(name)?.as_str().ok_or_else(|| self.type_error(name, "string"))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.fields.iter().map(|(n, v)| (n.as_str(), v))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(n, _)| n.as_str())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    fn require(&self, name: &str) -> Result<&FieldValue> {
        self.get(name)
            .ok_or_else(|| FinderError::invalid_query(format!("identity has no field '{name}'")))
    }

    fn type_error(&self, name: &str, expected: &str) -> FinderError {
        FinderError::invalid_query(format!("identity field '{name}' is not a {expected}"))
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (name, value) in &self.fields {
            if !first {
                f.write_str(" ")?;
            }
            first = false;
            write!(f, "{name}={value}")?;
        }
        Ok(())
    }
}

impl Serialize for Identity {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (name, value) in &self.fields {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

impl FromIterator<(String, FieldValue)> for Identity {
    fn from_iter<T: IntoIterator<Item = (String, FieldValue)>>(iter: T) -> Self {
        let mut identity = Self::new();
        for (name, value) in iter {
            identity.insert(name, value);
        }
        identity
    }
}

/// Column-oriented identities of a discovery result.
///
/// The field names are fixed at construction; every pushed row must carry exactly those
/// names, so all columns always have the same length and row `i` of every column refers
/// to the same file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdentityColumns {
    names: Vec<String>,
    columns: Vec<Vec<FieldValue>>,
}

impl IdentityColumns {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();
        let columns = vec![Vec::new(); names.len()];
        Self {
            names,
            columns,
        }
    }

    /// Append one row. Fails if the identity's field set differs from the column names.
    pub fn push(&mut self, identity: &Identity) -> Result<()> {
        if identity.len() != self.names.len() {
            return Err(FinderError::invalid_query(format!(
                "identity has {} fields, expected {}",
                identity.len(),
                self.names.len()
            )));
        }
        let mut row = Vec::with_capacity(self.names.len());
        for name in &self.names {
            let value = identity.get(name).ok_or_else(|| {
                FinderError::invalid_query(format!("identity has no field '{name}'"))
            })?;
            row.push(value.clone());
        }
        for (column, value) in self.columns.iter_mut().zip(row) {
            column.push(value);
        }
        Ok(())
    }

    #[must_use]
    pub fn column(&self, name: &str) -> Option<&[FieldValue]> {
        self.names.iter().position(|n| n == name).map(|i| self.columns[i].as_slice())
    }

    /// Row `index` as a standalone identity.
    #[must_use]
    pub fn row(&self, index: usize) -> Option<Identity> {
        if index >= self.len() {
            return None;
        }
        Some(
            self.names
                .iter()
                .zip(&self.columns)
                .map(|(name, column)| (name.clone(), column[index].clone()))
                .collect(),
        )
    }

    pub fn rows(&self) -> impl Iterator<Item = Identity> + '_ {
        (0..self.len()).filter_map(|i| self.row(i))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.columns.first().map_or(0, Vec::len)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Serialize for IdentityColumns {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.names.len()))?;
        for (name, column) in self.names.iter().zip(&self.columns) {
            map.serialize_entry(name, column)?;
        }
        map.end()
    }
}
