//! Ordered collections of filters.

use super::{Filter, Query};
use crate::core::{FinderError, Result};

/// The ordered filter set of one product kind.
///
/// Order is significant: it is the order of fields in identities and in output.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSet {
    filters: Vec<Filter>,
}

impl FilterSet {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            filters: Vec::new(),
        }
    }

    /// Append a filter. A filter with the same name replaces the existing one in place.
    pub fn push(&mut self, filter: Filter) {
        if let Some(existing) = self.filters.iter_mut().find(|f| f.name() == filter.name()) {
            *existing = filter;
        } else {
            self.filters.push(filter);
        }
    }

    #[must_use]
    pub fn with(mut self, filter: Filter) -> Self {
        self.push(filter);
        self
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Filter> {
        self.filters.iter().find(|f| f.name() == name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Filter> {
        self.filters.iter_mut().find(|f| f.name() == name)
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Set the query of the named filter.
    pub fn set_query(&mut self, name: &str, query: Query) -> Result<()> {
        self.get_mut(name)
            .ok_or_else(|| FinderError::invalid_query(format!("unknown field '{name}'")))?
            .set_query(query)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Filter> {
        self.filters.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.filters.iter().map(Filter::name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.filters.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }
}

impl FromIterator<Filter> for FilterSet {
    fn from_iter<T: IntoIterator<Item = Filter>>(iter: T) -> Self {
        let mut set = Self::new();
        for filter in iter {
            set.push(filter);
        }
        set
    }
}

impl<'a> IntoIterator for &'a FilterSet {
    type Item = &'a Filter;
    type IntoIter = std::slice::Iter<'a, Filter>;

    fn into_iter(self) -> Self::IntoIter {
        self.filters.iter()
    }
}
