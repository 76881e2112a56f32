//! Chainable post-processing of filtered snapshots.
//!
//! A [`QueryResult`] owns a private copy of the documents a collection scan matched.
//! It shares nothing with the collection, so ordering and slicing need no locking.
//! Each step consumes the result and hands it back, which makes the chain order
//! explicit:
//!
//! ```ignore
//! let second_page = users
//!     .filter(|u| u.age >= 18)
//!     .await
//!     .sort(|a, b| a.name < b.name)
//!     .offset(10)
//!     .limit(10)
//!     .results();
//! ```
//!
//! Applying `offset`/`limit` before `sort` slices an unordered snapshot, which is
//! rarely what you want; the order of the chain is left to the caller.

use std::{cmp::Ordering, slice, vec};

use crate::page::{Page, PaginationParams};

/// An owned snapshot of matched documents supporting sort, offset and limit.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryResult<T> {
    results: Vec<T>,
}

impl<T> QueryResult<T> {
    /// Wraps an already collected snapshot.
    pub fn new(results: Vec<T>) -> Self {
        Self { results }
    }

    /// Orders the snapshot with a strict "less than" comparator.
    ///
    /// The sort is stable: documents the comparator considers equal keep their
    /// relative order.
    pub fn sort<F>(self, less: F) -> Self
    where
        F: Fn(&T, &T) -> bool,
    {
        self.sort_by(|a, b| {
            if less(a, b) {
                Ordering::Less
            } else if less(b, a) {
                Ordering::Greater
            } else {
                Ordering::Equal
            }
        })
    }

    /// Orders the snapshot with an [`Ordering`] comparator. Stable.
    pub fn sort_by<F>(mut self, compare: F) -> Self
    where
        F: FnMut(&T, &T) -> Ordering,
    {
        self.results.sort_by(compare);
        self
    }

    /// Drops the first `offset` documents; empty if `offset` reaches the end.
    pub fn offset(mut self, offset: usize) -> Self {
        if offset >= self.results.len() {
            self.results.clear();
        } else {
            self.results.drain(..offset);
        }
        self
    }

    /// Keeps at most `limit` documents.
    pub fn limit(mut self, limit: usize) -> Self {
        self.results.truncate(limit);
        self
    }

    /// Cuts one page out of the snapshot.
    pub fn paginate(self, params: PaginationParams) -> Page<T> {
        params.paginate(self.results)
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn first(&self) -> Option<&T> {
        self.results.first()
    }

    pub fn iter(&self) -> slice::Iter<'_, T> {
        self.results.iter()
    }

    /// Returns the processed documents.
    pub fn results(self) -> Vec<T> {
        self.results
    }
}

impl<T> Default for QueryResult<T> {
    fn default() -> Self {
        Self { results: Vec::new() }
    }
}

impl<T> From<Vec<T>> for QueryResult<T> {
    fn from(results: Vec<T>) -> Self {
        Self::new(results)
    }
}

impl<T> FromIterator<T> for QueryResult<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<T> IntoIterator for QueryResult<T> {
    type Item = T;
    type IntoIter = vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.results.into_iter()
    }
}

impl<'a, T> IntoIterator for &'a QueryResult<T> {
    type Item = &'a T;
    type IntoIter = slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.results.iter()
    }
}
