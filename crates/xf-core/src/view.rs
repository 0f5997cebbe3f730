//! Filtered views over the record store

use crate::record::{RecordStore, TripRecord};

/// The subsequence of the store that passes every active filter.
///
/// Views borrow the store and are rebuilt on every recompute pass; they are
/// never cached across passes.
#[derive(Debug, Clone)]
pub struct FilteredView<'a> {
    store: &'a RecordStore,
    selection: Selection,
}

#[derive(Debug, Clone)]
enum Selection {
    All,
    Rows(Vec<usize>),
}

impl<'a> FilteredView<'a> {
    pub(crate) fn all(store: &'a RecordStore) -> Self {
        Self {
            store,
            selection: Selection::All,
        }
    }

    pub(crate) fn from_indices(store: &'a RecordStore, rows: Vec<usize>) -> Self {
        Self {
            store,
            selection: Selection::Rows(rows),
        }
    }

    /// Number of rows in the view
    pub fn len(&self) -> usize {
        match &self.selection {
            Selection::All => self.store.len(),
            Selection::Rows(rows) => rows.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of rows in the underlying store
    pub fn total_len(&self) -> usize {
        self.store.len()
    }

    /// Whether the view is the whole store
    pub fn is_unfiltered(&self) -> bool {
        matches!(self.selection, Selection::All)
    }

    pub fn store(&self) -> &'a RecordStore {
        self.store
    }

    /// Iterate the rows in store order
    pub fn iter(&self) -> Rows<'_> {
        match &self.selection {
            Selection::All => Rows::All(self.store.records().iter()),
            Selection::Rows(rows) => Rows::Picked {
                records: self.store.records(),
                indices: rows.iter(),
            },
        }
    }
}

impl<'v, 'a> IntoIterator for &'v FilteredView<'a> {
    type Item = &'v TripRecord;
    type IntoIter = Rows<'v>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over the rows of a [`FilteredView`]
pub enum Rows<'v> {
    All(std::slice::Iter<'v, TripRecord>),
    Picked {
        records: &'v [TripRecord],
        indices: std::slice::Iter<'v, usize>,
    },
}

impl<'v> Iterator for Rows<'v> {
    type Item = &'v TripRecord;

    fn next(&mut self) -> Option<Self::Item> {
        match self {
            Rows::All(iter) => iter.next(),
            Rows::Picked { records, indices } => indices.next().and_then(|&i| records.get(i)),
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match self {
            Rows::All(iter) => iter.size_hint(),
            Rows::Picked { indices, .. } => indices.size_hint(),
        }
    }
}
