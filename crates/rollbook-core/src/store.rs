// ABOUTME: RecordStore owns the ordered student collection and enforces roll uniqueness.
// ABOUTME: Every mutation is written through the persistence adapter before it becomes visible.

use std::cmp::Ordering;
use std::iter::Enumerate;
use std::slice;

use thiserror::Error;

use crate::model::{RecordId, StudentRecord, ValidationError};
use crate::persistence::{PersistError, Persistence};
use crate::query::{Filter, View, query};
use crate::storage::StorageProvider;

/// Errors that can occur when mutating the store. The store is left
/// unchanged whenever one is returned.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("roll number already exists: {roll}")]
    DuplicateRoll { roll: String },

    #[error("no record at index {index} (store holds {len})")]
    InvalidIndex { index: usize, len: usize },

    #[error("record not found: {0}")]
    UnknownRecord(RecordId),

    #[error("invalid record: {0}")]
    Invalid(#[from] ValidationError),

    #[error("persistence error: {0}")]
    Persistence(#[from] PersistError),
}

#[derive(Debug, Clone)]
struct Entry {
    id: RecordId,
    record: StudentRecord,
}

/// A record together with its current position and stable id.
#[derive(Debug, Clone, Copy)]
pub struct Row<'a> {
    pub index: usize,
    pub id: RecordId,
    pub record: &'a StudentRecord,
}

/// Iterator over the store's rows in order.
#[derive(Debug, Clone)]
pub struct Rows<'a> {
    inner: Enumerate<slice::Iter<'a, Entry>>,
}

impl<'a> Iterator for Rows<'a> {
    type Item = Row<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(index, entry)| Row {
            index,
            id: entry.id,
            record: &entry.record,
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl ExactSizeIterator for Rows<'_> {}

/// Filtered view over the store's rows.
pub type StoreView<'a> = View<Rows<'a>>;

/// The ordered collection of student records.
pub struct RecordStore<S> {
    entries: Vec<Entry>,
    persistence: Persistence<S>,
}

impl<S: StorageProvider> RecordStore<S> {
    /// Load the stored collection and assign fresh ids. Stored records with
    /// a blank roll, or repeating an earlier roll, are dropped.
    pub fn open(persistence: Persistence<S>) -> Self {
        let mut entries: Vec<Entry> = Vec::new();
        for record in persistence.load() {
            if record.roll.trim().is_empty() {
                tracing::warn!("dropping stored record with blank roll (name {:?})", record.name);
                continue;
            }
            if entries.iter().any(|e| e.record.roll == record.roll) {
                tracing::warn!("dropping stored record with duplicate roll {:?}", record.roll);
                continue;
            }
            entries.push(Entry {
                id: RecordId::new(),
                record,
            });
        }
        Self {
            entries,
            persistence,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn persistence(&self) -> &Persistence<S> {
        &self.persistence
    }

    /// Read-only snapshot of all rows in order.
    pub fn list(&self) -> Rows<'_> {
        Rows {
            inner: self.entries.iter().enumerate(),
        }
    }

    /// Rows matching `filter`, in store order.
    pub fn query(&self, filter: &Filter) -> StoreView<'_> {
        query(self.list(), filter)
    }

    /// Owned copy of the records in order.
    pub fn records(&self) -> Vec<StudentRecord> {
        self.entries.iter().map(|e| e.record.clone()).collect()
    }

    pub fn get(&self, index: usize) -> Option<Row<'_>> {
        self.entries.get(index).map(|entry| Row {
            index,
            id: entry.id,
            record: &entry.record,
        })
    }

    /// Current position of the record with `id`.
    pub fn index_of(&self, id: RecordId) -> Option<usize> {
        self.entries.iter().position(|e| e.id == id)
    }

    /// Position of the record whose roll equals `roll` as text.
    pub fn position_of_roll(&self, roll: &str) -> Option<usize> {
        self.entries.iter().position(|e| e.record.roll == roll)
    }

    /// Append a record. Fails if its roll is already used.
    pub fn add(&mut self, record: StudentRecord) -> Result<RecordId, StoreError> {
        record.validate()?;
        if self.position_of_roll(&record.roll).is_some() {
            return Err(StoreError::DuplicateRoll { roll: record.roll });
        }

        let id = RecordId::new();
        let mut candidate = self.entries.clone();
        candidate.push(Entry { id, record });
        self.commit(candidate)?;

        tracing::debug!("added record {} at index {}", id, self.entries.len() - 1);
        Ok(id)
    }

    /// Replace the record at `index` in place. Its own roll may be kept; a
    /// roll held by any other record is rejected.
    pub fn update(&mut self, index: usize, record: StudentRecord) -> Result<RecordId, StoreError> {
        let len = self.entries.len();
        let id = self
            .entries
            .get(index)
            .map(|e| e.id)
            .ok_or(StoreError::InvalidIndex { index, len })?;
        self.replace_at(index, record)?;
        Ok(id)
    }

    /// Replace the record with `id` in place, wherever it currently sits.
    pub fn update_by_id(
        &mut self,
        id: RecordId,
        record: StudentRecord,
    ) -> Result<usize, StoreError> {
        let index = self.index_of(id).ok_or(StoreError::UnknownRecord(id))?;
        self.replace_at(index, record)?;
        Ok(index)
    }

    fn replace_at(&mut self, index: usize, record: StudentRecord) -> Result<(), StoreError> {
        record.validate()?;
        let collides = self
            .entries
            .iter()
            .enumerate()
            .any(|(i, e)| i != index && e.record.roll == record.roll);
        if collides {
            return Err(StoreError::DuplicateRoll { roll: record.roll });
        }

        let mut candidate = self.entries.clone();
        candidate[index].record = record;
        self.commit(candidate)?;

        tracing::debug!("updated record at index {}", index);
        Ok(())
    }

    /// Remove the record at `index`; later records shift down by one.
    pub fn delete(&mut self, index: usize) -> Result<(RecordId, StudentRecord), StoreError> {
        let len = self.entries.len();
        if index >= len {
            return Err(StoreError::InvalidIndex { index, len });
        }

        let mut candidate = self.entries.clone();
        let removed = candidate.remove(index);
        self.commit(candidate)?;

        tracing::debug!("deleted record {} from index {}", removed.id, index);
        Ok((removed.id, removed.record))
    }

    pub fn delete_by_id(&mut self, id: RecordId) -> Result<StudentRecord, StoreError> {
        let index = self.index_of(id).ok_or(StoreError::UnknownRecord(id))?;
        self.delete(index).map(|(_, record)| record)
    }

    /// Stable ascending sort on the numeric roll. Non-numeric rolls go last.
    pub fn sort_by_roll_ascending(&mut self) -> Result<(), StoreError> {
        self.sort_by(|a, b| missing_last(a.roll_number(), b.roll_number(), |x, y| x.total_cmp(&y)))
    }

    /// Stable descending sort on CGPA. Records without a CGPA go last.
    pub fn sort_by_cgpa_descending(&mut self) -> Result<(), StoreError> {
        self.sort_by(|a, b| missing_last(a.cgpa, b.cgpa, |x, y| y.total_cmp(&x)))
    }

    fn sort_by<F>(&mut self, mut compare: F) -> Result<(), StoreError>
    where
        F: FnMut(&StudentRecord, &StudentRecord) -> Ordering,
    {
        let mut candidate = self.entries.clone();
        candidate.sort_by(|a, b| compare(&a.record, &b.record));
        self.commit(candidate)?;

        tracing::debug!("sorted {} records", self.entries.len());
        Ok(())
    }

    /// Remove every record.
    pub fn clear(&mut self) -> Result<(), StoreError> {
        self.commit(Vec::new())?;
        tracing::debug!("cleared all records");
        Ok(())
    }

    /// Persist `candidate` and, only once the write succeeds, make it the
    /// current collection.
    fn commit(&mut self, candidate: Vec<Entry>) -> Result<(), StoreError> {
        if let Err(e) = self.persistence.save(candidate.iter().map(|e| &e.record)) {
            tracing::error!("failed to persist {} records: {}", candidate.len(), e);
            return Err(e.into());
        }
        self.entries = candidate;
        Ok(())
    }
}

/// Order present values with `compare` and place absent values after them.
fn missing_last<F>(a: Option<f64>, b: Option<f64>, compare: F) -> Ordering
where
    F: FnOnce(f64, f64) -> Ordering,
{
    match (a, b) {
        (Some(x), Some(y)) => compare(x, y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
