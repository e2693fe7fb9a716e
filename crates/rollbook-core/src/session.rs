// ABOUTME: Form/edit session that turns raw field values into committed student records.
// ABOUTME: Tracks add vs. edit mode; edits target a stable record id rather than a row index.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::{RecordId, StudentRecord, ValidationError, parse_number};
use crate::storage::StorageProvider;
use crate::store::{RecordStore, StoreError};

/// An input control of the record form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormField {
    Roll,
    Name,
    Department,
    Semester,
    Cgpa,
}

/// Raw text of each form control, exactly as entered.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormFields {
    pub roll: String,
    pub name: String,
    pub department: String,
    pub semester: String,
    pub cgpa: String,
}

impl FormFields {
    /// Fill the controls from a stored record. An absent CGPA becomes a
    /// blank control.
    pub fn from_record(record: &StudentRecord) -> Self {
        Self {
            roll: record.roll.clone(),
            name: record.name.clone(),
            department: record.department.clone(),
            semester: record.semester.clone(),
            cgpa: record.cgpa.map(|c| c.to_string()).unwrap_or_default(),
        }
    }

    pub fn set(&mut self, field: FormField, value: impl Into<String>) {
        let value = value.into();
        match field {
            FormField::Roll => self.roll = value,
            FormField::Name => self.name = value,
            FormField::Department => self.department = value,
            FormField::Semester => self.semester = value,
            FormField::Cgpa => self.cgpa = value,
        }
    }

    /// Validate and normalize into a record. Roll, name, and CGPA are
    /// trimmed; department and semester pass through untouched.
    pub fn to_record(&self) -> Result<StudentRecord, ValidationError> {
        let roll = self.roll.trim();
        let name = self.name.trim();
        if roll.is_empty() {
            return Err(ValidationError::MissingRoll);
        }
        if name.is_empty() {
            return Err(ValidationError::MissingName);
        }

        let cgpa = self.cgpa.trim();
        let cgpa = if cgpa.is_empty() {
            None
        } else {
            Some(parse_number(cgpa).ok_or_else(|| ValidationError::InvalidCgpa(cgpa.to_string()))?)
        };

        Ok(StudentRecord {
            roll: roll.to_string(),
            name: name.to_string(),
            department: self.department.clone(),
            semester: self.semester.clone(),
            cgpa,
        })
    }
}

/// Whether committing adds a new record or replaces an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Add,
    Edit { target: RecordId },
}

/// Why a commit did not happen.
#[derive(Debug, Error)]
pub enum CommitError {
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Result of a successful commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Committed {
    Added(RecordId),
    Updated(RecordId),
}

/// The form state: current mode plus in-progress field values.
#[derive(Debug, Clone)]
pub struct FormSession {
    mode: Mode,
    fields: FormFields,
}

impl Default for FormSession {
    fn default() -> Self {
        Self {
            mode: Mode::Add,
            fields: FormFields::default(),
        }
    }
}

impl FormSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn fields(&self) -> &FormFields {
        &self.fields
    }

    pub fn set_field(&mut self, field: FormField, value: impl Into<String>) {
        self.fields.set(field, value);
    }

    /// Replace every field value at once, keeping the mode.
    pub fn fill(&mut self, fields: FormFields) {
        self.fields = fields;
    }

    /// Load the record at `index` into the form and target it for update.
    pub fn begin_edit<S: StorageProvider>(
        &mut self,
        store: &RecordStore<S>,
        index: usize,
    ) -> Result<RecordId, StoreError> {
        let row = store.get(index).ok_or(StoreError::InvalidIndex {
            index,
            len: store.len(),
        })?;
        self.mode = Mode::Edit { target: row.id };
        self.fields = FormFields::from_record(row.record);
        tracing::debug!("editing record {} at index {}", row.id, index);
        Ok(row.id)
    }

    /// Return to add mode with a blank form.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Reset the session if it is editing `id`. Returns whether it did.
    pub fn invalidate_if_targets(&mut self, id: RecordId) -> bool {
        if self.mode == (Mode::Edit { target: id }) {
            tracing::warn!("record {} under edit was removed, discarding the edit", id);
            self.reset();
            true
        } else {
            false
        }
    }

    /// Validate the fields and add or update through `store`. On success the
    /// session returns to add mode with a blank form; on failure mode and
    /// fields are left as they were.
    pub fn commit<S: StorageProvider>(
        &mut self,
        store: &mut RecordStore<S>,
    ) -> Result<Committed, CommitError> {
        let record = self.fields.to_record()?;
        let committed = match self.mode {
            Mode::Add => Committed::Added(store.add(record)?),
            Mode::Edit { target } => {
                store.update_by_id(target, record)?;
                Committed::Updated(target)
            }
        };
        self.reset();
        Ok(committed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::Persistence;
    use crate::storage::MemoryStorage;

    fn store_with(records: &[StudentRecord]) -> RecordStore<MemoryStorage> {
        let mut store = RecordStore::open(Persistence::new(MemoryStorage::new()));
        for record in records {
            store.add(record.clone()).unwrap();
        }
        store
    }

    fn fields(roll: &str, name: &str, cgpa: &str) -> FormFields {
        FormFields {
            roll: roll.to_string(),
            name: name.to_string(),
            department: "CS".to_string(),
            semester: "3".to_string(),
            cgpa: cgpa.to_string(),
        }
    }

    #[test]
    fn to_record_trims_required_fields_and_parses_cgpa() {
        let record = fields("  101 ", " Alice ", " 8.5 ").to_record().unwrap();

        assert_eq!(record.roll, "101");
        assert_eq!(record.name, "Alice");
        assert_eq!(record.cgpa, Some(8.5));
        assert_eq!(record.department, "CS");
    }

    #[test]
    fn to_record_blank_cgpa_is_absent_not_zero() {
        let record = fields("1", "A", "   ").to_record().unwrap();
        assert_eq!(record.cgpa, None);
    }

    #[test]
    fn to_record_passes_department_and_semester_through() {
        let mut raw = fields("1", "A", "");
        raw.department = " Civil ".to_string();
        raw.semester = String::new();

        let record = raw.to_record().unwrap();
        assert_eq!(record.department, " Civil ");
        assert_eq!(record.semester, "");
    }

    #[test]
    fn to_record_rejects_missing_and_malformed_values() {
        assert_eq!(fields(" ", "A", "").to_record(), Err(ValidationError::MissingRoll));
        assert_eq!(fields("1", "\t", "").to_record(), Err(ValidationError::MissingName));
        assert_eq!(
            fields("1", "A", "high").to_record(),
            Err(ValidationError::InvalidCgpa("high".to_string()))
        );
    }

    #[test]
    fn commit_in_add_mode_adds_and_resets() {
        let mut store = store_with(&[]);
        let mut session = FormSession::new();
        session.fill(fields("101", "Alice", "8.5"));

        let committed = session.commit(&mut store).unwrap();

        assert!(matches!(committed, Committed::Added(_)));
        assert_eq!(store.len(), 1);
        assert_eq!(session.mode(), Mode::Add);
        assert_eq!(session.fields(), &FormFields::default());
    }

    #[test]
    fn validation_failure_keeps_mode_and_fields() {
        let mut store = store_with(&[]);
        let mut session = FormSession::new();
        session.fill(fields("101", "", ""));

        let err = session.commit(&mut store).unwrap_err();

        assert!(matches!(err, CommitError::Validation(ValidationError::MissingName)));
        assert!(store.is_empty());
        assert_eq!(session.fields().roll, "101");
    }

    #[test]
    fn duplicate_roll_keeps_session_for_correction() {
        let mut store = store_with(&[StudentRecord::new("101", "Alice")]);
        let mut session = FormSession::new();
        session.fill(fields("101", "Bob", ""));

        let err = session.commit(&mut store).unwrap_err();
        assert!(matches!(err, CommitError::Store(StoreError::DuplicateRoll { .. })));
        assert_eq!(session.fields().name, "Bob");

        session.set_field(FormField::Roll, "102");
        session.commit(&mut store).unwrap();
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn begin_edit_loads_fields_and_targets_record() {
        let store = store_with(&[
            StudentRecord::new("1", "A"),
            StudentRecord::new("2", "B").with_department("EE").with_cgpa(7.5),
        ]);
        let mut session = FormSession::new();

        let id = session.begin_edit(&store, 1).unwrap();

        assert_eq!(session.mode(), Mode::Edit { target: id });
        assert_eq!(session.fields().roll, "2");
        assert_eq!(session.fields().department, "EE");
        assert_eq!(session.fields().cgpa, "7.5");
    }

    #[test]
    fn begin_edit_out_of_range_fails_without_changing_mode() {
        let store = store_with(&[StudentRecord::new("1", "A")]);
        let mut session = FormSession::new();

        assert!(matches!(
            session.begin_edit(&store, 3),
            Err(StoreError::InvalidIndex { index: 3, len: 1 })
        ));
        assert_eq!(session.mode(), Mode::Add);
    }

    #[test]
    fn commit_in_edit_mode_updates_target_after_reorder() {
        let mut store = store_with(&[StudentRecord::new("20", "B"), StudentRecord::new("10", "A")]);
        let mut session = FormSession::new();
        session.begin_edit(&store, 0).unwrap();
        store.sort_by_roll_ascending().unwrap();

        session.set_field(FormField::Name, "Beatrice");
        let committed = session.commit(&mut store).unwrap();

        assert!(matches!(committed, Committed::Updated(_)));
        assert_eq!(store.get(1).unwrap().record.name, "Beatrice");
        assert_eq!(store.get(0).unwrap().record.name, "A");
        assert_eq!(session.mode(), Mode::Add);
    }

    #[test]
    fn commit_to_removed_target_fails_and_keeps_session() {
        let mut store = store_with(&[StudentRecord::new("1", "A")]);
        let mut session = FormSession::new();
        let id = session.begin_edit(&store, 0).unwrap();
        store.delete(0).unwrap();

        let err = session.commit(&mut store).unwrap_err();

        assert!(matches!(
            err,
            CommitError::Store(StoreError::UnknownRecord(missing)) if missing == id
        ));
        assert_eq!(session.mode(), Mode::Edit { target: id });
    }

    #[test]
    fn invalidate_only_resets_matching_target() {
        let store = store_with(&[StudentRecord::new("1", "A"), StudentRecord::new("2", "B")]);
        let mut session = FormSession::new();
        let id = session.begin_edit(&store, 0).unwrap();
        let other = store.get(1).unwrap().id;

        assert!(!session.invalidate_if_targets(other));
        assert_eq!(session.mode(), Mode::Edit { target: id });

        assert!(session.invalidate_if_targets(id));
        assert_eq!(session.mode(), Mode::Add);
        assert!(session.fields().roll.is_empty());
    }
}
