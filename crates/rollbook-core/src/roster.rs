// ABOUTME: Roster facade tying the record store, form session, and active filter together.
// ABOUTME: Dispatches UI events, asks the UI to confirm destructive actions, and re-renders after changes.

use thiserror::Error;

use crate::event::UiEvent;
use crate::model::{RecordId, StudentRecord, ValidationError};
use crate::persistence::Persistence;
use crate::query::{Filter, FilterField};
use crate::session::{CommitError, Committed, FormField, FormSession};
use crate::storage::StorageProvider;
use crate::store::{RecordStore, StoreError, StoreView};

pub const CONFIRM_DELETE: &str = "Are you sure you want to delete this record?";
pub const CONFIRM_CLEAR: &str = "Clear all records and stored data?";

/// Capabilities the presentation layer provides to the roster.
pub trait Ui {
    /// Ask the user to approve a destructive action.
    fn confirm(&mut self, message: &str) -> bool;

    /// Display the current filtered view.
    fn render(&mut self, view: StoreView<'_>);
}

/// Errors surfaced to the user. None of them change the store.
#[derive(Debug, Error)]
pub enum RosterError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<CommitError> for RosterError {
    fn from(err: CommitError) -> Self {
        match err {
            CommitError::Validation(e) => Self::Validation(e),
            CommitError::Store(e) => Self::Store(e),
        }
    }
}

/// What happened to a dispatched event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// A record was added or updated.
    Committed(Committed),
    /// The event was applied.
    Applied,
    /// The user declined the confirmation; nothing changed.
    Declined,
}

/// The record manager: one store, one form session, one active filter.
pub struct Roster<S> {
    store: RecordStore<S>,
    session: FormSession,
    filter: Filter,
}

impl<S: StorageProvider> Roster<S> {
    /// Load the stored collection and start in add mode with no filter.
    pub fn open(persistence: Persistence<S>) -> Self {
        Self {
            store: RecordStore::open(persistence),
            session: FormSession::new(),
            filter: Filter::new(),
        }
    }

    pub fn store(&self) -> &RecordStore<S> {
        &self.store
    }

    pub fn session(&self) -> &FormSession {
        &self.session
    }

    pub fn filter(&self) -> &Filter {
        &self.filter
    }

    /// Rows matching `filter`.
    pub fn query(&self, filter: &Filter) -> StoreView<'_> {
        self.store.query(filter)
    }

    /// Rows matching the active filter.
    pub fn view(&self) -> StoreView<'_> {
        self.store.query(&self.filter)
    }

    pub fn set_filter(&mut self, field: FilterField, value: impl Into<String>) {
        self.filter.set(field, value);
    }

    pub fn add_student(&mut self, record: StudentRecord) -> Result<RecordId, StoreError> {
        self.store.add(record)
    }

    pub fn update_student(
        &mut self,
        index: usize,
        record: StudentRecord,
    ) -> Result<RecordId, StoreError> {
        self.store.update(index, record)
    }

    /// Delete without confirmation. A session editing the removed record is
    /// reset.
    pub fn delete_student(&mut self, index: usize) -> Result<StudentRecord, StoreError> {
        let (id, record) = self.store.delete(index)?;
        self.session.invalidate_if_targets(id);
        Ok(record)
    }

    pub fn begin_edit(&mut self, index: usize) -> Result<RecordId, StoreError> {
        self.session.begin_edit(&self.store, index)
    }

    pub fn set_field(&mut self, field: FormField, value: impl Into<String>) {
        self.session.set_field(field, value);
    }

    pub fn reset_session(&mut self) {
        self.session.reset();
    }

    /// Commit the form through the store.
    pub fn submit(&mut self) -> Result<Committed, RosterError> {
        Ok(self.session.commit(&mut self.store)?)
    }

    pub fn sort_by_roll(&mut self) -> Result<(), StoreError> {
        self.store.sort_by_roll_ascending()
    }

    pub fn sort_by_cgpa(&mut self) -> Result<(), StoreError> {
        self.store.sort_by_cgpa_descending()
    }

    /// Remove every record and return the form to add mode.
    pub fn clear_all(&mut self) -> Result<(), StoreError> {
        self.store.clear()?;
        self.session.reset();
        Ok(())
    }

    /// Hand the active view to the UI.
    pub fn render(&self, ui: &mut dyn Ui) {
        ui.render(self.view());
    }

    /// Process one UI event to completion, re-rendering when the visible
    /// table may have changed.
    pub fn dispatch(&mut self, event: UiEvent, ui: &mut dyn Ui) -> Result<Outcome, RosterError> {
        tracing::debug!("dispatching {:?}", event);
        let outcome = match event {
            UiEvent::Submit { fields } => {
                if let Some(fields) = fields {
                    self.session.fill(fields);
                }
                Outcome::Committed(self.submit()?)
            }
            UiEvent::SetField { field, value } => {
                self.set_field(field, value);
                return Ok(Outcome::Applied);
            }
            UiEvent::Edit { index } => {
                self.begin_edit(index)?;
                return Ok(Outcome::Applied);
            }
            UiEvent::Reset => {
                self.reset_session();
                return Ok(Outcome::Applied);
            }
            UiEvent::Delete { index } => {
                if self.store.get(index).is_none() {
                    return Err(StoreError::InvalidIndex {
                        index,
                        len: self.store.len(),
                    }
                    .into());
                }
                if !ui.confirm(CONFIRM_DELETE) {
                    return Ok(Outcome::Declined);
                }
                self.delete_student(index)?;
                Outcome::Applied
            }
            UiEvent::ClearAll => {
                if !ui.confirm(CONFIRM_CLEAR) {
                    return Ok(Outcome::Declined);
                }
                self.clear_all()?;
                Outcome::Applied
            }
            UiEvent::SortByRoll => {
                self.sort_by_roll()?;
                Outcome::Applied
            }
            UiEvent::SortByCgpa => {
                self.sort_by_cgpa()?;
                Outcome::Applied
            }
            UiEvent::FilterChanged { field, value } => {
                self.set_filter(field, value);
                Outcome::Applied
            }
        };
        self.render(ui);
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{FormFields, Mode};
    use crate::storage::MemoryStorage;

    /// Records every prompt and rendered table; answers prompts from a fixed reply.
    struct ScriptedUi {
        approve: bool,
        prompts: Vec<String>,
        renders: Vec<Vec<String>>,
    }

    impl ScriptedUi {
        fn new(approve: bool) -> Self {
            Self {
                approve,
                prompts: Vec::new(),
                renders: Vec::new(),
            }
        }

        fn last_render(&self) -> &[String] {
            self.renders.last().map(Vec::as_slice).unwrap_or(&[])
        }
    }

    impl Ui for ScriptedUi {
        fn confirm(&mut self, message: &str) -> bool {
            self.prompts.push(message.to_string());
            self.approve
        }

        fn render(&mut self, view: StoreView<'_>) {
            self.renders
                .push(view.map(|row| row.record.roll.clone()).collect());
        }
    }

    fn roster() -> Roster<MemoryStorage> {
        Roster::open(Persistence::new(MemoryStorage::new()))
    }

    fn submit(roll: &str, name: &str, department: &str, semester: &str, cgpa: &str) -> UiEvent {
        UiEvent::Submit {
            fields: Some(FormFields {
                roll: roll.to_string(),
                name: name.to_string(),
                department: department.to_string(),
                semester: semester.to_string(),
                cgpa: cgpa.to_string(),
            }),
        }
    }

    #[test]
    fn scenario_sort_by_cgpa_and_filter_department() {
        let mut roster = roster();
        let mut ui = ScriptedUi::new(true);

        roster.dispatch(submit("101", "Alice", "CS", "3", "8.5"), &mut ui).unwrap();
        roster.dispatch(submit("102", "Bob", "EE", "1", "7.2"), &mut ui).unwrap();
        roster.dispatch(UiEvent::SortByCgpa, &mut ui).unwrap();
        assert_eq!(ui.last_render(), ["101", "102"]);

        roster
            .dispatch(
                UiEvent::FilterChanged {
                    field: FilterField::Department,
                    value: "EE".to_string(),
                },
                &mut ui,
            )
            .unwrap();
        assert_eq!(ui.last_render(), ["102"]);
        assert_eq!(
            roster.filter(),
            &Filter::new().with(FilterField::Department, "EE")
        );

        roster
            .dispatch(
                UiEvent::FilterChanged {
                    field: FilterField::Department,
                    value: String::new(),
                },
                &mut ui,
            )
            .unwrap();
        assert!(roster.filter().is_empty());
        assert_eq!(ui.last_render(), ["101", "102"]);
    }

    #[test]
    fn every_mutation_renders() {
        let mut roster = roster();
        let mut ui = ScriptedUi::new(true);

        roster.dispatch(submit("2", "B", "", "", ""), &mut ui).unwrap();
        roster.dispatch(submit("1", "A", "", "", ""), &mut ui).unwrap();
        roster.dispatch(UiEvent::SortByRoll, &mut ui).unwrap();
        roster.dispatch(UiEvent::Delete { index: 0 }, &mut ui).unwrap();

        assert_eq!(ui.renders, vec![vec!["2"], vec!["2", "1"], vec!["1", "2"], vec!["2"]]);
    }

    #[test]
    fn failed_submit_does_not_render() {
        let mut roster = roster();
        let mut ui = ScriptedUi::new(true);

        let err = roster.dispatch(submit("", "A", "", "", ""), &mut ui).unwrap_err();

        assert!(matches!(err, RosterError::Validation(ValidationError::MissingRoll)));
        assert!(ui.renders.is_empty());
    }

    #[test]
    fn declined_delete_leaves_store_unchanged() {
        let mut roster = roster();
        let mut ui = ScriptedUi::new(false);
        roster.add_student(StudentRecord::new("1", "A")).unwrap();

        let outcome = roster.dispatch(UiEvent::Delete { index: 0 }, &mut ui).unwrap();

        assert_eq!(outcome, Outcome::Declined);
        assert_eq!(ui.prompts, vec![CONFIRM_DELETE]);
        assert_eq!(roster.store().len(), 1);
    }

    #[test]
    fn delete_of_missing_index_fails_before_prompting() {
        let mut roster = roster();
        let mut ui = ScriptedUi::new(true);

        let err = roster.dispatch(UiEvent::Delete { index: 5 }, &mut ui).unwrap_err();

        assert!(matches!(err, RosterError::Store(StoreError::InvalidIndex { index: 5, len: 0 })));
        assert!(ui.prompts.is_empty());
    }

    #[test]
    fn deleting_edited_record_resets_session() {
        let mut roster = roster();
        let mut ui = ScriptedUi::new(true);
        roster.add_student(StudentRecord::new("1", "A")).unwrap();
        roster.add_student(StudentRecord::new("2", "B")).unwrap();

        roster.dispatch(UiEvent::Edit { index: 1 }, &mut ui).unwrap();
        roster.dispatch(UiEvent::Delete { index: 1 }, &mut ui).unwrap();

        assert_eq!(roster.session().mode(), Mode::Add);
        assert!(roster.session().fields().roll.is_empty());
    }

    #[test]
    fn deleting_earlier_record_keeps_edit_on_same_student() {
        let mut roster = roster();
        let mut ui = ScriptedUi::new(true);
        roster.add_student(StudentRecord::new("1", "A")).unwrap();
        roster.add_student(StudentRecord::new("2", "B")).unwrap();

        roster.dispatch(UiEvent::Edit { index: 1 }, &mut ui).unwrap();
        roster.dispatch(UiEvent::Delete { index: 0 }, &mut ui).unwrap();
        roster
            .dispatch(
                UiEvent::SetField {
                    field: FormField::Name,
                    value: "Bea".to_string(),
                },
                &mut ui,
            )
            .unwrap();
        roster.dispatch(UiEvent::Submit { fields: None }, &mut ui).unwrap();

        let row = roster.store().get(0).unwrap();
        assert_eq!(row.record.roll, "2");
        assert_eq!(row.record.name, "Bea");
        assert_eq!(roster.store().len(), 1);
    }

    #[test]
    fn clear_all_requires_confirmation_and_resets_session() {
        let mut roster = roster();
        roster.add_student(StudentRecord::new("1", "A")).unwrap();
        roster.begin_edit(0).unwrap();

        let mut declining = ScriptedUi::new(false);
        assert_eq!(
            roster.dispatch(UiEvent::ClearAll, &mut declining).unwrap(),
            Outcome::Declined
        );
        assert_eq!(roster.store().len(), 1);

        let mut approving = ScriptedUi::new(true);
        roster.dispatch(UiEvent::ClearAll, &mut approving).unwrap();
        assert!(roster.store().is_empty());
        assert_eq!(roster.session().mode(), Mode::Add);
        assert_eq!(approving.prompts, vec![CONFIRM_CLEAR]);
    }

    #[test]
    fn update_student_rejects_roll_of_another_row() {
        let mut roster = roster();
        roster.add_student(StudentRecord::new("1", "A")).unwrap();
        roster.add_student(StudentRecord::new("2", "B")).unwrap();

        let err = roster
            .update_student(1, StudentRecord::new("1", "B"))
            .unwrap_err();
        assert!(matches!(err, StoreError::DuplicateRoll { .. }));

        roster.update_student(1, StudentRecord::new("2", "Bo")).unwrap();
        assert_eq!(roster.store().get(1).unwrap().record.name, "Bo");
    }

    #[test]
    fn query_ignores_active_filter() {
        let mut roster = roster();
        roster.add_student(StudentRecord::new("1", "Anna")).unwrap();
        roster.add_student(StudentRecord::new("2", "Bob")).unwrap();
        roster.add_student(StudentRecord::new("3", "Diana")).unwrap();
        roster.set_filter(FilterField::Roll, "2");

        let by_name = Filter::new().with(FilterField::Name, "an");
        let rolls: Vec<&str> = roster
            .query(&by_name)
            .map(|row| row.record.roll.as_str())
            .collect();

        assert_eq!(rolls, vec!["1", "3"]);
        assert_eq!(roster.view().count(), 1);
    }
}
