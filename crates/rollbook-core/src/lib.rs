// ABOUTME: Core library for rollbook: student records, the record store, queries, and the form session.
// ABOUTME: Storage is reached only through the StorageProvider trait, so the core runs without a display or disk.

pub mod event;
pub mod model;
pub mod persistence;
pub mod query;
pub mod roster;
pub mod session;
pub mod storage;
pub mod store;

pub use event::UiEvent;
pub use model::{RecordId, StudentRecord, ValidationError};
pub use persistence::{DEFAULT_KEY, PersistError, Persistence, decode_records, encode_records};
pub use query::{Filter, FilterField, View, query};
pub use roster::{Outcome, Roster, RosterError, Ui};
pub use session::{CommitError, Committed, FormField, FormFields, FormSession, Mode};
pub use storage::{MemoryStorage, StorageError, StorageProvider, validate_key};
pub use store::{RecordStore, Row, Rows, StoreError, StoreView};
