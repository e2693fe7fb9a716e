// ABOUTME: Defines UiEvent, the set of user actions a UI layer forwards to the roster.
// ABOUTME: Events are serde-tagged so a scripted session can be stored and replayed as JSON lines.

use serde::{Deserialize, Serialize};

use crate::query::FilterField;
use crate::session::{FormField, FormFields};

/// A single user-initiated action. Each is processed to completion before
/// the next.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum UiEvent {
    /// Submit the form. With `fields`, they replace the form contents first.
    Submit {
        #[serde(default)]
        fields: Option<FormFields>,
    },
    SetField {
        field: FormField,
        value: String,
    },
    Edit {
        index: usize,
    },
    Delete {
        index: usize,
    },
    SortByRoll,
    SortByCgpa,
    ClearAll,
    Reset,
    FilterChanged {
        field: FilterField,
        value: String,
    },
}
