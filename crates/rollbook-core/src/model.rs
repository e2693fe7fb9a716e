// ABOUTME: Defines StudentRecord, the unit of data held by the roster, and its persisted shape.
// ABOUTME: Rolls compare as text for identity and as numbers for ordering; CGPA may be absent.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;
use ulid::Ulid;

/// Reasons a record cannot be committed.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("roll number is required")]
    MissingRoll,

    #[error("name is required")]
    MissingName,

    #[error("CGPA must be a number, got {0:?}")]
    InvalidCgpa(String),
}

/// In-memory identity of a record. Assigned when a record enters the store
/// and never persisted, so it stays fixed while rows are deleted or reordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RecordId(Ulid);

impl RecordId {
    pub fn new() -> Self {
        Self(Ulid::new())
    }
}

impl Default for RecordId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One student's stored data.
///
/// Serializes to `{roll, name, department, semester, cgpa}` with an absent
/// CGPA written as `""`. Deserialization also accepts numeric rolls and
/// semesters, numeric-string CGPAs, and missing optional fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentRecord {
    #[serde(deserialize_with = "text_or_number")]
    pub roll: String,
    #[serde(deserialize_with = "text_or_number")]
    pub name: String,
    #[serde(default, deserialize_with = "text_or_number")]
    pub department: String,
    #[serde(default, deserialize_with = "text_or_number")]
    pub semester: String,
    #[serde(default, with = "cgpa_field")]
    pub cgpa: Option<f64>,
}

impl StudentRecord {
    /// Create a record with the required fields. Department and semester
    /// start empty and CGPA absent.
    pub fn new(roll: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            roll: roll.into(),
            name: name.into(),
            department: String::new(),
            semester: String::new(),
            cgpa: None,
        }
    }

    pub fn with_department(mut self, department: impl Into<String>) -> Self {
        self.department = department.into();
        self
    }

    pub fn with_semester(mut self, semester: impl Into<String>) -> Self {
        self.semester = semester.into();
        self
    }

    pub fn with_cgpa(mut self, cgpa: f64) -> Self {
        self.cgpa = Some(cgpa);
        self
    }

    /// Check the invariants every committed record must satisfy.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.roll.trim().is_empty() {
            return Err(ValidationError::MissingRoll);
        }
        if self.name.trim().is_empty() {
            return Err(ValidationError::MissingName);
        }
        if let Some(cgpa) = self.cgpa
            && !cgpa.is_finite()
        {
            return Err(ValidationError::InvalidCgpa(cgpa.to_string()));
        }
        Ok(())
    }

    /// Numeric interpretation of the roll used for ordering. None when the
    /// roll is not a finite number.
    pub fn roll_number(&self) -> Option<f64> {
        parse_number(&self.roll)
    }
}

/// Parse trimmed text as a finite number.
pub(crate) fn parse_number(text: &str) -> Option<f64> {
    text.trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
}

#[derive(Deserialize)]
#[serde(untagged)]
enum TextOrNumber {
    Text(String),
    Number(serde_json::Number),
    Null,
}

fn text_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match TextOrNumber::deserialize(deserializer)? {
        TextOrNumber::Text(text) => text,
        TextOrNumber::Number(number) => number.to_string(),
        TextOrNumber::Null => String::new(),
    })
}

mod cgpa_field {
    use serde::{Deserialize, Deserializer, Serializer};

    use super::{TextOrNumber, parse_number};

    pub fn serialize<S>(cgpa: &Option<f64>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match cgpa {
            Some(value) => serializer.serialize_f64(*value),
            None => serializer.serialize_str(""),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match TextOrNumber::deserialize(deserializer)? {
            TextOrNumber::Number(number) => number.as_f64(),
            // Unparsable text was NaN in the stored data; treat it as absent.
            TextOrNumber::Text(text) => parse_number(&text),
            TextOrNumber::Null => None,
        })
    }
}
