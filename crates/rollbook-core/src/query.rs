// ABOUTME: Query engine producing the filtered, display-only view of the record store.
// ABOUTME: Filters are optional, AND-combined, and evaluated lazily in store order.

use serde::{Deserialize, Serialize};

use crate::model::StudentRecord;
use crate::store::Row;

/// A filterable field of the search controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterField {
    Roll,
    Name,
    Department,
    Semester,
}

/// Search criteria. A `None` or blank criterion places no constraint.
///
/// - `roll`: trimmed, exact text match
/// - `name`: trimmed, case-insensitive substring
/// - `department`: exact match
/// - `semester`: exact text match
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Filter {
    pub roll: Option<String>,
    pub name: Option<String>,
    pub department: Option<String>,
    pub semester: Option<String>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`Filter::set`].
    pub fn with(mut self, field: FilterField, value: impl Into<String>) -> Self {
        self.set(field, value);
        self
    }

    /// Set one criterion. An empty value clears it.
    pub fn set(&mut self, field: FilterField, value: impl Into<String>) {
        let value = value.into();
        let value = (!value.is_empty()).then_some(value);
        match field {
            FilterField::Roll => self.roll = value,
            FilterField::Name => self.name = value,
            FilterField::Department => self.department = value,
            FilterField::Semester => self.semester = value,
        }
    }

    pub fn is_empty(&self) -> bool {
        Matcher::new(self).is_unconstrained()
    }

    pub fn matches(&self, record: &StudentRecord) -> bool {
        Matcher::new(self).matches(record)
    }
}

/// A filter normalized once so each row check is a plain comparison.
#[derive(Debug, Clone)]
struct Matcher {
    roll: Option<String>,
    name: Option<String>,
    department: Option<String>,
    semester: Option<String>,
}

impl Matcher {
    fn new(filter: &Filter) -> Self {
        let non_empty = |v: &Option<String>| v.as_ref().filter(|v| !v.is_empty()).cloned();
        let trimmed = |v: &Option<String>| {
            v.as_deref()
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        };
        Self {
            roll: trimmed(&filter.roll),
            name: trimmed(&filter.name).map(|n| n.to_lowercase()),
            department: non_empty(&filter.department),
            semester: non_empty(&filter.semester),
        }
    }

    fn is_unconstrained(&self) -> bool {
        self.roll.is_none()
            && self.name.is_none()
            && self.department.is_none()
            && self.semester.is_none()
    }

    fn matches(&self, record: &StudentRecord) -> bool {
        if let Some(roll) = &self.roll
            && record.roll != *roll
        {
            return false;
        }
        if let Some(name) = &self.name
            && !record.name.to_lowercase().contains(name.as_str())
        {
            return false;
        }
        if let Some(department) = &self.department
            && record.department != *department
        {
            return false;
        }
        if let Some(semester) = &self.semester
            && record.semester != *semester
        {
            return false;
        }
        true
    }
}

/// Lazy sequence of the rows that match a filter.
#[derive(Debug, Clone)]
pub struct View<I> {
    rows: I,
    matcher: Matcher,
}

impl<'a, I> Iterator for View<I>
where
    I: Iterator<Item = Row<'a>>,
{
    type Item = Row<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let matcher = &self.matcher;
        self.rows.find(|row| matcher.matches(row.record))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, self.rows.size_hint().1)
    }
}

/// Filter `rows` by `filter`, preserving their order. Never mutates the
/// source.
pub fn query<'a, I>(rows: I, filter: &Filter) -> View<I::IntoIter>
where
    I: IntoIterator<Item = Row<'a>>,
{
    View {
        rows: rows.into_iter(),
        matcher: Matcher::new(filter),
    }
}
