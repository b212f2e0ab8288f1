//! Raw request input forms and their validation.
//!
//! # Responsibility
//! - Accept unvalidated name/deadline payloads from the request layer.
//! - Produce clean drafts, or a field → messages error map for the caller
//!   to relay.
//!
//! # Invariants
//! - A draft is only ever built from input that passed every field check.
//! - Names are trimmed and at most `MAX_NAME_CHARS` characters.
//! - Naive deadlines are interpreted as UTC.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Upper bound for project and task names.
pub const MAX_NAME_CHARS: usize = 255;

const REQUIRED_MESSAGE: &str = "This field is required.";
const INVALID_DEADLINE_MESSAGE: &str = "Enter a valid date/time.";

const NAIVE_DEADLINE_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
];

/// Field-level validation failures, keyed by form field name.
///
/// Serializes as `{"name": ["This field is required."]}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors {
    fields: BTreeMap<&'static str, Vec<String>>,
}

impl ValidationErrors {
    /// Records one message against `field`.
    pub fn add(&mut self, field: &'static str, message: impl Into<String>) {
        self.fields.entry(field).or_default().push(message.into());
    }

    /// Returns messages recorded for `field`, if any.
    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.fields.get(field).map(Vec::as_slice)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Iterates `(field, messages)` in field-name order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &[String])> {
        self.fields
            .iter()
            .map(|(field, messages)| (*field, messages.as_slice()))
    }

    fn into_result<T>(self, value: T) -> Result<T, ValidationErrors> {
        if self.is_empty() {
            Ok(value)
        } else {
            Err(self)
        }
    }
}

impl Display for ValidationErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let mut first = true;
        for (field, messages) in self.iter() {
            for message in messages {
                if !first {
                    write!(f, "; ")?;
                }
                write!(f, "{field}: {message}")?;
                first = false;
            }
        }
        Ok(())
    }
}

impl Error for ValidationErrors {}

/// Raw project input.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectForm {
    pub name: String,
}

/// Validated project input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectDraft {
    pub name: String,
}

impl ProjectForm {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// Validates the form into a persistable draft.
    pub fn validate(&self) -> Result<ProjectDraft, ValidationErrors> {
        let mut errors = ValidationErrors::default();
        let name = clean_name(&self.name, &mut errors);
        errors.into_result(ProjectDraft { name })
    }
}

/// Raw task input. Priority and status are never accepted from callers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskForm {
    pub name: String,
    pub deadline: String,
}

/// Validated task input with the deadline resolved to epoch milliseconds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskDraft {
    pub name: String,
    pub deadline: i64,
}

impl TaskForm {
    pub fn new(name: impl Into<String>, deadline: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            deadline: deadline.into(),
        }
    }

    /// Validates the form into a persistable draft.
    ///
    /// Every field is checked so the caller receives all failures at once.
    pub fn validate(&self) -> Result<TaskDraft, ValidationErrors> {
        let mut errors = ValidationErrors::default();
        let name = clean_name(&self.name, &mut errors);

        let raw_deadline = self.deadline.trim();
        let deadline = if raw_deadline.is_empty() {
            errors.add("deadline", REQUIRED_MESSAGE);
            0
        } else {
            match parse_deadline(raw_deadline) {
                Some(value) => value,
                None => {
                    errors.add("deadline", INVALID_DEADLINE_MESSAGE);
                    0
                }
            }
        };

        errors.into_result(TaskDraft { name, deadline })
    }
}

/// Parses a deadline string into UTC epoch milliseconds.
///
/// Accepts RFC 3339, `YYYY-MM-DD[ T]HH:MM[:SS[.ffffff]]` and bare
/// `YYYY-MM-DD` (midnight).
pub fn parse_deadline(value: &str) -> Option<i64> {
    let trimmed = value.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(parsed.timestamp_millis());
    }

    for format in NAIVE_DEADLINE_FORMATS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Some(parsed.and_utc().timestamp_millis());
        }
    }

    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|midnight| midnight.and_utc().timestamp_millis())
}

fn clean_name(raw: &str, errors: &mut ValidationErrors) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        errors.add("name", REQUIRED_MESSAGE);
    } else {
        let length = trimmed.chars().count();
        if length > MAX_NAME_CHARS {
            errors.add(
                "name",
                format!(
                    "Ensure this value has at most {MAX_NAME_CHARS} characters (it has {length})."
                ),
            );
        }
    }
    trimmed.to_string()
}

#[cfg(test)]
mod tests {
    use super::{parse_deadline, ProjectForm, TaskForm, MAX_NAME_CHARS};

    #[test]
    fn project_form_trims_name() {
        let draft = ProjectForm::new("  Garden  ").validate().unwrap();
        assert_eq!(draft.name, "Garden");
    }

    #[test]
    fn project_form_rejects_blank_name() {
        let errors = ProjectForm::new("   ").validate().unwrap_err();
        assert_eq!(
            errors.get("name"),
            Some(&["This field is required.".to_string()][..])
        );
    }

    #[test]
    fn project_form_rejects_overlong_name() {
        let errors = ProjectForm::new("x".repeat(MAX_NAME_CHARS + 1))
            .validate()
            .unwrap_err();
        assert!(errors.contains("name"));

        assert!(ProjectForm::new("x".repeat(MAX_NAME_CHARS))
            .validate()
            .is_ok());
    }

    #[test]
    fn task_form_reports_every_invalid_field() {
        let errors = TaskForm::new("", "next tuesday").validate().unwrap_err();
        assert!(errors.contains("name"));
        assert_eq!(
            errors.get("deadline"),
            Some(&["Enter a valid date/time.".to_string()][..])
        );
        assert_eq!(
            errors.to_string(),
            "deadline: Enter a valid date/time.; name: This field is required."
        );
    }

    #[test]
    fn task_form_requires_deadline() {
        let errors = TaskForm::new("Pay rent", "  ").validate().unwrap_err();
        assert!(!errors.contains("name"));
        assert_eq!(
            errors.get("deadline"),
            Some(&["This field is required.".to_string()][..])
        );
    }

    #[test]
    fn task_form_produces_draft() {
        let draft = TaskForm::new(" Pay rent ", "2024-03-01 09:30")
            .validate()
            .unwrap();
        assert_eq!(draft.name, "Pay rent");
        assert_eq!(draft.deadline, 1_709_285_400_000);
    }

    #[test]
    fn parse_deadline_accepts_supported_formats() {
        let expected = 1_709_285_400_000;
        assert_eq!(parse_deadline("2024-03-01T09:30:00Z"), Some(expected));
        assert_eq!(parse_deadline("2024-03-01T11:30:00+02:00"), Some(expected));
        assert_eq!(parse_deadline("2024-03-01 09:30:00"), Some(expected));
        assert_eq!(parse_deadline("2024-03-01 09:30:00.000000"), Some(expected));
        assert_eq!(parse_deadline("2024-03-01T09:30"), Some(expected));
        assert_eq!(parse_deadline("2024-03-01"), Some(1_709_251_200_000));
    }

    #[test]
    fn parse_deadline_rejects_garbage() {
        assert_eq!(parse_deadline("2024-13-01"), None);
        assert_eq!(parse_deadline("tomorrow"), None);
    }
}
