// File: ./src/model/validate.rs
// Input validation for reminder requests and the create-task form
use crate::error::ReminderError;
use crate::model::item::{TaskCategory, TaskDifficulty};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;

pub const MIN_DESCRIPTION_CHARS: usize = 3;
pub const MAX_DESCRIPTION_CHARS: usize = 200;

/// Validated input for a single inference call.
///
/// Only [`ReminderRequest::validate`] builds one, so every instance holds a
/// description in range, a known difficulty and a parseable due date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReminderRequest {
    task_description: String,
    task_difficulty: TaskDifficulty,
    due_date: String,
    #[serde(skip)]
    due_instant: DateTime<Utc>,
}

impl ReminderRequest {
    pub fn validate(
        description: &str,
        difficulty: &str,
        due_date_raw: &str,
    ) -> Result<Self, ReminderError> {
        check_description(description)?;
        let task_difficulty: TaskDifficulty = difficulty.parse()?;
        let due_instant = parse_instant(due_date_raw)?;

        Ok(Self {
            task_description: description.to_string(),
            task_difficulty,
            due_date: due_date_raw.to_string(),
            due_instant,
        })
    }

    /// Used by the workflow, which already holds typed values.
    pub fn from_parts(
        description: &str,
        difficulty: TaskDifficulty,
        due: DateTime<Utc>,
    ) -> Result<Self, ReminderError> {
        Self::validate(description, difficulty.as_str(), &to_iso(due))
    }

    pub fn task_description(&self) -> &str {
        &self.task_description
    }

    pub fn task_difficulty(&self) -> TaskDifficulty {
        self.task_difficulty
    }

    /// The due date exactly as it was supplied.
    pub fn due_date(&self) -> &str {
        &self.due_date
    }

    pub fn due_instant(&self) -> DateTime<Utc> {
        self.due_instant
    }
}

/// Raw create-task form values.
#[derive(Debug, Clone, Default)]
pub struct TaskDraft {
    pub description: String,
    pub category: String,
    pub difficulty: String,
    pub due_date: Option<String>,
}

/// A create-task form that passed validation.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedDraft {
    pub description: String,
    pub category: TaskCategory,
    pub difficulty: TaskDifficulty,
    pub due_date: Option<DateTime<Utc>>,
}

impl TaskDraft {
    pub fn validate(&self) -> Result<ValidatedDraft, ReminderError> {
        check_description(&self.description)?;
        let category = self.category.parse()?;
        let difficulty = self.difficulty.parse()?;
        let due_date = match self.due_date.as_deref() {
            None => None,
            Some(raw) => Some(parse_instant(raw)?),
        };
        Ok(ValidatedDraft {
            description: self.description.clone(),
            category,
            difficulty,
            due_date,
        })
    }
}

/// `2024-01-10T00:00:00.000Z` style, millisecond precision, always UTC.
pub fn to_iso(dt: DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub fn parse_instant(raw: &str) -> Result<DateTime<Utc>, ReminderError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|d| d.with_timezone(&Utc))
        .map_err(|e| {
            ReminderError::validation(format!("'{}' is not an ISO 8601 instant: {}", raw, e))
        })
}

fn check_description(description: &str) -> Result<(), ReminderError> {
    let len = description.chars().count();
    if len < MIN_DESCRIPTION_CHARS {
        return Err(ReminderError::validation(format!(
            "Description must be at least {} characters.",
            MIN_DESCRIPTION_CHARS
        )));
    }
    if len > MAX_DESCRIPTION_CHARS {
        return Err(ReminderError::validation(format!(
            "Description must be at most {} characters.",
            MAX_DESCRIPTION_CHARS
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn valid_input_is_mapped_unchanged() {
        let req =
            ReminderRequest::validate("Buy groceries", "easy", "2024-01-10T00:00:00.000Z").unwrap();
        assert_eq!(req.task_description(), "Buy groceries");
        assert_eq!(req.task_difficulty(), TaskDifficulty::Easy);
        assert_eq!(req.due_date(), "2024-01-10T00:00:00.000Z");
        assert_eq!(
            req.due_instant(),
            Utc.with_ymd_and_hms(2024, 1, 10, 0, 0, 0).unwrap()
        );
    }

    #[test]
    fn description_bounds() {
        let due = "2024-01-10T00:00:00Z";
        for len in [0usize, 1, 2, 201, 500] {
            let d = "x".repeat(len);
            let err = ReminderRequest::validate(&d, "easy", due).unwrap_err();
            assert!(err.is_validation(), "len {} should fail", len);
        }
        for len in [3usize, 100, 200] {
            let d = "x".repeat(len);
            assert!(ReminderRequest::validate(&d, "hard", due).is_ok(), "len {}", len);
        }
    }

    #[test]
    fn description_length_counts_chars_not_bytes() {
        // 200 two-byte chars is still within bounds.
        let d = "é".repeat(200);
        assert!(ReminderRequest::validate(&d, "medium", "2024-01-10T00:00:00Z").is_ok());
    }

    #[test]
    fn whitespace_is_not_trimmed() {
        let req = ReminderRequest::validate("  ab ", "easy", "2024-01-10T00:00:00Z").unwrap();
        assert_eq!(req.task_description(), "  ab ");
    }

    #[test]
    fn rejects_unknown_difficulty() {
        let err = ReminderRequest::validate("Task", "urgent", "2024-01-10T00:00:00Z").unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn rejects_unparseable_dates() {
        for raw in ["", "tomorrow", "2024-01-10", "2024-13-01T00:00:00Z", "2024-01-10T00:00:00"] {
            let err = ReminderRequest::validate("Task", "easy", raw).unwrap_err();
            assert!(err.is_validation(), "{:?} should fail", raw);
        }
    }

    #[test]
    fn accepts_offsets() {
        let req = ReminderRequest::validate("Task", "easy", "2024-01-10T02:00:00+02:00").unwrap();
        assert_eq!(
            req.due_instant(),
            Utc.with_ymd_and_hms(2024, 1, 10, 0, 0, 0).unwrap()
        );
        assert_eq!(req.due_date(), "2024-01-10T02:00:00+02:00");
    }

    #[test]
    fn draft_without_due_date_validates() {
        let draft = TaskDraft {
            description: "Schedule a dentist appointment".into(),
            category: "home".into(),
            difficulty: "easy".into(),
            due_date: None,
        };
        let v = draft.validate().unwrap();
        assert_eq!(v.category, TaskCategory::Home);
        assert!(v.due_date.is_none());
    }

    #[test]
    fn draft_rejects_bad_category() {
        let draft = TaskDraft {
            description: "Write report".into(),
            category: "errands".into(),
            difficulty: "easy".into(),
            due_date: None,
        };
        assert!(draft.validate().unwrap_err().is_validation());
    }

    #[test]
    fn iso_format_matches_js_style() {
        let dt = Utc.with_ymd_and_hms(2024, 1, 10, 0, 0, 0).unwrap();
        assert_eq!(to_iso(dt), "2024-01-10T00:00:00.000Z");
    }
}
