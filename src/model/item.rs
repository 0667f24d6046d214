// File: ./src/model/item.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ReminderError;

/// Ordered by the lead time a task needs before its due date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskDifficulty {
    Easy,
    Medium,
    Hard,
}

impl TaskDifficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskDifficulty::Easy => "easy",
            TaskDifficulty::Medium => "medium",
            TaskDifficulty::Hard => "hard",
        }
    }
}

impl fmt::Display for TaskDifficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskDifficulty {
    type Err = ReminderError;

    // Exact match only: "Easy" or " easy" are rejected.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "easy" => Ok(TaskDifficulty::Easy),
            "medium" => Ok(TaskDifficulty::Medium),
            "hard" => Ok(TaskDifficulty::Hard),
            other => Err(ReminderError::validation(format!(
                "difficulty must be one of easy, medium, hard (got '{}')",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskCategory {
    Work,
    Home,
}

impl TaskCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskCategory::Work => "work",
            TaskCategory::Home => "home",
        }
    }
}

impl fmt::Display for TaskCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskCategory {
    type Err = ReminderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "work" => Ok(TaskCategory::Work),
            "home" => Ok(TaskCategory::Home),
            other => Err(ReminderError::validation(format!(
                "category must be one of work, home (got '{}')",
                other
            ))),
        }
    }
}

/// Suggested reminder time plus the model's rationale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SmartReminder {
    pub reminder_date: String,
    pub reasoning: String,
}

impl SmartReminder {
    pub fn reminder_instant(&self) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(&self.reminder_date)
            .ok()
            .map(|d| d.with_timezone(&Utc))
    }
}

/// A task as produced by the create-task workflow, before the store assigns ids.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTask {
    pub description: String,
    pub due_date: Option<DateTime<Utc>>,
    pub difficulty: TaskDifficulty,
    pub category: TaskCategory,
    pub completed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub smart_reminder: Option<SmartReminder>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub user_id: String,
    pub description: String,
    pub due_date: Option<DateTime<Utc>>,
    pub difficulty: TaskDifficulty,
    pub category: TaskCategory,
    pub completed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub smart_reminder: Option<SmartReminder>,
}

impl Task {
    pub fn from_new(id: String, user_id: String, new: NewTask) -> Self {
        Self {
            id,
            user_id,
            description: new.description,
            due_date: new.due_date,
            difficulty: new.difficulty,
            category: new.category,
            completed: new.completed,
            smart_reminder: new.smart_reminder,
        }
    }

    /// Store-side merge. Edits never touch the reminder.
    pub fn apply(&mut self, patch: &TaskPatch) {
        if let Some(c) = patch.completed {
            self.completed = c;
        }
    }
}

/// The only edit the dashboard offers is toggling completion.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskPatch {
    pub completed: Option<bool>,
}

impl TaskPatch {
    pub fn completed(done: bool) -> Self {
        Self {
            completed: Some(done),
        }
    }
}
