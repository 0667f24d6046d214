// File: ./src/reminder/prompt.rs
// Prompt template for the reminder model call
use crate::model::ReminderRequest;
use anyhow::{Context, Result, bail};
use std::fs;
use std::path::Path;

const DESCRIPTION_SLOT: &str = "{{{taskDescription}}}";
const DIFFICULTY_SLOT: &str = "{{{taskDifficulty}}}";
const DUE_DATE_SLOT: &str = "{{{dueDate}}}";

pub const DEFAULT_TEMPLATE: &str = r#"You are a smart reminder assistant. You will receive a task description, its difficulty, and its due date.

Your goal is to determine the optimal time to send a reminder to the user so that they complete the task on time, taking into account the task's difficulty.

Task description: {{{taskDescription}}}
Task difficulty: {{{taskDifficulty}}}
Due date: {{{dueDate}}}

Consider these factors:
- Hard tasks require more advance reminders.
- Easy tasks can be reminded closer to the due date.

Return the reminder date in ISO format and include your reasoning.
Example:
{
  "reminderDate": "2024-01-02T10:00:00.000Z",
  "reasoning": "The task is hard and requires 3 days to complete."
}
"#;

/// Immutable prompt text with `{{{taskDescription}}}`, `{{{taskDifficulty}}}`
/// and `{{{dueDate}}}` slots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplate {
    text: String,
}

impl Default for PromptTemplate {
    fn default() -> Self {
        Self {
            text: DEFAULT_TEMPLATE.to_string(),
        }
    }
}

impl PromptTemplate {
    pub fn new(text: impl Into<String>) -> Result<Self> {
        let text = text.into();
        for slot in [DESCRIPTION_SLOT, DIFFICULTY_SLOT, DUE_DATE_SLOT] {
            if !text.contains(slot) {
                bail!("prompt template is missing the {} placeholder", slot);
            }
        }
        Ok(Self { text })
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading prompt template {}", path.display()))?;
        Self::new(text)
    }

    /// Values are substituted verbatim in a single pass, so a description that
    /// itself contains a slot marker is not expanded again.
    pub fn render(&self, request: &ReminderRequest) -> String {
        let slots = [
            (DESCRIPTION_SLOT, request.task_description()),
            (DIFFICULTY_SLOT, request.task_difficulty().as_str()),
            (DUE_DATE_SLOT, request.due_date()),
        ];
        let mut out = String::with_capacity(self.text.len() + 128);
        let mut rest = self.text.as_str();
        loop {
            let next = slots
                .iter()
                .filter_map(|(slot, value)| rest.find(slot).map(|idx| (idx, *slot, *value)))
                .min_by_key(|(idx, _, _)| *idx);
            match next {
                Some((idx, slot, value)) => {
                    out.push_str(&rest[..idx]);
                    out.push_str(value);
                    rest = &rest[idx + slot.len()..];
                }
                None => {
                    out.push_str(rest);
                    return out;
                }
            }
        }
    }
}
