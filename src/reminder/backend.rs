// File: ./src/reminder/backend.rs
use crate::error::ReminderError;
use async_trait::async_trait;
use serde_json::Value;

/// A prompt-completion endpoint constrained to an output schema.
///
/// Implementations return the model's raw text; schema enforcement happens in
/// [`crate::reminder::parse_reminder_output`] so it does not depend on the
/// transport. Transport failures should be reported as
/// [`ReminderError::InferenceUnavailable`].
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    async fn complete(&self, prompt: &str, output_schema: &Value) -> Result<String, ReminderError>;
}
