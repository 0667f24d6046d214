// File: ./src/reminder/service.rs
use crate::error::ReminderError;
use crate::model::{ReminderRequest, SmartReminder};
use crate::reminder::backend::CompletionBackend;
use crate::reminder::prompt::PromptTemplate;
use crate::reminder::schema::{parse_reminder_output, reminder_output_schema};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Raw inbound payload, as a task-creation caller would send it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SmartReminderInput {
    pub task_description: String,
    pub task_difficulty: String,
    pub due_date: String,
}

/// Renders the prompt, makes one backend call and checks the answer.
///
/// Holds no mutable state: concurrent calls are independent and nothing is
/// cached between them.
#[derive(Clone)]
pub struct ReminderService {
    backend: Arc<dyn CompletionBackend>,
    template: PromptTemplate,
    schema: Value,
    timeout: Duration,
}

impl ReminderService {
    pub fn new(backend: Arc<dyn CompletionBackend>, template: PromptTemplate) -> Self {
        Self {
            backend,
            template,
            schema: reminder_output_schema(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub async fn generate_reminder(
        &self,
        request: &ReminderRequest,
    ) -> Result<SmartReminder, ReminderError> {
        let prompt = self.template.render(request);
        debug!(
            difficulty = %request.task_difficulty(),
            due = request.due_date(),
            "reminder inference requested"
        );

        let call = self.backend.complete(&prompt, &self.schema);
        let raw = match tokio::time::timeout(self.timeout, call).await {
            Ok(res) => res,
            Err(_) => Err(ReminderError::unavailable(format!(
                "no answer within {}s",
                self.timeout.as_secs_f32()
            ))),
        };

        let result = raw.and_then(|text| parse_reminder_output(&text));
        match &result {
            Ok(reminder) => {
                if let Some(at) = reminder.reminder_instant()
                    && at > request.due_instant()
                {
                    warn!(
                        reminder = %reminder.reminder_date,
                        due = request.due_date(),
                        "model proposed a reminder after the due date"
                    );
                }
                info!(reminder = %reminder.reminder_date, "reminder inference completed");
            }
            Err(e) => warn!(error = %e, "reminder inference failed"),
        }
        result
    }
}

/// Validates the raw payload, then asks the service for a reminder.
pub async fn generate_smart_reminder(
    service: &ReminderService,
    input: &SmartReminderInput,
) -> Result<SmartReminder, ReminderError> {
    let request = ReminderRequest::validate(
        &input.task_description,
        &input.task_difficulty,
        &input.due_date,
    )?;
    service.generate_reminder(&request).await
}
