// File: ./src/workflow.rs
// Create-task action: validate, maybe infer a reminder, hand back the task
use crate::error::ReminderError;
use crate::model::{NewTask, ReminderRequest, SmartReminder, TaskDraft};
use crate::reminder::{ReminderService, heuristic_reminder};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// What to do with a valid task when reminder inference fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReminderPolicy {
    /// Keep the task, drop the reminder, report a warning.
    #[default]
    BestEffort,
    /// Abort task creation with the inference error.
    Required,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CreateOptions {
    pub policy: ReminderPolicy,
    /// Substitute a fixed lead-time reminder when the model fails.
    pub heuristic_fallback: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TaskCreation {
    pub task: NewTask,
    /// Set when the task was created without the model's reminder.
    pub warning: Option<ReminderError>,
}

pub async fn create_task(
    draft: &TaskDraft,
    service: &ReminderService,
    options: CreateOptions,
) -> Result<TaskCreation, ReminderError> {
    let valid = draft.validate()?;

    let mut task = NewTask {
        description: valid.description,
        due_date: valid.due_date,
        difficulty: valid.difficulty,
        category: valid.category,
        completed: false,
        smart_reminder: None,
    };

    // No due date, no inference call.
    let Some(due) = task.due_date else {
        return Ok(TaskCreation {
            task,
            warning: None,
        });
    };

    let request = ReminderRequest::from_parts(&task.description, task.difficulty, due)?;
    let (reminder, warning) = match service.generate_reminder(&request).await {
        Ok(r) => (Some(r), None),
        Err(e) => fallback(&request, e, options)?,
    };
    task.smart_reminder = reminder;
    Ok(TaskCreation { task, warning })
}

fn fallback(
    request: &ReminderRequest,
    err: ReminderError,
    options: CreateOptions,
) -> Result<(Option<SmartReminder>, Option<ReminderError>), ReminderError> {
    if options.policy == ReminderPolicy::Required {
        return Err(err);
    }
    if options.heuristic_fallback {
        info!(error = %err, "using fixed lead-time reminder");
        return Ok((Some(heuristic_reminder(request, Utc::now())), Some(err)));
    }
    warn!(error = %err, "creating task without a reminder");
    Ok((None, Some(err)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reminder::{CompletionBackend, PromptTemplate};
    use async_trait::async_trait;
    use serde_json::Value;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Fake {
        reply: Result<&'static str, ReminderError>,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl CompletionBackend for Fake {
        async fn complete(&self, _: &str, _: &Value) -> Result<String, ReminderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.reply.clone().map(str::to_string)
        }
    }

    fn service(reply: Result<&'static str, ReminderError>) -> (ReminderService, Arc<Fake>) {
        let fake = Arc::new(Fake {
            reply,
            calls: AtomicUsize::new(0),
        });
        (
            ReminderService::new(fake.clone(), PromptTemplate::default()),
            fake,
        )
    }

    fn draft(due: Option<&str>) -> TaskDraft {
        TaskDraft {
            description: "Plan the architecture for the new microservice".into(),
            category: "work".into(),
            difficulty: "hard".into(),
            due_date: due.map(str::to_string),
        }
    }

    const GOOD: &str = concat!(
        r#"{"reminderDate":"2024-01-03T09:00:00.000Z","#,
        r#""reasoning":"Hard task, start a week early."}"#,
    );

    #[tokio::test]
    async fn no_due_date_skips_inference() {
        let (svc, fake) = service(Ok(GOOD));
        let out = create_task(&draft(None), &svc, CreateOptions::default())
            .await
            .unwrap();
        assert!(out.task.smart_reminder.is_none());
        assert!(out.warning.is_none());
        assert_eq!(fake.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn due_date_attaches_reminder() {
        let (svc, fake) = service(Ok(GOOD));
        let out = create_task(
            &draft(Some("2024-01-10T00:00:00.000Z")),
            &svc,
            CreateOptions::default(),
        )
        .await
        .unwrap();
        assert_eq!(fake.calls.load(Ordering::SeqCst), 1);
        let r = out.task.smart_reminder.unwrap();
        assert_eq!(r.reminder_date, "2024-01-03T09:00:00.000Z");
        assert!(!out.task.completed);
    }

    #[tokio::test]
    async fn invalid_draft_aborts_before_inference() {
        let (svc, fake) = service(Ok(GOOD));
        let mut d = draft(Some("2024-01-10T00:00:00Z"));
        d.description = "ab".into();
        let err = create_task(&d, &svc, CreateOptions::default())
            .await
            .unwrap_err();
        assert!(err.is_validation());
        assert_eq!(fake.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn best_effort_keeps_task_on_failure() {
        let (svc, _) = service(Err(ReminderError::unavailable("down")));
        let out = create_task(
            &draft(Some("2024-01-10T00:00:00Z")),
            &svc,
            CreateOptions::default(),
        )
        .await
        .unwrap();
        assert!(out.task.smart_reminder.is_none());
        assert!(out.warning.unwrap().is_inference());
    }

    #[tokio::test]
    async fn required_policy_aborts_on_failure() {
        let (svc, _) = service(Ok(r#"{"reminderDate":"2024-01-03T09:00:00Z"}"#));
        let options = CreateOptions {
            policy: ReminderPolicy::Required,
            heuristic_fallback: true,
        };
        let err = create_task(&draft(Some("2024-01-10T00:00:00Z")), &svc, options)
            .await
            .unwrap_err();
        assert!(matches!(err, ReminderError::InferenceOutput(_)));
    }

    #[tokio::test]
    async fn heuristic_fills_in_when_enabled() {
        let (svc, _) = service(Err(ReminderError::unavailable("down")));
        let options = CreateOptions {
            policy: ReminderPolicy::BestEffort,
            heuristic_fallback: true,
        };
        let out = create_task(&draft(Some("2099-01-10T00:00:00Z")), &svc, options)
            .await
            .unwrap();
        let r = out.task.smart_reminder.unwrap();
        assert_eq!(r.reminder_date, "2099-01-03T09:00:00.000Z");
        assert!(out.warning.is_some());
    }
}
