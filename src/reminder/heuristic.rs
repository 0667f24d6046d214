// File: ./src/reminder/heuristic.rs
// Deterministic reminder used when the model cannot be reached
use crate::model::validate::to_iso;
use crate::model::{ReminderRequest, SmartReminder, TaskDifficulty};
use chrono::{DateTime, Duration, NaiveTime, Utc};

pub fn lead_days(difficulty: TaskDifficulty) -> i64 {
    match difficulty {
        TaskDifficulty::Easy => 1,
        TaskDifficulty::Medium => 2,
        TaskDifficulty::Hard => 7,
    }
}

/// 09:00 UTC, `lead_days` before the due date, never earlier than `now` and
/// never later than the due date.
pub fn heuristic_reminder(request: &ReminderRequest, now: DateTime<Utc>) -> SmartReminder {
    let due = request.due_instant();
    let days = lead_days(request.task_difficulty());
    let morning = NaiveTime::from_hms_opt(9, 0, 0).unwrap_or_default();
    let target = (due - Duration::days(days))
        .date_naive()
        .and_time(morning)
        .and_utc();
    let at = target.max(now).min(due);

    let reasoning = if at == target {
        match request.task_difficulty() {
            TaskDifficulty::Easy => "Easy task, a reminder the day before is enough.".to_string(),
            TaskDifficulty::Medium => concat!(
                "This is a medium difficulty task. ",
                "Reminding you 2 days before the due date should be sufficient.",
            )
            .to_string(),
            TaskDifficulty::Hard => {
                "This is a hard task, you should start at least a week in advance.".to_string()
            }
        }
    } else if at == due {
        "The due date has already passed, so the reminder is set for the due date itself."
            .to_string()
    } else {
        format!(
            "A {} task usually needs a {}-day lead time, which has already passed, \
             so the reminder is set for as soon as possible.",
            request.task_difficulty(),
            days
        )
    };

    SmartReminder {
        reminder_date: to_iso(at),
        reasoning,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn req(difficulty: &str, due: &str) -> ReminderRequest {
        ReminderRequest::validate("Plan the architecture", difficulty, due).unwrap()
    }

    #[test]
    fn harder_tasks_get_earlier_reminders() {
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let due = "2024-01-15T00:00:00.000Z";
        let easy = heuristic_reminder(&req("easy", due), now);
        let medium = heuristic_reminder(&req("medium", due), now);
        let hard = heuristic_reminder(&req("hard", due), now);
        assert_eq!(easy.reminder_date, "2024-01-14T09:00:00.000Z");
        assert_eq!(medium.reminder_date, "2024-01-13T09:00:00.000Z");
        assert_eq!(hard.reminder_date, "2024-01-08T09:00:00.000Z");
        assert!(hard.reasoning.contains("a week in advance"));
    }

    #[test]
    fn clamped_to_now_when_lead_time_already_passed() {
        let now = Utc.with_ymd_and_hms(2024, 1, 12, 12, 0, 0).unwrap();
        let r = heuristic_reminder(&req("hard", "2024-01-15T00:00:00Z"), now);
        assert_eq!(r.reminder_date, "2024-01-12T12:00:00.000Z");
        assert!(r.reasoning.contains("7-day lead time"));
        assert!(r.reasoning.contains("as soon as possible"));
        assert!(!r.reasoning.contains("at least a week in advance"));
    }

    #[test]
    fn never_after_due_date() {
        let now = Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap();
        let r = heuristic_reminder(&req("easy", "2024-01-15T00:00:00Z"), now);
        assert_eq!(r.reminder_date, "2024-01-15T00:00:00.000Z");
        assert!(r.reasoning.contains("already passed"));
        assert!(!r.reasoning.contains("the day before"));
    }
}
