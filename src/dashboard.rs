// File: ./src/dashboard.rs
// Listing helpers: filtering, ordering and due-date text
use crate::model::{SmartReminder, Task, TaskCategory};
use chrono::{DateTime, TimeZone, Utc};
use std::fmt::Display;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Filter {
    #[default]
    All,
    Category(TaskCategory),
}

impl FromStr for Filter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(Filter::All),
            other => other
                .parse::<TaskCategory>()
                .map(Filter::Category)
                .map_err(|_| format!("unknown filter '{}' (all, work, home)", other)),
        }
    }
}

/// Incomplete tasks first. Stable, so store order is kept within each group.
pub fn sort_tasks(tasks: &[Task]) -> Vec<Task> {
    let mut sorted = tasks.to_vec();
    sorted.sort_by_key(|t| t.completed);
    sorted
}

pub fn filter_tasks(tasks: &[Task], filter: Filter) -> Vec<Task> {
    match filter {
        Filter::All => tasks.to_vec(),
        Filter::Category(c) => tasks.iter().filter(|t| t.category == c).cloned().collect(),
    }
}

pub fn completed_count(tasks: &[Task]) -> usize {
    tasks.iter().filter(|t| t.completed).count()
}

pub fn is_overdue(task: &Task, now: DateTime<Utc>) -> bool {
    !task.completed && task.due_date.is_some_and(|d| d < now)
}

/// `Jan 5, 2024` in the viewer's zone, or `No date`.
pub fn format_due<Tz>(due: Option<DateTime<Utc>>, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    match due {
        Some(d) => d.with_timezone(tz).format("%b %-d, %Y").to_string(),
        None => "No date".to_string(),
    }
}

/// `Jan 9 at 9:00 AM` in the viewer's zone. A stored date that is not an
/// instant is shown as is.
pub fn format_reminder<Tz>(reminder: &SmartReminder, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    match reminder.reminder_instant() {
        Some(at) => at
            .with_timezone(tz)
            .format("%b %-d at %-I:%M %p")
            .to_string(),
        None => reminder.reminder_date.clone(),
    }
}

/// Human distance between `due` and `now` with a suffix: `in 3 days`, `about 2 hours ago`.
pub fn due_distance(due: Option<DateTime<Utc>>, now: DateTime<Utc>) -> String {
    let Some(due) = due else {
        return "No due date".to_string();
    };
    let seconds = (due - now).num_seconds();
    let text = distance_words(seconds.unsigned_abs());
    if seconds >= 0 {
        format!("in {}", text)
    } else {
        format!("{} ago", text)
    }
}

const MINUTES_IN_DAY: u64 = 1440;
const MINUTES_IN_MONTH: u64 = 43200;

fn plural(n: u64, unit: &str) -> String {
    if n == 1 {
        format!("1 {}", unit)
    } else {
        format!("{} {}s", n, unit)
    }
}

fn round_div(n: u64, d: u64) -> u64 {
    (n + d / 2) / d
}

fn distance_words(seconds: u64) -> String {
    let minutes = round_div(seconds, 60);
    match minutes {
        0 => "less than a minute".to_string(),
        1 => "1 minute".to_string(),
        m if m < 45 => plural(m, "minute"),
        m if m < 90 => "about 1 hour".to_string(),
        m if m < MINUTES_IN_DAY => format!("about {}", plural(round_div(m, 60), "hour")),
        m if m < 2520 => "1 day".to_string(),
        m if m < MINUTES_IN_MONTH => plural(round_div(m, MINUTES_IN_DAY), "day"),
        m if m < 2 * MINUTES_IN_MONTH => {
            format!("about {}", plural(round_div(m, MINUTES_IN_MONTH), "month"))
        }
        m => {
            let months = m / MINUTES_IN_MONTH;
            if months < 12 {
                return plural(round_div(m, MINUTES_IN_MONTH), "month");
            }
            let years = months / 12;
            let rest = months % 12;
            if rest < 3 {
                format!("about {}", plural(years, "year"))
            } else if rest < 9 {
                format!("over {}", plural(years, "year"))
            } else {
                format!("almost {}", plural(years + 1, "year"))
            }
        }
    }
}
