// File: ./src/reminder/mod.rs
// Smart reminder generation: prompt, schema, backend seam and service
pub mod backend;
pub mod heuristic;
pub mod prompt;
pub mod schema;
pub mod service;

pub use backend::CompletionBackend;
pub use heuristic::heuristic_reminder;
pub use prompt::PromptTemplate;
pub use schema::{parse_reminder_output, reminder_output_schema};
pub use service::{ReminderService, SmartReminderInput, generate_smart_reminder};
