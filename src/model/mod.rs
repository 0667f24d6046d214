// File: ./src/model/mod.rs
// Aggregates the split model files
pub mod item;
pub mod validate;

// Re-export types so callers can use `crate::model::Task` directly
pub use item::{NewTask, SmartReminder, Task, TaskCategory, TaskDifficulty, TaskPatch};
pub use validate::{ReminderRequest, TaskDraft, ValidatedDraft};
