// File: ./src/store.rs
// Per-user task persistence seam
use crate::model::{NewTask, Task, TaskPatch};
use anyhow::Result;
use async_trait::async_trait;
use futures::stream::BoxStream;

#[async_trait]
pub trait TaskStore: Send + Sync {
    /// Assigns an id and persists the task under `user_id`.
    async fn create(&self, user_id: &str, task: NewTask) -> Result<Task>;

    async fn update(&self, user_id: &str, id: &str, patch: TaskPatch) -> Result<Task>;

    /// Deleting an id that does not exist is not an error.
    async fn delete(&self, user_id: &str, id: &str) -> Result<()>;

    async fn list(&self, user_id: &str) -> Result<Vec<Task>>;

    /// Yields the current task list immediately, then again after every write.
    fn subscribe(&self, user_id: &str) -> Result<BoxStream<'static, Vec<Task>>>;
}
