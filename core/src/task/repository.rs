//! Task repository trait
//!
//! Defines the interface for task storage operations.

use async_trait::async_trait;

use super::model::{NewTask, Status, Task, TaskPatch};
use crate::Result;

/// Repository interface for task CRUD operations
#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// Insert a new task, assigning its id and creation timestamp
    async fn create(&self, new: NewTask) -> Result<Task>;

    /// Get a task by ID
    async fn get(&self, id: u64) -> Result<Option<Task>>;

    /// Get all tasks in insertion order
    async fn list(&self) -> Result<Vec<Task>>;

    /// Apply a partial update to an existing task
    ///
    /// Fails with `TaskNotFound` for an unknown id and `NoFieldsProvided`
    /// for an empty patch; the record is untouched in both cases. The
    /// existence check happens before the empty-patch check.
    async fn update(&self, id: u64, patch: TaskPatch) -> Result<Task>;

    /// Delete a task by ID, reporting whether a record was removed
    async fn delete(&self, id: u64) -> Result<bool>;

    /// Find tasks with the given status, in insertion order
    async fn find_by_status(&self, status: &Status) -> Result<Vec<Task>>;
}
