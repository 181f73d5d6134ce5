//! Task CRUD operations
//!
//! The four task tools exposed to the delegation runtime. Each takes the
//! store it operates on and always returns a tagged result; storage faults
//! are converted, never propagated.

use serde::{Deserialize, Serialize};
use tracing::info;

use td_core::task::{NewTask, Priority, Status, Task, TaskPatch, TaskRepository};

use crate::response::{ErrorKind, ToolError, ToolResult};

// ============================================================================
// Request/Response types
// ============================================================================

/// Arguments for `create_task`
#[derive(Debug, Clone, Deserialize)]
pub struct CreateTaskRequest {
    pub task_name: String,
    #[serde(default)]
    pub task_description: String,
    #[serde(default)]
    pub priority: Priority,
}

/// Arguments for `update_task`
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateTaskRequest {
    pub task_id: u64,
    #[serde(flatten)]
    pub patch: TaskPatch,
}

/// Success payload for task creation
#[derive(Debug, Serialize)]
pub struct TaskCreated {
    pub task_id: u64,
    pub message: String,
}

/// Success payload for task listing
#[derive(Debug, Serialize)]
pub struct TaskList {
    pub tasks: Vec<Task>,
    pub count: usize,
}

/// Success payload for update and delete confirmations
#[derive(Debug, Serialize)]
pub struct Confirmation {
    pub message: String,
}

// ============================================================================
// Operations
// ============================================================================

/// Create a new task; `status` always starts as `pending`
pub async fn create_task(
    store: &dyn TaskRepository,
    req: CreateTaskRequest,
) -> ToolResult<TaskCreated> {
    info!("Tool create_task called for task: {}", req.task_name);

    if req.task_name.trim().is_empty() {
        return ToolResult::error(ErrorKind::InvalidInput, "Task name cannot be empty.");
    }

    let new = NewTask::new(req.task_name)
        .with_description(req.task_description)
        .with_priority(req.priority);

    match store.create(new).await {
        Ok(task) => ToolResult::Success(TaskCreated {
            task_id: task.id,
            message: format!("Task '{}' added successfully.", task.task_name),
        }),
        Err(e) => ToolResult::Error(ToolError::from_store("Failed to add task", e)),
    }
}

/// List tasks, optionally filtered by status.
///
/// A missing filter or any casing of "all" returns every task; anything else
/// matches on equality with the lower-cased filter value.
pub async fn list_tasks(store: &dyn TaskRepository, status: Option<&str>) -> ToolResult<TaskList> {
    let filter = status.unwrap_or("all");
    info!("Tool list_tasks called with status filter: {}", filter);

    let result = if filter.eq_ignore_ascii_case("all") {
        store.list().await
    } else {
        store.find_by_status(&Status::from(filter.to_lowercase())).await
    };

    match result {
        Ok(tasks) => {
            let count = tasks.len();
            ToolResult::Success(TaskList { tasks, count })
        }
        Err(e) => ToolResult::Error(ToolError::from_store("Failed to retrieve tasks", e)),
    }
}

/// Apply a partial update to an existing task.
///
/// A missing id and a patch naming no fields are reported as two distinct
/// error conditions; the existence check comes first.
pub async fn update_task(
    store: &dyn TaskRepository,
    task_id: u64,
    patch: TaskPatch,
) -> ToolResult<Confirmation> {
    info!("Tool update_task called for task_id: {}", task_id);

    match store.update(task_id, patch).await {
        Ok(_) => ToolResult::Success(Confirmation {
            message: format!("Task {} updated successfully.", task_id),
        }),
        Err(e) => ToolResult::Error(ToolError::from_store("Failed to update task", e)),
    }
}

/// Delete a task permanently
pub async fn delete_task(store: &dyn TaskRepository, task_id: u64) -> ToolResult<Confirmation> {
    info!("Tool delete_task called for task_id: {}", task_id);

    match store.delete(task_id).await {
        Ok(true) => ToolResult::Success(Confirmation {
            message: format!("Task {} deleted successfully.", task_id),
        }),
        Ok(false) => ToolResult::error(
            ErrorKind::NotFound,
            format!("Task with ID {} not found.", task_id),
        ),
        Err(e) => ToolResult::Error(ToolError::from_store("Failed to delete task", e)),
    }
}
