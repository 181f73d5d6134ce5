//! Task model definitions

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Task priority level
///
/// The canonical values are `low`, `medium` and `high`. Callers are trusted
/// to supply sane values, so anything else is carried through verbatim as
/// `Other` rather than rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Priority {
    Low,
    Medium,
    High,
    Other(String),
}

impl Default for Priority {
    fn default() -> Self {
        Self::Medium
    }
}

impl From<String> for Priority {
    fn from(value: String) -> Self {
        match value.as_str() {
            "low" => Self::Low,
            "medium" => Self::Medium,
            "high" => Self::High,
            _ => Self::Other(value),
        }
    }
}

impl From<&str> for Priority {
    fn from(value: &str) -> Self {
        Self::from(value.to_string())
    }
}

impl From<Priority> for String {
    fn from(value: Priority) -> Self {
        match value {
            Priority::Low => "low".to_string(),
            Priority::Medium => "medium".to_string(),
            Priority::High => "high".to_string(),
            Priority::Other(other) => other,
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Low => f.write_str("low"),
            Self::Medium => f.write_str("medium"),
            Self::High => f.write_str("high"),
            Self::Other(other) => f.write_str(other),
        }
    }
}

/// Task status
///
/// Same permissive contract as [`Priority`]: `pending` and `completed` are
/// the canonical values, unknown strings round-trip untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Status {
    Pending,
    Completed,
    Other(String),
}

impl Default for Status {
    fn default() -> Self {
        Self::Pending
    }
}

impl From<String> for Status {
    fn from(value: String) -> Self {
        match value.as_str() {
            "pending" => Self::Pending,
            "completed" => Self::Completed,
            _ => Self::Other(value),
        }
    }
}

impl From<&str> for Status {
    fn from(value: &str) -> Self {
        Self::from(value.to_string())
    }
}

impl From<Status> for String {
    fn from(value: Status) -> Self {
        match value {
            Status::Pending => "pending".to_string(),
            Status::Completed => "completed".to_string(),
            Status::Other(other) => other,
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => f.write_str("pending"),
            Self::Completed => f.write_str("completed"),
            Self::Other(other) => f.write_str(other),
        }
    }
}

/// A task record in the to-do list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: u64,
    pub task_name: String,
    pub task_description: String,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub status: Status,
    pub created_at: DateTime<Utc>,
}

/// A task draft prior to insertion
///
/// The store assigns `id` and `created_at`; `status` always starts as
/// `pending`.
#[derive(Debug, Clone, Default)]
pub struct NewTask {
    pub task_name: String,
    pub task_description: String,
    pub priority: Priority,
}

impl NewTask {
    /// Create a new draft with the given name
    pub fn new(task_name: impl Into<String>) -> Self {
        Self {
            task_name: task_name.into(),
            task_description: String::new(),
            priority: Priority::default(),
        }
    }

    /// Set the description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.task_description = description.into();
        self
    }

    /// Set the priority
    pub fn with_priority(mut self, priority: impl Into<Priority>) -> Self {
        self.priority = priority.into();
        self
    }
}

/// A partial update to an existing task
///
/// `None` means "leave the stored value untouched"; a patch naming no fields
/// is a distinct error condition at the store level.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TaskPatch {
    #[serde(default)]
    pub task_name: Option<String>,
    #[serde(default)]
    pub task_description: Option<String>,
    #[serde(default)]
    pub priority: Option<Priority>,
    #[serde(default)]
    pub status: Option<Status>,
}

impl TaskPatch {
    /// True when the patch names no fields at all
    pub fn is_empty(&self) -> bool {
        self.task_name.is_none()
            && self.task_description.is_none()
            && self.priority.is_none()
            && self.status.is_none()
    }

    /// Apply the supplied fields to a record, leaving the rest untouched.
    /// `id` and `created_at` are never part of a patch.
    pub fn apply(self, task: &mut Task) {
        if let Some(task_name) = self.task_name {
            task.task_name = task_name;
        }
        if let Some(task_description) = self.task_description {
            task.task_description = task_description;
        }
        if let Some(priority) = self.priority {
            task.priority = priority;
        }
        if let Some(status) = self.status {
            task.status = status;
        }
    }
}
