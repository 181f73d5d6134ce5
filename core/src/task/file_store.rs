//! File-based task storage implementation
//!
//! Stores the task collection as JSON in a single file on disk, together
//! with the id allocator watermark so ids are never reused.

use std::collections::BTreeMap;
use std::path::PathBuf;

use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::debug;

use super::model::{NewTask, Status, Task, TaskPatch};
use super::repository::TaskRepository;
use crate::{Error, Result};

/// On-disk document: the task collection plus the next id to hand out
#[derive(Debug, Serialize, Deserialize)]
struct StoreDocument {
    next_id: u64,
    tasks: Vec<Task>,
}

impl Default for StoreDocument {
    fn default() -> Self {
        Self {
            next_id: 1,
            tasks: Vec::new(),
        }
    }
}

/// In-memory state backing the store
struct StoreState {
    next_id: u64,
    tasks: BTreeMap<u64, Task>,
}

impl From<StoreDocument> for StoreState {
    fn from(doc: StoreDocument) -> Self {
        let tasks: BTreeMap<u64, Task> = doc.tasks.into_iter().map(|t| (t.id, t)).collect();
        // Never hand out an id the document already contains.
        let highest = tasks.keys().next_back().map_or(0, |id| id + 1);
        Self {
            next_id: doc.next_id.max(highest),
            tasks,
        }
    }
}

/// File-based task store using JSON
///
/// The whole collection lives in one document; an in-memory cache serves
/// reads and every mutation rewrites the file. The `BTreeMap` cache keeps
/// retrieval in ascending-id order, which is insertion order.
pub struct FileTaskStore {
    /// Path to the JSON file
    path: PathBuf,
    /// In-memory state, mirrored to disk on every mutation
    state: RwLock<StoreState>,
}

impl FileTaskStore {
    /// Open the store at the given path.
    ///
    /// Loads the existing document if present, otherwise starts empty; the
    /// file is created on first write. Opening an already-initialized store
    /// changes nothing, so this is safe to call on every process start.
    pub async fn new(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let state = if path.exists() {
            let content = tokio::fs::read_to_string(&path)
                .await
                .map_err(|e| Error::Storage(format!("Failed to read task file: {}", e)))?;
            let doc: StoreDocument = serde_json::from_str(&content)
                .map_err(|e| Error::Storage(format!("Failed to parse task file: {}", e)))?;
            StoreState::from(doc)
        } else {
            StoreState::from(StoreDocument::default())
        };

        Ok(Self {
            path,
            state: RwLock::new(state),
        })
    }

    /// Persist the current state to disk
    async fn persist(&self) -> Result<()> {
        let doc = {
            let state = self.state.read().await;
            StoreDocument {
                next_id: state.next_id,
                tasks: state.tasks.values().cloned().collect(),
            }
        };
        let content = serde_json::to_string_pretty(&doc)?;

        // Ensure parent directory exists
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        tokio::fs::write(&self.path, content).await?;
        debug!("Persisted {} tasks to {:?}", doc.tasks.len(), self.path);
        Ok(())
    }
}

#[async_trait]
impl TaskRepository for FileTaskStore {
    async fn create(&self, new: NewTask) -> Result<Task> {
        let task = {
            let mut state = self.state.write().await;
            let id = state.next_id;
            state.next_id += 1;

            let task = Task {
                id,
                task_name: new.task_name,
                task_description: new.task_description,
                priority: new.priority,
                status: Status::default(),
                created_at: Utc::now(),
            };
            state.tasks.insert(id, task.clone());
            task
        };
        self.persist().await?;
        Ok(task)
    }

    async fn get(&self, id: u64) -> Result<Option<Task>> {
        let state = self.state.read().await;
        Ok(state.tasks.get(&id).cloned())
    }

    async fn list(&self) -> Result<Vec<Task>> {
        let state = self.state.read().await;
        Ok(state.tasks.values().cloned().collect())
    }

    async fn update(&self, id: u64, patch: TaskPatch) -> Result<Task> {
        let task = {
            let mut state = self.state.write().await;
            // Existence is checked before the empty-patch condition.
            let Some(task) = state.tasks.get_mut(&id) else {
                return Err(Error::TaskNotFound(id));
            };
            if patch.is_empty() {
                return Err(Error::NoFieldsProvided);
            }
            patch.apply(task);
            task.clone()
        };
        self.persist().await?;
        Ok(task)
    }

    async fn delete(&self, id: u64) -> Result<bool> {
        let removed = {
            let mut state = self.state.write().await;
            state.tasks.remove(&id).is_some()
        };
        if removed {
            self.persist().await?;
        }
        Ok(removed)
    }

    async fn find_by_status(&self, status: &Status) -> Result<Vec<Task>> {
        let state = self.state.read().await;
        Ok(state
            .tasks
            .values()
            .filter(|t| t.status == *status)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::Priority;
    use tempfile::TempDir;

    async fn create_test_store() -> (FileTaskStore, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("tasks.json");
        let store = FileTaskStore::new(&path).await.unwrap();
        (store, temp_dir)
    }

    #[tokio::test]
    async fn test_create_task_defaults() {
        let (store, _temp) = create_test_store().await;

        let created = store.create(NewTask::new("Buy milk")).await.unwrap();

        assert_eq!(created.id, 1);
        assert_eq!(created.task_name, "Buy milk");
        assert_eq!(created.task_description, "");
        assert_eq!(created.priority, Priority::Medium);
        assert_eq!(created.status, Status::Pending);
    }

    #[tokio::test]
    async fn test_create_assigns_monotonic_ids() {
        let (store, _temp) = create_test_store().await;

        let first = store.create(NewTask::new("Task 1")).await.unwrap();
        let second = store.create(NewTask::new("Task 2")).await.unwrap();
        let third = store.create(NewTask::new("Task 3")).await.unwrap();

        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);
        assert_eq!(third.id, 3);
    }

    #[tokio::test]
    async fn test_get_task() {
        let (store, _temp) = create_test_store().await;

        let created = store.create(NewTask::new("Buy milk")).await.unwrap();

        let retrieved = store.get(created.id).await.unwrap();
        assert_eq!(retrieved, Some(created));

        // Test non-existent task
        let non_existent = store.get(9999).await.unwrap();
        assert!(non_existent.is_none());
    }

    #[tokio::test]
    async fn test_list_returns_insertion_order() {
        let (store, _temp) = create_test_store().await;

        store.create(NewTask::new("Task 1")).await.unwrap();
        store.create(NewTask::new("Task 2")).await.unwrap();
        store.create(NewTask::new("Task 3")).await.unwrap();

        let tasks = store.list().await.unwrap();
        let ids: Vec<u64> = tasks.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_update_changes_only_supplied_fields() {
        let (store, _temp) = create_test_store().await;

        let created = store
            .create(
                NewTask::new("Buy milk")
                    .with_description("Two liters")
                    .with_priority(Priority::High),
            )
            .await
            .unwrap();

        let patch = TaskPatch {
            status: Some(Status::Completed),
            ..TaskPatch::default()
        };
        let updated = store.update(created.id, patch).await.unwrap();

        assert_eq!(updated.status, Status::Completed);
        assert_eq!(updated.task_name, created.task_name);
        assert_eq!(updated.task_description, created.task_description);
        assert_eq!(updated.priority, created.priority);
        assert_eq!(updated.created_at, created.created_at);
    }

    #[tokio::test]
    async fn test_update_nonexistent_task() {
        let (store, _temp) = create_test_store().await;

        let patch = TaskPatch {
            status: Some(Status::Completed),
            ..TaskPatch::default()
        };
        let result = store.update(9999, patch).await;

        match result.unwrap_err() {
            Error::TaskNotFound(id) => assert_eq!(id, 9999),
            e => panic!("Expected TaskNotFound error, got: {:?}", e),
        }
    }

    #[tokio::test]
    async fn test_update_empty_patch_leaves_record_untouched() {
        let (store, _temp) = create_test_store().await;

        let created = store.create(NewTask::new("Buy milk")).await.unwrap();

        let result = store.update(created.id, TaskPatch::default()).await;
        match result.unwrap_err() {
            Error::NoFieldsProvided => {}
            e => panic!("Expected NoFieldsProvided error, got: {:?}", e),
        }

        let retrieved = store.get(created.id).await.unwrap().unwrap();
        assert_eq!(retrieved, created);
    }

    #[tokio::test]
    async fn test_delete_task() {
        let (store, _temp) = create_test_store().await;

        let created = store.create(NewTask::new("Task to delete")).await.unwrap();

        let deleted = store.delete(created.id).await.unwrap();
        assert!(deleted);
        assert!(store.get(created.id).await.unwrap().is_none());

        // Delete again should report nothing removed
        let deleted_again = store.delete(created.id).await.unwrap();
        assert!(!deleted_again);
    }

    #[tokio::test]
    async fn test_find_by_status() {
        let (store, _temp) = create_test_store().await;

        store.create(NewTask::new("Pending 1")).await.unwrap();
        store.create(NewTask::new("Pending 2")).await.unwrap();
        let done = store.create(NewTask::new("Done 1")).await.unwrap();

        let patch = TaskPatch {
            status: Some(Status::Completed),
            ..TaskPatch::default()
        };
        store.update(done.id, patch).await.unwrap();

        let pending = store.find_by_status(&Status::Pending).await.unwrap();
        assert_eq!(pending.len(), 2);

        let completed = store.find_by_status(&Status::Completed).await.unwrap();
        assert_eq!(completed.len(), 1);
        assert_eq!(completed[0].id, done.id);

        // A status nothing carries matches nothing
        let other = store
            .find_by_status(&Status::from("on_hold"))
            .await
            .unwrap();
        assert!(other.is_empty());
    }

    #[tokio::test]
    async fn test_persistence_across_instances() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("tasks.json");

        let task_id;

        // Create store and add task
        {
            let store = FileTaskStore::new(&path).await.unwrap();
            let created = store
                .create(
                    NewTask::new("Persistent task")
                        .with_description("Should survive reload")
                        .with_priority(Priority::High),
                )
                .await
                .unwrap();
            task_id = created.id;
        }

        // Create new store instance and verify data persisted
        {
            let store = FileTaskStore::new(&path).await.unwrap();
            let task = store.get(task_id).await.unwrap().unwrap();
            assert_eq!(task.task_name, "Persistent task");
            assert_eq!(task.task_description, "Should survive reload");
            assert_eq!(task.priority, Priority::High);
        }
    }

    #[tokio::test]
    async fn test_ids_not_reused_after_delete_and_reload() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("tasks.json");

        {
            let store = FileTaskStore::new(&path).await.unwrap();
            store.create(NewTask::new("Task 1")).await.unwrap();
            let second = store.create(NewTask::new("Task 2")).await.unwrap();
            store.delete(second.id).await.unwrap();
        }

        {
            let store = FileTaskStore::new(&path).await.unwrap();
            let third = store.create(NewTask::new("Task 3")).await.unwrap();
            assert_eq!(third.id, 3);
        }
    }

    #[tokio::test]
    async fn test_reopening_is_idempotent() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("tasks.json");

        {
            let store = FileTaskStore::new(&path).await.unwrap();
            store.create(NewTask::new("Task 1")).await.unwrap();
        }

        // Opening twice in a row is safe and alters nothing.
        let _ = FileTaskStore::new(&path).await.unwrap();
        let store = FileTaskStore::new(&path).await.unwrap();

        let tasks = store.list().await.unwrap();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].task_name, "Task 1");
    }

    #[tokio::test]
    async fn test_open_fails_on_corrupt_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("tasks.json");
        tokio::fs::write(&path, "not json").await.unwrap();

        let result = FileTaskStore::new(&path).await;
        match result {
            Err(Error::Storage(msg)) => assert!(msg.contains("Failed to parse")),
            other => panic!("Expected Storage error, got: {:?}", other.map(|_| ())),
        }
    }
}
