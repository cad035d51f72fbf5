//! Task service: the entry point callers use for tasks and tags.
//!
//! [`TaskService`] composes the repositories into the owner-scoped operations
//! an outer layer (HTTP handlers, a CLI) calls. The owner id is taken as given;
//! authenticating it is the caller's job.
//!
//! - [`tasks`] - task CRUD, listing, completion and the upcoming view
//! - [`tags`] - tag CRUD and tag replacement on a task

pub mod tags;
pub mod tasks;

use anyhow::Result;
use sea_orm::ConnectionTrait;
use std::sync::Arc;

use crate::config::{Config, TasksConfig};
use crate::entities::task;
use crate::models::TaskResponse;
use crate::repositories::TaskTagRepository;
use crate::storage::LocalStorage;

pub use tasks::CompletionToggle;

/// Owner-scoped task and tag operations over local storage.
///
/// Cloning is cheap; clones share the same connection pool. The service holds
/// no other state between calls.
///
/// # Example
/// ```rust,no_run
/// use std::sync::Arc;
/// use tasklane::config::TasksConfig;
/// use tasklane::models::TaskCreate;
/// use tasklane::service::TaskService;
/// use tasklane::storage::LocalStorage;
///
/// # async fn example() -> anyhow::Result<()> {
/// let storage = Arc::new(LocalStorage::in_memory().await?);
/// let service = TaskService::new(storage, TasksConfig::default());
///
/// let owner = uuid::Uuid::new_v4();
/// let task = service.create_task(owner, TaskCreate::new("Pay rent").priority("high")).await?;
/// let toggled = service.toggle_completion(owner, task.id).await?;
/// assert!(toggled.task.completed);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct TaskService {
    storage: Arc<LocalStorage>,
    config: TasksConfig,
}

impl TaskService {
    pub fn new(storage: Arc<LocalStorage>, config: TasksConfig) -> Self {
        Self { storage, config }
    }

    /// Open the configured database and build a service on top of it.
    pub async fn open(config: &Config) -> Result<Self> {
        config.validate()?;
        let storage = LocalStorage::new(&config.database).await?;
        Ok(Self::new(Arc::new(storage), config.tasks.clone()))
    }

    pub fn storage(&self) -> &LocalStorage {
        &self.storage
    }

    /// Attach a task's tags to form the response record.
    async fn to_response<C>(conn: &C, task: task::Model) -> Result<TaskResponse>
    where
        C: ConnectionTrait,
    {
        let tags = TaskTagRepository::get_tags_for_task(conn, &task.id).await?;
        Ok(TaskResponse::from_model(task, tags))
    }

    /// Enrich tasks one by one; task order is kept as given.
    async fn to_responses<C>(conn: &C, tasks: Vec<task::Model>) -> Result<Vec<TaskResponse>>
    where
        C: ConnectionTrait,
    {
        let mut responses = Vec::with_capacity(tasks.len());
        for task in tasks {
            responses.push(Self::to_response(conn, task).await?);
        }
        Ok(responses)
    }
}
