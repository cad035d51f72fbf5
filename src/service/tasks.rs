use anyhow::Result;
use chrono::{DateTime, Duration, Utc};
use log::{debug, error, info};
use sea_orm::{ActiveValue, TransactionTrait};
use serde::Serialize;
use uuid::Uuid;

use crate::constants::{
    LOG_SUCCESSOR_FAILED, LOG_SUCCESSOR_SPAWNED, LOG_TASK_CREATED, LOG_TASK_DELETED, LOG_TASK_TOGGLED,
    LOG_TASK_UPDATED,
};
use crate::entities::task;
use crate::error::{TaskError, TaskResult};
use crate::models::{TaskCreate, TaskResponse, TaskUpdate};
use crate::query::{RawTaskQuery, TaskQuery};
use crate::recurrence::{self, RecurrenceOutcome, RecurrencePlan};
use crate::repositories::{TaskRepository, TaskTagRepository};
use crate::service::TaskService;
use crate::utils::datetime::next_update_timestamp;

/// Result of [`TaskService::toggle_completion`]
#[derive(Debug, Clone, Serialize)]
pub struct CompletionToggle {
    /// The toggled task, as committed
    pub task: TaskResponse,
    /// What the recurrence side effect did
    pub recurrence: RecurrenceOutcome,
}

impl TaskService {
    /// Creates a task owned by `owner_id`, together with its initial tags.
    ///
    /// Tag ids the owner does not own are dropped silently.
    ///
    /// # Errors
    /// `Validation` for out-of-range lengths, unknown enum values or
    /// unparsable dates; `Storage` if the database write fails.
    pub async fn create_task(&self, owner_id: Uuid, create: TaskCreate) -> TaskResult<TaskResponse> {
        let valid = create.validate()?;
        let now = Utc::now();

        let txn = self.storage.conn.begin().await?;

        let model = task::ActiveModel {
            id: ActiveValue::Set(Uuid::new_v4()),
            title: ActiveValue::Set(valid.title),
            description: ActiveValue::Set(valid.description),
            completed: ActiveValue::Set(valid.completed),
            priority: ActiveValue::Set(valid.priority),
            due_date: ActiveValue::Set(valid.due_date),
            recurrence_pattern: ActiveValue::Set(valid.recurrence_pattern),
            recurrence_end_date: ActiveValue::Set(valid.recurrence_end_date),
            owner_id: ActiveValue::Set(owner_id),
            created_at: ActiveValue::Set(now),
            updated_at: ActiveValue::Set(now),
        };
        let task = TaskRepository::create(&txn, model).await?;

        if !create.tag_ids.is_empty() {
            TaskTagRepository::replace_associations(&txn, &task.id, &owner_id, &create.tag_ids).await?;
        }

        let response = Self::to_response(&txn, task).await?;
        txn.commit().await?;

        info!("{}: {} for owner {}", LOG_TASK_CREATED, response.id, owner_id);
        Ok(response)
    }

    /// Lists the owner's tasks matching `query`, each with its tags.
    pub async fn list_tasks(&self, owner_id: Uuid, query: &TaskQuery) -> TaskResult<Vec<TaskResponse>> {
        let conn = &self.storage.conn;
        let tasks = TaskRepository::query(conn, &owner_id, query).await?;
        debug!("Query {:?} matched {} task(s) for owner {}", query, tasks.len(), owner_id);
        Ok(Self::to_responses(conn, tasks).await?)
    }

    /// Lists tasks from raw caller parameters.
    ///
    /// # Errors
    /// `Validation` when a date bound cannot be parsed.
    pub async fn list_tasks_raw(&self, owner_id: Uuid, raw: &RawTaskQuery) -> TaskResult<Vec<TaskResponse>> {
        let query = TaskQuery::from_raw(raw)?;
        self.list_tasks(owner_id, &query).await
    }

    /// Fetches a single task.
    ///
    /// # Errors
    /// `NotFound` if the task does not exist or belongs to someone else.
    pub async fn get_task(&self, owner_id: Uuid, task_id: Uuid) -> TaskResult<TaskResponse> {
        let conn = &self.storage.conn;
        let task = TaskRepository::get_owned(conn, &owner_id, &task_id)
            .await?
            .ok_or_else(TaskError::task_not_found)?;
        Ok(Self::to_response(conn, task).await?)
    }

    /// Applies the fields present in `update`; absent fields are kept.
    ///
    /// `updated_at` is refreshed even when nothing else changes. When
    /// `tag_ids` is present the task's tags are replaced in the same
    /// transaction as the field update. Changing `completed` here does not
    /// trigger recurrence; use [`TaskService::toggle_completion`] for that.
    pub async fn update_task(&self, owner_id: Uuid, task_id: Uuid, update: TaskUpdate) -> TaskResult<TaskResponse> {
        let update = update.validate()?;

        let txn = self.storage.conn.begin().await?;

        let existing = TaskRepository::get_owned(&txn, &owner_id, &task_id)
            .await?
            .ok_or_else(TaskError::task_not_found)?;

        let updated_at = next_update_timestamp(existing.updated_at, Utc::now());
        let mut active: task::ActiveModel = existing.into();

        if let Some(title) = update.title {
            active.title = ActiveValue::Set(title);
        }
        if let Some(description) = update.description {
            active.description = ActiveValue::Set(description);
        }
        if let Some(completed) = update.completed {
            active.completed = ActiveValue::Set(completed);
        }
        if let Some(priority) = update.priority {
            active.priority = ActiveValue::Set(priority);
        }
        if let Some(due_date) = update.due_date {
            active.due_date = ActiveValue::Set(due_date);
        }
        if let Some(pattern) = update.recurrence_pattern {
            active.recurrence_pattern = ActiveValue::Set(pattern);
        }
        if let Some(end_date) = update.recurrence_end_date {
            active.recurrence_end_date = ActiveValue::Set(end_date);
        }
        active.updated_at = ActiveValue::Set(updated_at);

        let task = TaskRepository::update(&txn, active).await?;

        if let Some(tag_ids) = &update.tag_ids {
            TaskTagRepository::replace_associations(&txn, &task.id, &owner_id, tag_ids).await?;
        }

        let response = Self::to_response(&txn, task).await?;
        txn.commit().await?;

        info!("{}: {}", LOG_TASK_UPDATED, task_id);
        Ok(response)
    }

    /// Deletes a task and its tag links. Returns `false` if there was nothing
    /// the owner could delete.
    pub async fn delete_task(&self, owner_id: Uuid, task_id: Uuid) -> TaskResult<bool> {
        let txn = self.storage.conn.begin().await?;

        if TaskRepository::get_owned(&txn, &owner_id, &task_id).await?.is_none() {
            return Ok(false);
        }

        TaskTagRepository::delete_for_task(&txn, &task_id).await?;
        let deleted = TaskRepository::delete_owned(&txn, &owner_id, &task_id).await?;
        txn.commit().await?;

        if deleted {
            info!("{}: {}", LOG_TASK_DELETED, task_id);
        }
        Ok(deleted)
    }

    /// Flips a task's completion flag.
    ///
    /// Completing (false to true) a recurring task then tries to create its
    /// next occurrence. The flip is committed first and stays committed
    /// whatever happens to the successor; a failed insert is logged and
    /// reported as [`RecurrenceOutcome::Failed`].
    ///
    /// # Errors
    /// `NotFound` for tasks the owner cannot see; `Conflict` if the flag was
    /// changed concurrently between read and write.
    pub async fn toggle_completion(&self, owner_id: Uuid, task_id: Uuid) -> TaskResult<CompletionToggle> {
        let conn = &self.storage.conn;

        let existing = TaskRepository::get_owned(conn, &owner_id, &task_id)
            .await?
            .ok_or_else(TaskError::task_not_found)?;

        // Everything the response needs is read before the write
        let tags = TaskTagRepository::get_tags_for_task(conn, &task_id).await?;

        let now = Utc::now();
        let was_completed = existing.completed;
        let updated_at = next_update_timestamp(existing.updated_at, now);

        if !TaskRepository::set_completed_if(conn, &owner_id, &task_id, was_completed, updated_at).await? {
            return Err(TaskError::Conflict(format!(
                "task {} was modified while toggling completion",
                task_id
            )));
        }

        let toggled = task::Model {
            completed: !was_completed,
            updated_at,
            ..existing
        };
        info!("{}: {} (completed = {})", LOG_TASK_TOGGLED, task_id, toggled.completed);

        let recurrence = if was_completed {
            RecurrenceOutcome::NotTriggered
        } else {
            self.spawn_successor(&toggled, now).await
        };

        Ok(CompletionToggle {
            task: TaskResponse::from_model(toggled, tags),
            recurrence,
        })
    }

    /// Pending tasks due within `within` from now (overdue ones included),
    /// soonest first.
    ///
    /// # Errors
    /// `Validation` when now plus `within` is not a representable timestamp.
    pub async fn upcoming(&self, owner_id: Uuid, within: Duration) -> TaskResult<Vec<TaskResponse>> {
        let conn = &self.storage.conn;
        let until = Utc::now()
            .checked_add_signed(within)
            .ok_or_else(|| TaskError::Validation(format!("upcoming window of {} is out of range", within)))?;
        let tasks = TaskRepository::get_upcoming(conn, &owner_id, until).await?;
        Ok(Self::to_responses(conn, tasks).await?)
    }

    /// [`TaskService::upcoming`] over the configured default window.
    pub async fn upcoming_default(&self, owner_id: Uuid) -> TaskResult<Vec<TaskResponse>> {
        self.upcoming(owner_id, Duration::hours(self.config.upcoming_hours)).await
    }

    /// Run the recurrence step for a task that has just been completed.
    async fn spawn_successor(&self, completed: &task::Model, now: DateTime<Utc>) -> RecurrenceOutcome {
        match recurrence::plan_successor(completed, now) {
            RecurrencePlan::NotRecurring => RecurrenceOutcome::NotTriggered,
            RecurrencePlan::Skip(reason) => {
                debug!("No successor for task {}: {:?}", completed.id, reason);
                RecurrenceOutcome::Skipped(reason)
            }
            RecurrencePlan::Spawn { due_date } => match self.insert_successor(completed, due_date, now).await {
                Ok(model) => {
                    // Successors start without tags
                    let successor = TaskResponse::from_model(model, Vec::new());
                    info!(
                        "{}: {} -> {} due {}",
                        LOG_SUCCESSOR_SPAWNED, completed.id, successor.id, due_date
                    );
                    RecurrenceOutcome::Spawned(Box::new(successor))
                }
                Err(e) => {
                    error!("{} for task {}: {:#}", LOG_SUCCESSOR_FAILED, completed.id, e);
                    RecurrenceOutcome::Failed(e.to_string())
                }
            },
        }
    }

    async fn insert_successor(
        &self,
        completed: &task::Model,
        due_date: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<task::Model> {
        TaskRepository::create(&self.storage.conn, recurrence::successor_model(completed, due_date, now)).await
    }
}
