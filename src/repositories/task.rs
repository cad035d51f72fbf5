//! Task repository for database operations.

use anyhow::Result;
use chrono::{DateTime, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::{ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder};
use uuid::Uuid;

use crate::entities::task;
use crate::query::TaskQuery;

/// Repository for task-related database operations.
///
/// A task owned by someone else is indistinguishable from a missing one.
pub struct TaskRepository;

impl TaskRepository {
    /// Get a single task by id, only if `owner_id` owns it.
    pub async fn get_owned<C>(conn: &C, owner_id: &Uuid, id: &Uuid) -> Result<Option<task::Model>>
    where
        C: ConnectionTrait,
    {
        Ok(task::Entity::find_by_id(*id)
            .filter(task::Column::OwnerId.eq(*owner_id))
            .one(conn)
            .await?)
    }

    /// Run a filtered, sorted query over an owner's tasks.
    pub async fn query<C>(conn: &C, owner_id: &Uuid, query: &TaskQuery) -> Result<Vec<task::Model>>
    where
        C: ConnectionTrait,
    {
        Ok(query.to_select(*owner_id).all(conn).await?)
    }

    /// Pending tasks with a due date no later than `until`, soonest first.
    pub async fn get_upcoming<C>(conn: &C, owner_id: &Uuid, until: DateTime<Utc>) -> Result<Vec<task::Model>>
    where
        C: ConnectionTrait,
    {
        Ok(task::Entity::find()
            .filter(task::Column::OwnerId.eq(*owner_id))
            .filter(task::Column::Completed.eq(false))
            .filter(task::Column::DueDate.is_not_null())
            .filter(task::Column::DueDate.lte(until))
            .order_by_asc(task::Column::DueDate)
            .order_by_asc(task::Column::Id)
            .all(conn)
            .await?)
    }

    /// Insert a new task.
    pub async fn create<C>(conn: &C, task: task::ActiveModel) -> Result<task::Model>
    where
        C: ConnectionTrait,
    {
        Ok(task.insert(conn).await?)
    }

    /// Update a task in the database.
    pub async fn update<C>(conn: &C, task: task::ActiveModel) -> Result<task::Model>
    where
        C: ConnectionTrait,
    {
        Ok(task.update(conn).await?)
    }

    /// Set the completion flag only if it still equals `expected`.
    ///
    /// Returns `false` when no row matched: the task is gone, not owned by
    /// `owner_id`, or its flag was flipped by someone else in the meantime.
    pub async fn set_completed_if<C>(
        conn: &C,
        owner_id: &Uuid,
        id: &Uuid,
        expected: bool,
        updated_at: DateTime<Utc>,
    ) -> Result<bool>
    where
        C: ConnectionTrait,
    {
        let result = task::Entity::update_many()
            .col_expr(task::Column::Completed, Expr::value(!expected))
            .col_expr(task::Column::UpdatedAt, Expr::value(updated_at))
            .filter(task::Column::Id.eq(*id))
            .filter(task::Column::OwnerId.eq(*owner_id))
            .filter(task::Column::Completed.eq(expected))
            .exec(conn)
            .await?;

        Ok(result.rows_affected > 0)
    }

    /// Delete a task owned by `owner_id`. Returns whether a row was removed.
    pub async fn delete_owned<C>(conn: &C, owner_id: &Uuid, id: &Uuid) -> Result<bool>
    where
        C: ConnectionTrait,
    {
        let result = task::Entity::delete_many()
            .filter(task::Column::Id.eq(*id))
            .filter(task::Column::OwnerId.eq(*owner_id))
            .exec(conn)
            .await?;

        Ok(result.rows_affected > 0)
    }
}
