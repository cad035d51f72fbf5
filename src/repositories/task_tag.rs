//! Task-tag association repository.
//!
//! Associations are only ever replaced wholesale: delete every link for the
//! task, then insert the new set. Both steps run in one transaction (a
//! savepoint when the caller already holds one), so readers never see a task
//! whose tags are half replaced.

use anyhow::Result;
use log::debug;
use sea_orm::{
    ActiveValue, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, TransactionTrait,
};
use uuid::Uuid;

use crate::entities::{tag, task_tag};
use crate::repositories::TagRepository;

/// Repository for the many-to-many link between tasks and tags.
pub struct TaskTagRepository;

impl TaskTagRepository {
    /// Replace all tags of `task_id` with the subset of `tag_ids` owned by `owner_id`.
    ///
    /// Ids that do not exist or belong to another owner are dropped silently.
    /// Returns the tags that ended up attached.
    pub async fn replace_associations<C>(
        conn: &C,
        task_id: &Uuid,
        owner_id: &Uuid,
        tag_ids: &[Uuid],
    ) -> Result<Vec<tag::Model>>
    where
        C: ConnectionTrait + TransactionTrait,
    {
        let txn = conn.begin().await?;

        let tags = TagRepository::get_owned_many(&txn, owner_id, tag_ids).await?;

        task_tag::Entity::delete_many()
            .filter(task_tag::Column::TaskId.eq(*task_id))
            .exec(&txn)
            .await?;

        if !tags.is_empty() {
            let links = tags.iter().map(|tag| task_tag::ActiveModel {
                task_id: ActiveValue::Set(*task_id),
                tag_id: ActiveValue::Set(tag.id),
            });
            task_tag::Entity::insert_many(links).exec_without_returning(&txn).await?;
        }

        txn.commit().await?;

        debug!(
            "Task {} now has {} tag(s) ({} requested)",
            task_id,
            tags.len(),
            tag_ids.len()
        );
        Ok(tags)
    }

    /// Tags attached to a task, ordered by name.
    pub async fn get_tags_for_task<C>(conn: &C, task_id: &Uuid) -> Result<Vec<tag::Model>>
    where
        C: ConnectionTrait,
    {
        Ok(tag::Entity::find()
            .inner_join(task_tag::Entity)
            .filter(task_tag::Column::TaskId.eq(*task_id))
            .order_by_asc(tag::Column::Name)
            .order_by_asc(tag::Column::Id)
            .all(conn)
            .await?)
    }

    /// Remove every association of a task.
    pub async fn delete_for_task<C>(conn: &C, task_id: &Uuid) -> Result<u64>
    where
        C: ConnectionTrait,
    {
        let result = task_tag::Entity::delete_many()
            .filter(task_tag::Column::TaskId.eq(*task_id))
            .exec(conn)
            .await?;
        Ok(result.rows_affected)
    }

    /// Remove every association of a tag.
    pub async fn delete_for_tag<C>(conn: &C, tag_id: &Uuid) -> Result<u64>
    where
        C: ConnectionTrait,
    {
        let result = task_tag::Entity::delete_many()
            .filter(task_tag::Column::TagId.eq(*tag_id))
            .exec(conn)
            .await?;
        Ok(result.rows_affected)
    }
}
