use chrono::Utc;
use log::{debug, info};
use sea_orm::{ActiveValue, TransactionTrait};
use uuid::Uuid;

use crate::constants::{LOG_TAGS_REPLACED, LOG_TAG_CREATED, LOG_TAG_DELETED, LOG_TAG_REUSED};
use crate::entities::{tag, task};
use crate::error::{TaskError, TaskResult};
use crate::models::{validate_tag_name, TagCreate, TagResponse, TagUpdate};
use crate::repositories::{TagRepository, TaskRepository, TaskTagRepository};
use crate::service::TaskService;
use crate::utils::datetime::next_update_timestamp;

impl TaskService {
    /// Creates a tag, or returns the owner's existing tag with the same name.
    pub async fn create_tag(&self, owner_id: Uuid, create: TagCreate) -> TaskResult<TagResponse> {
        validate_tag_name(&create.name)?;
        let conn = &self.storage.conn;

        if let Some(existing) = TagRepository::get_by_name(conn, &owner_id, &create.name).await? {
            debug!("{} '{}' ({})", LOG_TAG_REUSED, existing.name, existing.id);
            return Ok(existing.into());
        }

        let now = Utc::now();
        let model = tag::ActiveModel {
            id: ActiveValue::Set(Uuid::new_v4()),
            name: ActiveValue::Set(create.name),
            owner_id: ActiveValue::Set(owner_id),
            created_at: ActiveValue::Set(now),
            updated_at: ActiveValue::Set(now),
        };
        let tag = TagRepository::create(conn, model).await?;

        info!("{}: '{}' ({})", LOG_TAG_CREATED, tag.name, tag.id);
        Ok(tag.into())
    }

    /// Lists the owner's tags by name.
    pub async fn list_tags(&self, owner_id: Uuid) -> TaskResult<Vec<TagResponse>> {
        let tags = TagRepository::get_all_for_owner(&self.storage.conn, &owner_id).await?;
        Ok(tags.into_iter().map(TagResponse::from).collect())
    }

    pub async fn get_tag(&self, owner_id: Uuid, tag_id: Uuid) -> TaskResult<TagResponse> {
        TagRepository::get_owned(&self.storage.conn, &owner_id, &tag_id)
            .await?
            .map(TagResponse::from)
            .ok_or_else(TaskError::tag_not_found)
    }

    /// Renames a tag when a name is given; `updated_at` is refreshed either way.
    pub async fn update_tag(&self, owner_id: Uuid, tag_id: Uuid, update: TagUpdate) -> TaskResult<TagResponse> {
        if let Some(name) = &update.name {
            validate_tag_name(name)?;
        }
        let conn = &self.storage.conn;

        let existing = TagRepository::get_owned(conn, &owner_id, &tag_id)
            .await?
            .ok_or_else(TaskError::tag_not_found)?;

        let updated_at = next_update_timestamp(existing.updated_at, Utc::now());
        let mut active: tag::ActiveModel = existing.into();
        if let Some(name) = update.name {
            active.name = ActiveValue::Set(name);
        }
        active.updated_at = ActiveValue::Set(updated_at);

        Ok(TagRepository::update(conn, active).await?.into())
    }

    /// Deletes a tag and detaches it from every task.
    pub async fn delete_tag(&self, owner_id: Uuid, tag_id: Uuid) -> TaskResult<bool> {
        let txn = self.storage.conn.begin().await?;

        if TagRepository::get_owned(&txn, &owner_id, &tag_id).await?.is_none() {
            return Ok(false);
        }

        let detached = TaskTagRepository::delete_for_tag(&txn, &tag_id).await?;
        let deleted = TagRepository::delete_owned(&txn, &owner_id, &tag_id).await?;
        txn.commit().await?;

        info!("{}: {} (detached from {} task(s))", LOG_TAG_DELETED, tag_id, detached);
        Ok(deleted)
    }

    /// Replaces the tags of one of the owner's tasks and returns the tags now attached.
    ///
    /// Unknown or foreign tag ids are ignored.
    pub async fn replace_task_tags(&self, owner_id: Uuid, task_id: Uuid, tag_ids: &[Uuid]) -> TaskResult<Vec<TagResponse>> {
        let txn = self.storage.conn.begin().await?;

        let existing = TaskRepository::get_owned(&txn, &owner_id, &task_id)
            .await?
            .ok_or_else(TaskError::task_not_found)?;

        let updated_at = next_update_timestamp(existing.updated_at, Utc::now());
        let mut active: task::ActiveModel = existing.into();
        active.updated_at = ActiveValue::Set(updated_at);
        TaskRepository::update(&txn, active).await?;

        let tags = TaskTagRepository::replace_associations(&txn, &task_id, &owner_id, tag_ids).await?;
        txn.commit().await?;

        info!("{}: {} -> {} tag(s)", LOG_TAGS_REPLACED, task_id, tags.len());
        Ok(tags.into_iter().map(TagResponse::from).collect())
    }
}
