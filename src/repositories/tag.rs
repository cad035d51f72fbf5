//! Tag repository for database operations.

use anyhow::Result;
use sea_orm::{ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder};
use uuid::Uuid;

use crate::entities::tag;

/// Repository for tag-related database operations.
pub struct TagRepository;

impl TagRepository {
    /// Get a single tag by id, only if `owner_id` owns it.
    pub async fn get_owned<C>(conn: &C, owner_id: &Uuid, id: &Uuid) -> Result<Option<tag::Model>>
    where
        C: ConnectionTrait,
    {
        Ok(tag::Entity::find_by_id(*id)
            .filter(tag::Column::OwnerId.eq(*owner_id))
            .one(conn)
            .await?)
    }

    /// Of the given ids, the tags that exist and belong to `owner_id`.
    pub async fn get_owned_many<C>(conn: &C, owner_id: &Uuid, ids: &[Uuid]) -> Result<Vec<tag::Model>>
    where
        C: ConnectionTrait,
    {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        Ok(tag::Entity::find()
            .filter(tag::Column::Id.is_in(ids.iter().copied()))
            .filter(tag::Column::OwnerId.eq(*owner_id))
            .order_by_asc(tag::Column::Name)
            .all(conn)
            .await?)
    }

    /// Get all of an owner's tags ordered by name.
    pub async fn get_all_for_owner<C>(conn: &C, owner_id: &Uuid) -> Result<Vec<tag::Model>>
    where
        C: ConnectionTrait,
    {
        Ok(tag::Entity::find()
            .filter(tag::Column::OwnerId.eq(*owner_id))
            .order_by_asc(tag::Column::Name)
            .order_by_asc(tag::Column::Id)
            .all(conn)
            .await?)
    }

    /// Get an owner's tag by exact name; the oldest one if several share it.
    pub async fn get_by_name<C>(conn: &C, owner_id: &Uuid, name: &str) -> Result<Option<tag::Model>>
    where
        C: ConnectionTrait,
    {
        Ok(tag::Entity::find()
            .filter(tag::Column::OwnerId.eq(*owner_id))
            .filter(tag::Column::Name.eq(name))
            .order_by_asc(tag::Column::CreatedAt)
            .one(conn)
            .await?)
    }

    /// Insert a new tag.
    pub async fn create<C>(conn: &C, tag: tag::ActiveModel) -> Result<tag::Model>
    where
        C: ConnectionTrait,
    {
        Ok(tag.insert(conn).await?)
    }

    /// Update a tag in the database.
    pub async fn update<C>(conn: &C, tag: tag::ActiveModel) -> Result<tag::Model>
    where
        C: ConnectionTrait,
    {
        Ok(tag.update(conn).await?)
    }

    /// Delete a tag owned by `owner_id`. Returns whether a row was removed.
    pub async fn delete_owned<C>(conn: &C, owner_id: &Uuid, id: &Uuid) -> Result<bool>
    where
        C: ConnectionTrait,
    {
        let result = tag::Entity::delete_many()
            .filter(tag::Column::Id.eq(*id))
            .filter(tag::Column::OwnerId.eq(*owner_id))
            .exec(conn)
            .await?;

        Ok(result.rows_affected > 0)
    }
}
