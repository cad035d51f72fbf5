#![allow(dead_code)]

use std::sync::Arc;

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, EntityTrait};
use tasklane::config::TasksConfig;
use tasklane::entities::task;
use tasklane::models::{TagCreate, TaskCreate, TaskResponse};
use tasklane::storage::LocalStorage;
use tasklane::TaskService;
use uuid::Uuid;

/// Service over a fresh in-memory database
pub async fn service() -> TaskService {
    let storage = LocalStorage::in_memory().await.expect("in-memory storage");
    TaskService::new(Arc::new(storage), TasksConfig::default())
}

pub async fn create(service: &TaskService, owner: Uuid, title: &str) -> TaskResponse {
    service
        .create_task(owner, TaskCreate::new(title))
        .await
        .expect("task should be created")
}

pub async fn create_tag(service: &TaskService, owner: Uuid, name: &str) -> Uuid {
    service
        .create_tag(owner, TagCreate { name: name.to_string() })
        .await
        .expect("tag should be created")
        .id
}

/// Backdate a task's creation time directly in storage
pub async fn set_created_at(service: &TaskService, task_id: Uuid, at: DateTime<Utc>) {
    task::Entity::update(task::ActiveModel {
        id: ActiveValue::Unchanged(task_id),
        created_at: ActiveValue::Set(at),
        ..Default::default()
    })
    .exec(&service.storage().conn)
    .await
    .expect("created_at should be updated");
}

pub async fn count_tasks(service: &TaskService, owner: Uuid) -> usize {
    service
        .list_tasks(owner, &Default::default())
        .await
        .expect("list should succeed")
        .len()
}

pub fn titles(tasks: &[TaskResponse]) -> Vec<&str> {
    tasks.iter().map(|t| t.title.as_str()).collect()
}
