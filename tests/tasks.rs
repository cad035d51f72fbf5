mod common;

use chrono::{TimeZone, Utc};
use tasklane::entities::task::{Priority, RecurrencePattern};
use tasklane::models::{TaskCreate, TaskUpdate};
use tasklane::TaskError;
use uuid::Uuid;

use common::{create, create_tag, service};

#[tokio::test]
async fn test_create_task_defaults() {
    let service = service().await;
    let owner = Uuid::new_v4();

    let task = create(&service, owner, "Buy milk").await;

    assert_eq!(task.title, "Buy milk");
    assert_eq!(task.description, None);
    assert!(!task.completed);
    assert_eq!(task.priority, Priority::Medium);
    assert_eq!(task.due_date, None);
    assert_eq!(task.recurrence_pattern, None);
    assert_eq!(task.owner_id, owner);
    assert_eq!(task.created_at, task.updated_at);
    assert!(task.tags.is_empty());
}

#[tokio::test]
async fn test_create_task_assigns_unique_ids() {
    let service = service().await;
    let owner = Uuid::new_v4();

    let a = create(&service, owner, "One").await;
    let b = create(&service, owner, "One").await;
    assert_ne!(a.id, b.id);
}

#[tokio::test]
async fn test_create_task_with_all_fields() {
    let service = service().await;
    let owner = Uuid::new_v4();
    let work = create_tag(&service, owner, "work").await;

    let task = service
        .create_task(
            owner,
            TaskCreate::new("Pay rent")
                .description("Transfer to landlord")
                .priority("HIGH")
                .due_date("2024-01-01")
                .recurrence("monthly", Some("2024-12-31T23:59:59Z"))
                .tags(&[work]),
        )
        .await
        .unwrap();

    assert_eq!(task.priority, Priority::High);
    assert_eq!(task.due_date, Some(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()));
    assert_eq!(task.recurrence_pattern, Some(RecurrencePattern::Monthly));
    assert_eq!(
        task.recurrence_end_date,
        Some(Utc.with_ymd_and_hms(2024, 12, 31, 23, 59, 59).unwrap())
    );
    assert_eq!(task.tags.len(), 1);
    assert_eq!(task.tags[0].name, "work");
}

#[tokio::test]
async fn test_create_task_validation() {
    let service = service().await;
    let owner = Uuid::new_v4();

    let cases = vec![
        TaskCreate::new(""),
        TaskCreate::new("x".repeat(256)),
        TaskCreate::new("ok").description("d".repeat(1001)),
        TaskCreate::new("ok").priority("urgent"),
        TaskCreate::new("ok").due_date("tomorrow-ish"),
        TaskCreate::new("ok").recurrence("yearly", None),
        TaskCreate::new("ok").recurrence("daily", Some("31/12/2024")),
    ];

    for case in cases {
        let result = service.create_task(owner, case.clone()).await;
        assert!(
            matches!(result, Err(TaskError::Validation(_))),
            "expected validation error for {:?}",
            case
        );
    }

    // Boundaries are inclusive
    assert!(service.create_task(owner, TaskCreate::new("x".repeat(255))).await.is_ok());
    assert!(service
        .create_task(owner, TaskCreate::new("ok").description("d".repeat(1000)))
        .await
        .is_ok());
    assert_eq!(common::count_tasks(&service, owner).await, 2);
}

#[tokio::test]
async fn test_other_owner_cannot_see_or_touch_task() {
    let service = service().await;
    let alice = Uuid::new_v4();
    let bob = Uuid::new_v4();

    let task = create(&service, alice, "Alice's task").await;

    assert!(matches!(service.get_task(bob, task.id).await, Err(TaskError::NotFound(_))));
    assert!(matches!(
        service.update_task(bob, task.id, TaskUpdate::default()).await,
        Err(TaskError::NotFound(_))
    ));
    assert!(matches!(service.toggle_completion(bob, task.id).await, Err(TaskError::NotFound(_))));
    assert!(!service.delete_task(bob, task.id).await.unwrap());
    assert!(service.list_tasks(bob, &Default::default()).await.unwrap().is_empty());
    assert!(service.upcoming(bob, chrono::Duration::days(365 * 100)).await.unwrap().is_empty());

    // Still intact for the owner
    let fetched = service.get_task(alice, task.id).await.unwrap();
    assert_eq!(fetched, task);
}

#[tokio::test]
async fn test_missing_and_foreign_tasks_look_the_same() {
    let service = service().await;
    let alice = Uuid::new_v4();
    let bob = Uuid::new_v4();
    let task = create(&service, alice, "Secret").await;

    let foreign = service.get_task(bob, task.id).await.unwrap_err();
    let missing = service.get_task(bob, Uuid::new_v4()).await.unwrap_err();
    assert_eq!(foreign.to_string(), missing.to_string());
    assert!(foreign.is_recoverable());
    assert!(!TaskError::Storage(anyhow::anyhow!("disk full")).is_recoverable());
}

#[tokio::test]
async fn test_empty_update_only_refreshes_updated_at() {
    let service = service().await;
    let owner = Uuid::new_v4();
    let task = service
        .create_task(owner, TaskCreate::new("Stable").description("keep").priority("low"))
        .await
        .unwrap();

    let updated = service.update_task(owner, task.id, TaskUpdate::default()).await.unwrap();

    assert!(updated.updated_at > task.updated_at);
    assert_eq!(updated.title, task.title);
    assert_eq!(updated.description, task.description);
    assert_eq!(updated.priority, task.priority);
    assert_eq!(updated.completed, task.completed);
    assert_eq!(updated.created_at, task.created_at);

    let again = service.update_task(owner, task.id, TaskUpdate::default()).await.unwrap();
    assert!(again.updated_at > updated.updated_at);
}

#[tokio::test]
async fn test_partial_update_keeps_absent_fields() {
    let service = service().await;
    let owner = Uuid::new_v4();
    let task = service
        .create_task(
            owner,
            TaskCreate::new("Draft")
                .description("first pass")
                .due_date("2024-05-01")
                .priority("high"),
        )
        .await
        .unwrap();

    let update = TaskUpdate {
        title: Some("Final".to_string()),
        ..Default::default()
    };
    let updated = service.update_task(owner, task.id, update).await.unwrap();

    assert_eq!(updated.title, "Final");
    assert_eq!(updated.description.as_deref(), Some("first pass"));
    assert_eq!(updated.priority, Priority::High);
    assert_eq!(updated.due_date, task.due_date);
}

#[tokio::test]
async fn test_update_explicit_null_clears_field() {
    let service = service().await;
    let owner = Uuid::new_v4();
    let task = service
        .create_task(owner, TaskCreate::new("Clear me").description("old").due_date("2024-05-01"))
        .await
        .unwrap();

    let update: TaskUpdate = serde_json::from_str(r#"{"description": null, "priority": "low"}"#).unwrap();
    let updated = service.update_task(owner, task.id, update).await.unwrap();

    assert_eq!(updated.description, None);
    assert_eq!(updated.priority, Priority::Low);
    // Absent in the payload, so untouched
    assert_eq!(updated.due_date, task.due_date);
}

#[tokio::test]
async fn test_update_validation_leaves_task_unchanged() {
    let service = service().await;
    let owner = Uuid::new_v4();
    let task = create(&service, owner, "Valid").await;

    let update = TaskUpdate {
        title: Some(String::new()),
        ..Default::default()
    };
    assert!(matches!(
        service.update_task(owner, task.id, update).await,
        Err(TaskError::Validation(_))
    ));

    let update = TaskUpdate {
        due_date: Some(Some("not a date".to_string())),
        ..Default::default()
    };
    assert!(matches!(
        service.update_task(owner, task.id, update).await,
        Err(TaskError::Validation(_))
    ));

    assert_eq!(service.get_task(owner, task.id).await.unwrap(), task);
}

#[tokio::test]
async fn test_update_replaces_tags() {
    let service = service().await;
    let owner = Uuid::new_v4();
    let home = create_tag(&service, owner, "home").await;
    let work = create_tag(&service, owner, "work").await;

    let task = service
        .create_task(owner, TaskCreate::new("Tagged").tags(&[home]))
        .await
        .unwrap();
    assert_eq!(task.tags.len(), 1);

    let update = TaskUpdate {
        tag_ids: Some(vec![work]),
        ..Default::default()
    };
    let updated = service.update_task(owner, task.id, update).await.unwrap();
    let names: Vec<_> = updated.tags.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, vec!["work"]);

    // Absent tag_ids leaves the set alone
    let untouched = service.update_task(owner, task.id, TaskUpdate::default()).await.unwrap();
    assert_eq!(untouched.tags, updated.tags);

    // Empty set clears
    let update = TaskUpdate {
        tag_ids: Some(Vec::new()),
        ..Default::default()
    };
    let cleared = service.update_task(owner, task.id, update).await.unwrap();
    assert!(cleared.tags.is_empty());
}

#[tokio::test]
async fn test_delete_task() {
    let service = service().await;
    let owner = Uuid::new_v4();
    let tag = create_tag(&service, owner, "errand").await;
    let task = service
        .create_task(owner, TaskCreate::new("Gone soon").tags(&[tag]))
        .await
        .unwrap();

    assert!(service.delete_task(owner, task.id).await.unwrap());
    assert!(matches!(service.get_task(owner, task.id).await, Err(TaskError::NotFound(_))));
    assert!(!service.delete_task(owner, task.id).await.unwrap());

    // The tag itself survives
    assert_eq!(service.get_tag(owner, tag).await.unwrap().name, "errand");
}

#[tokio::test]
async fn test_upcoming_tasks() {
    let service = service().await;
    let owner = Uuid::new_v4();
    let now = Utc::now();

    let soon = service
        .create_task(owner, TaskCreate::new("Soon").due_date((now + chrono::Duration::hours(2)).to_rfc3339()))
        .await
        .unwrap();
    let overdue = service
        .create_task(owner, TaskCreate::new("Overdue").due_date((now - chrono::Duration::hours(5)).to_rfc3339()))
        .await
        .unwrap();
    service
        .create_task(owner, TaskCreate::new("Later").due_date((now + chrono::Duration::hours(48)).to_rfc3339()))
        .await
        .unwrap();
    service.create_task(owner, TaskCreate::new("Someday")).await.unwrap();
    let done = service
        .create_task(owner, TaskCreate::new("Done").due_date((now + chrono::Duration::hours(1)).to_rfc3339()))
        .await
        .unwrap();
    service.toggle_completion(owner, done.id).await.unwrap();

    let upcoming = service.upcoming_default(owner).await.unwrap();
    let ids: Vec<_> = upcoming.iter().map(|t| t.id).collect();
    assert_eq!(ids, vec![overdue.id, soon.id]);

    let wider = service.upcoming(owner, chrono::Duration::hours(72)).await.unwrap();
    assert_eq!(common::titles(&wider), vec!["Overdue", "Soon", "Later"]);
}

#[tokio::test]
async fn test_task_response_serialization() {
    let service = service().await;
    let owner = Uuid::new_v4();
    let task = service
        .create_task(owner, TaskCreate::new("Serialize").priority("high").recurrence("weekly", None))
        .await
        .unwrap();

    let json = serde_json::to_value(&task).unwrap();
    assert_eq!(json["priority"], "high");
    assert_eq!(json["recurrence_pattern"], "weekly");
    assert_eq!(json["owner_id"], owner.to_string());
    assert!(json["tags"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_upcoming_window_out_of_range() {
    let service = service().await;
    let owner = Uuid::new_v4();
    create(&service, owner, "Anything").await;

    let result = service.upcoming(owner, chrono::Duration::days(365 * 300_000)).await;
    assert!(matches!(result, Err(TaskError::Validation(_))));

    let result = service.upcoming(owner, chrono::Duration::days(-365 * 300_000)).await;
    assert!(matches!(result, Err(TaskError::Validation(_))));
}
