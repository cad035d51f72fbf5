mod common;

use chrono::{Duration, TimeZone, Utc};
use sea_orm::ConnectionTrait;
use tasklane::entities::task::{Priority, RecurrencePattern};
use tasklane::models::TaskCreate;
use tasklane::query::{TaskQuery, TaskStatus};
use tasklane::recurrence::{RecurrenceOutcome, SkipReason};
use tasklane::repositories::TaskRepository;
use tasklane::TaskError;
use uuid::Uuid;

use common::{count_tasks, create, service};

#[tokio::test]
async fn test_completing_daily_task_spawns_next_day() {
    let service = service().await;
    let owner = Uuid::new_v4();
    let due = Utc::now() + Duration::hours(3);

    let task = service
        .create_task(owner, TaskCreate::new("Water plants").due_date(due.to_rfc3339()).recurrence("daily", None))
        .await
        .unwrap();

    let toggle = service.toggle_completion(owner, task.id).await.unwrap();
    assert!(toggle.task.completed);
    assert!(toggle.task.updated_at > task.updated_at);

    let successor = toggle.recurrence.successor().expect("successor spawned").clone();
    assert_ne!(successor.id, task.id);
    assert_eq!(successor.title, "Water plants");
    assert!(!successor.completed);
    assert_eq!(successor.due_date, Some(due + Duration::days(1)));
    assert_eq!(successor.recurrence_pattern, Some(RecurrencePattern::Daily));
    assert_eq!(successor.owner_id, owner);
    assert_eq!(count_tasks(&service, owner).await, 2);

    // Reopening does nothing to recurrence
    let reopened = service.toggle_completion(owner, task.id).await.unwrap();
    assert!(!reopened.task.completed);
    assert!(matches!(reopened.recurrence, RecurrenceOutcome::NotTriggered));
    assert_eq!(count_tasks(&service, owner).await, 2);
}

#[tokio::test]
async fn test_monthly_task_moves_thirty_days() {
    let service = service().await;
    let owner = Uuid::new_v4();
    let work = common::create_tag(&service, owner, "bills").await;

    let task = service
        .create_task(
            owner,
            TaskCreate::new("Pay rent")
                .description("Transfer to landlord")
                .priority("high")
                .due_date("2024-01-01")
                .recurrence("monthly", None)
                .tags(&[work]),
        )
        .await
        .unwrap();

    let toggle = service.toggle_completion(owner, task.id).await.unwrap();
    let successor = toggle.recurrence.successor().expect("successor spawned");

    assert_eq!(successor.title, "Pay rent");
    assert_eq!(successor.description.as_deref(), Some("Transfer to landlord"));
    assert_eq!(successor.priority, Priority::High);
    assert_eq!(successor.due_date, Some(Utc.with_ymd_and_hms(2024, 1, 31, 0, 0, 0).unwrap()));
    assert_eq!(successor.recurrence_pattern, Some(RecurrencePattern::Monthly));
    // Tags stay with the completed instance
    assert!(successor.tags.is_empty());

    let pending = service
        .list_tasks(owner, &TaskQuery::new().status(TaskStatus::Pending))
        .await
        .unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].id, successor.id);
}

#[tokio::test]
async fn test_weekly_successor_keeps_end_date() {
    let service = service().await;
    let owner = Uuid::new_v4();

    let task = service
        .create_task(
            owner,
            TaskCreate::new("Team sync")
                .due_date("2099-01-01")
                .recurrence("weekly", Some("2099-12-31")),
        )
        .await
        .unwrap();

    let toggle = service.toggle_completion(owner, task.id).await.unwrap();
    let successor = toggle.recurrence.successor().expect("successor spawned");
    assert_eq!(successor.due_date, Some(Utc.with_ymd_and_hms(2099, 1, 8, 0, 0, 0).unwrap()));
    assert_eq!(successor.recurrence_end_date, task.recurrence_end_date);

    // The successor recurs in turn
    let next = service.toggle_completion(owner, successor.id).await.unwrap();
    assert_eq!(
        next.recurrence.successor().and_then(|t| t.due_date),
        Some(Utc.with_ymd_and_hms(2099, 1, 15, 0, 0, 0).unwrap())
    );
}

#[tokio::test]
async fn test_no_successor_past_end_date() {
    let service = service().await;
    let owner = Uuid::new_v4();

    let task = service
        .create_task(
            owner,
            TaskCreate::new("Last call")
                .due_date("2099-06-01")
                .recurrence("weekly", Some("2099-06-05")),
        )
        .await
        .unwrap();

    let toggle = service.toggle_completion(owner, task.id).await.unwrap();
    assert!(toggle.task.completed);
    assert!(matches!(toggle.recurrence, RecurrenceOutcome::Skipped(SkipReason::PastEndDate)));
    assert_eq!(count_tasks(&service, owner).await, 1);
}

#[tokio::test]
async fn test_no_successor_once_recurrence_expired() {
    let service = service().await;
    let owner = Uuid::new_v4();

    let task = service
        .create_task(
            owner,
            TaskCreate::new("Old habit")
                .due_date("2020-01-01")
                .recurrence("daily", Some("2020-02-01")),
        )
        .await
        .unwrap();

    let toggle = service.toggle_completion(owner, task.id).await.unwrap();
    assert!(matches!(toggle.recurrence, RecurrenceOutcome::Skipped(SkipReason::Expired)));
    assert_eq!(count_tasks(&service, owner).await, 1);
}

#[tokio::test]
async fn test_no_successor_without_due_date() {
    let service = service().await;
    let owner = Uuid::new_v4();

    let task = service
        .create_task(owner, TaskCreate::new("Floating").recurrence("daily", None))
        .await
        .unwrap();

    let toggle = service.toggle_completion(owner, task.id).await.unwrap();
    assert!(toggle.task.completed);
    assert!(matches!(toggle.recurrence, RecurrenceOutcome::Skipped(SkipReason::NoAnchor)));
    assert_eq!(count_tasks(&service, owner).await, 1);
}

#[tokio::test]
async fn test_non_recurring_toggle() {
    let service = service().await;
    let owner = Uuid::new_v4();
    let task = create(&service, owner, "Once").await;

    let toggle = service.toggle_completion(owner, task.id).await.unwrap();
    assert!(toggle.task.completed);
    assert!(matches!(toggle.recurrence, RecurrenceOutcome::NotTriggered));
    assert_eq!(count_tasks(&service, owner).await, 1);
}

#[tokio::test]
async fn test_update_completed_does_not_recur() {
    let service = service().await;
    let owner = Uuid::new_v4();
    let task = service
        .create_task(owner, TaskCreate::new("Sneaky").due_date("2099-01-01").recurrence("daily", None))
        .await
        .unwrap();

    let update = tasklane::models::TaskUpdate {
        completed: Some(true),
        ..Default::default()
    };
    let updated = service.update_task(owner, task.id, update).await.unwrap();
    assert!(updated.completed);
    assert_eq!(count_tasks(&service, owner).await, 1);
}

#[tokio::test]
async fn test_failed_successor_keeps_completion() {
    let service = service().await;
    let owner = Uuid::new_v4();
    let task = service
        .create_task(owner, TaskCreate::new("Fragile").due_date("2099-01-01").recurrence("daily", None))
        .await
        .unwrap();

    service
        .storage()
        .conn
        .execute_unprepared(
            "CREATE TRIGGER reject_task_insert BEFORE INSERT ON tasks \
             BEGIN SELECT RAISE(ABORT, 'inserts disabled'); END;",
        )
        .await
        .unwrap();

    let toggle = service.toggle_completion(owner, task.id).await.unwrap();
    assert!(toggle.task.completed);
    match &toggle.recurrence {
        RecurrenceOutcome::Failed(message) => assert!(message.contains("inserts disabled")),
        other => panic!("expected a failed successor, got {:?}", other),
    }

    let stored = service.get_task(owner, task.id).await.unwrap();
    assert!(stored.completed);
    assert_eq!(count_tasks(&service, owner).await, 1);
}

#[tokio::test]
async fn test_toggle_unknown_task() {
    let service = service().await;
    let result = service.toggle_completion(Uuid::new_v4(), Uuid::new_v4()).await;
    assert!(matches!(result, Err(TaskError::NotFound(_))));
}

#[tokio::test]
async fn test_outcome_serialization() {
    let service = service().await;
    let owner = Uuid::new_v4();
    let task = service
        .create_task(owner, TaskCreate::new("Floating").recurrence("weekly", None))
        .await
        .unwrap();

    let toggle = service.toggle_completion(owner, task.id).await.unwrap();
    let json = serde_json::to_value(&toggle).unwrap();
    assert_eq!(json["task"]["completed"], true);
    assert_eq!(json["recurrence"]["status"], "skipped");
    assert_eq!(json["recurrence"]["detail"], "no_anchor");
}

#[tokio::test]
async fn test_stale_completion_write_is_rejected() {
    let service = service().await;
    let owner = Uuid::new_v4();
    let task = create(&service, owner, "Contended").await;
    let conn = &service.storage().conn;

    // Another writer completes the task after we read it as pending
    assert!(TaskRepository::set_completed_if(conn, &owner, &task.id, false, Utc::now()).await.unwrap());
    assert!(!TaskRepository::set_completed_if(conn, &owner, &task.id, false, Utc::now()).await.unwrap());

    // Only the owner's row can match
    assert!(!TaskRepository::set_completed_if(conn, &Uuid::new_v4(), &task.id, true, Utc::now()).await.unwrap());

    let stored = service.get_task(owner, task.id).await.unwrap();
    assert!(stored.completed);
}

#[tokio::test]
async fn test_toggle_response_matches_stored_state() {
    let service = service().await;
    let owner = Uuid::new_v4();
    let tag = common::create_tag(&service, owner, "chores").await;
    let task = service
        .create_task(
            owner,
            TaskCreate::new("Laundry").due_date("2099-03-01").recurrence("weekly", None).tags(&[tag]),
        )
        .await
        .unwrap();

    let toggle = service.toggle_completion(owner, task.id).await.unwrap();
    assert_eq!(toggle.task, service.get_task(owner, task.id).await.unwrap());
    assert_eq!(toggle.task.tags.len(), 1);

    let successor = toggle.recurrence.successor().expect("successor spawned");
    assert_eq!(successor, &service.get_task(owner, successor.id).await.unwrap());

    let reopened = service.toggle_completion(owner, task.id).await.unwrap();
    assert_eq!(reopened.task, service.get_task(owner, task.id).await.unwrap());
}
