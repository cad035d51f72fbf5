//! Recurrence: deciding whether completing a task spawns its next occurrence.
//!
//! Planning is pure ([`plan_successor`]); the service performs the insert and
//! reports the result as a [`RecurrenceOutcome`]. Intervals are fixed offsets:
//! a "monthly" task moves by exactly 30 days, not to the same day of the next
//! calendar month.

use chrono::{DateTime, Duration, Utc};
use sea_orm::ActiveValue;
use serde::Serialize;
use uuid::Uuid;

use crate::constants::{DAILY_INTERVAL_DAYS, MONTHLY_INTERVAL_DAYS, WEEKLY_INTERVAL_DAYS};
use crate::entities::task::{self, RecurrencePattern};
use crate::models::TaskResponse;

impl RecurrencePattern {
    /// Offset between two consecutive occurrences
    pub fn interval(&self) -> Duration {
        match self {
            RecurrencePattern::Daily => Duration::days(DAILY_INTERVAL_DAYS),
            RecurrencePattern::Weekly => Duration::days(WEEKLY_INTERVAL_DAYS),
            RecurrencePattern::Monthly => Duration::days(MONTHLY_INTERVAL_DAYS),
        }
    }
}

/// Why a recurring task did not produce a successor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// The recurrence end date is already in the past
    Expired,
    /// No due date to compute the next occurrence from
    NoAnchor,
    /// The next occurrence would fall after the recurrence end date
    PastEndDate,
    /// The next occurrence is beyond the latest representable timestamp
    OutOfRange,
}

/// What completing a task should do about recurrence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecurrencePlan {
    NotRecurring,
    Skip(SkipReason),
    Spawn { due_date: DateTime<Utc> },
}

/// Next due date after `due_date`; `None` when it falls outside the representable range.
pub fn next_due_date(due_date: DateTime<Utc>, pattern: RecurrencePattern) -> Option<DateTime<Utc>> {
    due_date.checked_add_signed(pattern.interval())
}

/// Decide what happens when `task` has just been completed at `now`.
pub fn plan_successor(task: &task::Model, now: DateTime<Utc>) -> RecurrencePlan {
    let Some(pattern) = task.recurrence_pattern else {
        return RecurrencePlan::NotRecurring;
    };

    if let Some(end) = task.recurrence_end_date {
        if now > end {
            return RecurrencePlan::Skip(SkipReason::Expired);
        }
    }

    let Some(due_date) = task.due_date else {
        return RecurrencePlan::Skip(SkipReason::NoAnchor);
    };

    let Some(next) = next_due_date(due_date, pattern) else {
        return RecurrencePlan::Skip(SkipReason::OutOfRange);
    };

    match task.recurrence_end_date {
        Some(end) if next > end => RecurrencePlan::Skip(SkipReason::PastEndDate),
        _ => RecurrencePlan::Spawn { due_date: next },
    }
}

/// New pending task continuing `completed` at `due_date`.
///
/// Tags are not carried over and nothing links back to the predecessor.
pub fn successor_model(completed: &task::Model, due_date: DateTime<Utc>, now: DateTime<Utc>) -> task::ActiveModel {
    task::ActiveModel {
        id: ActiveValue::Set(Uuid::new_v4()),
        title: ActiveValue::Set(completed.title.clone()),
        description: ActiveValue::Set(completed.description.clone()),
        completed: ActiveValue::Set(false),
        priority: ActiveValue::Set(completed.priority),
        due_date: ActiveValue::Set(Some(due_date)),
        recurrence_pattern: ActiveValue::Set(completed.recurrence_pattern),
        recurrence_end_date: ActiveValue::Set(completed.recurrence_end_date),
        owner_id: ActiveValue::Set(completed.owner_id),
        created_at: ActiveValue::Set(now),
        updated_at: ActiveValue::Set(now),
    }
}

/// Result of the recurrence side effect of a completion toggle.
///
/// `Failed` never undoes the toggle itself: completing the current instance is
/// committed before the successor is attempted.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", content = "detail", rename_all = "snake_case")]
pub enum RecurrenceOutcome {
    /// Reopened, or not a recurring task
    NotTriggered,
    Skipped(SkipReason),
    Spawned(Box<TaskResponse>),
    Failed(String),
}

impl RecurrenceOutcome {
    pub fn successor(&self) -> Option<&TaskResponse> {
        match self {
            RecurrenceOutcome::Spawned(task) => Some(task),
            _ => None,
        }
    }
}
