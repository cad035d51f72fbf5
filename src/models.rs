//! Request payloads and response records exchanged with callers.
//!
//! Payload fields that carry enums or dates are plain strings as received from
//! the caller. Malformed values are rejected here with `Validation`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use crate::constants::{DESCRIPTION_MAX_LEN, TAG_NAME_MAX_LEN, TAG_NAME_MIN_LEN, TITLE_MAX_LEN, TITLE_MIN_LEN};
use crate::entities::task::{Priority, RecurrencePattern};
use crate::entities::{tag, task};
use crate::error::{TaskError, TaskResult};
use crate::utils::datetime::parse_datetime_input;

/// Fields for a new task
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TaskCreate {
    pub title: String,
    pub description: Option<String>,
    pub completed: bool,
    pub priority: Option<String>,
    pub due_date: Option<String>,
    pub recurrence_pattern: Option<String>,
    pub recurrence_end_date: Option<String>,
    pub tag_ids: Vec<Uuid>,
}

impl TaskCreate {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn priority(mut self, priority: impl Into<String>) -> Self {
        self.priority = Some(priority.into());
        self
    }

    pub fn due_date(mut self, due_date: impl Into<String>) -> Self {
        self.due_date = Some(due_date.into());
        self
    }

    pub fn recurrence(mut self, pattern: impl Into<String>, end_date: Option<&str>) -> Self {
        self.recurrence_pattern = Some(pattern.into());
        self.recurrence_end_date = end_date.map(str::to_string);
        self
    }

    pub fn tags(mut self, tag_ids: &[Uuid]) -> Self {
        self.tag_ids = tag_ids.to_vec();
        self
    }
}

/// Checked and converted form of [`TaskCreate`]
#[derive(Debug, Clone)]
pub(crate) struct ValidTaskCreate {
    pub title: String,
    pub description: Option<String>,
    pub completed: bool,
    pub priority: Priority,
    pub due_date: Option<DateTime<Utc>>,
    pub recurrence_pattern: Option<RecurrencePattern>,
    pub recurrence_end_date: Option<DateTime<Utc>>,
}

impl TaskCreate {
    pub(crate) fn validate(&self) -> TaskResult<ValidTaskCreate> {
        validate_title(&self.title)?;
        if let Some(description) = &self.description {
            validate_description(description)?;
        }

        Ok(ValidTaskCreate {
            title: self.title.clone(),
            description: self.description.clone(),
            completed: self.completed,
            priority: match &self.priority {
                Some(p) => parse_priority(p)?,
                None => Priority::default(),
            },
            due_date: parse_optional_date("due_date", self.due_date.as_deref())?,
            recurrence_pattern: self.recurrence_pattern.as_deref().map(parse_recurrence).transpose()?,
            recurrence_end_date: parse_optional_date("recurrence_end_date", self.recurrence_end_date.as_deref())?,
        })
    }
}

/// Partial update of a task.
///
/// Outer `None` leaves a field untouched. For nullable fields, `Some(None)`
/// (an explicit JSON `null`) clears the stored value.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TaskUpdate {
    pub title: Option<String>,
    #[serde(deserialize_with = "present")]
    pub description: Option<Option<String>>,
    pub completed: Option<bool>,
    pub priority: Option<String>,
    #[serde(deserialize_with = "present")]
    pub due_date: Option<Option<String>>,
    #[serde(deserialize_with = "present")]
    pub recurrence_pattern: Option<Option<String>>,
    #[serde(deserialize_with = "present")]
    pub recurrence_end_date: Option<Option<String>>,
    /// Full replacement of the task's tags when present
    pub tag_ids: Option<Vec<Uuid>>,
}

/// Checked form of [`TaskUpdate`], same presence semantics
#[derive(Debug, Clone, Default)]
pub(crate) struct ValidTaskUpdate {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub completed: Option<bool>,
    pub priority: Option<Priority>,
    pub due_date: Option<Option<DateTime<Utc>>>,
    pub recurrence_pattern: Option<Option<RecurrencePattern>>,
    pub recurrence_end_date: Option<Option<DateTime<Utc>>>,
    pub tag_ids: Option<Vec<Uuid>>,
}

impl TaskUpdate {
    pub(crate) fn validate(&self) -> TaskResult<ValidTaskUpdate> {
        if let Some(title) = &self.title {
            validate_title(title)?;
        }
        if let Some(Some(description)) = &self.description {
            validate_description(description)?;
        }

        Ok(ValidTaskUpdate {
            title: self.title.clone(),
            description: self.description.clone(),
            completed: self.completed,
            priority: self.priority.as_deref().map(parse_priority).transpose()?,
            due_date: self
                .due_date
                .as_ref()
                .map(|d| parse_optional_date("due_date", d.as_deref()))
                .transpose()?,
            recurrence_pattern: self
                .recurrence_pattern
                .as_ref()
                .map(|p| p.as_deref().map(parse_recurrence).transpose())
                .transpose()?,
            recurrence_end_date: self
                .recurrence_end_date
                .as_ref()
                .map(|d| parse_optional_date("recurrence_end_date", d.as_deref()))
                .transpose()?,
            tag_ids: self.tag_ids.clone(),
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TagCreate {
    pub name: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TagUpdate {
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TagResponse {
    pub id: Uuid,
    pub name: String,
    pub owner_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<tag::Model> for TagResponse {
    fn from(tag: tag::Model) -> Self {
        Self {
            id: tag.id,
            name: tag.name,
            owner_id: tag.owner_id,
            created_at: tag.created_at,
            updated_at: tag.updated_at,
        }
    }
}

/// A task as returned to callers, with its tags attached
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskResponse {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub completed: bool,
    pub priority: Priority,
    pub due_date: Option<DateTime<Utc>>,
    pub recurrence_pattern: Option<RecurrencePattern>,
    pub recurrence_end_date: Option<DateTime<Utc>>,
    pub owner_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub tags: Vec<TagResponse>,
}

impl TaskResponse {
    pub fn from_model(task: task::Model, tags: Vec<tag::Model>) -> Self {
        Self {
            id: task.id,
            title: task.title,
            description: task.description,
            completed: task.completed,
            priority: task.priority,
            due_date: task.due_date,
            recurrence_pattern: task.recurrence_pattern,
            recurrence_end_date: task.recurrence_end_date,
            owner_id: task.owner_id,
            created_at: task.created_at,
            updated_at: task.updated_at,
            tags: tags.into_iter().map(TagResponse::from).collect(),
        }
    }
}

pub(crate) fn validate_title(title: &str) -> TaskResult<()> {
    let len = title.chars().count();
    if !(TITLE_MIN_LEN..=TITLE_MAX_LEN).contains(&len) {
        return Err(TaskError::Validation(format!(
            "title must be between {TITLE_MIN_LEN} and {TITLE_MAX_LEN} characters, got {len}"
        )));
    }
    Ok(())
}

pub(crate) fn validate_description(description: &str) -> TaskResult<()> {
    let len = description.chars().count();
    if len > DESCRIPTION_MAX_LEN {
        return Err(TaskError::Validation(format!(
            "description must be at most {DESCRIPTION_MAX_LEN} characters, got {len}"
        )));
    }
    Ok(())
}

pub(crate) fn validate_tag_name(name: &str) -> TaskResult<()> {
    let len = name.chars().count();
    if !(TAG_NAME_MIN_LEN..=TAG_NAME_MAX_LEN).contains(&len) {
        return Err(TaskError::Validation(format!(
            "tag name must be between {TAG_NAME_MIN_LEN} and {TAG_NAME_MAX_LEN} characters, got {len}"
        )));
    }
    Ok(())
}

fn parse_priority(value: &str) -> TaskResult<Priority> {
    Priority::parse(value)
        .ok_or_else(|| TaskError::Validation(format!("priority must be low, medium or high, got '{value}'")))
}

fn parse_recurrence(value: &str) -> TaskResult<RecurrencePattern> {
    RecurrencePattern::parse(value).ok_or_else(|| {
        TaskError::Validation(format!("recurrence_pattern must be daily, weekly or monthly, got '{value}'"))
    })
}

fn parse_optional_date(field: &str, value: Option<&str>) -> TaskResult<Option<DateTime<Utc>>> {
    value
        .map(|v| {
            parse_datetime_input(v)
                .ok_or_else(|| TaskError::Validation(format!("{field} is not a valid date or timestamp: '{v}'")))
        })
        .transpose()
}

/// Marks a field as present even when its value is `null`
fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
