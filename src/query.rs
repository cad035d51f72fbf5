//! Task filtering and ordering.
//!
//! A [`TaskQuery`] is an explicit set of optional predicates plus a resolved
//! [`TaskSort`]. Caller-supplied strings are converted once, in
//! [`TaskQuery::from_raw`]; unknown status, priority or sort values degrade to
//! "no filter" or the default ordering instead of failing. Only malformed dates
//! are rejected.
//!
//! Predicates are applied in a fixed order (search, status, priority, created
//! range, tags) and are AND-combined. Exactly one ordering pass is applied,
//! followed by the task id as a tie-breaker so that results are deterministic.

use chrono::{DateTime, Utc};
use sea_orm::sea_query::{Alias, Expr, Func, NullOrdering, SimpleExpr};
use sea_orm::{
    ColumnTrait, Condition, EntityTrait, JoinType, Order, QueryFilter, QueryOrder, QuerySelect, QueryTrait,
    RelationTrait, Select,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::constants::{STATUS_COMPLETED, STATUS_PENDING};
use crate::entities::task::Priority;
use crate::entities::{tag, task, task_tag};
use crate::error::{TaskError, TaskResult};
use crate::utils::datetime::parse_datetime_input;

/// Completion status filter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskStatus {
    Completed,
    Pending,
}

impl TaskStatus {
    /// `"completed"` or `"pending"`; anything else means no status filter.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            STATUS_COMPLETED => Some(Self::Completed),
            STATUS_PENDING => Some(Self::Pending),
            _ => None,
        }
    }

    fn is_completed(self) -> bool {
        matches!(self, Self::Completed)
    }
}

/// Column (or derived key) a task list is ordered by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    DueDate,
    Priority,
    Title,
    /// Alphabetically smallest name among the task's tags
    Tag,
    #[default]
    CreatedAt,
}

impl SortKey {
    /// Resolve a caller-supplied sort key. Absent or unknown values fall back
    /// to `CreatedAt`.
    pub fn resolve(value: Option<&str>) -> Self {
        let Some(value) = value else {
            return Self::CreatedAt;
        };

        match value.trim().to_ascii_lowercase().as_str() {
            "due_date" => Self::DueDate,
            "priority" => Self::Priority,
            "title" => Self::Title,
            "tag" => Self::Tag,
            _ => Self::CreatedAt,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    /// Only an explicit `"asc"` sorts ascending.
    pub fn resolve(value: Option<&str>) -> Self {
        match value.map(|v| v.trim().to_ascii_lowercase()) {
            Some(v) if v == "asc" => Self::Asc,
            _ => Self::Desc,
        }
    }
}

impl From<SortOrder> for Order {
    fn from(order: SortOrder) -> Self {
        match order {
            SortOrder::Asc => Order::Asc,
            SortOrder::Desc => Order::Desc,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TaskSort {
    pub key: SortKey,
    pub order: SortOrder,
}

impl TaskSort {
    pub fn new(key: SortKey, order: SortOrder) -> Self {
        Self { key, order }
    }

    /// Apply the single ordering pass for this sort, then the id tie-breaker.
    ///
    /// Undated and untagged tasks always come last, whatever the direction.
    pub fn apply(&self, select: Select<task::Entity>) -> Select<task::Entity> {
        let order: Order = self.order.into();

        let select = match self.key {
            SortKey::DueDate => select.order_by_with_nulls(task::Column::DueDate, order, NullOrdering::Last),
            SortKey::Priority => select.order_by(task::Column::Priority, order),
            SortKey::Title => select.order_by(task::Column::Title, order),
            SortKey::Tag => {
                let first_tag_name: SimpleExpr = Func::min(Expr::col((tag::Entity, tag::Column::Name))).into();
                select
                    .join(JoinType::LeftJoin, task::Relation::TaskTags.def())
                    .join(JoinType::LeftJoin, task_tag::Relation::Tag.def())
                    .group_by(task::Column::Id)
                    .order_by_with_nulls(first_tag_name, order, NullOrdering::Last)
            }
            SortKey::CreatedAt => select.order_by(task::Column::CreatedAt, order),
        };

        select.order_by_asc(task::Column::Id)
    }
}

/// Typed filter predicates; `None` means "do not filter on this".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskFilter {
    pub search: Option<String>,
    pub status: Option<TaskStatus>,
    pub priority: Option<Priority>,
    pub date_from: Option<DateTime<Utc>>,
    pub date_to: Option<DateTime<Utc>>,
    /// Task must carry at least one of these tags. An empty set matches nothing.
    pub tag_ids: Option<Vec<Uuid>>,
}

impl TaskFilter {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Add this filter's predicates to an owner-scoped select.
    pub fn apply(&self, mut select: Select<task::Entity>) -> Select<task::Entity> {
        if let Some(search) = &self.search {
            select = select.filter(
                Condition::any()
                    .add(contains_folded(task::Column::Title, search))
                    .add(contains_folded(task::Column::Description, search)),
            );
        }

        if let Some(status) = self.status {
            select = select.filter(task::Column::Completed.eq(status.is_completed()));
        }

        if let Some(priority) = self.priority {
            select = select.filter(task::Column::Priority.eq(priority));
        }

        if let Some(from) = self.date_from {
            select = select.filter(task::Column::CreatedAt.gte(from));
        }

        if let Some(to) = self.date_to {
            select = select.filter(task::Column::CreatedAt.lte(to));
        }

        if let Some(tag_ids) = &self.tag_ids {
            select = select.filter(
                task::Column::Id.in_subquery(
                    task_tag::Entity::find()
                        .filter(task_tag::Column::TagId.is_in(tag_ids.iter().copied()))
                        .select_only()
                        .column(task_tag::Column::TaskId)
                        .into_query(),
                ),
            );
        }

        select
    }
}

/// Query parameters as a caller (e.g. an HTTP layer) receives them.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawTaskQuery {
    pub search: Option<String>,
    pub status: Option<String>,
    pub priority: Option<String>,
    pub date_from: Option<String>,
    pub date_to: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
    pub tag_ids: Vec<String>,
}

/// Filter and sort for listing an owner's tasks.
///
/// # Example
/// ```
/// use tasklane::query::{SortKey, SortOrder, TaskQuery, TaskStatus};
///
/// let query = TaskQuery::new()
///     .search("rent")
///     .status(TaskStatus::Pending)
///     .sort(SortKey::DueDate, SortOrder::Asc);
/// assert_eq!(query.sort.key, SortKey::DueDate);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskQuery {
    pub filter: TaskFilter,
    pub sort: TaskSort,
}

impl TaskQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Convert raw caller parameters.
    ///
    /// # Errors
    /// `Validation` when `date_from` or `date_to` is not a timestamp or date.
    pub fn from_raw(raw: &RawTaskQuery) -> TaskResult<Self> {
        let date_from = parse_bound("date_from", raw.date_from.as_deref())?;
        let date_to = parse_bound("date_to", raw.date_to.as_deref())?;

        let tag_ids = if raw.tag_ids.is_empty() {
            None
        } else {
            // Malformed ids can never match a tag, so they narrow rather than widen
            Some(raw.tag_ids.iter().filter_map(|id| Uuid::parse_str(id.trim()).ok()).collect())
        };

        Ok(Self {
            filter: TaskFilter {
                search: raw.search.as_deref().and_then(non_blank),
                status: raw.status.as_deref().and_then(TaskStatus::parse),
                priority: raw.priority.as_deref().and_then(Priority::parse),
                date_from,
                date_to,
                tag_ids,
            },
            sort: TaskSort::new(
                SortKey::resolve(raw.sort_by.as_deref()),
                SortOrder::resolve(raw.sort_order.as_deref()),
            ),
        })
    }

    pub fn search(mut self, text: &str) -> Self {
        self.filter.search = non_blank(text);
        self
    }

    pub fn status(mut self, status: TaskStatus) -> Self {
        self.filter.status = Some(status);
        self
    }

    pub fn priority(mut self, priority: Priority) -> Self {
        self.filter.priority = Some(priority);
        self
    }

    pub fn created_between(mut self, from: Option<DateTime<Utc>>, to: Option<DateTime<Utc>>) -> Self {
        self.filter.date_from = from;
        self.filter.date_to = to;
        self
    }

    /// Restrict to tasks tagged with any of `tag_ids`; an empty slice clears the filter.
    pub fn tag_ids(mut self, tag_ids: &[Uuid]) -> Self {
        self.filter.tag_ids = if tag_ids.is_empty() { None } else { Some(tag_ids.to_vec()) };
        self
    }

    pub fn sort(mut self, key: SortKey, order: SortOrder) -> Self {
        self.sort = TaskSort::new(key, order);
        self
    }

    /// Build the full select for `owner_id`: scope, predicates, then ordering.
    pub fn to_select(&self, owner_id: Uuid) -> Select<task::Entity> {
        let select = task::Entity::find().filter(task::Column::OwnerId.eq(owner_id));
        self.sort.apply(self.filter.apply(select))
    }
}

/// `instr(lower(column), lower(needle)) > 0`: both sides folded by SQLite and
/// no LIKE wildcards in the needle.
fn contains_folded(column: task::Column, needle: &str) -> SimpleExpr {
    let haystack = Func::lower(Expr::col((task::Entity, column)));
    let needle = Func::lower(Expr::val(needle.to_string()));
    Expr::expr(Func::cust(Alias::new("instr")).arg(haystack).arg(needle)).gt(0)
}

fn non_blank(text: &str) -> Option<String> {
    if text.trim().is_empty() {
        None
    } else {
        Some(text.to_string())
    }
}

fn parse_bound(field: &str, value: Option<&str>) -> TaskResult<Option<DateTime<Utc>>> {
    match value {
        None => Ok(None),
        Some(v) if v.trim().is_empty() => Ok(None),
        Some(v) => parse_datetime_input(v)
            .map(Some)
            .ok_or_else(|| TaskError::Validation(format!("{field} is not a valid date or timestamp: '{v}'"))),
    }
}
