//! Constants used throughout the crate
//!
//! Field limits, defaults and log message templates live here so the
//! validation rules and the messages stay in one place.

// Field limits (measured in characters)
pub const TITLE_MIN_LEN: usize = 1;
pub const TITLE_MAX_LEN: usize = 255;
pub const DESCRIPTION_MAX_LEN: usize = 1000;
pub const TAG_NAME_MIN_LEN: usize = 1;
pub const TAG_NAME_MAX_LEN: usize = 50;

// Recurrence offsets in days
pub const DAILY_INTERVAL_DAYS: i64 = 1;
pub const WEEKLY_INTERVAL_DAYS: i64 = 7;
/// Fixed 30-day offset, not calendar-month aware.
pub const MONTHLY_INTERVAL_DAYS: i64 = 30;

// Query parameter values
pub const STATUS_COMPLETED: &str = "completed";
pub const STATUS_PENDING: &str = "pending";

// Defaults
pub const DEFAULT_UPCOMING_HOURS: i64 = 24;
/// Upper bound for the upcoming window (one year)
pub const MAX_UPCOMING_HOURS: i64 = 24 * 366;
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;
pub const APP_DIR_NAME: &str = "tasklane";
pub const CONFIG_FILE_NAME: &str = "tasklane.toml";
pub const DATABASE_FILE_NAME: &str = "tasklane.db";
pub const LOG_FILE_NAME: &str = "tasklane.log";

// Log Messages
pub const LOG_TASK_CREATED: &str = "Task created";
pub const LOG_TASK_UPDATED: &str = "Task updated";
pub const LOG_TASK_DELETED: &str = "Task deleted";
pub const LOG_TASK_TOGGLED: &str = "Task completion toggled";
pub const LOG_SUCCESSOR_SPAWNED: &str = "Spawned recurring successor";
pub const LOG_SUCCESSOR_FAILED: &str = "Failed to create recurring successor";
pub const LOG_TAG_CREATED: &str = "Tag created";
pub const LOG_TAG_REUSED: &str = "Reusing existing tag";
pub const LOG_TAG_DELETED: &str = "Tag deleted";
pub const LOG_TAGS_REPLACED: &str = "Replaced task tags";

// Config Messages
pub const CONFIG_GENERATED: &str = "Generated default configuration file";
