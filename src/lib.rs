//! Tasklane - owner-scoped task management core
//!
//! This library stores tasks and tags per owner, answers filtered and sorted
//! task queries, and spawns the next occurrence of recurring tasks when they
//! are completed. Authentication and transport live outside: callers pass an
//! already-authenticated owner id to every operation.
//!
//! # Modules
//!
//! * [`config`] - Configuration loading and validation
//! * [`entities`] - SeaORM entity models for database tables
//! * [`repositories`] - Owner-scoped database operations
//! * [`query`] - Task filter and sort builder
//! * [`recurrence`] - Successor planning for recurring tasks
//! * [`service`] - The operations callers use
//! * [`storage`] - Database connection and schema

/// Configuration module for managing application settings
pub mod config;

/// Field limits, defaults and log message constants
pub mod constants;

/// SeaORM entity models for database tables
pub mod entities;

/// Error types returned by the service
pub mod error;

/// File logging setup
pub mod logger;

/// Request payloads and response records
pub mod models;

/// Task filtering and sorting
pub mod query;

/// Recurrence planning
pub mod recurrence;

/// Repository layer for database operations
pub mod repositories;

/// Task and tag operations for callers
pub mod service;

/// Database connection and schema management
pub mod storage;

/// Utility functions for date/time handling
pub mod utils;

// Re-export entity models for convenient access
pub use entities::{tag, task, task_tag};
pub use error::{TaskError, TaskResult};
pub use service::TaskService;
