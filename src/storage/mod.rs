//! Local storage module for task persistence
//!
//! This module owns the SeaORM connection and the schema for:
//! - Tasks
//! - Tags
//! - Task-tag associations

pub mod db;

pub use db::LocalStorage;
