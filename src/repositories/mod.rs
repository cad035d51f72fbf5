//! Repository layer for database operations.
//!
//! Repositories keep entities as pure data models while providing reusable,
//! owner-scoped database access methods. Every method is generic over
//! `ConnectionTrait` so it runs equally on the pooled connection or inside a
//! transaction opened by the caller.

pub mod tag;
pub mod task;
pub mod task_tag;

pub use tag::TagRepository;
pub use task::TaskRepository;
pub use task_tag::TaskTagRepository;
