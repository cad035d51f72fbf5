pub mod tag;
pub mod task;
pub mod task_tag;

pub use tag::Entity as Tag;
pub use task::Entity as Task;
pub use task_tag::Entity as TaskTag;
