pub mod envelope;
pub mod todo;
pub mod user;

pub use envelope::ApiResponse;
pub use todo::{NewTodo, Todo, TodoChanges, TodoPriority, TodoStatus};
pub use user::{User, UserInput, DEFAULT_ROLE};
