mod filter;
mod task;

pub use filter::Filter;
pub use task::{NewTask, Task, TaskId};
