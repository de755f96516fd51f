mod task;

pub use task::{Filter, MAX_TASK_LENGTH, Task};
