pub mod clock;
pub mod config;
pub mod controller;
pub mod error;
pub mod model;
pub mod storage;
pub mod task_list;
pub mod view;

pub use controller::{App, Surface, TaskAction, UiEvent};
pub use task_list::{AddRejection, Confirm, Decision, DeleteOutcome, DeleteRequest, TaskList};
