use crate::clock::Clock;
use crate::error::AppError;
use crate::model::{Filter, MAX_TASK_LENGTH, Task};
use crate::storage::SlotStore;
use crate::storage::json_slot;
use crate::view::{Counters, ListView, project};
use std::fmt;
use tracing::{debug, warn};

/// Why a submitted text was refused. Shown to the user, never logged as an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddRejection {
    Empty,
    TooLong { len: usize },
}

impl AddRejection {
    pub fn message(&self) -> String {
        match self {
            Self::Empty => "Please type a task before adding it!".to_string(),
            Self::TooLong { .. } => {
                format!("A task cannot be longer than {MAX_TASK_LENGTH} characters.")
            }
        }
    }
}

impl fmt::Display for AddRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message())
    }
}

impl std::error::Error for AddRejection {}

impl From<AddRejection> for AppError {
    fn from(rejection: AddRejection) -> Self {
        AppError::invalid_input(rejection.message())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Confirm,
    Cancel,
}

/// First half of a delete: the task exists and is waiting on the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteRequest {
    id: i64,
    text: String,
}

impl DeleteRequest {
    pub fn id(&self) -> i64 {
        self.id
    }

    pub fn prompt(&self) -> String {
        format!("Are you sure you want to remove \"{}\"?", self.text)
    }
}

/// Supplies the user's answer to a pending delete.
pub trait Confirm {
    fn confirm(&mut self, request: &DeleteRequest) -> Decision;
}

impl Confirm for Decision {
    fn confirm(&mut self, _request: &DeleteRequest) -> Decision {
        *self
    }
}

impl<F> Confirm for F
where
    F: FnMut(&DeleteRequest) -> Decision,
{
    fn confirm(&mut self, request: &DeleteRequest) -> Decision {
        self(request)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted(Task),
    Cancelled,
    NotFound,
}

/// The task collection, the active filter and the slot they are saved to.
pub struct TaskList {
    tasks: Vec<Task>,
    filter: Filter,
    store: Box<dyn SlotStore>,
    key: String,
    clock: Box<dyn Clock>,
    save_error: Option<AppError>,
}

impl TaskList {
    /// Loads whatever the slot holds. The filter always starts at `all`.
    pub fn open<K: Into<String>>(store: Box<dyn SlotStore>, key: K, clock: Box<dyn Clock>) -> Self {
        let key = key.into();
        let tasks = json_slot::load_tasks(store.as_ref(), &key);
        debug!(key = %key, count = tasks.len(), "loaded tasks");

        Self {
            tasks,
            filter: Filter::default(),
            store,
            key,
            clock,
            save_error: None,
        }
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn filter(&self) -> Filter {
        self.filter
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn store(&self) -> &dyn SlotStore {
        self.store.as_ref()
    }

    pub fn counters(&self) -> Counters {
        Counters::of(&self.tasks)
    }

    pub fn view(&self) -> ListView {
        project(&self.tasks, self.filter)
    }

    /// The most recent failed save, if the store has not accepted a write since.
    pub fn take_save_error(&mut self) -> Option<AppError> {
        self.save_error.take()
    }

    pub fn add_task(&mut self, raw: &str) -> Result<Task, AddRejection> {
        let text = validate_text(raw)?;
        let task = Task {
            id: self.next_id(),
            text: text.to_string(),
            completed: false,
        };

        self.tasks.push(task.clone());
        debug!(task_id = task.id, "added task");
        self.persist();

        Ok(task)
    }

    /// Starts at the current millisecond and walks forward past taken ids.
    fn next_id(&self) -> i64 {
        let mut candidate = self.clock.now_millis();
        while self.tasks.iter().any(|task| task.id == candidate) {
            candidate += 1;
        }
        candidate
    }

    pub fn toggle_task(&mut self, id: i64) -> Option<Task> {
        let Some(task) = self.tasks.iter_mut().find(|task| task.id == id) else {
            warn!(task_id = id, "no task with this id to toggle");
            return None;
        };

        task.completed = !task.completed;
        let toggled = task.clone();
        debug!(task_id = id, completed = toggled.completed, "toggled task");
        self.persist();

        Some(toggled)
    }

    pub fn request_delete(&self, id: i64) -> Option<DeleteRequest> {
        match self.tasks.iter().find(|task| task.id == id) {
            Some(task) => Some(DeleteRequest {
                id,
                text: task.text.clone(),
            }),
            None => {
                warn!(task_id = id, "no task with this id to delete");
                None
            }
        }
    }

    pub fn resolve_delete(&mut self, request: DeleteRequest, decision: Decision) -> DeleteOutcome {
        if decision == Decision::Cancel {
            debug!(task_id = request.id, "delete cancelled");
            return DeleteOutcome::Cancelled;
        }

        let Some(index) = self.tasks.iter().position(|task| task.id == request.id) else {
            warn!(task_id = request.id, "task vanished before delete was confirmed");
            return DeleteOutcome::NotFound;
        };

        let removed = self.tasks.remove(index);
        debug!(task_id = removed.id, "deleted task");
        self.persist();

        DeleteOutcome::Deleted(removed)
    }

    pub fn delete_task(&mut self, id: i64, confirm: &mut dyn Confirm) -> DeleteOutcome {
        let Some(request) = self.request_delete(id) else {
            return DeleteOutcome::NotFound;
        };
        let decision = confirm.confirm(&request);
        self.resolve_delete(request, decision)
    }

    /// Returns `false` when `filter` is already active.
    pub fn set_filter(&mut self, filter: Filter) -> bool {
        if self.filter == filter {
            return false;
        }
        self.filter = filter;
        true
    }

    fn persist(&mut self) {
        match json_slot::save_tasks(self.store.as_mut(), &self.key, &self.tasks) {
            Ok(()) => self.save_error = None,
            Err(err) => {
                warn!(key = %self.key, error = %err, "could not save tasks, changes are kept in memory only");
                self.save_error = Some(err);
            }
        }
    }
}

pub fn validate_text(raw: &str) -> Result<&str, AddRejection> {
    let text = raw.trim();
    if text.is_empty() {
        return Err(AddRejection::Empty);
    }

    let len = text.encode_utf16().count();
    if len > MAX_TASK_LENGTH {
        return Err(AddRejection::TooLong { len });
    }

    Ok(text)
}
