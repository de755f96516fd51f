use crate::error::AppError;
use crate::model::Task;
use crate::storage::SlotStore;
use std::collections::HashSet;
use tracing::{error, warn};

pub const DEFAULT_SLOT_KEY: &str = "tasks";

/// Reads the task snapshot from `key`.
///
/// Never fails: an absent slot, an unreadable slot, text that is not JSON and
/// JSON of the wrong shape all come back as an empty list. The last three are
/// reported through `tracing`.
pub fn load_tasks(store: &dyn SlotStore, key: &str) -> Vec<Task> {
    let content = match store.read(key) {
        Ok(Some(content)) => content,
        Ok(None) => return Vec::new(),
        Err(err) => {
            error!(key, error = %err, "could not read task slot, starting with an empty list");
            return Vec::new();
        }
    };

    let value: serde_json::Value = match serde_json::from_str(&content) {
        Ok(value) => value,
        Err(err) => {
            error!(key, error = %err, "task slot is not valid JSON, starting with an empty list");
            return Vec::new();
        }
    };

    match decode_tasks(value) {
        Ok(tasks) => drop_duplicate_ids(key, tasks),
        Err(err) => {
            warn!(key, error = %err, "task slot is corrupt, starting with an empty list");
            Vec::new()
        }
    }
}

fn decode_tasks(value: serde_json::Value) -> Result<Vec<Task>, AppError> {
    if !value.is_array() {
        return Err(AppError::invalid_data("expected an array of tasks"));
    }

    Ok(serde_json::from_value(value)?)
}

/// Keeps the first task seen for each id.
fn drop_duplicate_ids(key: &str, tasks: Vec<Task>) -> Vec<Task> {
    let mut seen = HashSet::with_capacity(tasks.len());
    let mut unique = Vec::with_capacity(tasks.len());
    for task in tasks {
        if seen.insert(task.id) {
            unique.push(task);
        } else {
            warn!(key, task_id = task.id, "dropping task with duplicate id");
        }
    }
    unique
}

/// Overwrites `key` with the full collection.
pub fn save_tasks(store: &mut dyn SlotStore, key: &str, tasks: &[Task]) -> Result<(), AppError> {
    let content = serde_json::to_string(tasks)?;
    store.write(key, &content)
}
