//! Read-only projection of the collection for a rendering surface.
//!
//! [`project`] is a pure function of the collection and the active filter.
//! Calling it twice with the same inputs yields equal views.

use crate::model::{Filter, Task};
use serde::Serialize;

pub mod html;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Counters {
    pub total: usize,
    pub completed: usize,
}

impl Counters {
    /// Always counts the full collection, whatever filter is active.
    pub fn of(tasks: &[Task]) -> Self {
        Self {
            total: tasks.len(),
            completed: tasks.iter().filter(|task| task.completed).count(),
        }
    }

    pub fn pending(&self) -> usize {
        self.total - self.completed
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Control {
    pub label: &'static str,
    pub icon: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskEntry {
    pub id: i64,
    pub text: String,
    pub completed: bool,
    /// Routes clicks on this entry back to the task.
    pub marker: String,
    pub toggle: Control,
    pub delete: Control,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmptyState {
    pub filter: Filter,
    pub icon: &'static str,
    pub message: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterControl {
    pub filter: Filter,
    pub label: &'static str,
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListView {
    pub filter: Filter,
    pub counters: Counters,
    pub entries: Vec<TaskEntry>,
    pub empty_state: Option<EmptyState>,
    pub filter_controls: Vec<FilterControl>,
}

const DELETE_CONTROL: Control = Control {
    label: "Delete task",
    icon: "❌",
};

pub fn project(tasks: &[Task], filter: Filter) -> ListView {
    let entries: Vec<TaskEntry> = tasks
        .iter()
        .filter(|task| filter.matches(task))
        .map(task_entry)
        .collect();

    let empty_state = if entries.is_empty() {
        Some(empty_state_for(filter))
    } else {
        None
    };

    ListView {
        filter,
        counters: Counters::of(tasks),
        entries,
        empty_state,
        filter_controls: filter_controls(filter),
    }
}

fn task_entry(task: &Task) -> TaskEntry {
    TaskEntry {
        id: task.id,
        text: task.text.clone(),
        completed: task.completed,
        marker: task_marker(task.id),
        toggle: toggle_control(task.completed),
        delete: DELETE_CONTROL,
    }
}

fn toggle_control(completed: bool) -> Control {
    if completed {
        Control {
            label: "Mark as incomplete",
            icon: "✅",
        }
    } else {
        Control {
            label: "Mark as complete",
            icon: "✔️",
        }
    }
}

pub fn empty_state_for(filter: Filter) -> EmptyState {
    let (icon, message) = match filter {
        Filter::All => ("🎉", "Nice! No tasks added yet."),
        Filter::Pending => ("✅", "Woohoo! All pending tasks are done!"),
        Filter::Completed => ("🚀", "No completed tasks yet."),
    };
    EmptyState {
        filter,
        icon,
        message,
    }
}

pub fn filter_label(filter: Filter) -> &'static str {
    match filter {
        Filter::All => "All",
        Filter::Pending => "Pending",
        Filter::Completed => "Completed",
    }
}

fn filter_controls(active: Filter) -> Vec<FilterControl> {
    Filter::ALL
        .into_iter()
        .map(|filter| FilterControl {
            filter,
            label: filter_label(filter),
            active: filter == active,
        })
        .collect()
}

pub fn task_marker(id: i64) -> String {
    id.to_string()
}

/// Inverse of [`task_marker`]. Anything that is not a whole integer is `None`.
pub fn parse_task_marker(marker: &str) -> Option<i64> {
    marker.trim().parse().ok()
}

#[cfg(test)]
mod tests {
    use super::{Counters, empty_state_for, parse_task_marker, project, task_marker};
    use crate::model::{Filter, Task};

    fn task(id: i64, text: &str, completed: bool) -> Task {
        Task {
            id,
            text: text.to_string(),
            completed,
        }
    }

    fn sample() -> Vec<Task> {
        vec![task(1, "a", false), task(2, "b", true), task(3, "c", false)]
    }

    fn ids(tasks: &[Task], filter: Filter) -> Vec<i64> {
        project(tasks, filter)
            .entries
            .iter()
            .map(|entry| entry.id)
            .collect()
    }

    #[test]
    fn filters_preserve_collection_order() {
        let tasks = sample();

        assert_eq!(ids(&tasks, Filter::All), vec![1, 2, 3]);
        assert_eq!(ids(&tasks, Filter::Pending), vec![1, 3]);
        assert_eq!(ids(&tasks, Filter::Completed), vec![2]);
    }

    #[test]
    fn counters_ignore_active_filter() {
        let tasks = sample();

        for filter in Filter::ALL {
            let view = project(&tasks, filter);
            assert_eq!(
                view.counters,
                Counters {
                    total: 3,
                    completed: 1
                }
            );
            assert_eq!(view.counters.pending(), 2);
        }
    }

    #[test]
    fn entries_expose_text_controls_and_marker() {
        let view = project(&sample(), Filter::All);
        let pending = &view.entries[0];
        let done = &view.entries[1];

        assert_eq!(pending.text, "a");
        assert_eq!(pending.marker, "1");
        assert_eq!(pending.toggle.label, "Mark as complete");
        assert_eq!(done.toggle.label, "Mark as incomplete");
        assert_ne!(pending.toggle.icon, done.toggle.icon);
        assert_eq!(done.delete.label, "Delete task");
    }

    #[test]
    fn empty_collection_shows_no_tasks_state() {
        let view = project(&[], Filter::All);

        assert!(view.entries.is_empty());
        assert_eq!(view.empty_state, Some(empty_state_for(Filter::All)));
        assert_eq!(view.counters, Counters::default());
    }

    #[test]
    fn all_done_shows_pending_cleared_state() {
        let tasks = vec![task(1, "a", true), task(2, "b", true)];
        let view = project(&tasks, Filter::Pending);

        let empty = view.empty_state.unwrap();
        assert_eq!(empty.filter, Filter::Pending);
        assert_eq!(empty.message, "Woohoo! All pending tasks are done!");
    }

    #[test]
    fn nothing_completed_shows_completed_state() {
        let tasks = vec![task(1, "a", false)];
        let view = project(&tasks, Filter::Completed);

        assert_eq!(view.empty_state.unwrap().message, "No completed tasks yet.");
    }

    #[test]
    fn non_empty_view_has_no_empty_state() {
        assert!(project(&sample(), Filter::Pending).empty_state.is_none());
    }

    #[test]
    fn exactly_one_filter_control_is_active() {
        for filter in Filter::ALL {
            let view = project(&sample(), filter);
            let active: Vec<Filter> = view
                .filter_controls
                .iter()
                .filter(|control| control.active)
                .map(|control| control.filter)
                .collect();
            assert_eq!(active, vec![filter]);
        }
    }

    #[test]
    fn projection_is_repeatable() {
        let tasks = sample();
        assert_eq!(
            project(&tasks, Filter::Pending),
            project(&tasks, Filter::Pending)
        );
    }

    #[test]
    fn marker_round_trips_and_rejects_garbage() {
        assert_eq!(parse_task_marker(&task_marker(1_700_000_000_123)), Some(1_700_000_000_123));
        assert_eq!(parse_task_marker("abc"), None);
        assert_eq!(parse_task_marker(""), None);
        assert_eq!(parse_task_marker("12.5"), None);
    }
}
