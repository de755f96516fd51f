//! Binds a [`TaskList`] to whatever draws it and feeds it input.
//!
//! A surface only ever sees [`ListView`]s and answers delete prompts. The
//! controller decides the order of effects: mutate, persist, render and, for
//! adds, clear the input.

use crate::error::AppError;
use crate::model::{Filter, Task};
use crate::task_list::{AddRejection, Decision, DeleteOutcome, DeleteRequest, TaskList};
use crate::view::{ListView, parse_task_marker};
use tracing::{error, warn};

pub trait Surface {
    fn render(&mut self, view: &ListView);

    /// Say why the input was refused. The input keeps its text and focus.
    fn reject_input(&mut self, rejection: &AddRejection);

    fn clear_input(&mut self);

    fn confirm_delete(&mut self, request: &DeleteRequest) -> Decision;

    /// A change was applied but could not be saved.
    fn warn_unsaved(&mut self, error: &AppError);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskAction {
    Toggle,
    Delete,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiEvent {
    Submit(String),
    /// `marker` is the structural marker carried by the rendered entry.
    TaskAction {
        marker: String,
        action: TaskAction,
    },
    SelectFilter(String),
}

pub struct App<S: Surface> {
    list: TaskList,
    surface: S,
}

impl<S: Surface> App<S> {
    pub fn new(list: TaskList, surface: S) -> Self {
        Self { list, surface }
    }

    /// Draws the initial state.
    pub fn start(&mut self) {
        self.render();
    }

    pub fn list(&self) -> &TaskList {
        &self.list
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn dispatch(&mut self, event: UiEvent) {
        match event {
            UiEvent::Submit(raw) => {
                self.submit(&raw);
            }
            UiEvent::TaskAction { marker, action } => {
                let Some(id) = parse_task_marker(&marker) else {
                    error!(marker = %marker, "task marker is not an id");
                    return;
                };
                match action {
                    TaskAction::Toggle => {
                        self.toggle(id);
                    }
                    TaskAction::Delete => {
                        self.delete(id);
                    }
                }
            }
            UiEvent::SelectFilter(name) => match name.parse::<Filter>() {
                Ok(filter) => {
                    self.select_filter(filter);
                }
                Err(err) => warn!(error = %err, "ignoring filter selection"),
            },
        }
    }

    pub fn submit(&mut self, raw: &str) -> Option<Task> {
        match self.list.add_task(raw) {
            Ok(task) => {
                self.report_unsaved();
                self.render();
                self.surface.clear_input();
                Some(task)
            }
            Err(rejection) => {
                self.surface.reject_input(&rejection);
                None
            }
        }
    }

    pub fn toggle(&mut self, id: i64) -> Option<Task> {
        let task = self.list.toggle_task(id)?;
        self.report_unsaved();
        self.render();
        Some(task)
    }

    pub fn delete(&mut self, id: i64) -> DeleteOutcome {
        let Some(request) = self.list.request_delete(id) else {
            return DeleteOutcome::NotFound;
        };

        let decision = self.surface.confirm_delete(&request);
        let outcome = self.list.resolve_delete(request, decision);
        if let DeleteOutcome::Deleted(_) = outcome {
            self.report_unsaved();
            self.render();
        }
        outcome
    }

    /// Re-renders only when the filter actually changes.
    pub fn select_filter(&mut self, filter: Filter) -> bool {
        let changed = self.list.set_filter(filter);
        if changed {
            self.render();
        }
        changed
    }

    fn render(&mut self) {
        let view = self.list.view();
        self.surface.render(&view);
    }

    fn report_unsaved(&mut self) {
        if let Some(err) = self.list.take_save_error() {
            self.surface.warn_unsaved(&err);
        }
    }
}
