//! Terminal rendering surface for the task list controller.

use std::io::{self, BufRead, Write};
use tabled::settings::Style;
use tabled::{Table, Tabled};
use tasklist_core::config::Palette;
use tasklist_core::error::AppError;
use tasklist_core::view::{ListView, TaskEntry, html};
use tasklist_core::{AddRejection, Decision, DeleteRequest, Surface};
use tracing::error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Plain,
    Json,
    Html,
}

pub struct TerminalSurface<R> {
    input: R,
    palette: Palette,
    format: OutputFormat,
    echo_renders: bool,
    assume_yes: bool,
    rejection: Option<AddRejection>,
}

impl<R: BufRead> TerminalSurface<R> {
    pub fn new(input: R, palette: Palette) -> Self {
        Self {
            input,
            palette,
            format: OutputFormat::Plain,
            echo_renders: false,
            assume_yes: false,
            rejection: None,
        }
    }

    pub fn with_format(mut self, format: OutputFormat) -> Self {
        self.format = format;
        self
    }

    /// Print every view the controller renders, as an interactive session does.
    pub fn echo_renders(mut self, echo: bool) -> Self {
        self.echo_renders = echo;
        self
    }

    pub fn set_format(&mut self, format: OutputFormat) {
        self.format = format;
    }

    pub fn set_assume_yes(&mut self, assume_yes: bool) {
        self.assume_yes = assume_yes;
    }

    pub fn shows_renders(&self) -> bool {
        self.echo_renders
    }

    pub fn take_rejection(&mut self) -> Option<AddRejection> {
        self.rejection.take()
    }

    pub fn read_line(&mut self, buf: &mut String) -> io::Result<usize> {
        self.input.read_line(buf)
    }

    pub fn show(&self, view: &ListView) -> Result<(), AppError> {
        self.show_as(view, self.format)
    }

    pub fn show_as(&self, view: &ListView, format: OutputFormat) -> Result<(), AppError> {
        println!("{}", format_view(view, format, &self.palette)?);
        Ok(())
    }
}

impl<R: BufRead> Surface for TerminalSurface<R> {
    fn render(&mut self, view: &ListView) {
        if !self.echo_renders {
            return;
        }
        if let Err(err) = self.show(view) {
            error!(error = %err, "could not render task list");
        }
    }

    fn reject_input(&mut self, rejection: &AddRejection) {
        self.rejection = Some(*rejection);
    }

    /// Each command line is consumed when it is read.
    fn clear_input(&mut self) {}

    fn confirm_delete(&mut self, request: &DeleteRequest) -> Decision {
        if self.assume_yes {
            return Decision::Confirm;
        }

        eprint!("{} [y/N] ", request.prompt());
        io::stderr().flush().ok();

        let mut answer = String::new();
        match self.input.read_line(&mut answer) {
            Ok(_) => parse_answer(&answer),
            Err(err) => {
                error!(error = %err, "could not read confirmation, keeping task");
                Decision::Cancel
            }
        }
    }

    fn warn_unsaved(&mut self, error: &AppError) {
        eprintln!("WARNING: could not save tasks ({error}); the change lasts until exit");
    }
}

pub fn parse_answer(answer: &str) -> Decision {
    match answer.trim().to_ascii_lowercase().as_str() {
        "y" | "yes" => Decision::Confirm,
        _ => Decision::Cancel,
    }
}

pub fn format_view(
    view: &ListView,
    format: OutputFormat,
    palette: &Palette,
) -> Result<String, AppError> {
    match format {
        OutputFormat::Plain => Ok(format_plain(view, palette)),
        OutputFormat::Json => Ok(serde_json::to_string(view)?),
        OutputFormat::Html => Ok(html::render(view).trim_end().to_string()),
    }
}

#[derive(Tabled)]
struct TaskRow {
    #[tabled(rename = "id")]
    id: i64,
    #[tabled(rename = "done")]
    done: &'static str,
    #[tabled(rename = "task")]
    text: String,
}

impl From<&TaskEntry> for TaskRow {
    fn from(entry: &TaskEntry) -> Self {
        Self {
            id: entry.id,
            done: if entry.completed { "[x]" } else { "[ ]" },
            text: entry.text.clone(),
        }
    }
}

fn format_plain(view: &ListView, palette: &Palette) -> String {
    let filters: Vec<String> = view
        .filter_controls
        .iter()
        .map(|control| {
            if control.active {
                palette.accentize(&format!("[{}]", control.label))
            } else {
                control.label.to_string()
            }
        })
        .collect();

    let body = match &view.empty_state {
        Some(empty) => format!("{} {}", empty.icon, empty.message),
        None => {
            let rows: Vec<TaskRow> = view.entries.iter().map(TaskRow::from).collect();
            let mut table = Table::new(rows);
            table.with(Style::rounded());
            table.to_string()
        }
    };

    let counters = palette.mutedize(&format!(
        "Total: {} | Completed: {}",
        view.counters.total, view.counters.completed
    ));

    format!("Filter: {}\n{}\n{}", filters.join(" "), body, counters)
}

#[cfg(test)]
mod tests {
    use super::{OutputFormat, TerminalSurface, format_view, parse_answer};
    use std::io::Cursor;
    use tasklist_core::clock::FixedClock;
    use tasklist_core::config::palette_for_theme;
    use tasklist_core::model::{Filter, Task};
    use tasklist_core::storage::MemoryStore;
    use tasklist_core::view::project;
    use tasklist_core::{AddRejection, App, Decision, DeleteOutcome, Surface, TaskList};

    fn task(id: i64, text: &str, completed: bool) -> Task {
        Task {
            id,
            text: text.to_string(),
            completed,
        }
    }

    fn plain() -> tasklist_core::config::Palette {
        palette_for_theme(None)
    }

    #[test]
    fn plain_view_lists_tasks_and_counters() {
        let tasks = vec![task(1, "buy milk", false), task(2, "walk dog", true)];
        let out = format_view(&project(&tasks, Filter::All), OutputFormat::Plain, &plain()).unwrap();

        assert!(out.starts_with("Filter: [All] Pending Completed"));
        assert!(out.contains("buy milk"));
        assert!(out.contains("[x]"));
        assert!(out.ends_with("Total: 2 | Completed: 1"));
    }

    #[test]
    fn plain_view_shows_empty_state() {
        let tasks = vec![task(1, "done", true)];
        let out =
            format_view(&project(&tasks, Filter::Pending), OutputFormat::Plain, &plain()).unwrap();

        assert!(out.contains("Filter: All [Pending] Completed"));
        assert!(out.contains("Woohoo! All pending tasks are done!"));
    }

    #[test]
    fn json_view_carries_entries_and_counters() {
        let tasks = vec![task(1, "a", false), task(2, "b", true)];
        let out = format_view(&project(&tasks, Filter::Completed), OutputFormat::Json, &plain())
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();

        assert_eq!(value["filter"], "completed");
        assert_eq!(value["counters"]["total"], 2);
        assert_eq!(value["entries"].as_array().unwrap().len(), 1);
        assert_eq!(value["entries"][0]["marker"], "2");
    }

    #[test]
    fn html_view_is_markup() {
        let out = format_view(&project(&[], Filter::All), OutputFormat::Html, &plain()).unwrap();
        assert!(out.contains("<ul id=\"task-list\">"));
    }

    #[test]
    fn parse_answer_accepts_only_yes() {
        assert_eq!(parse_answer("y\n"), Decision::Confirm);
        assert_eq!(parse_answer(" YES "), Decision::Confirm);
        assert_eq!(parse_answer("n"), Decision::Cancel);
        assert_eq!(parse_answer(""), Decision::Cancel);
        assert_eq!(parse_answer("yep"), Decision::Cancel);
    }

    #[test]
    fn delete_reads_answer_from_input() {
        let store = MemoryStore::new().with_slot(
            "tasks",
            serde_json::to_string(&[task(1, "a", false), task(2, "b", false)]).unwrap(),
        );
        let list = TaskList::open(Box::new(store), "tasks", Box::new(FixedClock::at(0)));
        let surface = TerminalSurface::new(Cursor::new("n\ny\n"), plain());
        let mut app = App::new(list, surface);

        assert_eq!(app.delete(1), DeleteOutcome::Cancelled);
        assert_eq!(app.delete(1), DeleteOutcome::Deleted(task(1, "a", false)));
        assert_eq!(app.list().tasks(), &[task(2, "b", false)]);
    }

    #[test]
    fn assume_yes_skips_the_prompt() {
        let mut surface = TerminalSurface::new(Cursor::new(""), plain());
        surface.set_assume_yes(true);
        let store = MemoryStore::new().with_slot("tasks", r#"[{"id":1,"text":"a","completed":false}]"#);
        let list = TaskList::open(Box::new(store), "tasks", Box::new(FixedClock::at(0)));
        let mut app = App::new(list, surface);

        assert!(matches!(app.delete(1), DeleteOutcome::Deleted(_)));
    }

    #[test]
    fn closed_input_declines_delete() {
        let store = MemoryStore::new().with_slot("tasks", r#"[{"id":1,"text":"a","completed":false}]"#);
        let list = TaskList::open(Box::new(store), "tasks", Box::new(FixedClock::at(0)));
        let mut app = App::new(list, TerminalSurface::new(Cursor::new(""), plain()));

        assert_eq!(app.delete(1), DeleteOutcome::Cancelled);
        assert_eq!(app.list().tasks().len(), 1);
    }

    #[test]
    fn rejection_is_held_until_taken() {
        let mut surface = TerminalSurface::new(Cursor::new(""), plain()).with_format(OutputFormat::Json);
        surface.reject_input(&AddRejection::TooLong { len: 300 });

        assert_eq!(
            surface.take_rejection(),
            Some(AddRejection::TooLong { len: 300 })
        );
        assert_eq!(surface.take_rejection(), None);
    }
}
