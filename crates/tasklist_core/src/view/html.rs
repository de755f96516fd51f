use crate::view::{EmptyState, ListView, TaskEntry};

/// Renders the filter bar, the task list and the counters as markup.
pub fn render(view: &ListView) -> String {
    let mut out = String::new();

    out.push_str("<nav class=\"filters\">\n");
    for control in &view.filter_controls {
        let class = if control.active {
            "filter-btn active"
        } else {
            "filter-btn"
        };
        out.push_str(&format!(
            "  <button class=\"{class}\" data-filter=\"{}\" aria-pressed=\"{}\">{}</button>\n",
            control.filter, control.active, control.label
        ));
    }
    out.push_str("</nav>\n");

    out.push_str("<ul id=\"task-list\">\n");
    match &view.empty_state {
        Some(empty) => render_empty_state(&mut out, empty),
        None => {
            for entry in &view.entries {
                render_entry(&mut out, entry);
            }
        }
    }
    out.push_str("</ul>\n");

    out.push_str(&format!(
        "<p class=\"counters\">Total: <span id=\"total-tasks\">{}</span> | Completed: <span id=\"completed-tasks\">{}</span></p>\n",
        view.counters.total, view.counters.completed
    ));

    out
}

fn render_empty_state(out: &mut String, empty: &EmptyState) {
    out.push_str("  <div class=\"empty-list-message\" role=\"status\" aria-live=\"polite\">\n");
    out.push_str(&format!(
        "    <span role=\"img\" aria-label=\"{}\">{}</span> <p>{}</p>\n",
        escape(empty.message),
        empty.icon,
        escape(empty.message)
    ));
    out.push_str("  </div>\n");
}

fn render_entry(out: &mut String, entry: &TaskEntry) {
    let class = if entry.completed {
        "task-item completed"
    } else {
        "task-item"
    };
    out.push_str(&format!(
        "  <li class=\"{class}\" data-id=\"{}\">\n",
        escape(&entry.marker)
    ));
    out.push_str(&format!("    <span>{}</span>\n", escape(&entry.text)));
    out.push_str("    <div class=\"actions\">\n");
    out.push_str(&format!(
        "      <button class=\"complete-btn\" aria-label=\"{}\">{}</button>\n",
        entry.toggle.label, entry.toggle.icon
    ));
    out.push_str(&format!(
        "      <button class=\"delete-btn\" aria-label=\"{}\">{}</button>\n",
        entry.delete.label, entry.delete.icon
    ));
    out.push_str("    </div>\n");
    out.push_str("  </li>\n");
}

fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}
