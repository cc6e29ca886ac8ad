use askama::Template;

use super::{Mode, ViewState};

struct Row<'a> {
    id: i32,
    marker: &'static str,
    title: &'a str,
    draft: Option<&'a str>,
}

#[derive(Template)]
#[template(path = "todo_view.txt")]
struct TodoViewTemplate<'a> {
    rows: Vec<Row<'a>>,
    remaining: usize,
    input: &'a str,
}

/// Renders the view state as plain text for a terminal.
pub fn render(state: &ViewState) -> Result<String, askama::Error> {
    let editing = match &state.mode {
        Mode::Editing { id, draft } => Some((*id, draft.as_str())),
        Mode::Viewing => None,
    };

    let rows = state
        .todos
        .iter()
        .map(|todo| Row {
            id: todo.id,
            marker: if todo.completed { "x" } else { " " },
            title: &todo.title,
            draft: editing
                .filter(|(id, _)| *id == todo.id)
                .map(|(_, draft)| draft),
        })
        .collect();

    TodoViewTemplate {
        rows,
        remaining: state.todos.iter().filter(|todo| !todo.completed).count(),
        input: &state.input,
    }
    .render()
}
