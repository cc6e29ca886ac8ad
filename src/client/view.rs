use std::{
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    time::Duration,
};

use super::{ClientConfig, Debouncer, TodoApi};
use crate::models::{Todo, UpdateTodoRequest};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EditField {
    Title,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    Viewing,
    Editing { id: i32, draft: String },
}

/// Everything the view shows: the local copy of the list, the new-task input
/// box and the current interaction mode.
#[derive(Debug, Clone)]
pub struct ViewState {
    pub todos: Vec<Todo>,
    pub input: String,
    pub mode: Mode,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            todos: Vec::new(),
            input: String::new(),
            mode: Mode::Viewing,
        }
    }
}

impl ViewState {
    fn find_mut(&mut self, id: i32) -> Option<&mut Todo> {
        self.todos.iter_mut().find(|todo| todo.id == id)
    }

    fn find(&self, id: i32) -> Option<&Todo> {
        self.todos.iter().find(|todo| todo.id == id)
    }
}

/// Local mirror of the server's todo list.
///
/// Local state only changes after the server confirms a write. Failed calls
/// are logged and otherwise ignored, so the mirror can drift until the next
/// [`TodoView::load`].
pub struct TodoView<A> {
    api: Arc<A>,
    state: Arc<Mutex<ViewState>>,
    debouncer: Debouncer<(i32, EditField)>,
    debounce: Duration,
}

impl<A> Clone for TodoView<A> {
    fn clone(&self) -> Self {
        Self {
            api: Arc::clone(&self.api),
            state: Arc::clone(&self.state),
            debouncer: self.debouncer.clone(),
            debounce: self.debounce,
        }
    }
}

impl<A: TodoApi> TodoView<A> {
    pub fn new(api: A, debounce: Duration) -> Self {
        Self {
            api: Arc::new(api),
            state: Arc::new(Mutex::new(ViewState::default())),
            debouncer: Debouncer::new(),
            debounce,
        }
    }

    pub fn with_config(api: A, cfg: &ClientConfig) -> Self {
        Self::new(api, cfg.debounce)
    }

    pub fn snapshot(&self) -> ViewState {
        self.state().clone()
    }

    pub fn todos(&self) -> Vec<Todo> {
        self.state().todos.clone()
    }

    pub fn mode(&self) -> Mode {
        self.state().mode.clone()
    }

    pub fn has_pending_edit(&self, id: i32) -> bool {
        self.debouncer.is_pending(&(id, EditField::Title))
    }

    /// Inline edits that are waiting out their debounce window or whose
    /// request has not finished.
    pub fn pending_edits(&self) -> usize {
        self.debouncer.outstanding()
    }

    /// Waits until every scheduled inline edit has been sent and settled.
    pub async fn flush_edits(&self) {
        self.debouncer.flush().await;
    }

    /// Replaces the local list with the server's. On failure the current
    /// list is kept.
    pub async fn load(&self) -> bool {
        match self.api.list().await {
            Ok(todos) => {
                tracing::debug!(count = todos.len(), "todos loaded");
                self.state().todos = todos;
                true
            }
            Err(err) => {
                tracing::warn!(error = %err, "failed to fetch todos");
                false
            }
        }
    }

    pub fn set_input(&self, text: impl Into<String>) {
        self.state().input = text.into();
    }

    /// Creates a todo from the input box. Blank input is ignored.
    pub async fn add(&self) -> bool {
        let title = self.state().input.clone();
        if title.trim().is_empty() {
            return false;
        }

        match self.api.create(&title).await {
            Ok(todo) => {
                let mut state = self.state();
                state.todos.push(todo);
                state.input.clear();
                true
            }
            Err(err) => {
                tracing::warn!(error = %err, "failed to add todo");
                false
            }
        }
    }

    pub async fn toggle(&self, id: i32) -> bool {
        let Some(completed) = self.state().find(id).map(|todo| todo.completed) else {
            return false;
        };

        match self
            .api
            .update(id, &UpdateTodoRequest::completed(!completed))
            .await
        {
            Ok(_) => {
                if let Some(todo) = self.state().find_mut(id) {
                    todo.completed = !completed;
                }
                true
            }
            Err(err) => {
                tracing::warn!(id, error = %err, "failed to toggle todo");
                false
            }
        }
    }

    /// Enters edit mode for `id` with the current title as the draft.
    pub fn start_edit(&self, id: i32) -> bool {
        let mut state = self.state();
        let Some(title) = state.find(id).map(|todo| todo.title.clone()) else {
            return false;
        };
        state.mode = Mode::Editing { id, draft: title };
        true
    }

    pub fn set_draft(&self, text: impl Into<String>) -> bool {
        match &mut self.state().mode {
            Mode::Editing { draft, .. } => {
                *draft = text.into();
                true
            }
            Mode::Viewing => false,
        }
    }

    pub fn cancel_edit(&self) {
        self.state().mode = Mode::Viewing;
    }

    /// Sends the staged draft as one update. Stays in edit mode if the
    /// server rejects it.
    pub async fn commit_edit(&self) -> bool {
        let Mode::Editing { id, draft } = self.mode() else {
            return false;
        };

        match self.api.update(id, &UpdateTodoRequest::title(draft.clone())).await {
            Ok(_) => {
                let mut state = self.state();
                if let Some(todo) = state.find_mut(id) {
                    todo.title = draft;
                }
                state.mode = Mode::Viewing;
                true
            }
            Err(err) => {
                tracing::warn!(id, error = %err, "failed to save title");
                false
            }
        }
    }

    /// Keystroke-driven title editing. Each call replaces the pending update
    /// for this todo; only the last text inside the debounce window is sent.
    pub fn edit_title_inline(&self, id: i32, text: impl Into<String>) -> bool {
        if self.state().find(id).is_none() {
            return false;
        }

        let text = text.into();
        let view = self.clone();
        self.debouncer
            .schedule((id, EditField::Title), self.debounce, async move {
                match view.api.update(id, &UpdateTodoRequest::title(text.clone())).await {
                    Ok(_) => {
                        if let Some(todo) = view.state().find_mut(id) {
                            todo.title = text;
                        }
                    }
                    Err(err) => {
                        tracing::warn!(id, error = %err, "failed to update title");
                    }
                }
            });
        true
    }

    /// Deletes on the server, then drops the todo locally.
    pub async fn delete(&self, id: i32) -> bool {
        self.debouncer.cancel(&(id, EditField::Title));

        match self.api.delete(id).await {
            Ok(()) => {
                let mut state = self.state();
                state.todos.retain(|todo| todo.id != id);
                if matches!(state.mode, Mode::Editing { id: editing, .. } if editing == id) {
                    state.mode = Mode::Viewing;
                }
                true
            }
            Err(err) => {
                tracing::warn!(id, error = %err, "failed to delete todo");
                false
            }
        }
    }

    fn state(&self) -> MutexGuard<'_, ViewState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
