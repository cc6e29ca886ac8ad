use std::{
    sync::{
        Arc, Mutex,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};

use async_trait::async_trait;
use chrono::Utc;

use task_manager::{
    client::{ClientError, ClientResult, Mode, TodoApi, TodoView, render},
    models::{Patch, Todo, UpdateTodoRequest},
};

#[derive(Debug, Clone, PartialEq)]
enum Call {
    List,
    Create(String),
    Update(i32, UpdateTodoRequest),
    Delete(i32),
}

/// In-memory server that records every call and can be told to fail.
#[derive(Clone, Default)]
struct FakeApi {
    todos: Arc<Mutex<Vec<Todo>>>,
    calls: Arc<Mutex<Vec<Call>>>,
    failing: Arc<AtomicBool>,
    latency: Duration,
}

impl FakeApi {
    fn with_todos(titles: &[&str]) -> Self {
        let api = Self::default();
        {
            let mut todos = api.todos.lock().unwrap();
            for (index, title) in titles.iter().enumerate() {
                todos.push(todo(index as i32 + 1, title));
            }
        }
        api
    }

    fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn fail(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    fn record(&self, call: Call) -> ClientResult<()> {
        self.calls.lock().unwrap().push(call);
        if self.failing.load(Ordering::SeqCst) {
            return Err(ClientError::Status {
                status: 500,
                message: "boom".to_string(),
            });
        }
        Ok(())
    }
}

fn todo(id: i32, title: &str) -> Todo {
    Todo {
        id,
        title: title.to_string(),
        completed: false,
        created_at: Utc::now().fixed_offset(),
    }
}

#[async_trait]
impl TodoApi for FakeApi {
    async fn list(&self) -> ClientResult<Vec<Todo>> {
        self.record(Call::List)?;
        Ok(self.todos.lock().unwrap().clone())
    }

    async fn create(&self, title: &str) -> ClientResult<Todo> {
        self.record(Call::Create(title.to_string()))?;
        let mut todos = self.todos.lock().unwrap();
        let next = todos.iter().map(|todo| todo.id).max().unwrap_or(0) + 1;
        let created = todo(next, title);
        todos.push(created.clone());
        Ok(created)
    }

    async fn update(&self, id: i32, changes: &UpdateTodoRequest) -> ClientResult<Todo> {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        self.record(Call::Update(id, changes.clone()))?;
        let mut todos = self.todos.lock().unwrap();
        let stored = todos
            .iter_mut()
            .find(|todo| todo.id == id)
            .ok_or(ClientError::Status {
                status: 404,
                message: "Todo not found".to_string(),
            })?;
        if let Some(title) = changes.title.value() {
            stored.title = title.clone();
        }
        if let Some(completed) = changes.completed.value() {
            stored.completed = *completed;
        }
        Ok(stored.clone())
    }

    async fn delete(&self, id: i32) -> ClientResult<()> {
        self.record(Call::Delete(id))?;
        self.todos.lock().unwrap().retain(|todo| todo.id != id);
        Ok(())
    }
}

const DEBOUNCE: Duration = Duration::from_millis(500);

async fn loaded_view(titles: &[&str]) -> (FakeApi, TodoView<FakeApi>) {
    let api = FakeApi::with_todos(titles);
    let view = TodoView::new(api.clone(), DEBOUNCE);
    assert!(view.load().await);
    (api, view)
}

fn titles(view: &TodoView<FakeApi>) -> Vec<String> {
    view.todos().into_iter().map(|todo| todo.title).collect()
}

#[tokio::test]
async fn load_replaces_local_state() {
    let (api, view) = loaded_view(&["Buy milk", "Walk dog"]).await;

    assert_eq!(titles(&view), vec!["Buy milk", "Walk dog"]);
    assert_eq!(api.calls(), vec![Call::List]);
}

#[tokio::test]
async fn failed_load_keeps_the_current_list() {
    let (api, view) = loaded_view(&["Buy milk"]).await;
    api.fail(true);

    assert!(!view.load().await);
    assert_eq!(titles(&view), vec!["Buy milk"]);
}

#[tokio::test]
async fn add_ignores_blank_input() {
    let (api, view) = loaded_view(&[]).await;

    view.set_input("   ");
    assert!(!view.add().await);

    assert_eq!(api.calls(), vec![Call::List]);
    assert!(view.todos().is_empty());
}

#[tokio::test]
async fn add_appends_the_server_record_and_clears_input() {
    let (api, view) = loaded_view(&["Buy milk"]).await;

    view.set_input("Walk dog");
    assert!(view.add().await);

    assert_eq!(api.calls().last(), Some(&Call::Create("Walk dog".to_string())));
    let todos = view.todos();
    assert_eq!(todos.len(), 2);
    assert_eq!(todos[1].id, 2);
    assert_eq!(todos[1].title, "Walk dog");
    assert!(view.snapshot().input.is_empty());
}

#[tokio::test]
async fn failed_add_keeps_the_input() {
    let (api, view) = loaded_view(&[]).await;
    api.fail(true);

    view.set_input("Walk dog");
    assert!(!view.add().await);

    assert!(view.todos().is_empty());
    assert_eq!(view.snapshot().input, "Walk dog");
}

#[tokio::test]
async fn toggle_flips_after_the_server_confirms() {
    let (api, view) = loaded_view(&["Buy milk"]).await;

    assert!(view.toggle(1).await);

    assert_eq!(
        api.calls().last(),
        Some(&Call::Update(1, UpdateTodoRequest::completed(true)))
    );
    assert!(view.todos()[0].completed);
}

#[tokio::test]
async fn failed_toggle_leaves_state_untouched() {
    let (api, view) = loaded_view(&["Buy milk"]).await;
    api.fail(true);

    assert!(!view.toggle(1).await);
    assert!(!view.todos()[0].completed);
}

#[tokio::test]
async fn delete_removes_only_after_confirmation() {
    let (api, view) = loaded_view(&["Buy milk", "Walk dog"]).await;

    api.fail(true);
    assert!(!view.delete(1).await);
    assert_eq!(titles(&view), vec!["Buy milk", "Walk dog"]);

    api.fail(false);
    assert!(view.delete(1).await);
    assert_eq!(titles(&view), vec!["Walk dog"]);
}

#[tokio::test]
async fn edit_mode_commit_sends_one_update() {
    let (api, view) = loaded_view(&["Buy milk"]).await;

    assert!(view.start_edit(1));
    assert_eq!(
        view.mode(),
        Mode::Editing {
            id: 1,
            draft: "Buy milk".to_string()
        }
    );
    view.set_draft("B");
    view.set_draft("Bu");
    view.set_draft("Buy oat milk");
    assert!(view.commit_edit().await);

    let updates: Vec<Call> = api
        .calls()
        .into_iter()
        .filter(|call| matches!(call, Call::Update(..)))
        .collect();
    assert_eq!(
        updates,
        vec![Call::Update(1, UpdateTodoRequest::title("Buy oat milk"))]
    );
    assert_eq!(view.mode(), Mode::Viewing);
    assert_eq!(titles(&view), vec!["Buy oat milk"]);
}

#[tokio::test]
async fn failed_commit_stays_in_edit_mode() {
    let (api, view) = loaded_view(&["Buy milk"]).await;
    view.start_edit(1);
    view.set_draft("Buy bread");
    api.fail(true);

    assert!(!view.commit_edit().await);

    assert!(matches!(view.mode(), Mode::Editing { id: 1, .. }));
    assert_eq!(titles(&view), vec!["Buy milk"]);
}

#[tokio::test]
async fn cancel_discards_the_draft() {
    let (api, view) = loaded_view(&["Buy milk"]).await;
    view.start_edit(1);
    view.set_draft("something else");

    view.cancel_edit();

    assert_eq!(view.mode(), Mode::Viewing);
    assert_eq!(titles(&view), vec!["Buy milk"]);
    assert_eq!(api.calls(), vec![Call::List]);
}

#[tokio::test]
async fn unknown_ids_are_ignored_locally() {
    let (api, view) = loaded_view(&["Buy milk"]).await;

    assert!(!view.toggle(9).await);
    assert!(!view.start_edit(9));
    assert!(!view.edit_title_inline(9, "x"));
    assert!(!view.set_draft("not editing"));
    assert_eq!(api.calls(), vec![Call::List]);
}

#[tokio::test(start_paused = true)]
async fn inline_edits_are_debounced_to_the_last_text() {
    let (api, view) = loaded_view(&["Buy milk"]).await;

    for text in ["a", "ab", "abc"] {
        assert!(view.edit_title_inline(1, text));
        tokio::time::sleep(Duration::from_millis(100)).await;
    }
    assert!(view.has_pending_edit(1));
    assert_eq!(api.calls(), vec![Call::List]);

    tokio::time::sleep(DEBOUNCE).await;

    assert_eq!(
        api.calls(),
        vec![Call::List, Call::Update(1, UpdateTodoRequest::title("abc"))]
    );
    assert_eq!(titles(&view), vec!["abc"]);
    assert_eq!(view.pending_edits(), 0);
}

#[tokio::test(start_paused = true)]
async fn inline_edits_to_different_todos_do_not_cancel_each_other() {
    let (api, view) = loaded_view(&["one", "two"]).await;

    view.edit_title_inline(1, "uno");
    view.edit_title_inline(2, "dos");
    tokio::time::sleep(DEBOUNCE * 2).await;

    let updates = api
        .calls()
        .into_iter()
        .filter(|call| matches!(call, Call::Update(..)))
        .count();
    assert_eq!(updates, 2);
    assert_eq!(titles(&view), vec!["uno", "dos"]);
}

#[tokio::test(start_paused = true)]
async fn flush_waits_for_an_inline_edit_already_on_the_wire() {
    let api = FakeApi::with_todos(&["Buy milk"]).with_latency(Duration::from_millis(200));
    let view = TodoView::new(api.clone(), DEBOUNCE);
    assert!(view.load().await);

    assert!(view.edit_title_inline(1, "Buy bread"));
    tokio::time::sleep(DEBOUNCE + Duration::from_millis(10)).await;

    assert!(!view.has_pending_edit(1));
    assert_eq!(view.pending_edits(), 1);
    assert_eq!(api.calls(), vec![Call::List]);

    view.flush_edits().await;

    assert_eq!(view.pending_edits(), 0);
    assert_eq!(
        api.calls(),
        vec![Call::List, Call::Update(1, UpdateTodoRequest::title("Buy bread"))]
    );
    assert_eq!(titles(&view), vec!["Buy bread"]);
}

#[tokio::test(start_paused = true)]
async fn delete_drops_a_pending_inline_edit() {
    let (api, view) = loaded_view(&["Buy milk"]).await;

    view.edit_title_inline(1, "Buy bread");
    assert!(view.delete(1).await);
    tokio::time::sleep(DEBOUNCE * 2).await;

    assert_eq!(api.calls(), vec![Call::List, Call::Delete(1)]);
}

#[tokio::test]
async fn render_reflects_the_view() {
    let (_, view) = loaded_view(&["Buy milk", "Walk dog"]).await;
    view.toggle(1).await;
    view.start_edit(2);
    view.set_draft("Walk the dog");

    let text = render(&view.snapshot()).expect("render should succeed");

    assert!(text.contains("[x] #1 Buy milk"));
    assert!(text.contains("[ ] #2 Walk the dog_ (editing)"));
}

#[test]
fn update_requests_carry_only_set_fields() {
    let request = UpdateTodoRequest::title("abc");
    assert!(request.completed.is_absent());
    assert_eq!(request.title, Patch::Value("abc".to_string()));
}
