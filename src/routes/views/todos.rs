use std::sync::Arc;

use askama::Template;
use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::{Html, Redirect},
    routing::get,
};
use chrono::Local;

use crate::{models::Todo, services::ServiceContext, state::AppState};

#[derive(Template)]
#[template(path = "todos.html")]
struct TodosPageTemplate {
    now: String,
    project_name: String,
    todos: Vec<Todo>,
    remaining: usize,
}

type HtmlError = (StatusCode, Html<String>);

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/todos", get(todos_page))
        .with_state(state)
}

async fn index() -> Redirect {
    Redirect::to("/todos")
}

/// Server-rendered snapshot of the list. The service logs the cause of a
/// failed fetch; the page only reports the fixed message.
async fn todos_page(State(state): State<Arc<AppState>>) -> Result<Html<String>, HtmlError> {
    let todos = ServiceContext::from_state(&state)
        .todo()
        .list_todos()
        .await
        .map_err(|err| html_error(StatusCode::INTERNAL_SERVER_ERROR, err.message()))?;
    let remaining = todos.iter().filter(|todo| !todo.completed).count();
    let rendered = TodosPageTemplate {
        now: Local::now().to_rfc3339(),
        project_name: env!("CARGO_PKG_NAME").to_string(),
        todos,
        remaining,
    }
    .render()
    .map_err(|err| {
        tracing::error!(error = %err, "failed to render todos page");
        html_error(StatusCode::INTERNAL_SERVER_ERROR, "failed to render todos page")
    })?;
    Ok(Html(rendered))
}

fn html_error(status: StatusCode, message: &str) -> HtmlError {
    (status, Html(message.to_string()))
}
