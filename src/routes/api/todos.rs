use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
    http::StatusCode,
    routing::{get, put},
};

use crate::{
    error::AppError,
    models::{CreateTodoRequest, MessageBody, Todo, UpdateTodoRequest},
    response::ApiResult,
    services::{ServiceContext, todo_service::changes_from_request},
    state::AppState,
};

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/todos", get(list_todos).post(create_todo))
        .route("/todos/{id}", put(update_todo).delete(delete_todo))
        .with_state(state)
}

async fn list_todos(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<Todo>>> {
    let todos = ServiceContext::from_state(&state).todo().list_todos().await?;
    Ok(Json(todos))
}

async fn create_todo(
    State(state): State<Arc<AppState>>,
    body: Result<Json<CreateTodoRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Todo>)> {
    let Json(body) = body.map_err(json_rejection)?;
    let todo = ServiceContext::from_state(&state)
        .todo()
        .create_todo(&body.title)
        .await?;
    Ok((StatusCode::CREATED, Json(todo)))
}

async fn update_todo(
    State(state): State<Arc<AppState>>,
    id: Result<Path<i32>, PathRejection>,
    body: Result<Json<UpdateTodoRequest>, JsonRejection>,
) -> ApiResult<Json<Todo>> {
    let Path(id) = id.map_err(path_rejection)?;
    let Json(body) = body.map_err(json_rejection)?;
    let changes = changes_from_request(body)?;
    let todo = ServiceContext::from_state(&state)
        .todo()
        .update_todo(id, changes)
        .await?;
    Ok(Json(todo))
}

async fn delete_todo(
    State(state): State<Arc<AppState>>,
    id: Result<Path<i32>, PathRejection>,
) -> ApiResult<Json<MessageBody>> {
    let Path(id) = id.map_err(path_rejection)?;
    ServiceContext::from_state(&state)
        .todo()
        .delete_todo(id)
        .await?;
    Ok(Json(MessageBody {
        message: "Todo deleted".to_string(),
    }))
}

fn json_rejection(rejection: JsonRejection) -> AppError {
    AppError::validation(rejection.body_text())
}

fn path_rejection(rejection: PathRejection) -> AppError {
    AppError::validation(rejection.body_text())
}
