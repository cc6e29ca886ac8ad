use crate::{
    db::dao::{TodoChanges, TodoDao},
    error::AppError,
    models::{Todo, UpdateTodoRequest},
    services::crud_service::{CrudErrors, CrudOp, map_dao_error},
};

const TODO_ERRORS: CrudErrors = CrudErrors {
    list_failed: "Failed to fetch todos",
    create_failed: "Failed to create todo",
    update_failed: "Failed to update todo",
    delete_failed: "Failed to delete todo",
    not_found: "Todo not found",
};

#[derive(Clone)]
pub struct TodoService {
    todo_dao: TodoDao,
}

impl TodoService {
    pub fn new(todo_dao: TodoDao) -> Self {
        Self { todo_dao }
    }

    fn map_error(op: CrudOp) -> impl FnOnce(crate::db::dao::DaoLayerError) -> AppError {
        move |err| map_dao_error(&TODO_ERRORS, op, err)
    }

    pub async fn list_todos(&self) -> Result<Vec<Todo>, AppError> {
        let todos = self
            .todo_dao
            .list_todos()
            .await
            .map_err(Self::map_error(CrudOp::List))?;
        Ok(todos.into_iter().map(Todo::from).collect())
    }

    /// Titles are stored exactly as given, blank ones included.
    pub async fn create_todo(&self, title: &str) -> Result<Todo, AppError> {
        let todo = self
            .todo_dao
            .create_todo(title)
            .await
            .map_err(Self::map_error(CrudOp::Create))?;
        tracing::info!(id = todo.id, "todo created");
        Ok(todo.into())
    }

    pub async fn update_todo(&self, id: i32, changes: TodoChanges) -> Result<Todo, AppError> {
        if changes.is_empty() {
            tracing::debug!(id, "empty update");
        }
        let todo = self
            .todo_dao
            .update_todo(id, changes)
            .await
            .map_err(Self::map_error(CrudOp::Update))?;
        tracing::info!(id, completed = todo.completed, "todo updated");
        Ok(todo.into())
    }

    pub async fn delete_todo(&self, id: i32) -> Result<(), AppError> {
        self.todo_dao
            .delete_todo(id)
            .await
            .map_err(Self::map_error(CrudOp::Delete))?;
        tracing::info!(id, "todo deleted");
        Ok(())
    }
}

/// Turns an update body into the columns to write. Fields left out of the
/// body stay untouched; `null` is rejected since neither column is nullable.
pub fn changes_from_request(request: UpdateTodoRequest) -> Result<TodoChanges, AppError> {
    let UpdateTodoRequest { title, completed } = request;
    let title = title
        .into_required()
        .map_err(|_| AppError::validation("title must not be null"))?;
    let completed = completed
        .into_required()
        .map_err(|_| AppError::validation("completed must not be null"))?;
    Ok(TodoChanges { title, completed })
}
