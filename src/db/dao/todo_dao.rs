use sea_orm::{DatabaseConnection, Order, Set};

use super::{DaoBase, DaoResult};
use crate::db::entities::prelude::Todo;
use crate::db::entities::todo;

#[derive(Clone)]
pub struct TodoDao {
    db: DatabaseConnection,
}

impl DaoBase for TodoDao {
    type Entity = Todo;

    fn from_db(db: DatabaseConnection) -> Self {
        Self { db }
    }

    fn db(&self) -> &DatabaseConnection {
        &self.db
    }
}

/// Columns to overwrite on an existing todo. `None` leaves the column alone.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TodoChanges {
    pub title: Option<String>,
    pub completed: Option<bool>,
}

impl TodoChanges {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.completed.is_none()
    }
}

impl TodoDao {
    pub async fn create_todo(&self, title: &str) -> DaoResult<todo::Model> {
        let model = todo::ActiveModel {
            title: Set(title.to_string()),
            completed: Set(false),
            ..Default::default()
        };
        self.create(model).await
    }

    pub async fn list_todos(&self) -> DaoResult<Vec<todo::Model>> {
        self.find_all(Some((todo::Column::Id, Order::Asc)), |query| query)
            .await
    }

    pub async fn update_todo(&self, id: i32, changes: TodoChanges) -> DaoResult<todo::Model> {
        let TodoChanges { title, completed } = changes;
        self.update(id, move |active| {
            if let Some(title) = title {
                active.title = Set(title);
            }
            if let Some(completed) = completed {
                active.completed = Set(completed);
            }
        })
        .await
    }

    pub async fn delete_todo(&self, id: i32) -> DaoResult<i32> {
        self.delete(id).await
    }
}

#[cfg(test)]
mod tests {
    use chrono::{FixedOffset, TimeZone};
    use sea_orm::{DatabaseBackend, DbErr, MockDatabase, MockExecResult};

    use crate::db::entities::todo;

    use super::{TodoChanges, TodoDao};
    use crate::db::dao::{DaoBase, DaoLayerError};

    fn ts() -> chrono::DateTime<chrono::FixedOffset> {
        FixedOffset::east_opt(0)
            .expect("offset should be valid")
            .with_ymd_and_hms(2026, 1, 1, 0, 0, 0)
            .single()
            .expect("timestamp should be valid")
    }

    fn todo_model(id: i32, title: &str, completed: bool) -> todo::Model {
        todo::Model {
            id,
            title: title.to_string(),
            completed,
            created_at: ts(),
        }
    }

    #[tokio::test]
    async fn create_todo_returns_inserted_row() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[todo_model(1, "Buy milk", false)]])
            .into_connection();
        let dao = TodoDao::new(&db);

        let created = dao.create_todo("Buy milk").await.expect("insert should succeed");

        assert_eq!(created.id, 1);
        assert_eq!(created.title, "Buy milk");
        assert!(!created.completed);
    }

    #[tokio::test]
    async fn list_todos_returns_every_row() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[todo_model(1, "a", false), todo_model(2, "b", true)]])
            .into_connection();
        let dao = TodoDao::new(&db);

        let todos = dao.list_todos().await.expect("query should succeed");
        let ids: Vec<i32> = todos.iter().map(|todo| todo.id).collect();
        assert_eq!(ids, vec![1, 2]);
    }

    #[tokio::test]
    async fn update_todo_reports_missing_rows_as_not_found() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<todo::Model>::new()])
            .into_connection();
        let dao = TodoDao::new(&db);

        let err = dao
            .update_todo(
                42,
                TodoChanges {
                    completed: Some(true),
                    ..Default::default()
                },
            )
            .await
            .expect_err("missing row should fail");

        assert!(matches!(err, DaoLayerError::NotFound { id: 42, .. }));
    }

    #[tokio::test]
    async fn update_todo_without_changes_skips_the_write() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[todo_model(3, "keep", false)]])
            .into_connection();
        let dao = TodoDao::new(&db);

        let model = dao
            .update_todo(3, TodoChanges::default())
            .await
            .expect("empty update should succeed");
        assert_eq!(model, todo_model(3, "keep", false));

        assert_eq!(db.into_transaction_log().len(), 1);
    }

    #[tokio::test]
    async fn update_todo_returns_the_written_row() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[todo_model(3, "keep", false)]])
            .append_query_results([[todo_model(3, "keep", true)]])
            .into_connection();
        let dao = TodoDao::new(&db);

        let model = dao
            .update_todo(
                3,
                TodoChanges {
                    completed: Some(true),
                    ..Default::default()
                },
            )
            .await
            .expect("update should succeed");

        assert!(model.completed);
        assert_eq!(model.title, "keep");
    }

    #[tokio::test]
    async fn delete_todo_reports_missing_rows_as_not_found() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 0,
            }])
            .into_connection();
        let dao = TodoDao::new(&db);

        let err = dao.delete_todo(7).await.expect_err("missing row should fail");
        assert!(matches!(err, DaoLayerError::NotFound { id: 7, .. }));
    }

    #[tokio::test]
    async fn list_todos_maps_database_errors() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_errors([DbErr::Custom("connection reset".to_string())])
            .into_connection();
        let dao = TodoDao::new(&db);

        let err = dao.list_todos().await.expect_err("query should fail");
        assert!(matches!(err, DaoLayerError::Db(_)));
    }
}
