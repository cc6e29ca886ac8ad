use sea_orm::DatabaseConnection;

use crate::{db::dao::DaoContext, services::todo_service::TodoService, state::AppState};

#[derive(Clone)]
pub struct ServiceContext {
    daos: DaoContext,
}

impl ServiceContext {
    pub fn new(db: &DatabaseConnection) -> Self {
        Self {
            daos: DaoContext::new(db),
        }
    }

    pub fn from_state(state: &AppState) -> Self {
        Self::new(&state.db)
    }

    pub fn todo(&self) -> TodoService {
        TodoService::new(self.daos.todo())
    }
}
