use std::sync::Arc;

use axum::Router;

use crate::state::AppState;

pub mod todos;

pub fn router(state: Arc<AppState>) -> Router {
    Router::new().merge(todos::router(state))
}
