use axum::{Router, middleware};
use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase};

use crate::{
    config::AppConfig,
    middleware::{catch_panic_layer, json_error_middleware},
    routes::router,
    state::AppState,
};

/// Full application router, with the error layers `main` installs, over `db`.
pub fn app(db: DatabaseConnection) -> Router {
    let state = AppState::new(AppConfig::default(), db);
    router(state)
        .layer(middleware::from_fn(json_error_middleware))
        .layer(catch_panic_layer())
}

/// Router over a mock database with no queued results.
pub fn test_router() -> Router {
    app(MockDatabase::new(DatabaseBackend::Postgres).into_connection())
}
