use std::net::SocketAddr;

use anyhow::Context;
use axum::{Router, middleware};
use tower_http::trace::TraceLayer;

use task_manager::{
    config::AppConfig,
    db::connection,
    logging::init_tracing,
    middleware::{catch_panic_layer, json_error_middleware},
    routes::router,
    state::AppState,
};

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        tracing::error!("server failed: {err:?}");
        eprintln!("server failed: {err:#}");
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let cfg = AppConfig::from_env().context("failed to load config")?;
    init_tracing(&cfg.logging.rust_log);

    let db = connection::connect(&cfg.database).await?;
    let state = AppState::new(cfg, db);

    let app = Router::new()
        .merge(router(state.clone()))
        .layer(middleware::from_fn(json_error_middleware))
        .layer(catch_panic_layer())
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = state
        .config
        .bind_address()
        .parse()
        .with_context(|| format!("invalid host/port `{}`", state.config.bind_address()))?;
    tracing::info!("listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
