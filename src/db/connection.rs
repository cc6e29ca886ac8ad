use sea_orm::DatabaseConnection;
use tracing::info;

use crate::config::DatabaseConfig;

use super::providers;

/// Opens the configured database and makes sure every entity table exists.
pub async fn connect(cfg: &DatabaseConfig) -> anyhow::Result<DatabaseConnection> {
    let registry = providers::default_registry()?;
    let provider = registry.resolve(&cfg.url)?;
    info!(provider = provider.id().as_str(), "connecting to database");

    let db = provider.connect(cfg).await?;
    provider.post_connect(&db).await?;

    info!("syncing database schema from entities");
    db.get_schema_registry("task_manager::db::entities::*")
        .sync(&db)
        .await?;
    Ok(db)
}
