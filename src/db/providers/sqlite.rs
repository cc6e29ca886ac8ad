use anyhow::Result;
use async_trait::async_trait;
use sea_orm::{ConnectionTrait, DatabaseConnection};

use super::registry::{DbProvider, DbProviderId};

const SQLITE_BUSY_TIMEOUT_MS: u64 = 5_000;

pub struct SqliteDbProvider;

#[async_trait]
impl DbProvider for SqliteDbProvider {
    fn id(&self) -> DbProviderId {
        DbProviderId::Sqlite
    }

    fn schemes(&self) -> &'static [&'static str] {
        &["sqlite"]
    }

    /// Concurrent writers wait on the lock instead of failing with
    /// `SQLITE_BUSY`.
    async fn post_connect(&self, db: &DatabaseConnection) -> Result<()> {
        db.execute_unprepared("PRAGMA foreign_keys = ON").await?;
        db.execute_unprepared(&format!("PRAGMA busy_timeout = {SQLITE_BUSY_TIMEOUT_MS}"))
            .await?;
        Ok(())
    }
}
