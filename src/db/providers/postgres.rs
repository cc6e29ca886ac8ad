use async_trait::async_trait;

use super::registry::{DbProvider, DbProviderId};

pub struct PostgresDbProvider;

#[async_trait]
impl DbProvider for PostgresDbProvider {
    fn id(&self) -> DbProviderId {
        DbProviderId::Postgres
    }

    fn schemes(&self) -> &'static [&'static str] {
        &["postgres", "postgresql"]
    }
}
