use std::{sync::Arc, time::Duration};

use anyhow::{Result, bail};
use async_trait::async_trait;
use sea_orm::{ConnectOptions, Database, DatabaseConnection};

use crate::config::DatabaseConfig;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DbProviderId {
    Postgres,
    Sqlite,
}

impl DbProviderId {
    pub fn as_str(self) -> &'static str {
        match self {
            DbProviderId::Postgres => "postgres",
            DbProviderId::Sqlite => "sqlite",
        }
    }
}

/// A database backend the todo store can run on, chosen by URL scheme.
#[async_trait]
pub trait DbProvider: Send + Sync {
    fn id(&self) -> DbProviderId;

    /// Lowercase URL schemes this backend answers to, without the `:`.
    fn schemes(&self) -> &'static [&'static str];

    async fn connect(&self, cfg: &DatabaseConfig) -> Result<DatabaseConnection> {
        let mut options = ConnectOptions::new(cfg.url.clone());
        options
            .max_connections(cfg.max_connections)
            .min_connections(cfg.min_idle)
            .connect_timeout(CONNECT_TIMEOUT)
            .sqlx_logging(false);
        Ok(Database::connect(options).await?)
    }

    /// Per-connection setup that has to run before the schema sync.
    async fn post_connect(&self, _db: &DatabaseConnection) -> Result<()> {
        Ok(())
    }
}

/// Lowercased scheme of `url`, i.e. everything before the first `:`.
fn url_scheme(url: &str) -> Option<String> {
    let (scheme, _) = url.trim().split_once(':')?;
    let valid = !scheme.is_empty()
        && scheme
            .chars()
            .all(|ch| ch.is_ascii_alphanumeric() || matches!(ch, '+' | '-' | '.'));
    valid.then(|| scheme.to_ascii_lowercase())
}

#[derive(Default)]
pub struct DbProviders {
    providers: Vec<Arc<dyn DbProvider>>,
}

impl DbProviders {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_provider(mut self, provider: Arc<dyn DbProvider>) -> Result<Self> {
        self.register(provider)?;
        Ok(self)
    }

    /// Adds `provider` unless its id or one of its schemes is already taken.
    pub fn register(&mut self, provider: Arc<dyn DbProvider>) -> Result<()> {
        for existing in &self.providers {
            if existing.id() == provider.id() {
                bail!("database provider already registered: {}", provider.id().as_str());
            }
            if let Some(scheme) = provider
                .schemes()
                .iter()
                .find(|scheme| existing.schemes().contains(*scheme))
            {
                bail!(
                    "scheme `{scheme}` already handled by {}",
                    existing.id().as_str()
                );
            }
        }
        self.providers.push(provider);
        Ok(())
    }

    /// Picks the provider for `url`. Errors only ever echo the scheme, never
    /// the credentials that may follow it.
    pub fn resolve(&self, url: &str) -> Result<Arc<dyn DbProvider>> {
        let Some(scheme) = url_scheme(url) else {
            bail!("database url has no scheme");
        };

        match self
            .providers
            .iter()
            .find(|provider| provider.schemes().iter().any(|known| *known == scheme))
        {
            Some(provider) => Ok(Arc::clone(provider)),
            None => bail!(
                "unsupported database scheme `{scheme}`; known schemes: {}",
                self.known_schemes().join(", ")
            ),
        }
    }

    fn known_schemes(&self) -> Vec<&'static str> {
        self.providers
            .iter()
            .flat_map(|provider| provider.schemes().iter().copied())
            .collect()
    }
}
