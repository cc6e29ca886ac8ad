use ::config::{Config, Environment};
use anyhow::{Context, Result};
use serde::de::DeserializeOwned;

/// Settings read from `<PREFIX>_<SECTION>__<KEY>` variables, checked with
/// [`EnvConfig::validate`] before they are handed out.
pub trait EnvConfig: Sized + DeserializeOwned {
    const PREFIX: &'static str = "APP";
    const SEPARATOR: &'static str = "__";

    fn validate(&self) -> Result<()> {
        Ok(())
    }

    /// Process environment, after `.env` in the working directory (if any)
    /// has been merged into it.
    fn from_env() -> Result<Self> {
        match dotenvy::dotenv() {
            Ok(_) => {}
            Err(err) if err.not_found() => {}
            Err(err) => return Err(err).context("failed to read .env"),
        }
        Self::load(Self::environment())
    }

    /// Same as [`EnvConfig::from_env`] but over an explicit variable set.
    fn from_vars<I, K, V>(vars: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let vars = vars
            .into_iter()
            .map(|(key, value)| (key.into(), value.into()))
            .collect();
        Self::load(Self::environment().source(Some(vars)))
    }

    fn environment() -> Environment {
        Environment::with_prefix(Self::PREFIX)
            .prefix_separator("_")
            .separator(Self::SEPARATOR)
            .try_parsing(true)
    }

    fn load(source: Environment) -> Result<Self> {
        let cfg: Self = Config::builder()
            .add_source(source)
            .build()
            .context("failed to read config variables")?
            .try_deserialize()
            .context("failed to deserialize config")?;
        cfg.validate()?;
        Ok(cfg)
    }
}
