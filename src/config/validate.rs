use anyhow::{Result, bail};

use super::AppConfig;

pub fn validate(cfg: &AppConfig) -> Result<()> {
    let mut errors: Vec<String> = Vec::new();

    if cfg.general.host.trim().is_empty() {
        errors.push("general.host must not be empty".to_string());
    }

    if cfg.logging.rust_log.trim().is_empty() {
        errors.push("logging.rust_log must not be empty".to_string());
    }

    let database = &cfg.database;
    if database.url.trim().is_empty() {
        errors.push("database.url must not be empty".to_string());
    }

    if database.max_connections == 0 {
        errors.push("database.max_connections must be > 0".to_string());
    }

    if database.min_idle > database.max_connections {
        errors.push(format!(
            "database.min_idle ({}) must be <= database.max_connections ({})",
            database.min_idle, database.max_connections
        ));
    }

    if errors.is_empty() {
        return Ok(());
    }

    bail!("invalid app config:\n- {}", errors.join("\n- "))
}
