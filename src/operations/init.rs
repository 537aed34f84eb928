use std::path::PathBuf;

use serde::Serialize;

use super::Status;
use crate::config::Config;
use crate::db::Database;
use crate::error::Result;

#[derive(Debug, Clone, Serialize)]
pub struct InitOutput {
    pub status: Status,
    pub root: PathBuf,
    pub db_path: PathBuf,
    pub config_path: PathBuf,
    /// Whether a default config.toml was written.
    pub created_config: bool,
    /// Whether the database file was already there.
    pub store_existed: bool,
}

/// Create the store and write default settings. An existing config file or
/// database is left as it is.
pub fn init(config: &Config) -> Result<InitOutput> {
    let store_existed = config.store_exists();
    let created_config = !config.config_path.exists();
    if created_config {
        config.save_settings()?;
    }
    Database::open_with_timeout(&config.db_path, config.busy_timeout())?.close()?;
    tracing::info!(root = %config.root.display(), created_config, store_existed, "initialized");

    Ok(InitOutput {
        status: Status::Success,
        root: config.root.clone(),
        db_path: config.db_path.clone(),
        config_path: config.config_path.clone(),
        created_config,
        store_existed,
    })
}
