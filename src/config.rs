use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{KbError, Result};

/// Default directory name for knowledge base data.
const KB_DIR: &str = ".kb";
/// Default database filename.
const DB_FILE: &str = "knowledge.db";
/// Config filename.
const CONFIG_FILE: &str = "config.toml";

/// Store location and settings resolved from a root directory.
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory the `.kb/` folder lives in.
    pub root: PathBuf,
    /// Path to the `.kb/` directory.
    pub kb_dir: PathBuf,
    /// Path to the `SQLite` database.
    pub db_path: PathBuf,
    /// Path to the config file.
    pub config_path: PathBuf,
    /// User settings loaded from config.toml.
    pub settings: UserSettings,
}

/// User-configurable settings from .kb/config.toml.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserSettings {
    pub storage: StorageSettings,
    pub dependencies: DependencySettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
    /// How long a unit of work waits for the database lock.
    pub busy_timeout_ms: u64,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            busy_timeout_ms: 5000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DependencySettings {
    /// Traversal depth when the caller gives none.
    pub default_max_depth: usize,
    /// Largest traversal depth a caller may request.
    pub max_depth_cap: usize,
}

impl Default for DependencySettings {
    fn default() -> Self {
        Self {
            default_max_depth: 1,
            max_depth_cap: 10,
        }
    }
}

impl DependencySettings {
    /// Resolve a requested depth: default when absent, clamped to `1..=cap`.
    #[must_use]
    pub fn resolve(&self, requested: Option<usize>) -> usize {
        let cap = self.max_depth_cap.max(1);
        requested
            .unwrap_or(self.default_max_depth)
            .clamp(1, cap)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Filter directive used when `RUST_LOG` is unset.
    pub level: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".into(),
        }
    }
}

impl Config {
    /// Create config for a given root directory.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let kb_dir = root.join(KB_DIR);
        let db_path = kb_dir.join(DB_FILE);
        let config_path = kb_dir.join(CONFIG_FILE);

        let settings = Self::load_settings(&config_path).unwrap_or_default();

        Self {
            root,
            kb_dir,
            db_path,
            config_path,
            settings,
        }
    }

    /// Create config from the current working directory.
    pub fn from_cwd() -> Result<Self> {
        let cwd = std::env::current_dir()
            .map_err(|e| KbError::Config(format!("cannot get cwd: {e}")))?;
        Ok(Self::new(cwd))
    }

    /// Point the store at an explicit database file. Settings still come
    /// from the root's `.kb/config.toml`.
    #[must_use]
    pub fn with_db_path(mut self, db_path: impl Into<PathBuf>) -> Self {
        self.db_path = db_path.into();
        self
    }

    /// Load settings from config.toml if it exists and parses.
    fn load_settings(config_path: &Path) -> Option<UserSettings> {
        if !config_path.exists() {
            return None;
        }
        let content = std::fs::read_to_string(config_path).ok()?;
        match toml::from_str(&content) {
            Ok(settings) => Some(settings),
            Err(e) => {
                tracing::warn!(path = %config_path.display(), error = %e, "ignoring invalid config");
                None
            }
        }
    }

    /// Save current settings to config.toml.
    pub fn save_settings(&self) -> Result<()> {
        self.ensure_kb_dir()?;
        let content = toml::to_string_pretty(&self.settings)
            .map_err(|e| KbError::Config(format!("failed to serialize settings: {e}")))?;
        std::fs::write(&self.config_path, content)?;
        Ok(())
    }

    /// Ensure the `.kb/` directory exists.
    pub fn ensure_kb_dir(&self) -> Result<()> {
        std::fs::create_dir_all(&self.kb_dir)?;
        Ok(())
    }

    /// Check whether the database file exists.
    #[must_use]
    pub fn store_exists(&self) -> bool {
        self.db_path.exists()
    }

    #[must_use]
    pub fn busy_timeout(&self) -> Duration {
        Duration::from_millis(self.settings.storage.busy_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn config_new_sets_paths() {
        let cfg = Config::new("/tmp/project");
        assert_eq!(cfg.root, PathBuf::from("/tmp/project"));
        assert_eq!(cfg.kb_dir, PathBuf::from("/tmp/project/.kb"));
        assert_eq!(cfg.db_path, PathBuf::from("/tmp/project/.kb/knowledge.db"));
        assert_eq!(
            cfg.config_path,
            PathBuf::from("/tmp/project/.kb/config.toml")
        );
    }

    #[test]
    fn db_path_override() {
        let cfg = Config::new("/tmp/project").with_db_path("/data/shared.db");
        assert_eq!(cfg.db_path, PathBuf::from("/data/shared.db"));
        assert_eq!(cfg.kb_dir, PathBuf::from("/tmp/project/.kb"));
    }

    #[test]
    fn ensure_kb_dir_creates_directory() {
        let tmp = TempDir::new().unwrap();
        let cfg = Config::new(tmp.path());
        assert!(!cfg.kb_dir.exists());
        cfg.ensure_kb_dir().unwrap();
        assert!(cfg.kb_dir.exists());
        assert!(!cfg.store_exists());
    }

    #[test]
    fn default_settings() {
        let settings = UserSettings::default();
        assert_eq!(settings.storage.busy_timeout_ms, 5000);
        assert_eq!(settings.dependencies.default_max_depth, 1);
        assert_eq!(settings.dependencies.max_depth_cap, 10);
        assert_eq!(settings.logging.level, "info");
    }

    #[test]
    fn save_and_load_settings() {
        let tmp = TempDir::new().unwrap();
        let mut cfg = Config::new(tmp.path());
        cfg.settings.storage.busy_timeout_ms = 250;
        cfg.settings.dependencies.max_depth_cap = 4;
        cfg.settings.logging.level = "debug".into();
        cfg.save_settings().unwrap();
        assert!(cfg.config_path.exists());

        let cfg2 = Config::new(tmp.path());
        assert_eq!(cfg2.settings, cfg.settings);
        assert_eq!(cfg2.busy_timeout(), Duration::from_millis(250));
    }

    #[test]
    fn partial_config_keeps_other_defaults() {
        let tmp = TempDir::new().unwrap();
        let cfg = Config::new(tmp.path());
        cfg.ensure_kb_dir().unwrap();
        std::fs::write(&cfg.config_path, "[dependencies]\nmax_depth_cap = 3\n").unwrap();

        let cfg = Config::new(tmp.path());
        assert_eq!(cfg.settings.dependencies.max_depth_cap, 3);
        assert_eq!(cfg.settings.dependencies.default_max_depth, 1);
        assert_eq!(cfg.settings.storage.busy_timeout_ms, 5000);
    }

    #[test]
    fn load_invalid_config_uses_defaults() {
        let tmp = TempDir::new().unwrap();
        let kb_dir = tmp.path().join(".kb");
        std::fs::create_dir_all(&kb_dir).unwrap();
        std::fs::write(kb_dir.join("config.toml"), "invalid toml {{{{").unwrap();

        let cfg = Config::new(tmp.path());
        assert_eq!(cfg.settings, UserSettings::default());
    }

    #[test]
    fn depth_resolution() {
        let deps = DependencySettings::default();
        assert_eq!(deps.resolve(None), 1);
        assert_eq!(deps.resolve(Some(0)), 1);
        assert_eq!(deps.resolve(Some(4)), 4);
        assert_eq!(deps.resolve(Some(50)), 10);

        let zero_cap = DependencySettings {
            default_max_depth: 3,
            max_depth_cap: 0,
        };
        assert_eq!(zero_cap.resolve(None), 1);
    }
}
