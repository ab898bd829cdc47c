use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;
use smsledger_import::SyncConfig;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Relative paths resolve against the config file's directory.
    pub database_path: Option<PathBuf>,
    pub days_back: u32,
    pub log_filter: Option<String>,
    pub sync: SyncConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_path: None,
            days_back: 30,
            log_filter: None,
            sync: SyncConfig::default(),
        }
    }
}

impl AppConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Defaults when the file does not exist.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn resolve_database_path(&self, config_path: &Path, data_dir: &Path) -> PathBuf {
        match &self.database_path {
            Some(p) if p.is_absolute() => p.clone(),
            Some(p) => config_path
                .parent()
                .map(|dir| dir.join(p))
                .unwrap_or_else(|| p.clone()),
            None => data_dir.join("ledger.db"),
        }
    }
}

/// Platform directories: `(config file, data dir)`.
pub fn default_locations() -> Result<(PathBuf, PathBuf)> {
    let dirs = directories::ProjectDirs::from("in", "smsledger", "smsledger")
        .context("Failed to resolve a home directory")?;
    Ok((
        dirs.config_dir().join("smsledger.toml"),
        dirs.data_dir().to_path_buf(),
    ))
}
