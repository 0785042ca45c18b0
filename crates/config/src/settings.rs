// Application settings
// Loaded from <config_dir>/propostas/settings.toml

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::ConfigError;

pub const APP_DIR: &str = "propostas";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ImportSettings {
    /// Encoding label for the delimited exports
    pub encoding: String,

    /// Re-join sources left out of an import from the latest batch
    pub carry_over: bool,

    /// Column schema overriding the built-in header candidates
    pub schema: Option<PathBuf>,
}

impl Default for ImportSettings {
    fn default() -> Self {
        Self {
            encoding: "utf-8".to_string(),
            carry_over: true,
            schema: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
    /// SQLite file holding the batches; None = platform data dir
    pub database: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub import: ImportSettings,
    pub storage: StorageSettings,
}

impl Settings {
    /// Get the settings file path
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(APP_DIR)
            .join("settings.toml")
    }

    /// Load settings from the default path. A missing file means defaults.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::config_path())
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            log::debug!("no settings at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;

        toml::from_str(&contents).map_err(|e| ConfigError::Parse {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    }

    /// Batch database path: configured, else `<data_dir>/propostas/store.sqlite3`.
    pub fn database_path(&self) -> PathBuf {
        match &self.storage.database {
            Some(path) => path.clone(),
            None => dirs::data_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(APP_DIR)
                .join("store.sqlite3"),
        }
    }
}
