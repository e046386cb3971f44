use std::{
    fmt,
    path::{Path, PathBuf},
    str::FromStr,
};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::fs;
use tokio::io::{AsyncReadExt, AsyncWriteExt};

static DATA_DIR_NAME: &str = "quill";
static QUILL_DB_NAME: &str = "quill_db.sqlite";
static CONFIG_FILE_NAME: &str = "config.json";

// For now this directory structure should be like
// data_dir_path
// |- quill
//    |- quill_db.sqlite
//    |- config.json

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("no data directory on this platform")]
    NoDataDir,
    #[error("config io error")]
    Io(#[from] std::io::Error),
    #[error("malformed config file")]
    Json(#[from] serde_json::Error),
    #[error("unknown storage kind `{0}`, expected `memory` or `relational`")]
    UnknownStorage(String),
}

/// Which repository implementation backs the core.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageKind {
    Memory,
    #[default]
    Relational,
}

impl fmt::Display for StorageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageKind::Memory => f.write_str("memory"),
            StorageKind::Relational => f.write_str("relational"),
        }
    }
}

impl FromStr for StorageKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" => Ok(StorageKind::Memory),
            "relational" => Ok(StorageKind::Relational),
            other => Err(ConfigError::UnknownStorage(other.to_string())),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct QuillConfig {
    #[serde(default)]
    pub storage: StorageKind,

    /// Connection string for the relational backend. Unused with `memory`.
    pub database_url: String,
}

impl QuillConfig {
    /// Creates a config pointing at a SQLite file inside `data_dir`
    pub fn new(data_dir: &Path) -> Self {
        let database_path = data_dir.join(QUILL_DB_NAME);

        QuillConfig {
            storage: StorageKind::default(),
            database_url: format!("sqlite://{}?mode=rwc", database_path.display()),
        }
    }

    /// Config for a throwaway in-process store. Nothing touches the disk.
    pub fn memory() -> Self {
        QuillConfig {
            storage: StorageKind::Memory,
            database_url: String::new(),
        }
    }

    /// Loads `config.json` from `dir`, writing a fresh default there first if
    /// none exists.
    pub async fn load_or_init(dir: &Path) -> Result<Self, ConfigError> {
        let config_path = dir.join(CONFIG_FILE_NAME);

        fs::create_dir_all(dir).await?;

        if fs::try_exists(&config_path).await? {
            let mut file = fs::File::open(&config_path).await?;
            let mut contents = String::new();
            file.read_to_string(&mut contents).await?;

            let config: QuillConfig = serde_json::from_str(&contents)?;
            tracing::debug!(path = %config_path.display(), "loaded config");
            Ok(config)
        } else {
            let config = QuillConfig::new(dir);

            let json = serde_json::to_string_pretty(&config)?;
            let mut file = fs::File::create(&config_path).await?;
            file.write_all(json.as_bytes()).await?;

            tracing::info!(path = %config_path.display(), "wrote default config");
            Ok(config)
        }
    }
}

/// The platform data directory used when no explicit directory is given.
pub fn default_dir() -> Result<PathBuf, ConfigError> {
    dirs::data_dir()
        .map(|d| d.join(DATA_DIR_NAME))
        .ok_or(ConfigError::NoDataDir)
}

/// Gets the existing config or initializes a new one if it doesn't exist
pub async fn get_or_init() -> Result<QuillConfig, ConfigError> {
    QuillConfig::load_or_init(&default_dir()?).await
}
