use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

pub const DEFAULT_CONFIG_PATH: &str = "config/crew_chat.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Directory holding the database and the attachment folder
    pub data_dir: PathBuf,
    /// Database file name, relative to `data_dir`
    pub database_file: String,
    pub window_title: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            database_file: "chat.db".to_string(),
            window_title: "Crew Chat".to_string(),
        }
    }
}

impl AppConfig {
    pub fn database_path(&self) -> PathBuf {
        self.data_dir.join(&self.database_file)
    }

    pub fn attachments_dir(&self) -> PathBuf {
        self.data_dir.join("attachments")
    }
}

/// Read the config at `path`. A missing file is created with defaults; an
/// unreadable one falls back to defaults without touching it.
pub fn load_config(path: &str) -> AppConfig {
    let path = Path::new(path);
    match fs::read_to_string(path) {
        Ok(content) => match serde_json::from_str::<AppConfig>(&content) {
            Ok(config) => config,
            Err(err) => {
                log::warn!("Failed to parse config file {}: {err}", path.display());
                AppConfig::default()
            }
        },
        Err(err) if err.kind() == ErrorKind::NotFound => {
            log::info!(
                "Config file {} not found; writing defaults",
                path.display()
            );
            let config = AppConfig::default();
            if let Err(err) = save_config(path, &config) {
                log::warn!("Failed to write default config {}: {err}", path.display());
            }
            config
        }
        Err(err) => {
            log::warn!("Failed to read config file {}: {err}", path.display());
            AppConfig::default()
        }
    }
}

pub fn save_config(path: &Path, config: &AppConfig) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let json = serde_json::to_string_pretty(config)?;
    fs::write(path, json)
}
