use std::fs;
use std::path::{Path, PathBuf};

use crate::io::document_io::DATA_FILE_NAME;
use crate::model::config::AppConfig;

const APP_DIR: &str = "tasktree";
const CONFIG_FILE_NAME: &str = "config.toml";

/// Error type for reading config.toml
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not read {path}: {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not parse {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },
}

/// `<config dir>/tasktree/config.toml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join(APP_DIR).join(CONFIG_FILE_NAME))
}

/// `<data dir>/tasktree/tasktree-data.json`
pub fn default_data_path() -> Option<PathBuf> {
    dirs::data_dir().map(|d| d.join(APP_DIR).join(DATA_FILE_NAME))
}

/// Read the config file. A missing file gives the defaults.
pub fn read_config(path: &Path) -> Result<AppConfig, ConfigError> {
    if !path.exists() {
        tracing::debug!(path = %path.display(), "no config file, using defaults");
        return Ok(AppConfig::default());
    }
    let text = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
        path: path.to_path_buf(),
        source: e,
    })?;
    toml::from_str(&text).map_err(|e| ConfigError::ParseError {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Config from `explicit`, else from the default location, else defaults
pub fn load_config(explicit: Option<&Path>) -> Result<AppConfig, ConfigError> {
    match explicit.map(Path::to_path_buf).or_else(default_config_path) {
        Some(path) => read_config(&path),
        None => Ok(AppConfig::default()),
    }
}

/// Document path: `--file` beats `[storage] data_file` beats the default
pub fn resolve_data_path(explicit: Option<&Path>, config: &AppConfig) -> PathBuf {
    explicit
        .map(Path::to_path_buf)
        .or_else(|| config.storage.data_file.clone())
        .or_else(default_data_path)
        .unwrap_or_else(|| PathBuf::from(DATA_FILE_NAME))
}

/// Image directory: `[storage] images_dir`, else `images/` beside the document
pub fn resolve_images_dir(data_path: &Path, config: &AppConfig) -> PathBuf {
    config.storage.images_dir.clone().unwrap_or_else(|| {
        data_path
            .parent()
            .unwrap_or(Path::new("."))
            .join("images")
    })
}
