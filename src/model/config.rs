use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// Configuration from config.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub ui: UiConfig,
    #[serde(default)]
    pub log: LogConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Document file. Defaults to `<data dir>/tasktree/tasktree-data.json`.
    #[serde(default)]
    pub data_file: Option<PathBuf>,
    /// Delay between the last edit and the autosave write
    #[serde(default = "default_autosave_delay_ms")]
    pub autosave_delay_ms: u64,
    /// Where attached images are copied. Defaults to `images/` next to the data file.
    #[serde(default)]
    pub images_dir: Option<PathBuf>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        StorageConfig {
            data_file: None,
            autosave_delay_ms: default_autosave_delay_ms(),
            images_dir: None,
        }
    }
}

fn default_autosave_delay_ms() -> u64 {
    1000
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    #[serde(default = "default_true")]
    pub show_key_hints: bool,
    /// Colour overrides, `name = "#RRGGBB"`
    #[serde(default)]
    pub colors: HashMap<String, String>,
    /// Indent width in cells at zoom 1.0
    #[serde(default = "default_indent")]
    pub indent: u16,
}

impl Default for UiConfig {
    fn default() -> Self {
        UiConfig {
            show_key_hints: true,
            colors: HashMap::new(),
            indent: default_indent(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_indent() -> u16 {
    4
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    /// Log file for the terminal UI. No file, no logging while the UI runs.
    #[serde(default)]
    pub file: Option<PathBuf>,
    /// One of trace, debug, info, warn, error
    #[serde(default = "default_level")]
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        LogConfig {
            file: None,
            level: default_level(),
        }
    }
}

fn default_level() -> String {
    "info".to_string()
}
