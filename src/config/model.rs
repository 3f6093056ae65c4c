use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::state::HighlightDurations;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub ui: UiConfig,
    #[serde(default)]
    pub docker: DockerConfig,
    #[serde(default)]
    pub keybindings: KeyBindings,
    #[serde(default)]
    pub logging: LogConfig,
}

/// Polling and highlight timing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    #[serde(default = "default_poll_interval")]
    pub poll_interval_ms: u64,
    #[serde(default = "default_highlight")]
    pub highlight_ms: u64,
    #[serde(default = "default_deleted_highlight")]
    pub deleted_highlight_ms: u64,
    #[serde(default = "default_upload_highlight")]
    pub upload_highlight_ms: u64,
    /// Include stopped containers and intermediate images from the start
    #[serde(default)]
    pub show_all: bool,
}

impl GeneralConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn highlight_durations(&self) -> HighlightDurations {
        HighlightDurations {
            created: Duration::from_millis(self.highlight_ms),
            deleted: Duration::from_millis(self.deleted_highlight_ms),
            uploading: Duration::from_millis(self.upload_highlight_ms),
        }
    }
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval(),
            highlight_ms: default_highlight(),
            deleted_highlight_ms: default_deleted_highlight(),
            upload_highlight_ms: default_upload_highlight(),
            show_all: false,
        }
    }
}

/// UI behaviour settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    /// Move the cursor down after marking a row
    #[serde(default = "default_true")]
    pub advance_on_mark: bool,
    #[serde(default)]
    pub mouse_enabled: bool,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            advance_on_mark: true,
            mouse_enabled: false,
        }
    }
}

/// Docker connection settings
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DockerConfig {
    #[serde(default)]
    pub host: Option<String>,
}

/// Keybinding overrides, `key -> event name` per mode
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct KeyBindings {
    #[serde(default)]
    pub global: HashMap<String, String>,
    #[serde(default)]
    pub containers: HashMap<String, String>,
    #[serde(default)]
    pub images: HashMap<String, String>,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_file")]
    pub file: PathBuf,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: default_log_file(),
        }
    }
}

// Default value functions
fn default_poll_interval() -> u64 {
    1000
}

fn default_highlight() -> u64 {
    1000
}

fn default_deleted_highlight() -> u64 {
    2500
}

fn default_upload_highlight() -> u64 {
    5000
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_file() -> PathBuf {
    PathBuf::from("/tmp/dockconsole.log")
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_values() {
        let general = GeneralConfig::default();
        assert_eq!(general.poll_interval_ms, 1000);
        assert_eq!(general.highlight_ms, 1000);
        assert_eq!(general.deleted_highlight_ms, 2500);
        assert!(!general.show_all);
        assert!(UiConfig::default().advance_on_mark);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: Config = toml::from_str(
            r#"
            [general]
            poll_interval_ms = 250

            [keybindings.containers]
            "ctrl j" = "next-item"
            "#,
        )
        .unwrap();

        assert_eq!(config.general.poll_interval(), Duration::from_millis(250));
        assert_eq!(config.general.upload_highlight_ms, 5000);
        assert_eq!(
            config.keybindings.containers.get("ctrl j").map(String::as_str),
            Some("next-item")
        );
        assert_eq!(config.logging.file, PathBuf::from("/tmp/dockconsole.log"));
    }

    #[test]
    fn test_highlight_durations() {
        let durations = GeneralConfig::default().highlight_durations();
        assert_eq!(durations.deleted, Duration::from_millis(2500));
        assert_eq!(durations.uploading, Duration::from_secs(5));
    }
}
