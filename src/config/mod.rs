use std::path::Path;

use anyhow::{Context, Result};

use tracing::{debug, info};

use crate::core::ConfigError;
use crate::keys::Keymap;

pub mod model;

pub use model::*;

impl Config {
    /// Load configuration from a specific file path
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        info!("Loading configuration from: {}", path.display());

        if !path.exists() {
            return Err(ConfigError::NotFound(path.display().to_string()).into());
        }

        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        config.validate()?;
        debug!("Configuration loaded and validated successfully");

        Ok(config)
    }

    /// Load configuration from default locations
    pub fn load_default() -> Result<Self> {
        use directories::ProjectDirs;

        if let Some(proj_dirs) = ProjectDirs::from("com", "dockconsole", "dockconsole") {
            let config_path = proj_dirs.config_dir().join("config.toml");

            if config_path.exists() {
                return Self::load(&config_path);
            }
        }

        // Try current directory
        let local_config = std::path::PathBuf::from("config.toml");
        if local_config.exists() {
            return Self::load(&local_config);
        }

        info!("No configuration file found, using defaults");
        Ok(Config::default())
    }

    /// Save configuration to a file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        info!("Saving configuration to: {}", path.display());

        let contents = toml::to_string_pretty(self).context("Failed to serialize configuration")?;

        std::fs::write(path, contents)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        info!("Configuration saved successfully");
        Ok(())
    }

    /// Build the key map, applying configured overrides
    pub fn keymap(&self) -> Result<Keymap> {
        Keymap::from_config(&self.keybindings).context("Invalid [keybindings] section")
    }

    /// Validate the configuration
    fn validate(&self) -> Result<()> {
        if self.general.poll_interval_ms < 100 {
            return Err(ConfigError::Validation(
                "poll_interval_ms must be at least 100".to_string(),
            )
            .into());
        }

        if self.general.highlight_ms < 100 {
            return Err(
                ConfigError::Validation("highlight_ms must be at least 100".to_string()).into(),
            );
        }

        self.keymap()?;

        Ok(())
    }
}
