use crate::models::settings::Settings;
use anyhow::{anyhow, Context, Result};
use directories::ProjectDirs;
use std::fs;
use std::path::{Path, PathBuf};

use super::mapper::{settings_to_toml, toml_to_settings};

/// Environment variable that overrides the settings file location
pub const CONFIG_PATH_ENV: &str = "COUNTDOWN_CONFIG";
const CONFIG_FILE_NAME: &str = "countdown.toml";

pub struct SettingsService {
    path: PathBuf,
}

impl SettingsService {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Service for the file named by `COUNTDOWN_CONFIG`, or the platform
    /// config directory when unset.
    pub fn from_env() -> Self {
        match std::env::var_os(CONFIG_PATH_ENV) {
            Some(path) => Self::new(path),
            None => Self::new(Self::default_path()),
        }
    }

    pub fn default_path() -> PathBuf {
        if let Some(dirs) = ProjectDirs::from("com", "LaunchCountdown", "Countdown") {
            dirs.config_dir().join(CONFIG_FILE_NAME)
        } else {
            log::warn!("Unable to resolve project directory; using current dir for settings");
            PathBuf::from(CONFIG_FILE_NAME)
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load and validate settings. A missing file yields the defaults.
    pub fn load(&self) -> Result<Settings> {
        if !self.path.exists() {
            log::info!(
                "No settings file at {}; using built-in defaults",
                self.path.display()
            );
            return Ok(Settings::default());
        }

        let data = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read settings from {}", self.path.display()))?;
        let settings = toml_to_settings(&data)
            .with_context(|| format!("Invalid settings file {}", self.path.display()))?;

        settings
            .validate()
            .map_err(|e| anyhow!("Invalid settings in {}: {}", self.path.display(), e))?;

        log::info!("Loaded settings from {}", self.path.display());
        Ok(settings)
    }

    /// Write settings, creating parent directories as needed.
    pub fn save(&self, settings: &Settings) -> Result<()> {
        settings
            .validate()
            .map_err(|e| anyhow!("Invalid settings: {}", e))?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create dir {}", parent.display()))?;
        }

        let data = settings_to_toml(settings)?;
        fs::write(&self.path, data)
            .with_context(|| format!("Failed to write settings to {}", self.path.display()))?;
        Ok(())
    }

    /// Overwrite the file with the defaults
    pub fn reset(&self) -> Result<()> {
        self.save(&Settings::default())
    }
}
