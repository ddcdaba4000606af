use crate::models::settings::Settings;
use anyhow::{Context, Result};

pub fn toml_to_settings(data: &str) -> Result<Settings> {
    toml::from_str(data).context("Failed to parse countdown settings")
}

pub fn settings_to_toml(settings: &Settings) -> Result<String> {
    toml::to_string_pretty(settings).context("Failed to serialize countdown settings")
}
