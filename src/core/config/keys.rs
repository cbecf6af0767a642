//! `set` / `unset` support for individual config keys.

use std::fmt;
use std::path::PathBuf;

use crate::core::config::data::Config;
use crate::core::models::ModelKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigKey {
    DefaultModel,
    BaseUrl,
    ApiKeyEnv,
    ImageDir,
    Markdown,
}

impl ConfigKey {
    pub const ALL: [ConfigKey; 5] = [
        ConfigKey::DefaultModel,
        ConfigKey::BaseUrl,
        ConfigKey::ApiKeyEnv,
        ConfigKey::ImageDir,
        ConfigKey::Markdown,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ConfigKey::DefaultModel => "default-model",
            ConfigKey::BaseUrl => "base-url",
            ConfigKey::ApiKeyEnv => "api-key-env",
            ConfigKey::ImageDir => "image-dir",
            ConfigKey::Markdown => "markdown",
        }
    }

    pub fn parse(key: &str) -> Result<Self, SettingError> {
        let normalized = key.trim().to_ascii_lowercase().replace('_', "-");
        Self::ALL
            .into_iter()
            .find(|candidate| candidate.name() == normalized)
            .ok_or_else(|| SettingError::UnknownKey(key.to_string()))
    }
}

/// Errors that can occur when modifying configuration settings.
#[derive(Debug, PartialEq, Eq)]
pub enum SettingError {
    /// The provided setting key is not recognized.
    UnknownKey(String),
    /// The provided value is not a text model kind.
    UnknownModel(String),
    /// The provided value could not be parsed as a boolean.
    InvalidBoolean(String),
    /// The key needs a non-empty value.
    EmptyValue(&'static str),
}

impl fmt::Display for SettingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingError::UnknownKey(key) => {
                let known: Vec<_> = ConfigKey::ALL.iter().map(|k| k.name()).collect();
                write!(f, "Unknown config key: {key} (known: {})", known.join(", "))
            }
            SettingError::UnknownModel(value) => {
                write!(f, "Unknown model: {value} (expected pro, flash or lite)")
            }
            SettingError::InvalidBoolean(value) => {
                write!(f, "Invalid boolean: {value} (expected on/off, true/false)")
            }
            SettingError::EmptyValue(key) => write!(f, "{key} needs a value"),
        }
    }
}

impl std::error::Error for SettingError {}

fn parse_bool(value: &str) -> Result<bool, SettingError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "on" | "true" | "yes" | "1" => Ok(true),
        "off" | "false" | "no" | "0" => Ok(false),
        _ => Err(SettingError::InvalidBoolean(value.to_string())),
    }
}

impl Config {
    pub fn set_value(&mut self, key: ConfigKey, value: &str) -> Result<(), SettingError> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(SettingError::EmptyValue(key.name()));
        }
        match key {
            ConfigKey::DefaultModel => match ModelKind::parse(trimmed) {
                Some(kind) if kind != ModelKind::Image => {
                    self.default_model = Some(trimmed.to_ascii_lowercase());
                }
                _ => return Err(SettingError::UnknownModel(trimmed.to_string())),
            },
            ConfigKey::BaseUrl => self.base_url = Some(trimmed.trim_end_matches('/').to_string()),
            ConfigKey::ApiKeyEnv => self.api_key_env = Some(trimmed.to_string()),
            ConfigKey::ImageDir => self.image_dir = Some(PathBuf::from(trimmed)),
            ConfigKey::Markdown => self.markdown = Some(parse_bool(trimmed)?),
        }
        Ok(())
    }

    pub fn unset_value(&mut self, key: ConfigKey) {
        match key {
            ConfigKey::DefaultModel => self.default_model = None,
            ConfigKey::BaseUrl => self.base_url = None,
            ConfigKey::ApiKeyEnv => self.api_key_env = None,
            ConfigKey::ImageDir => self.image_dir = None,
            ConfigKey::Markdown => self.markdown = None,
        }
    }
}
