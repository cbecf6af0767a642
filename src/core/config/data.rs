use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::core::models::{ModelCatalog, ModelKind, ModelOverrides};
use crate::core::vendor::http::DEFAULT_BASE_URL;
use crate::core::vendor::ApiKeySource;

#[derive(Debug, Serialize, Deserialize, Default, Clone, PartialEq)]
pub struct Config {
    /// Model kind selected at startup and after a new chat ("pro", "flash", "lite")
    pub default_model: Option<String>,
    /// API root, without the `/v1beta` suffix
    pub base_url: Option<String>,
    /// Environment variable holding the API key
    pub api_key_env: Option<String>,
    /// Directory generated images are written to
    pub image_dir: Option<PathBuf>,
    /// Enable markdown rendering in the chat area
    pub markdown: Option<bool>,
    /// Per-kind model id overrides
    #[serde(default, skip_serializing_if = "is_default_overrides")]
    pub models: ModelOverrides,
}

fn is_default_overrides(overrides: &ModelOverrides) -> bool {
    *overrides == ModelOverrides::default()
}

impl Config {
    /// Configured default kind. The image model is never a default.
    pub fn default_model_kind(&self) -> ModelKind {
        self.default_model
            .as_deref()
            .and_then(ModelKind::parse)
            .filter(|kind| *kind != ModelKind::Image)
            .unwrap_or_default()
    }

    pub fn base_url(&self) -> &str {
        self.base_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .unwrap_or(DEFAULT_BASE_URL)
    }

    pub fn api_key_source(&self) -> ApiKeySource {
        match self.api_key_env.as_deref().map(str::trim) {
            Some(var) if !var.is_empty() => ApiKeySource::env(var),
            _ => ApiKeySource::default(),
        }
    }

    pub fn image_dir(&self) -> PathBuf {
        self.image_dir.clone().unwrap_or_else(|| PathBuf::from("."))
    }

    pub fn markdown_enabled(&self) -> bool {
        self.markdown.unwrap_or(true)
    }

    pub fn catalog(&self) -> ModelCatalog {
        ModelCatalog::new(self.models.clone())
    }
}

pub fn path_display(path: &Path) -> String {
    path.display().to_string()
}
