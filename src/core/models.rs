use serde::{Deserialize, Serialize};

/// Hosted model variants the client knows how to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelKind {
    #[default]
    Pro,
    Flash,
    Lite,
    Image,
}

impl ModelKind {
    /// Text models offered by the picker. The image model is reachable only
    /// through image mode.
    pub const TEXT_MODELS: [ModelKind; 3] = [ModelKind::Pro, ModelKind::Flash, ModelKind::Lite];

    pub fn default_id(self) -> &'static str {
        match self {
            ModelKind::Pro => "gemini-3-pro-preview",
            ModelKind::Flash => "gemini-flash-latest",
            ModelKind::Lite => "gemini-flash-lite-latest",
            ModelKind::Image => "gemini-2.5-flash-image",
        }
    }

    /// Short badge shown in the header and input title.
    pub fn label(self) -> &'static str {
        match self {
            ModelKind::Pro => "PRO V3",
            ModelKind::Flash => "FLASH V2",
            ModelKind::Lite => "LITE V1",
            ModelKind::Image => "IMAGE CREATOR V1",
        }
    }

    /// Longer name used in the model picker.
    pub fn display_name(self) -> &'static str {
        match self {
            ModelKind::Pro => "Pro Intelligence",
            ModelKind::Flash => "Flash Response",
            ModelKind::Lite => "Lite Efficiency",
            ModelKind::Image => "Image Creator",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "pro" => Some(ModelKind::Pro),
            "flash" => Some(ModelKind::Flash),
            "lite" => Some(ModelKind::Lite),
            "image" => Some(ModelKind::Image),
            _ => None,
        }
    }
}

/// Per-kind model id overrides from the config file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelOverrides {
    pub pro: Option<String>,
    pub flash: Option<String>,
    pub lite: Option<String>,
    pub image: Option<String>,
}

/// Resolves model kinds to the opaque ids sent to the vendor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModelCatalog {
    overrides: ModelOverrides,
}

impl ModelCatalog {
    pub fn new(overrides: ModelOverrides) -> Self {
        Self { overrides }
    }

    pub fn id(&self, kind: ModelKind) -> &str {
        let configured = match kind {
            ModelKind::Pro => self.overrides.pro.as_deref(),
            ModelKind::Flash => self.overrides.flash.as_deref(),
            ModelKind::Lite => self.overrides.lite.as_deref(),
            ModelKind::Image => self.overrides.image.as_deref(),
        };
        configured
            .filter(|id| !id.trim().is_empty())
            .unwrap_or_else(|| kind.default_id())
    }

    /// Kind whose resolved id equals `id`, if any.
    pub fn kind_for_id(&self, id: &str) -> Option<ModelKind> {
        [
            ModelKind::Pro,
            ModelKind::Flash,
            ModelKind::Lite,
            ModelKind::Image,
        ]
        .into_iter()
        .find(|kind| self.id(*kind) == id)
    }
}

/// A model chosen either by kind or by a raw id passed on the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelChoice {
    Kind(ModelKind),
    Raw(String),
}

impl ModelChoice {
    pub fn parse(value: &str) -> Self {
        match ModelKind::parse(value) {
            Some(kind) => ModelChoice::Kind(kind),
            None => ModelChoice::Raw(value.trim().to_string()),
        }
    }

    pub fn resolve<'a>(&'a self, catalog: &'a ModelCatalog) -> &'a str {
        match self {
            ModelChoice::Kind(kind) => catalog.id(*kind),
            ModelChoice::Raw(id) => id.as_str(),
        }
    }
}
