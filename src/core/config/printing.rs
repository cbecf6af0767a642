use crate::core::config::data::{path_display, Config};
use crate::core::models::ModelKind;

impl Config {
    pub fn print_all(&self) {
        println!("Current configuration:");
        match &self.default_model {
            Some(model) => println!("  default-model: {model}"),
            None => println!("  default-model: (unset, {})", ModelKind::default().label()),
        }
        println!("  base-url: {}", self.base_url());
        match &self.api_key_env {
            Some(var) => println!("  api-key-env: {var}"),
            None => println!("  api-key-env: (unset, GEMINI_API_KEY or API_KEY)"),
        }
        println!("  image-dir: {}", path_display(&self.image_dir()));
        match self.markdown_enabled() {
            true => println!("  markdown: on"),
            false => println!("  markdown: off"),
        }
        let catalog = self.catalog();
        println!("  models:");
        for kind in [
            ModelKind::Pro,
            ModelKind::Flash,
            ModelKind::Lite,
            ModelKind::Image,
        ] {
            println!("    {}: {}", kind.label(), catalog.id(kind));
        }
    }
}
