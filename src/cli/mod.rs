//! Command-line interface parsing and handling
//!
//! This module handles parsing command-line arguments and executing the appropriate commands.

pub mod say;

use std::error::Error;
use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing::{debug, warn};

use crate::cli::say::{run_enhance, run_image, run_say};
use crate::core::config::{Config, ConfigKey};
use crate::core::models::{ModelChoice, ModelKind};
use crate::core::vendor::http::HttpTransport;
use crate::core::vendor::VendorClient;
use crate::logging::{self, LogTarget};
use crate::ui::chat_loop::{run_chat, ChatOptions};
use crate::ui::theme::Theme;

const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("VERGEN_GIT_DESCRIBE"),
    ", built ",
    env!("VERGEN_BUILD_DATE"),
    ")"
);

#[derive(Parser)]
#[command(name = "lumiera", version, long_version = LONG_VERSION)]
#[command(about = "A full-screen terminal chat client for hosted generative AI models")]
#[command(
    long_about = "Lumiera is a full-screen terminal chat client for hosted generative AI models. \
Replies stream in as they are generated; prompts can be refined before sending and \
an image mode generates pictures instead of text.\n\n\
Environment Variables:\n\
  GEMINI_API_KEY    API key for the model service (API_KEY is used as a fallback)\n\
  LUMIERA_LOG       Log filter, e.g. debug or lumiera=trace (default: warn)\n\
  LUMIERA_CONFIG    Path to an alternative config.toml\n\n\
Controls:\n\
  Enter             Send the message\n\
  Alt+Enter         Insert a new line\n\
  Ctrl+N            Start a new chat\n\
  Alt+Up/Down       Switch between chats\n\
  Ctrl+D            Delete the current chat\n\
  Ctrl+E            Enhance the typed prompt\n\
  Ctrl+G            Toggle image mode\n\
  Ctrl+O            Choose a model\n\
  Ctrl+P            Edit your profile\n\
  Ctrl+S            Save the latest generated images\n\
  Ctrl+B            Toggle the sidebar\n\
  Ctrl+L            Log out\n\
  Esc               Cancel the request, dismiss an error or close a popup\n\
  Ctrl+C            Quit the application"
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Model to use: pro, flash, lite, or a raw model id
    #[arg(short = 'm', long, global = true, value_name = "MODEL")]
    pub model: Option<String>,

    /// Write diagnostic logs to this file
    #[arg(short = 'l', long, global = true, value_name = "FILE")]
    pub log: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the chat interface (default)
    Chat {
        /// Pre-fill the login prompt with this name
        #[arg(long)]
        name: Option<String>,
    },
    /// Send one prompt and stream the reply to stdout
    Say {
        #[arg(required = true, trailing_var_arg = true)]
        prompt: Vec<String>,
    },
    /// Print a refined version of a prompt
    Enhance {
        #[arg(required = true, trailing_var_arg = true)]
        prompt: Vec<String>,
    },
    /// Generate images from a prompt and write them to disk
    Image {
        #[arg(required = true, trailing_var_arg = true)]
        prompt: Vec<String>,
        /// Directory for the image files (defaults to the configured image-dir)
        #[arg(long, value_name = "DIR")]
        out: Option<PathBuf>,
    },
    /// Set a configuration value
    Set {
        /// Configuration key to set
        key: String,
        /// Value to set for the key
        #[arg(trailing_var_arg = true, allow_hyphen_values = true, required = true)]
        value: Vec<String>,
    },
    /// Unset a configuration value
    Unset {
        /// Configuration key to unset
        key: String,
    },
    /// Print the current configuration
    Config,
}

pub fn main() -> Result<(), Box<dyn Error>> {
    tokio::runtime::Runtime::new()?.block_on(async_main())
}

async fn async_main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    let command = args.command.unwrap_or(Commands::Chat { name: None });

    let interactive = matches!(command, Commands::Chat { .. });
    logging::init(LogTarget::select(args.log, interactive))?;

    let mut config = Config::load()?;
    let model = args.model.as_deref().map(ModelChoice::parse);

    match command {
        Commands::Chat { name } => {
            let default_model = apply_model_flag(&mut config, model);
            let client = build_client(&config);
            debug!(model = %client.catalog().id(default_model), "starting chat");
            run_chat(ChatOptions {
                client,
                default_model,
                theme: Theme::detect(),
                markdown: config.markdown_enabled(),
                image_dir: config.image_dir(),
                login_name: name,
            })
            .await
        }
        Commands::Say { prompt } => {
            let client = build_client(&config);
            let model_id = match &model {
                Some(choice) => choice.resolve(client.catalog()).to_string(),
                None => client.catalog().id(config.default_model_kind()).to_string(),
            };
            run_say(&client, &model_id, &prompt.join(" ")).await
        }
        Commands::Enhance { prompt } => {
            if model.is_some() {
                warn!("--model is ignored by enhance; it always uses the flash model");
            }
            run_enhance(&build_client(&config), &prompt.join(" ")).await
        }
        Commands::Image { prompt, out } => {
            let dir = out.unwrap_or_else(|| config.image_dir());
            run_image(&build_client(&config), &prompt.join(" "), &dir).await
        }
        Commands::Set { key, value } => {
            let key = ConfigKey::parse(&key)?;
            let value = value.join(" ");
            config.set_value(key, &value)?;
            let path = config.save()?;
            println!("Set {} to {} ({})", key.name(), value.trim(), path.display());
            Ok(())
        }
        Commands::Unset { key } => {
            let key = ConfigKey::parse(&key)?;
            config.unset_value(key);
            let path = config.save()?;
            println!("Unset {} ({})", key.name(), path.display());
            Ok(())
        }
        Commands::Config => {
            config.print_all();
            Ok(())
        }
    }
}

fn build_client(config: &Config) -> VendorClient {
    let transport = HttpTransport::new(
        reqwest::Client::new(),
        config.base_url(),
        config.api_key_source(),
    );
    VendorClient::new(Arc::new(transport), config.catalog())
}

/// Folds `-m` into the config for the interactive UI and returns the kind
/// to start with. A raw id that matches no configured kind replaces the
/// pro model for this run.
fn apply_model_flag(config: &mut Config, choice: Option<ModelChoice>) -> ModelKind {
    match choice {
        None => config.default_model_kind(),
        Some(ModelChoice::Kind(ModelKind::Image)) => {
            warn!("the image model is only used in image mode; starting with the default model");
            config.default_model_kind()
        }
        Some(ModelChoice::Kind(kind)) => kind,
        Some(ModelChoice::Raw(id)) => match config.catalog().kind_for_id(&id) {
            Some(kind) if kind != ModelKind::Image => kind,
            _ => {
                config.models.pro = Some(id);
                ModelKind::Pro
            }
        },
    }
}
