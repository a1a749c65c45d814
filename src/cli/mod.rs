//! Command-line interface parsing and handling
//!
//! This module handles parsing command-line arguments and executing the appropriate commands.

pub mod say;
pub mod settings;

use std::error::Error;
use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing::{info, warn};

use crate::api::client::{GeminiClient, ModelClient};
use crate::cli::say::run_say;
use crate::cli::settings::{apply_set, apply_unset};
use crate::core::app::{App, AppSettings};
use crate::core::config::{api_key_from_env, path_display, Config};
use crate::logging::{default_log_path, init_logging, LogTarget};
use crate::ui::chat_loop::run_chat;

fn long_version() -> &'static str {
    concat!(
        env!("CARGO_PKG_VERSION"),
        "\n",
        "commit: ",
        env!("VERGEN_GIT_DESCRIBE"),
        " (",
        env!("VERGEN_GIT_SHA"),
        ")\n",
        "built: ",
        env!("VERGEN_BUILD_DATE"),
    )
}

#[derive(Parser)]
#[command(name = "timmgpt")]
#[command(version, long_version = long_version())]
#[command(about = "A terminal chat client for Google's Gemini models")]
#[command(
    long_about = "TimmGPT is a full-screen terminal chat interface that streams replies \
from the Gemini API. Replies render as markdown with highlighted code blocks, and \
images can be attached to any message.\n\n\
Environment Variables:\n\
  GEMINI_API_KEY    Your Gemini API key (API_KEY is used as a fallback)\n\
  TIMMGPT_LOG       Log filter, e.g. 'debug' or 'timmgpt=trace'\n\n\
Controls:\n\
  Enter             Send the message\n\
  Alt+Enter         Insert a new line\n\
  Up/Down/Mouse     Scroll through chat history\n\
  Tab               Try a suggestion (empty chat)\n\
  Ctrl+L            Start a new chat\n\
  Ctrl+C            Quit the application\n\n\
Commands:\n\
  /attach <path>    Attach an image to the next message\n\
  /detach [n]       Remove an attached image\n\
  /clear            Start a new chat\n\
  /help             Show keyboard shortcuts and commands"
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Gemini model to use (overrides the config file)
    #[arg(short = 'm', long, global = true, value_name = "MODEL")]
    pub model: Option<String>,

    /// Write logs to this file instead of the default location
    #[arg(short = 'l', long, global = true, value_name = "FILE")]
    pub log: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the chat interface (default)
    Chat,
    /// Send one prompt and print the reply without the chat interface
    Say {
        /// Image to attach (repeatable)
        #[arg(short = 'i', long = "image", value_name = "PATH")]
        images: Vec<PathBuf>,
        /// Prompt text
        #[arg(trailing_var_arg = true, allow_hyphen_values = true, required = true)]
        prompt: Vec<String>,
    },
    /// Set configuration values
    Set {
        /// Configuration key to set (model, base-url, markdown, syntax)
        key: String,
        /// Value to set for the key
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        value: Vec<String>,
    },
    /// Unset configuration values
    Unset {
        /// Configuration key to unset
        key: String,
    },
    /// Print the current configuration
    Config,
}

pub fn main() -> Result<(), Box<dyn Error>> {
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async_main())
}

fn build_app(config: &Config, cli_model: Option<&str>) -> App {
    let model = config.resolve_model(cli_model);
    let base_url = config.resolve_base_url();
    let api_key = api_key_from_env();
    if api_key.is_none() {
        warn!("no API key found in GEMINI_API_KEY or API_KEY");
    }

    let client: Arc<dyn ModelClient> = Arc::new(GeminiClient::new(
        reqwest::Client::new(),
        base_url.clone(),
        api_key.clone().unwrap_or_default(),
    ));
    info!(%model, %base_url, "configured client");

    App::new(
        AppSettings {
            model,
            api_key,
            markdown: config.markdown_enabled(),
            syntax: config.syntax_enabled(),
        },
        client,
    )
}

async fn async_main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    match args.command.unwrap_or(Commands::Chat) {
        Commands::Chat => {
            let config = Config::load()?;
            if let Some(path) = args.log.or_else(default_log_path) {
                if let Err(err) = init_logging(LogTarget::File(path.clone()), "info") {
                    eprintln!("⚠️  Could not open log file {}: {err}", path_display(&path));
                }
            }
            let app = build_app(&config, args.model.as_deref());
            run_chat(app).await
        }
        Commands::Say { images, prompt } => {
            let target = match args.log {
                Some(path) => LogTarget::File(path),
                None => LogTarget::Stderr,
            };
            init_logging(target, "warn")?;
            let config = Config::load()?;
            let app = build_app(&config, args.model.as_deref());
            if !run_say(app, prompt, images).await? {
                std::process::exit(1);
            }
            Ok(())
        }
        Commands::Set { key, value } => {
            let mut config = Config::load()?;
            match apply_set(&mut config, &key, &value) {
                Ok(message) => {
                    config.save()?;
                    println!("{message}");
                }
                Err(err) => {
                    eprintln!("❌ {err}");
                    std::process::exit(1);
                }
            }
            Ok(())
        }
        Commands::Unset { key } => {
            let mut config = Config::load()?;
            match apply_unset(&mut config, &key) {
                Ok(message) => {
                    config.save()?;
                    println!("{message}");
                }
                Err(err) => {
                    eprintln!("❌ {err}");
                    std::process::exit(1);
                }
            }
            Ok(())
        }
        Commands::Config => {
            let config = Config::load()?;
            match Config::config_path() {
                Some(path) => println!("Config file: {}", path_display(path)),
                None => println!("Config file: (no config directory available)"),
            }
            config.print_all();
            Ok(())
        }
    }
}
