//! Command-line interface parsing and handling
//!
//! This module handles parsing command-line arguments and executing the appropriate commands.

pub mod model_list;
pub mod status;

use std::error::Error;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::warn;

use crate::cli::model_list::list_models;
use crate::cli::status::print_status;
use crate::core::config::Config;
use crate::core::session::SessionId;
use crate::ui::chat_loop::{run_chat, ChatOptions};
use crate::utils::tracing_setup::init_tracing;

#[derive(Parser)]
#[command(name = "ragline")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(long_version = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("VERGEN_GIT_DESCRIBE"),
    ", built ",
    env!("VERGEN_BUILD_DATE"),
    ")"
))]
#[command(about = "Ask questions about a document through a retrieval backend")]
#[command(
    long_about = "Ragline uploads a document to a retrieval backend and lets you ask questions \
about it from the terminal. Answers are revealed word by word.\n\n\
Environment Variables:\n\
  RAGLINE_BACKEND_URL   Backend base URL (overrides the config file)\n\
  RUST_LOG              Diagnostic log filter, written to stderr (default: warn)\n\n\
Commands:\n\
  /upload <path>    Upload a PDF or TXT document\n\
  /model [id]       List or select the answering model\n\
  /key <api-key>    Store the provider API key on the backend\n\
  /help             List every command"
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Read and write configuration at this path instead of the default
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Enable logging to specified file
    #[arg(short = 'l', long, global = true)]
    pub log: Option<String>,

    /// Resume an existing backend session
    #[arg(long, value_name = "SESSION_ID")]
    pub session: Option<String>,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    /// Start the chat interface (default)
    Chat,
    /// Check the backend and report whether an API key is stored
    Status,
    /// List the models offered for selection
    Models,
    /// Set configuration values
    Set {
        /// Configuration key to set
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
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?
        .block_on(async_main())
}

async fn async_main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    if let Err(err) = init_tracing() {
        eprintln!("Failed to initialise diagnostics: {err}");
    }

    let config_path = args.config.as_deref();
    let command = args.command.unwrap_or(Commands::Chat);
    match command {
        Commands::Set { key, value } => {
            let mut config = Config::load(config_path)?;
            if value.is_empty() {
                config.print_all();
                return Ok(());
            }
            let value = value.join(" ");
            config.set_value(&key, &value)?;
            let saved = config.save(config_path)?;
            println!("Set {key} to: {value}");
            println!("Saved to {}", saved.display());
            Ok(())
        }
        Commands::Unset { key } => {
            let mut config = Config::load(config_path)?;
            config.unset_value(&key)?;
            config.save(config_path)?;
            println!("Unset {key}");
            Ok(())
        }
        Commands::Config => {
            Config::load(config_path)?.print_all();
            Ok(())
        }
        Commands::Models => {
            let config = Config::load(config_path)?;
            print!("{}", list_models(&config));
            Ok(())
        }
        Commands::Status => {
            let config = Config::load(config_path)?;
            print_status(&config).await
        }
        Commands::Chat => {
            let config = match Config::load(config_path) {
                Ok(config) => config,
                Err(err) => {
                    warn!(error = %err, "failed to load config, using defaults");
                    eprintln!("Warning: {err}. Using default settings.");
                    Config::default()
                }
            };
            run_chat(ChatOptions {
                config,
                log: args.log,
                resume: args.session.map(SessionId::from),
            })
            .await
        }
    }
}

#[cfg(test)]
mod tests;
