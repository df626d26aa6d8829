//! Command-line interface parsing and handling
//!
//! This module parses command-line arguments and dispatches to the relay
//! server or to one of the client commands.

pub mod chat;
pub mod config_cmd;
pub mod model_list;
pub mod preset_list;
pub mod say;
pub mod serve;

use std::error::Error;
use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::cli::chat::run_chat;
use crate::cli::config_cmd::{init_config, show_config};
use crate::cli::model_list::list_models;
use crate::cli::preset_list::list_presets;
use crate::cli::say::run_say;
use crate::cli::serve::run_serve;
use crate::core::config::Config;
use crate::utils::logging::{init_tracing, CLIENT_FILTER, SERVER_FILTER};

#[derive(Parser)]
#[command(name = "nero")]
#[command(version = crate::VERSION)]
#[command(about = "A chat relay for Google Gemini and OpenRouter-hosted models")]
#[command(
    long_about = "Nero relays chat conversations to Google Gemini or to models hosted on \
OpenRouter. `nero serve` runs the HTTP relay; `nero chat` and `nero say` talk to a running relay.\n\n\
Environment Variables:\n\
  GOOGLE_API_KEY       Credential for Gemini models\n\
  OPENROUTER_API_KEY   Credential for OpenRouter models\n\
  GOOGLE_MODEL         Default model id (defaults to gemini-2.5-flash)\n\
  HOST, PORT           Listen address for `nero serve` (defaults to 127.0.0.1:5000)\n\
  RUST_LOG             Log filter (defaults to nero=info,tower_http=info for the server)\n\n\
Chat commands:\n\
  /model [id]          Switch model, or list known models\n\
  /behaviour [name]    Switch behaviour preset (resets the conversation), or list presets\n\
  /clear               Start over from the welcome message\n\
  /quit                Leave the chat\n\
  Ctrl+C               Interrupt the pending reply (or quit when idle)"
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Path to the config file (defaults to the platform config directory)
    #[arg(short = 'c', long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

#[derive(clap::Args, Clone, Debug, Default)]
pub struct ClientArgs {
    /// Relay base URL (defaults to the configured listen address)
    #[arg(short = 's', long, value_name = "URL")]
    pub server: Option<String>,

    /// Model id to request
    #[arg(short = 'm', long, value_name = "MODEL")]
    pub model: Option<String>,

    /// Behaviour preset to request
    #[arg(short = 'b', long, value_name = "NAME")]
    pub behaviour: Option<String>,
}

impl ClientArgs {
    pub fn server_url(&self, config: &Config) -> String {
        self.server
            .clone()
            .unwrap_or_else(|| format!("http://{}", config.bind_address()))
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the HTTP relay
    Serve {
        /// Address to bind (overrides config and HOST)
        #[arg(long)]
        host: Option<String>,
        /// Port to bind (overrides config and PORT)
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Start an interactive chat against a running relay (default)
    Chat {
        #[command(flatten)]
        client: ClientArgs,
    },
    /// Send one prompt and print the reply
    Say {
        #[command(flatten)]
        client: ClientArgs,
        /// The prompt to send
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        prompt: Vec<String>,
    },
    /// List behaviour presets
    Presets,
    /// List known models and the provider that serves each
    Models,
    /// Inspect or create the config file
    Config {
        #[command(subcommand)]
        action: ConfigCommand,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Write a config file populated with the defaults
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Print the effective configuration with credentials redacted
    Show,
}

pub fn main() -> Result<(), Box<dyn Error>> {
    tokio::runtime::Runtime::new()?.block_on(async_main())
}

async fn async_main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    let command = args.command.unwrap_or(Commands::Chat {
        client: ClientArgs::default(),
    });

    init_tracing(if matches!(command, Commands::Serve { .. }) {
        SERVER_FILTER
    } else {
        CLIENT_FILTER
    });

    let config_path = args.config.as_deref();
    match command {
        Commands::Config {
            action: ConfigCommand::Init { force },
        } => init_config(config_path, force),
        Commands::Config {
            action: ConfigCommand::Show,
        } => show_config(config_path),
        Commands::Serve { host, port } => run_serve(Config::load(config_path)?, host, port).await,
        Commands::Chat { client } => run_chat(&Config::load(config_path)?, &client).await,
        Commands::Say { client, prompt } => {
            run_say(&Config::load(config_path)?, &client, prompt).await
        }
        Commands::Presets => {
            list_presets(&Config::load(config_path)?);
            Ok(())
        }
        Commands::Models => {
            list_models(&Config::load(config_path)?);
            Ok(())
        }
    }
}
