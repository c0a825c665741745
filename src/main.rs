use ai_selector_cli::config::{config_path, Config, API_URL_ENV};
use ai_selector_cli::{health, logging, prompt, show_config, stats, test_providers, ApiClient};

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "ai-selector", version, about = "Terminal client for the AI selector service")]
struct Cli {
    /// Base URL of the selector backend (overrides the config file)
    #[arg(long, env = API_URL_ENV)]
    api_url: Option<String>,
    /// Path to the configuration file
    #[arg(long)]
    config: Option<PathBuf>,
    /// Write logs to this file instead of the default location
    #[arg(long)]
    log_file: Option<PathBuf>,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Send a prompt; the backend picks the most reliable model
    Prompt {
        /// Prompt text
        text: String,
    },
    /// Print the model reliability ranking
    Stats,
    /// Test every provider and print the results
    Test,
    /// Check backend health; exits non-zero unless healthy
    Health,
    /// Print the effective configuration
    Config {
        /// Persist the effective configuration to the config file
        #[arg(long)]
        save: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Some(path) = cli.log_file.clone().or_else(logging::default_log_path) {
        // Logging is best effort; the client works without it.
        if let Err(e) = logging::init(&path) {
            eprintln!("warning: {e:#}");
        }
    }

    let path = cli.config.clone().or_else(config_path);
    let file_config = match &path {
        Some(p) => Config::load_from(p)?,
        None => Config::default(),
    };
    // clap resolves flag over environment variable.
    let config = file_config.with_api_url(cli.api_url);

    let Some(command) = cli.command else {
        return ai_selector_cli::tui::run(config).await;
    };

    let client = ApiClient::new(&config.api_url, config.timeout())?;
    match command {
        Commands::Prompt { text } => prompt(&client, &text).await,
        Commands::Stats => stats(&client).await,
        Commands::Test => test_providers(&client).await,
        Commands::Health => health(&client).await,
        Commands::Config { save } => show_config(&config, path.as_deref(), save),
    }
}
