//! Claimify CLI - Command-line interface for the Claimify claim extractor.

use anyhow::Context;
use claimify_cli::cli::{ConfigAction, ConfigArgs};
use claimify_cli::commands;
use claimify_cli::{Cli, Command, Config, Formatter};
use clap::Parser;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    // Initialize tracing (log to stderr so stdout stays machine-readable)
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    if let Err(e) = run().await {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Load config, falling back to defaults when the file is absent.
    // `config init` must work even when the existing file is broken.
    let config_path = Config::resolve_path(cli.config.as_deref())?;
    let config = match &cli.command {
        Command::Config(ConfigArgs {
            action: ConfigAction::Init { .. },
        }) => Config::default(),
        _ => Config::load_from(&config_path)
            .with_context(|| format!("Failed to load {}", config_path.display()))?,
    };

    // Determine output format
    let format = cli
        .format
        .map(Into::into)
        .unwrap_or(config.settings.format);

    // Determine color setting
    let color_enabled = !cli.no_color && config.settings.color;

    // Create formatter
    let formatter = Formatter::new(format, color_enabled);

    match cli.command {
        Command::Extract(args) => commands::execute_extract(args, &config, &formatter).await?,
        Command::Segment(args) => commands::execute_segment(args, &config, &formatter).await?,
        Command::Config(args) => commands::execute_config(args, &config, &config_path, &formatter).await?,
    }

    Ok(())
}
