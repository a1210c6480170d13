//! CLI command definitions and argument parsing.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Claimify CLI - Extract atomic, verifiable claims from answers.
#[derive(Debug, Parser)]
#[command(name = "claimify")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Output format
    #[arg(short, long, value_enum, global = true)]
    pub format: Option<CliFormat>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Configuration file path
    #[arg(short, long, global = true, env = "CLAIMIFY_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Output format options.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum CliFormat {
    /// Table format (default)
    Table,
    /// JSON format
    Json,
    /// Quiet format (claims only, one per line)
    Quiet,
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Extract claims from an answer
    Extract(ExtractArgs),

    /// Show sentences and context windows without calling a model
    Segment(SegmentArgs),

    /// Manage the configuration file
    Config(ConfigArgs),
}

/// Arguments for the extract command.
#[derive(Debug, Parser)]
pub struct ExtractArgs {
    /// Question the answer responds to
    #[arg(short, long)]
    pub question: String,

    /// File holding the answer (reads stdin when omitted)
    #[arg(short, long)]
    pub answer: Option<PathBuf>,

    /// Sentences of look-back context
    #[arg(long)]
    pub preceding: Option<usize>,

    /// Sentences of look-forward context
    #[arg(long)]
    pub following: Option<usize>,

    /// Sentences processed concurrently
    #[arg(long)]
    pub concurrency: Option<usize>,

    /// Model identifier (overrides the config file)
    #[arg(short, long, env = "CLAIMIFY_MODEL")]
    pub model: Option<String>,

    /// Print how every sentence ended instead of only the claims
    #[arg(long)]
    pub trace: bool,
}

/// Arguments for the segment command.
#[derive(Debug, Parser)]
pub struct SegmentArgs {
    /// File holding the answer (reads stdin when omitted)
    #[arg(short, long)]
    pub answer: Option<PathBuf>,

    /// Sentences of look-back context
    #[arg(long)]
    pub preceding: Option<usize>,

    /// Sentences of look-forward context
    #[arg(long)]
    pub following: Option<usize>,
}

/// Arguments for configuration management.
#[derive(Debug, Parser)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

/// Configuration management actions.
#[derive(Debug, Subcommand)]
pub enum ConfigAction {
    /// Print the effective configuration
    Show,

    /// Write a default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

impl From<CliFormat> for crate::config::OutputFormat {
    fn from(format: CliFormat) -> Self {
        match format {
            CliFormat::Table => crate::config::OutputFormat::Table,
            CliFormat::Json => crate::config::OutputFormat::Json,
            CliFormat::Quiet => crate::config::OutputFormat::Quiet,
        }
    }
}
