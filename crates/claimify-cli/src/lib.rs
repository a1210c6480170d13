//! Claimify CLI library.
//!
//! This library provides the core functionality for the Claimify command-line interface,
//! including configuration management, gateway selection, command execution, and output
//! formatting.

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod gateway;
pub mod output;

pub use cli::{Cli, Command};
pub use config::Config;
pub use error::{CliError, Result};
pub use output::Formatter;
