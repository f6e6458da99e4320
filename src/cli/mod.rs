//! CLI module for Gridboard
//!
//! Command-line interface definitions and handlers for the Gridboard
//! dashboard engine.
//!
//! # Commands
//!
//! - `run` - Load a dashboard document and drive its datasources
//! - `validate` - Check that a dashboard document loads cleanly
//! - `inspect` - Show the datasources, panes, and widgets of a document
//! - `plugins` - List available plugin types
//! - `config` - Configuration utilities (init)
//! - `completions` - Generate shell completions
//!
//! # Example
//!
//! ```bash
//! # Run a dashboard
//! gridboard run --dashboard boards/plant-floor.json
//!
//! # Check a document before deploying it
//! gridboard validate boards/plant-floor.json
//!
//! # Generate shell completions
//! gridboard completions bash > ~/.bash_completion.d/gridboard
//! ```

pub mod completions;
pub mod config;
pub mod inspect;
pub mod output;
pub mod run;
pub mod validate;

pub use completions::handle_completions;
pub use config::handle_config_init;
pub use inspect::{handle_inspect, handle_plugins};
pub use validate::handle_validate;

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Gridboard - Real-time dashboard engine
#[derive(Parser, Debug)]
#[command(
    name = "gridboard",
    version,
    about = "Headless real-time dashboard engine"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run a dashboard document
    Run(RunArgs),
    /// Validate a dashboard document
    Validate(ValidateArgs),
    /// Inspect a dashboard document
    Inspect(InspectArgs),
    /// List available plugin types
    Plugins(PluginsArgs),
    /// Configuration utilities
    #[command(subcommand)]
    Config(ConfigCommands),
    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Path to configuration file
    #[arg(short, long, default_value = "gridboard.toml")]
    pub config: PathBuf,

    /// Dashboard document to load (overrides the config file)
    #[arg(short, long, env = "GRIDBOARD_DASHBOARD")]
    pub dashboard: Option<PathBuf>,

    /// Override grid column count
    #[arg(long, env = "GRIDBOARD_COLUMNS")]
    pub columns: Option<u32>,

    /// Set log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "GRIDBOARD_LOG_LEVEL")]
    pub log_level: Option<String>,
}

#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Dashboard document to check
    pub dashboard: PathBuf,
}

#[derive(Args, Debug)]
pub struct InspectArgs {
    /// Dashboard document to inspect
    pub dashboard: PathBuf,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct PluginsArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Initialize a new configuration file
    Init(ConfigInitArgs),
}

#[derive(Args, Debug)]
pub struct ConfigInitArgs {
    /// Output file path
    #[arg(short, long, default_value = "gridboard.toml")]
    pub output: PathBuf,

    /// Overwrite existing file
    #[arg(short, long)]
    pub force: bool,
}

#[derive(Args, Debug)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: clap_complete::Shell,
}
