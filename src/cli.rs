use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::commands;
use crate::config::Config;
use crate::error::Result;

/// webrec - Record browser sessions into replayable Selenium scripts
#[derive(Parser)]
#[command(name = "webrec")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file (overrides the default location)
    #[arg(long, env = "WEBREC_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Locator profile to use (full, compact, or a configured one)
    #[arg(short = 'P', long, env = "WEBREC_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Debug log file (record defaults to the configured debug_log)
    #[arg(long, env = "WEBREC_LOG_FILE", global = true)]
    pub log_file: Option<PathBuf>,

    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Record a session transcript into a Selenium RSpec script
    Record {
        /// Transcript of DOM snapshots and browser events (JSON lines, `-` for stdin)
        #[arg(short, long)]
        input: Option<String>,

        /// Script output path (`-` for stdout)
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Print the locator for one node of a DOM snapshot
    Locate {
        /// DOM snapshot file (JSON node tree)
        #[arg(long)]
        dom: PathBuf,

        /// Node id (pre-order index, 0 is the document)
        #[arg(long)]
        node: usize,
    },

    /// Configuration management
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Locator profile management
    Profile {
        #[command(subcommand)]
        command: ProfileCommands,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show current configuration
    Show,

    /// Set a configuration value
    Set {
        /// Configuration key (e.g., recorder.receiver)
        key: String,
        /// Configuration value
        value: String,
    },

    /// Get a configuration value
    Get {
        /// Configuration key (e.g., envelope.port)
        key: String,
    },

    /// Show configuration file path
    Path,
}

#[derive(Subcommand)]
pub enum ProfileCommands {
    /// List all locator profiles
    List,

    /// Show profile details
    Show {
        /// Profile name
        name: String,
    },
}

impl Cli {
    pub fn config_path(&self) -> PathBuf {
        self.config.clone().unwrap_or_else(Config::config_path)
    }

    pub fn load_config(&self) -> Result<Config> {
        Config::load_from(&self.config_path())
    }

    pub async fn run(&self) -> Result<()> {
        match &self.command {
            Commands::Record { input, output } => {
                commands::record::run(self, input.as_deref(), output.as_deref()).await
            }
            Commands::Locate { dom, node } => commands::locate::run(self, dom, *node).await,
            Commands::Config { command } => commands::config::run(self, command).await,
            Commands::Profile { command } => commands::profile::run(self, command).await,
        }
    }
}
