//! CLI command definitions and subcommands

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use clap::{Parser, Subcommand};
use tracing::debug;

use crate::domain::{Channel, TargetLanguage};

/// WhisperWall - say the hard thing kindly
#[derive(Parser)]
#[command(
    name = "ww",
    about = "Guided message composer with AI-drafted tone variations and an anonymous wall",
    version
)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true, help = "Path to config file")]
    pub config: Option<PathBuf>,

    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[arg(
        short = 'l',
        long = "log-level",
        global = true,
        help = "Log level (TRACE, DEBUG, INFO, WARN, ERROR)"
    )]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// CLI subcommands
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Start the interactive compose session (default)
    Compose,

    /// List the intent catalogue
    Intents,

    /// Browse or manage the anonymous wall
    Wall {
        #[command(subcommand)]
        command: WallCommand,
    },

    /// Inspect or clear the saved draft
    Draft {
        #[command(subcommand)]
        command: DraftCommand,
    },

    /// Format a message for email or SMS delivery
    Format {
        /// Delivery channel (email, sms)
        channel: Channel,

        /// Message text
        text: String,

        /// Language of the formatted message
        #[arg(short = 'L', long, default_value = "English")]
        language: TargetLanguage,
    },
}

/// Wall subcommands
#[derive(Debug, Subcommand)]
pub enum WallCommand {
    /// List posts, newest first
    List {
        /// Only VENT posts
        #[arg(long)]
        vent: bool,

        /// Only posts written on this device
        #[arg(long)]
        mine: bool,

        /// Show the original text behind VENT posts
        #[arg(long)]
        reveal: bool,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// Delete a post written on this device
    Delete {
        /// Post id
        id: String,
    },
}

/// Draft slot subcommands
#[derive(Debug, Subcommand)]
pub enum DraftCommand {
    /// Print the saved draft
    Show,

    /// Remove the saved draft
    Clear,
}

/// Get the log file path
pub fn get_log_path() -> PathBuf {
    debug!("get_log_path: called");
    let path = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(wallstore::APP_DIR_NAME)
        .join("logs")
        .join("whisperwall.log");
    debug!(?path, "get_log_path: returning path");
    path
}

/// Generate the after_help text with storage and log locations
pub fn generate_after_help() -> String {
    debug!("generate_after_help: called");
    let mut help = String::new();

    help.push_str("Storage:\n");
    match wallstore::FileStore::default_dir() {
        Ok(dir) => help.push_str(&format!("  {}\n", dir.display())),
        Err(e) => help.push_str(&format!("  unavailable ({})\n", e)),
    }

    help.push('\n');
    help.push_str(&format!("Logs are written to: {}\n", get_log_path().display()));
    help
}

/// Output format for listing commands
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        debug!(%s, "OutputFormat::from_str: called");
        match s.to_lowercase().as_str() {
            "text" | "plain" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            _ => Err(format!("Unknown format: {}. Use: text or json", s)),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text => write!(f, "text"),
            Self::Json => write!(f, "json"),
        }
    }
}
