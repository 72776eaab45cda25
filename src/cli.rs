use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(
    name = "telegram-alert",
    version,
    about = "Render log alert events and deliver them through the Telegram Bot API",
    long_about = None
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Validate a configuration file without sending anything
    Check {
        /// Configuration file path
        #[arg(long, required = true)]
        config: PathBuf,
    },

    /// Render an alert event to stdout without sending it
    Render {
        /// Configuration file path
        #[arg(long, required = true)]
        config: PathBuf,

        /// Alert event file (JSON or YAML), `-` for stdin
        #[arg(short, long, default_value = "-")]
        event: PathBuf,
    },

    /// Render an alert event and deliver it to Telegram
    Send {
        /// Configuration file path
        #[arg(long, required = true)]
        config: PathBuf,

        /// Alert event file (JSON or YAML), `-` for stdin
        #[arg(short, long, default_value = "-")]
        event: PathBuf,
    },
}

impl Commands {
    pub fn config_path(&self) -> &Path {
        match self {
            Commands::Check { config }
            | Commands::Render { config, .. }
            | Commands::Send { config, .. } => config,
        }
    }
}
