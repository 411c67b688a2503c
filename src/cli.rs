use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Configuration file path
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Detect the channel's live stream and translate its chat until stopped
    Run {
        /// Channel id, overriding the configured one
        #[arg(long)]
        channel: Option<String>,

        /// Target languages (comma-separated), overriding the configured defaults
        #[arg(short, long)]
        target_langs: Option<String>,

        /// Translation backend: google or libre
        #[arg(short, long)]
        backend: Option<String>,
    },

    /// Resolve the channel to its live video and chat session ids
    Locate {
        /// Channel id, overriding the configured one
        #[arg(long)]
        channel: Option<String>,
    },

    /// List configured language options and which are default targets
    Languages,

    /// Write a default configuration file
    Init {
        /// Destination path
        #[arg(short, long, default_value = "config.toml")]
        output: PathBuf,
    },
}
