use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// `launch-studio` - Collect a product launch brief and fit launch copy.
#[derive(Parser, Debug)]
#[command(name = "launch-studio")]
#[command(version)]
#[command(about = "Conversational launch brief collection and launch asset tooling.", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Collect a launch brief interactively over stdin
    Chat {
        /// Write the collected brief as JSON when the session ends
        #[arg(long)]
        save: Option<PathBuf>,
    },

    /// Print the readiness gate of a brief stored as JSON
    Gate {
        /// Path to the brief JSON file
        path: PathBuf,
    },

    /// Fit narration text to a video length
    Fit {
        /// Requested video length in seconds (normalized to 4, 8 or 12)
        #[arg(short, long, default_value = "8")]
        seconds: i64,

        /// Call-to-action line appended when it fits
        #[arg(long)]
        cta: Option<String>,

        /// Raw narration text
        text: String,
    },

    /// Print the effective configuration
    Config,
}
