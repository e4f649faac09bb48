// CLI configuration
use clap::{Parser, Subcommand};

use crate::cli::OutputFormat;

/// id3meta - read comments from ID3v2 tags
#[derive(Parser, Debug)]
#[command(name = "id3meta")]
#[command(about = "Recover comment metadata from ID3v2 tagged audio files", long_about = None)]
#[command(version)]
pub struct Config {
    /// Output format
    #[arg(short, long, value_enum, default_value = "pretty", global = true)]
    pub format: OutputFormat,

    /// Quiet mode (only print results and errors)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Verbose mode (debug logging, RUST_LOG still takes precedence)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Subcommand
    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Extract the comment from audio file(s)
    Comment {
        /// Audio file path(s)
        #[arg(value_name = "FILE")]
        files: Vec<String>,
    },

    /// Show the ID3v2 tag header of audio file(s)
    Header {
        /// Audio file path(s)
        #[arg(value_name = "FILE")]
        files: Vec<String>,
    },

    /// Extract comments from every matching file in a directory
    Scan {
        /// Directory path
        #[arg(short, long)]
        directory: String,

        /// File pattern (e.g., "*.mp3")
        #[arg(short, long, default_value = "*.mp3")]
        pattern: String,
    },
}
