use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "vodpack")]
#[command(author, version, about = "Upload a video once, get HLS and DASH packagings")]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the upload server
    Start {
        /// Host to bind to (overrides config and HOST)
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on (overrides config and PORT)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Package a local file as HLS and DASH and print the result
    Transcode {
        /// Input video file
        #[arg(required = true)]
        input: PathBuf,

        /// Target codec: av1, hevc or avc
        #[arg(long, default_value = "avc")]
        codec: String,

        /// Reuse a specific video id instead of generating one
        #[arg(long)]
        id: Option<String>,
    },

    /// Print the ffmpeg flags chosen for a hardware profile and codec
    Args {
        /// Hardware profile (defaults to the configured one)
        #[arg(long)]
        hw: Option<String>,

        /// Target codec: av1, hevc or avc
        #[arg(long, default_value = "avc")]
        codec: String,
    },

    /// Check that ffmpeg is available
    CheckTools,

    /// Validate configuration file
    Validate {
        /// Config file to validate (uses --config if not specified)
        config: Option<PathBuf>,
    },

    /// Display version information
    Version,
}
