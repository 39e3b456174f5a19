pub mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Usage metering and playback control for cloud text-to-speech
#[derive(Parser)]
#[command(name = "tts-meter", version, about)]
pub struct Cli {
    /// Path to the profiles JSON file
    #[arg(long, global = true, env = "GTTS_PROFILES")]
    pub profiles: Option<String>,

    /// Profile name (defaults to `default_profile` in the file)
    #[arg(long, global = true, env = "GTTS_PROFILE")]
    pub profile: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Record a completed synthesis and show month-to-date usage
    Record {
        /// Characters billed for this request
        #[arg(long)]
        chars: u64,

        /// Voice name (defaults to the profile voice)
        #[arg(long)]
        voice: Option<String>,

        /// Language code (defaults to the profile language)
        #[arg(long)]
        language: Option<String>,

        /// Audio format (defaults to the profile format)
        #[arg(long)]
        format: Option<String>,

        /// Audio file that was written (defaults to a timestamped file in output_dir)
        #[arg(long)]
        output: Option<PathBuf>,

        /// Play the file afterwards if the profile enables autoplay
        #[arg(long)]
        play: bool,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Show usage and estimated cost for a month
    Usage {
        /// Month as YYYY-MM (defaults to the current UTC month)
        #[arg(long)]
        month: Option<String>,

        /// List the month's raw log rows instead of the summary
        #[arg(long)]
        events: bool,

        #[arg(long)]
        json: bool,
    },

    /// Play an audio file with the profile's player
    Play {
        file: PathBuf,
    },

    /// Stop running instances of the profile's player
    Stop {
        #[arg(long)]
        json: bool,
    },

    /// Print diagnostics as JSON
    Doctor,

    /// Create a starter profiles file in the config directory
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Serve the HTTP automation API
    Serve {
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        #[arg(long, default_value_t = 8765)]
        port: u16,
    },
}
