mod cli;
mod config;
mod playback;
mod server;
mod usage;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::commands::{self, record::RecordArgs};
use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();

    let cli = Cli::parse();
    let profiles = cli.profiles.as_deref();
    let profile = cli.profile.as_deref();

    match cli.command {
        Commands::Record {
            chars,
            voice,
            language,
            format,
            output,
            play,
            json,
        } => {
            let args = RecordArgs {
                chars,
                voice,
                language,
                format,
                output,
                play,
                json,
            };
            commands::record::run(profiles, profile, args).await
        }
        Commands::Usage {
            month,
            events,
            json,
        } => commands::usage::run(profiles, profile, month, events, json).await,
        Commands::Play { file } => commands::play::run(profiles, profile, file).await,
        Commands::Stop { json } => commands::stop::run(profiles, profile, json).await,
        Commands::Doctor => commands::doctor::run(profiles, profile).await,
        Commands::Init { force } => commands::init::run(force).await,
        Commands::Serve { host, port } => {
            commands::serve::run(profiles, profile, host, port).await
        }
    }
}

/// Diagnostics go to stderr; stdout is reserved for command output
fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
