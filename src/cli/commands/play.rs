use anyhow::{Context, Result};
use std::path::PathBuf;

use crate::config::load_from_args;
use crate::playback::PlaybackController;

/// Start the profile's player on a file and return immediately
pub async fn run(profiles: Option<&str>, profile: Option<&str>, file: PathBuf) -> Result<()> {
    let (_, profile) = load_from_args(profiles, profile)?;

    if !profile.autoplay {
        eprintln!(
            "[tts-meter] Autoplay is disabled for profile '{}', skipping",
            profile.name
        );
        return Ok(());
    }

    let file = file.to_string_lossy().to_string();
    let started = PlaybackController::system()
        .start(&profile.player_command, &file)
        .context("Failed to start playback")?;

    if started {
        eprintln!("[tts-meter] Playing: {}", file);
    } else {
        eprintln!("[tts-meter] No player_command configured, skipping");
    }
    Ok(())
}
