use anyhow::{Context, Result};

use crate::config::load_from_args;
use crate::playback::PlaybackController;

/// Stop every running process named like the profile's player
pub async fn run(profiles: Option<&str>, profile: Option<&str>, json: bool) -> Result<()> {
    let (_, profile) = load_from_args(profiles, profile)?;

    let outcome = PlaybackController::system()
        .stop(&profile.player_command)
        .context("Failed to stop playback")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    } else if !outcome.attempted {
        println!("[tts-meter] No player_command configured, nothing to stop");
    } else if outcome.stopped_count == 0 {
        println!("[tts-meter] No running {} processes", outcome.player_name);
    } else {
        println!(
            "[tts-meter] Stopped {} {} process(es)",
            outcome.stopped_count, outcome.player_name
        );
    }
    Ok(())
}
