use anyhow::Result;

use crate::config::init_config;

/// Write a starter profiles.json into the config directory
pub async fn run(force: bool) -> Result<()> {
    let path = init_config(force)?;
    println!("[tts-meter] Created profiles file: {}", path.display());
    println!("[tts-meter] Edit it to pick your voice and audio player.");
    Ok(())
}
