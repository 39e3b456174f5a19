/// Playback start/stop failures. All of these are non-fatal to a synthesis request.
#[derive(Debug, thiserror::Error)]
pub enum PlaybackError {
    #[error("Audio player not found: {binary}")]
    NotFound { binary: String },

    #[error("Unable to stop playback automatically: missing {tool}")]
    UnsupportedPlatform { tool: String },

    #[error("Failed to inspect running player processes for: {player}")]
    LookupFailed { player: String },

    #[error("Failed to stop active playback for player: {player}")]
    StopFailed { player: String },

    #[error("Failed to launch {binary}: {source}")]
    Spawn {
        binary: String,
        #[source]
        source: std::io::Error,
    },
}
