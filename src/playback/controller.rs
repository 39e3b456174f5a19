use serde::Serialize;
use std::path::Path;

use super::error::PlaybackError;
use super::process::{PosixProcessManager, ProcessManager};

/// Token in a player command template replaced by the audio file path
pub const FILE_PLACEHOLDER: &str = "{file}";

/// Result of a stop request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StopOutcome {
    pub attempted: bool,
    #[serde(rename = "player")]
    pub player_name: String,
    /// Count seen at lookup time; some may have exited before the terminate call
    #[serde(rename = "stopped_processes")]
    pub stopped_count: usize,
}

impl StopOutcome {
    fn not_attempted() -> Self {
        Self {
            attempted: false,
            player_name: String::new(),
            stopped_count: 0,
        }
    }
}

/// Outcome of a best-effort playback attached to another operation
#[derive(Debug, Clone, Default, Serialize)]
pub struct PlaybackAttempt {
    pub autoplay_started: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub playback_warning: Option<String>,
}

/// Starts and stops an external audio player.
///
/// Holds no process handles. `stop` matches any running process with the
/// player's executable name, including ones this tool did not start.
pub struct PlaybackController<P: ProcessManager = PosixProcessManager> {
    processes: P,
}

impl PlaybackController<PosixProcessManager> {
    pub fn system() -> Self {
        Self::new(PosixProcessManager)
    }
}

impl<P: ProcessManager> PlaybackController<P> {
    pub fn new(processes: P) -> Self {
        Self { processes }
    }

    /// Launch `player_command` for `file_path` without waiting for it.
    ///
    /// An empty command means no player is configured and returns `Ok(false)`.
    pub fn start(&self, player_command: &[String], file_path: &str) -> Result<bool, PlaybackError> {
        let command: Vec<String> = player_command
            .iter()
            .map(|part| part.replace(FILE_PLACEHOLDER, file_path))
            .collect();

        let Some((program, args)) = command.split_first() else {
            return Ok(false);
        };

        let resolved = self
            .processes
            .resolve_executable(program)
            .ok_or_else(|| PlaybackError::NotFound {
                binary: program.clone(),
            })?;

        self.processes.spawn_detached(&resolved, args)?;
        Ok(true)
    }

    /// Stop every running process named like the player in `player_command`.
    pub fn stop(&self, player_command: &[String]) -> Result<StopOutcome, PlaybackError> {
        let player_name = match player_command.first() {
            Some(first) => executable_name(first),
            None => return Ok(StopOutcome::not_attempted()),
        };
        if player_name.is_empty() {
            return Ok(StopOutcome::not_attempted());
        }

        self.processes.ensure_stop_supported()?;
        let running = self.processes.list_by_executable_name(&player_name)?;
        if running.is_empty() {
            tracing::debug!(player = %player_name, "No running player processes");
            return Ok(StopOutcome {
                attempted: true,
                player_name,
                stopped_count: 0,
            });
        }

        self.processes.terminate_by_executable_name(&player_name)?;
        tracing::info!(player = %player_name, count = running.len(), "Stopped playback");

        Ok(StopOutcome {
            attempted: true,
            player_name,
            stopped_count: running.len(),
        })
    }

    /// Start playback when `autoplay` is on, folding any failure into a warning.
    pub fn autoplay(
        &self,
        autoplay: bool,
        player_command: &[String],
        file_path: &str,
    ) -> PlaybackAttempt {
        if !autoplay {
            return PlaybackAttempt::default();
        }

        match self.start(player_command, file_path) {
            Ok(started) => PlaybackAttempt {
                autoplay_started: started,
                playback_warning: None,
            },
            Err(e) => {
                tracing::warn!(error = %e, "Playback failed");
                PlaybackAttempt {
                    autoplay_started: false,
                    playback_warning: Some(e.to_string()),
                }
            }
        }
    }
}

/// Base name of the player binary, e.g. `/usr/bin/mpv` -> `mpv`
fn executable_name(program: &str) -> String {
    Path::new(program)
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default()
}
