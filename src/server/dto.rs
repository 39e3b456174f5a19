use serde::{Deserialize, Serialize};

use crate::playback::PlaybackAttempt;
use crate::usage::UsageSnapshot;

/// Generic API response wrapper
#[derive(Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

/// Query for the month report
#[derive(Deserialize)]
pub struct UsageQuery {
    pub month: Option<String>,
}

/// A completed synthesis to record
#[derive(Deserialize)]
pub struct RecordEventRequest {
    pub chars: u64,
    pub voice: Option<String>,
    pub language: Option<String>,
    pub format: Option<String>,
    pub output_file: String,
    #[serde(default)]
    pub play: bool,
}

/// Snapshot after recording, plus any playback outcome
#[derive(Serialize)]
pub struct RecordEventResponse {
    pub output_file: String,
    #[serde(flatten)]
    pub usage: UsageSnapshot,
    #[serde(flatten)]
    pub playback: PlaybackAttempt,
}

#[derive(Deserialize)]
pub struct StartPlaybackRequest {
    pub file: String,
}

#[derive(Serialize)]
pub struct StartPlaybackResponse {
    pub started: bool,
}
