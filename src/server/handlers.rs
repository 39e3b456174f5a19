use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;

use crate::config::Profile;
use crate::playback::{PlaybackAttempt, PlaybackController, StopOutcome};
use crate::usage::{
    is_valid_month_key, month_key, MonthReport, UsageAccountant, UsageEvent, UsageLedger,
};

use super::dto::*;

/// Shared application state
pub struct AppState {
    pub profile: Profile,
    pub playback: PlaybackController,
}

impl AppState {
    fn ledger(&self) -> UsageLedger {
        UsageLedger::new(&self.profile.usage_log)
    }
}

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

/// Run ledger scans and process-table calls off the async workers
async fn blocking<T, F>(work: F) -> Result<T, String>
where
    F: FnOnce() -> Result<T, String> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| format!("Task failed: {}", e))?
}

fn respond<T: Serialize>(result: Result<T, String>) -> Json<ApiResponse<T>> {
    match result {
        Ok(data) => Json(ApiResponse::success(data)),
        Err(e) => Json(ApiResponse::error(e)),
    }
}

/// Month report, defaulting to the current UTC month
pub async fn get_usage(
    State(state): State<Arc<AppState>>,
    Query(query): Query<UsageQuery>,
) -> impl IntoResponse {
    let month = query.month.unwrap_or_else(|| month_key(&Utc::now()));
    if !is_valid_month_key(&month) {
        return Json(ApiResponse::<MonthReport>::error(format!(
            "Invalid month: {}. Use YYYY-MM",
            month
        )));
    }

    respond(
        blocking(move || {
            let ledger = state.ledger();
            UsageAccountant::new(&ledger)
                .month_report(&month)
                .map_err(|e| e.to_string())
        })
        .await,
    )
}

/// Record a synthesis event and return the usage snapshot including it
pub async fn record_event(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RecordEventRequest>,
) -> impl IntoResponse {
    respond(blocking(move || record_blocking(&state, req)).await)
}

fn record_blocking(state: &AppState, req: RecordEventRequest) -> Result<RecordEventResponse, String> {
    let profile = &state.profile;
    let now = Utc::now();
    let voice = req.voice.unwrap_or_else(|| profile.voice.clone());

    let ledger = state.ledger();
    let event = UsageEvent {
        timestamp: now,
        character_count: req.chars,
        voice_identifier: voice.clone(),
        language_code: req.language.unwrap_or_else(|| profile.language.clone()),
        audio_format: req.format.unwrap_or_else(|| profile.audio_format.clone()),
        output_path: req.output_file.clone(),
    };
    if let Err(e) = ledger.append(&event) {
        tracing::error!(error = %e, "Failed to record usage");
        return Err(e.to_string());
    }

    let usage = UsageAccountant::new(&ledger)
        .snapshot(req.chars, &voice, now)
        .map_err(|e| e.to_string())?;

    let playback = if req.play {
        state
            .playback
            .autoplay(profile.autoplay, &profile.player_command, &req.output_file)
    } else {
        PlaybackAttempt::default()
    };

    Ok(RecordEventResponse {
        output_file: req.output_file,
        usage,
        playback,
    })
}

/// Start the profile's player on a file (autoplay-gated)
pub async fn start_playback(
    State(state): State<Arc<AppState>>,
    Json(req): Json<StartPlaybackRequest>,
) -> impl IntoResponse {
    respond(
        blocking(move || {
            let profile = &state.profile;
            if !profile.autoplay {
                return Ok(StartPlaybackResponse { started: false });
            }
            state
                .playback
                .start(&profile.player_command, &req.file)
                .map(|started| StartPlaybackResponse { started })
                .map_err(|e| e.to_string())
        })
        .await,
    )
}

/// Stop running instances of the profile's player
pub async fn stop_playback(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    respond::<StopOutcome>(
        blocking(move || {
            state
                .playback
                .stop(&state.profile.player_command)
                .map_err(|e| e.to_string())
        })
        .await,
    )
}
