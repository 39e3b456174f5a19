use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

use super::handlers::{self, AppState};

/// Create the main router with all routes
pub fn create_router(state: Arc<AppState>) -> Router {
    let api_routes = Router::new()
        // Usage routes
        .route("/usage", get(handlers::get_usage))
        .route("/usage/events", post(handlers::record_event))
        // Playback routes
        .route("/playback/start", post(handlers::start_playback))
        .route("/playback/stop", post(handlers::stop_playback))
        // Health check
        .route("/health", get(handlers::health_check));

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .nest("/api", api_routes)
        .layer(cors)
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Profile;
    use crate::playback::PlaybackController;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use serde_json::{json, Value};
    use tempfile::TempDir;
    use tower::ServiceExt;

    fn test_state(dir: &TempDir, player_command: Vec<String>) -> Arc<AppState> {
        Arc::new(AppState {
            profile: Profile {
                name: "test".to_string(),
                voice: "en-US-Chirp3-HD-Fenrir".to_string(),
                language: "en-US".to_string(),
                audio_format: "mp3".to_string(),
                output_dir: dir.path().join("out"),
                usage_log: dir.path().join("usage.csv"),
                autoplay: true,
                player_command,
            },
            playback: PlaybackController::system(),
        })
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let dir = TempDir::new().unwrap();
        let app = create_router(test_state(&dir, vec![]));
        let response = app
            .oneshot(Request::builder().uri("/api/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_record_then_report() {
        let dir = TempDir::new().unwrap();
        let state = test_state(&dir, vec![]);

        let response = create_router(state.clone())
            .oneshot(post_json(
                "/api/usage/events",
                json!({"chars": 1_200_000, "output_file": "/tmp/a.mp3"}),
            ))
            .await
            .unwrap();
        let body = body_json(response).await;
        assert_eq!(body["success"], json!(true));
        assert_eq!(body["data"]["voice_family"], json!("Chirp3-HD"));
        assert_eq!(body["data"]["chars_this_request"], json!(1_200_000));
        assert_eq!(
            body["data"]["month_to_date_by_family"]["Chirp3-HD"]["billable_chars"],
            json!(200_000)
        );
        assert_eq!(body["data"]["autoplay_started"], json!(false));

        let response = create_router(state)
            .oneshot(Request::builder().uri("/api/usage").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let body = body_json(response).await;
        assert_eq!(body["data"]["total_chars"], json!(1_200_000));
        assert!((body["data"]["total_estimated_cost_usd"].as_f64().unwrap() - 6.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_invalid_month_rejected() {
        let dir = TempDir::new().unwrap();
        let app = create_router(test_state(&dir, vec![]));
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/usage?month=2025-13")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let body = body_json(response).await;
        assert_eq!(body["success"], json!(false));
    }

    #[tokio::test]
    async fn test_record_with_missing_player_still_succeeds() {
        let dir = TempDir::new().unwrap();
        let state = test_state(
            &dir,
            vec!["no-such-player-xyz".to_string(), "{file}".to_string()],
        );

        let response = create_router(state)
            .oneshot(post_json(
                "/api/usage/events",
                json!({"chars": 10, "output_file": "/tmp/a.mp3", "play": true}),
            ))
            .await
            .unwrap();
        let body = body_json(response).await;
        assert_eq!(body["success"], json!(true));
        assert_eq!(body["data"]["autoplay_started"], json!(false));
        assert_eq!(
            body["data"]["playback_warning"],
            json!("Audio player not found: no-such-player-xyz")
        );
    }

    #[tokio::test]
    async fn test_stop_without_player_command() {
        let dir = TempDir::new().unwrap();
        let app = create_router(test_state(&dir, vec![]));
        let response = app
            .oneshot(post_json("/api/playback/stop", json!({})))
            .await
            .unwrap();
        let body = body_json(response).await;
        assert_eq!(
            body["data"],
            json!({"attempted": false, "player": "", "stopped_processes": 0})
        );
    }
}
