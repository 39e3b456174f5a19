use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;

use crate::config::load_from_args;
use crate::playback::PlaybackController;
use crate::server::{create_router, AppState};

/// Run the HTTP automation API until interrupted
pub async fn run(
    profiles: Option<&str>,
    profile: Option<&str>,
    host: String,
    port: u16,
) -> Result<()> {
    let (path, profile) = load_from_args(profiles, profile)?;
    tracing::info!(
        profile = %profile.name,
        profiles_file = %path.display(),
        usage_log = %profile.usage_log.display(),
        "Loaded profile"
    );

    let state = Arc::new(AppState {
        profile,
        playback: PlaybackController::system(),
    });
    let app = create_router(state);

    let addr: SocketAddr = format!("{}:{}", host, port)
        .parse()
        .with_context(|| format!("Invalid address: {}:{}", host, port))?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    println!("[tts-meter] Server running at http://{}", addr);
    println!("[tts-meter] Press Ctrl+C to stop");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("Shutting down");
        })
        .await
        .context("Server error")?;

    Ok(())
}
