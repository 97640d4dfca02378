pub mod ai;
pub mod api;
pub mod config;
pub mod deck;
pub mod error;
pub mod frontend;
pub mod pipeline;
pub mod render;
pub mod session;
pub mod slides;

use std::sync::Arc;

use anyhow::Context;
use log::info;

use ai::GeminiClient;
use api::AppState;
use config::AppConfig;

/// Logging via `RUST_LOG`, defaulting to `info`.
pub fn init_logging() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
}

/// Run the HTTP service until Ctrl-C or SIGTERM.
pub async fn serve(config: AppConfig) -> anyhow::Result<()> {
    let addr = config.bind_addr()?;
    if config.genai_api_key.is_empty() {
        log::warn!("GENAI_API_KEY is not set; model endpoints will answer 502");
    }

    let gemini = Arc::new(GeminiClient::new(&config));
    let state = AppState::new(config, gemini.clone(), gemini);
    let app = api::router(state);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("deckgen {} listening on {}", env!("CARGO_PKG_VERSION"), addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;
    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            log::error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                log::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("Received Ctrl-C, shutting down"),
        () = terminate => info!("Received SIGTERM, shutting down"),
    }
}
