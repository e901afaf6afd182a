use axum::{routing::get, Router};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use creacaos::{config::AppConfig, history::JsonFileHistoryStore, state::AppState, ws};

#[tokio::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present (before any env var reads)
    if let Err(e) = dotenvy::dotenv() {
        // Not an error if .env doesn't exist, only log if it's a different issue
        if !matches!(e, dotenvy::Error::Io(_)) {
            eprintln!("Warning: Failed to load .env file: {}", e);
        }
    }

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "creacaos=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Crea-Caos...");

    let config = AppConfig::from_env();

    let classifier = match config.classifier.build() {
        Ok(Some(classifier)) => {
            tracing::info!("Classifier '{}' initialized", classifier.name());
            Some(classifier)
        }
        Ok(None) => {
            tracing::warn!("No classifier configured. Scavenger scans will never match.");
            None
        }
        Err(e) => {
            tracing::warn!(
                "Failed to initialize classifier: {}. Scavenger scans will never match.",
                e
            );
            None
        }
    };

    let store = Arc::new(JsonFileHistoryStore::new(config.history_path.clone()));
    tracing::info!("Match history at {}", store.path().display());

    // Stays on the loading screen until the first client reports `finish_loading`
    let state = Arc::new(AppState::new(config.game.clone(), store, classifier));

    let app = Router::new()
        .route("/ws", get(ws::ws_handler))
        .fallback_service(ServeDir::new("static"))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await
}
