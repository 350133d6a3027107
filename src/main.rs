//! SQL Chat - natural-language questions to SQL over a fixed schema
//!
//! Serves a small browser chat that greets the user once they supply a
//! Gemini API key and then translates each question into a SQL query.

mod api;
mod config;
mod controller;
mod llm;
mod markdown;
mod prompt;
mod runtime;
mod session;

use api::{create_router, AppState};
use config::Config;
use llm::{ClientFactory, GeminiFactory};
use runtime::SessionManager;
use std::sync::Arc;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sql_chat=info,tower_http=debug".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(false),
        )
        .init();

    let config = Config::from_env()?;
    tracing::info!(
        model = %config.llm.model,
        gateway = ?config.llm.gateway,
        idle_secs = config.session_idle.as_secs(),
        "Configuration loaded"
    );

    let model = config.llm.model.to_string();
    let factory: Arc<dyn ClientFactory> = Arc::new(GeminiFactory::new(config.llm));
    let sessions = Arc::new(SessionManager::new(factory, config.session_idle));
    sessions.clone().spawn_idle_sweeper();

    let state = AppState::new(sessions, model);

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let compression = CompressionLayer::new()
        .gzip(true)
        .br(true)
        .deflate(true)
        .zstd(true);

    let app = create_router(state)
        .layer(cors)
        .layer(compression)
        .layer(TraceLayer::new_for_http());

    tracing::info!("SQL chat server listening on {}", config.bind);

    let listener = tokio::net::TcpListener::bind(config.bind).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
