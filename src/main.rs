//! LLM chatbot relay
//!
//! Accepts `POST /ask` from the configured browser origin and forwards the
//! conversation to the upstream model.

use llm_chatbot::api::{create_router, AppState};
use llm_chatbot::config::RelayConfig;
use std::net::SocketAddr;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "llm_chatbot=info,tower_http=debug".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(false),
        )
        .init();

    // Configuration
    let config = RelayConfig::from_env()?;
    let llm = config.llm.build_service()?;

    tracing::info!(
        model = %llm.model_id(),
        allowed_origin = ?config.allowed_origin,
        timeout_secs = config.llm.timeout.as_secs(),
        "Upstream model configured"
    );

    let app = create_router(AppState::new(llm, config.allowed_origin));

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Relay listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
