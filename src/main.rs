//! Socratix tutor server.
//!
//! Serves `POST /socratic-tutor` backed by OpenAI chat completions.
//!
//! # Usage
//! ```bash
//! SOCRATIX__AI__OPENAI_API_KEY=sk-... socratix
//! ```

use std::sync::Arc;

use secrecy::ExposeSecret;
use tower_http::timeout::TimeoutLayer;

use socratix::adapters::ai::{OpenAIConfig, OpenAIProvider};
use socratix::adapters::http::{cors_for_origins, tutor_router_with_cors, TutorAppState};
use socratix::adapters::postgres;
use socratix::adapters::tutor::LlmTutorClient;
use socratix::config::AppConfig;
use socratix::telemetry;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;
    config.validate()?;
    telemetry::init_tracing(&config.logging)?;

    let api_key = config
        .ai
        .openai_api_key
        .as_ref()
        .ok_or("OpenAI API key is not configured (SOCRATIX__AI__OPENAI_API_KEY)")?;

    let provider = OpenAIProvider::new(
        OpenAIConfig::new(api_key.expose_secret().as_str())
            .with_model(config.ai.model.as_str())
            .with_base_url(config.ai.base_url.as_str())
            .with_timeout(config.ai.timeout())
            .with_max_attempts(config.ai.max_attempts)
            .with_backoff_unit(config.ai.backoff_unit()),
    )?;
    let tutor = LlmTutorClient::new(Arc::new(provider)).with_temperature(config.ai.temperature);

    if let Some(database) = config.database.as_ref().filter(|db| db.run_migrations) {
        let pool = postgres::connect(database).await?;
        postgres::migrate(&pool).await?;
        tracing::info!("Database migrations applied");
    }

    let state = TutorAppState::new(Arc::new(tutor), config.tutor.clone());
    let cors = cors_for_origins(&config.server.cors_origins_list())?;
    let app = tutor_router_with_cors(state, cors)
        .layer(TimeoutLayer::new(config.server.request_timeout()));

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(
        %addr,
        model = %config.ai.model,
        environment = ?config.server.environment,
        "Socratix tutor listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Socratix tutor stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %err, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
