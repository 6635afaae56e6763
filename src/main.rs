// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! CalTrack analysis service.
//!
//! Serves the meal-photo analysis endpoint: origin control, image
//! payload validation, upstream AI-gateway proxying, and error
//! normalization.

use caltrack::{config::Config, services::AiGatewayClient, AppState};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging();

    let config = Config::from_env().expect("Failed to load configuration");
    tracing::info!(port = config.port, "Starting CalTrack analysis service");

    if config.gateway_api_key.is_none() {
        // Deliberate: the server still starts and reports a per-request
        // configuration error instead of crash-looping.
        tracing::warn!("AI_GATEWAY_API_KEY is not set; analysis requests will fail");
    }

    let gateway = Arc::new(AiGatewayClient::from_config(&config));
    tracing::info!(
        url = %config.gateway_url,
        model = %config.gateway_model,
        "AI gateway client initialized"
    );

    let state = Arc::new(AppState {
        config: config.clone(),
        gateway,
    });

    let app = caltrack::routes::create_router(state);

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging.
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("caltrack=debug".parse().unwrap())
                .add_directive("info".parse().unwrap()),
        )
        .with(format)
        .init();
}
