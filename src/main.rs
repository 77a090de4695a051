// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! CaliSheet API Server
//!
//! Stores workout routines, records completed sessions, and serves
//! training-history queries for the CaliSheet app.

use calisheet_api::{config::Config, db::Db, services::TokenVerifier, AppState};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging
    init_logging();

    // Load configuration from environment
    let config = Config::from_env().expect("Failed to load configuration");
    tracing::info!(port = config.port, "Starting CaliSheet API");

    // Open the database and apply migrations
    let db = Db::connect(&config.database_url)
        .await
        .expect("Failed to open database");

    let token_verifier =
        Arc::new(TokenVerifier::new(&config).expect("Failed to initialize token verifier"));

    // Build shared state
    let state = Arc::new(AppState {
        config: config.clone(),
        db,
        token_verifier,
    });

    // Build router
    let app = calisheet_api::routes::create_router(state);

    // Start server
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
                .add_directive("calisheet_api=debug".parse().unwrap())
                .add_directive("info".parse().unwrap()),
        )
        .with(format)
        .init();
}
