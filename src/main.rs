//! VitalTrack service
//!
//! Main entry point for the VitalTrack vitals tracking service.

use actix_cors::Cors;
use actix_web::{web, App, HttpServer};
use anyhow::Context;
use tracing_actix_web::TracingLogger;

use vitaltrack::api;
use vitaltrack::api::handlers::AppState;
use vitaltrack::auth::AuthService;
use vitaltrack::config;
use vitaltrack::store::RecordStore;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    // Initialize logger
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    // Load configuration
    let config = config::load_config().context("Failed to load configuration")?;

    // Connect to the record store
    let store = RecordStore::connect(&config.database.url)
        .await
        .context("Failed to connect to record store")?;

    // Bring up the identity provider on the same pool
    let auth = AuthService::new(
        store.pool(),
        &config.auth.jwt_secret,
        config.auth.token_ttl_minutes,
    )
    .await
    .context("Failed to initialize identity provider")?;

    let state = web::Data::new(AppState {
        store,
        auth,
        thresholds: config.clinical,
    });

    let bind_addr = format!("{}:{}", config.server.host, config.server.port);
    tracing::info!("Starting VitalTrack on {}", bind_addr);

    // Start HTTP server
    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(TracingLogger::default())
            .wrap(Cors::permissive())
            .configure(api::configure)
    })
    .bind(bind_addr)?
    .run()
    .await?;

    Ok(())
}
