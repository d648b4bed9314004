//! Contact form web service composition root.

#![forbid(unsafe_code)]

mod api_config;
mod api_router;
mod dto;
mod error;
mod handlers;
mod state;
mod views;

use std::sync::Arc;

use odoolink_application::ContactMessageService;
use odoolink_core::AppError;
use odoolink_infrastructure::PostgresContactMessageRepository;
use sqlx::postgres::PgPoolOptions;
use tracing::info;

use crate::api_config::{ApiConfig, init_tracing};
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = ApiConfig::load()?;

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&config.database_url)
        .await
        .map_err(|error| AppError::Internal(format!("failed to connect to database: {error}")))?;

    sqlx::migrate!("../../crates/infrastructure/migrations")
        .run(&pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to run migrations: {error}")))?;

    if config.migrate_only {
        info!("database migrations applied successfully");
        return Ok(());
    }

    let app_state = AppState {
        contact_message_service: ContactMessageService::new(Arc::new(
            PostgresContactMessageRepository::new(pool),
        )),
    };
    let app = api_router::build_router(app_state, &config.frontend_url)?;

    let address = config.socket_address()?;
    let listener = tokio::net::TcpListener::bind(address)
        .await
        .map_err(|error| AppError::Internal(format!("failed to bind listener: {error}")))?;

    info!(%address, "odoolink-api listening");

    axum::serve(listener, app)
        .await
        .map_err(|error| AppError::Internal(format!("api server error: {error}")))
}
