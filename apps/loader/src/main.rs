//! Bulk loader: pushes a JSON file of records into one Odoo entity type.

#![forbid(unsafe_code)]

mod loader_config;
mod records;

use std::env;
use std::sync::Arc;

use clap::Parser;
use odoolink_application::{EntityOperations, RemoteGateway};
use odoolink_core::AppError;
use odoolink_infrastructure::JsonRpcOdooSession;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::loader_config::{LoadJob, LoaderConfig};

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    init_tracing();

    let job = LoadJob::parse();
    let config = LoaderConfig::from_lookup(|name| env::var(name).ok())?;
    let records = records::read_records(&job.records_path)?;
    info!(
        entity_type = %job.entity_type,
        records = records.len(),
        path = %job.records_path.display(),
        "records read"
    );

    let session = JsonRpcOdooSession::connect(&config.connection).await?;
    let uid = session.uid();
    let gateway = RemoteGateway::new(
        Arc::new(session),
        config.context.clone(),
        config.connection.api_version,
    );
    info!(
        url = %config.connection.url,
        database = %config.connection.database,
        uid,
        api_version = %gateway.api_version(),
        "connected"
    );

    let report = gateway
        .entity(job.entity_type.clone())
        .bulk_load(&records, &config.bulk_load_options())
        .await?;

    info!(
        entity_type = %report.entity_type,
        records = report.records_processed,
        ids = report.created_ids.len(),
        elapsed_ms = report.total_elapsed.as_millis(),
        "load complete"
    );

    Ok(())
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}
