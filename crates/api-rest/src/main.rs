//! Standalone REST API server binary.
//!
//! ## Purpose
//! Runs the REST API server on its own.
//!
//! ## Intended use
//! Useful for development and debugging of the REST host (with OpenAPI/Swagger UI). The
//! workspace's main `casenote-run` binary serves the same router.

use api_rest::{router, AppState};
use casenote_core::config::autosave_debounce_from_env_value;
use casenote_core::constants::DEFAULT_RECORD_DATA_DIR;
use casenote_core::{CoreConfig, SectionRegistry};
use casenote_store::{FileRecordStore, InvestigationsService};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Main entry point for the casenote REST API server
///
/// # Environment Variables
/// - `CASENOTE_REST_ADDR`: Server address (default: "0.0.0.0:3000")
/// - `RECORD_DATA_DIR`: Directory for draft storage (default: "record_data")
/// - `CASENOTE_AUTOSAVE_MS`: Autosave quiet interval in milliseconds (default: 3000)
///
/// # Errors
/// Returns an error if:
/// - the logging/tracing configuration cannot be initialised,
/// - the configuration is invalid or the data directory cannot be created,
/// - the server address cannot be bound, or
/// - the HTTP server fails while running.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("api_rest=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let addr = std::env::var("CASENOTE_REST_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into());

    let data_dir = PathBuf::from(
        std::env::var("RECORD_DATA_DIR").unwrap_or_else(|_| DEFAULT_RECORD_DATA_DIR.into()),
    );
    let debounce = autosave_debounce_from_env_value(std::env::var("CASENOTE_AUTOSAVE_MS").ok())?;
    let cfg = Arc::new(CoreConfig::new(debounce)?);

    let store = Arc::new(FileRecordStore::new(&data_dir)?);
    let state = AppState::new(
        cfg,
        SectionRegistry::standard(),
        store,
        InvestigationsService::new(&data_dir),
    );

    tracing::info!("-- Starting casenote REST API on {}", addr);
    tracing::info!("-- Storing drafts under {}", data_dir.display());

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, router(state)).await?;

    Ok(())
}
