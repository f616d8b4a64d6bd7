use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api_rest::{AppState, router};
use casenote_core::config::autosave_debounce_from_env_value;
use casenote_core::constants::DEFAULT_RECORD_DATA_DIR;
use casenote_core::{CoreConfig, SectionRegistry};
use casenote_store::{FileRecordStore, InvestigationsService};

/// Main entry point for the casenote application
///
/// Resolves configuration once, then serves the REST host until interrupted.
///
/// # Environment Variables
/// - `CASENOTE_REST_ADDR`: REST server address (default: "0.0.0.0:3000")
/// - `RECORD_DATA_DIR`: Directory for draft storage (default: "record_data")
/// - `CASENOTE_AUTOSAVE_MS`: Autosave quiet interval in milliseconds (default: 3000)
///
/// # Returns
/// * `Ok(())` - If the server starts and shuts down cleanly
/// * `Err(anyhow::Error)` - If configuration, startup or serving fails
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("casenote_run=info".parse()?)
                .add_directive("casenote_core=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let rest_addr: SocketAddr = std::env::var("CASENOTE_REST_ADDR")
        .unwrap_or_else(|_| "0.0.0.0:3000".into())
        .parse()?;
    let data_dir = PathBuf::from(
        std::env::var("RECORD_DATA_DIR").unwrap_or_else(|_| DEFAULT_RECORD_DATA_DIR.into()),
    );
    let debounce = autosave_debounce_from_env_value(std::env::var("CASENOTE_AUTOSAVE_MS").ok())?;
    let cfg = Arc::new(CoreConfig::new(debounce)?);

    tracing::info!("++ Starting casenote REST on {}", rest_addr);
    tracing::info!(
        "++ Drafts under {}, autosave after {:?} of quiet",
        data_dir.display(),
        cfg.autosave_debounce()
    );

    let store = Arc::new(FileRecordStore::new(&data_dir)?);
    let state = AppState::new(
        cfg,
        SectionRegistry::standard(),
        store,
        InvestigationsService::new(&data_dir),
    );

    let listener = tokio::net::TcpListener::bind(rest_addr).await?;
    axum::serve(listener, router(state.clone()))
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::warn!("failed to listen for shutdown signal: {}", e);
            }
            tracing::info!("-- Shutting down");
        })
        .await?;

    state.close_all().await;

    Ok(())
}
