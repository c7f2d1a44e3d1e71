//! Widget API Server Entry Point
//!
//! Loads configuration, opens the store and serves the Axum router until
//! Ctrl-C.

use widget_api::telemetry::{init_tracer, TelemetryConfig};
use widget_api::{create_api_router, ApiConfig, ApiError, ApiResult, WidgetDb};
use widget_storage::{StoreConfig, WidgetStore};

#[tokio::main]
async fn main() -> ApiResult<()> {
    let telemetry_config = TelemetryConfig::default();
    init_tracer(&telemetry_config)?;

    let store_config = StoreConfig::from_env();
    tracing::info!(
        path = %store_config.path.display(),
        table = %store_config.table,
        "Using widget store"
    );
    let store = WidgetStore::open(store_config)?;

    let api_config = ApiConfig::from_env()?;
    let db = WidgetDb::new(store, api_config.malformed_records);
    db.bootstrap().await?;
    let app = create_api_router(db, &api_config);

    let addr = api_config.bind_addr()?;
    tracing::info!(%addr, malformed_records = %api_config.malformed_records, "Starting widget API server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| ApiError::internal_error(format!("Failed to bind {}: {}", addr, e)))?;

    let server = axum::serve(listener, app);
    tokio::select! {
        result = server => {
            result.map_err(|e| ApiError::internal_error(format!("Server error: {}", e)))?;
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutdown signal received");
        }
    }

    Ok(())
}
