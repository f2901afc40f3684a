//! Helperbase API Server Entry Point
//!
//! Loads configuration, seeds the bootstrap admin, and starts the Axum
//! HTTP server over the in-memory record store.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use helperbase_api::telemetry::{init_tracing, TelemetryConfig};
use helperbase_api::{
    create_api_router, ApiConfig, ApiError, ApiResult, AppState, AuthConfig, BootstrapAdmin,
};
use helperbase_storage::InMemoryRecordStore;

#[tokio::main]
async fn main() -> ApiResult<()> {
    let telemetry_config = TelemetryConfig::default();
    init_tracing(&telemetry_config)?;

    let api_config = ApiConfig::from_env();
    let auth_config = AuthConfig::from_env();

    let state = AppState::new(Arc::new(InMemoryRecordStore::new()), api_config, auth_config);

    match BootstrapAdmin::from_env() {
        Some(admin) => {
            admin.seed(&state.store).await?;
        }
        None => tracing::warn!(
            "No bootstrap admin configured. Set HELPERBASE_BOOTSTRAP_ADMIN_EMAIL and \
             HELPERBASE_BOOTSTRAP_ADMIN_PASSWORD to create one."
        ),
    }

    let app: Router = create_api_router(state, &telemetry_config)?;

    let addr = resolve_bind_addr()?;
    tracing::info!(%addr, "Starting Helperbase API server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| ApiError::internal_error(format!("Failed to bind {}: {}", addr, e)))?;

    let server = axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    );
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

fn resolve_bind_addr() -> ApiResult<SocketAddr> {
    let host = std::env::var("HELPERBASE_API_BIND").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port_str = std::env::var("PORT")
        .ok()
        .or_else(|| std::env::var("HELPERBASE_API_PORT").ok())
        .unwrap_or_else(|| "3000".to_string());
    let port = port_str
        .parse::<u16>()
        .map_err(|_| ApiError::invalid_input(format!("Invalid port value: {}", port_str)))?;

    let addr = format!("{}:{}", host, port);
    addr.parse::<SocketAddr>()
        .map_err(|e| ApiError::invalid_input(format!("Invalid bind address {}: {}", addr, e)))
}
