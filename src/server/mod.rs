//! HTTP surface.
//!
//! Six read-only JSON endpoints over the shared [`DatasetStore`], plus a
//! liveness probe. Requests are logged by `TraceLayer`; CORS is fully open.

use std::sync::Arc;

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::data::DatasetStore;
use crate::domain::{DatasetConfig, ServerConfig};
use crate::error::AppError;

pub mod routes;

/// State shared by every handler.
#[derive(Debug, Clone)]
pub struct AppState {
    pub store: Arc<DatasetStore>,
}

impl AppState {
    pub fn new(config: DatasetConfig) -> Self {
        Self {
            store: Arc::new(DatasetStore::new(config)),
        }
    }
}

/// Build the application router.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(liveness))
        .route("/fetch-dataset", get(routes::fetch_dataset))
        .route("/data-info", get(routes::data_info))
        .route("/plot-energy", get(routes::plot_energy))
        .route("/seasonal-decomposition", get(routes::seasonal_decomposition))
        .route("/arima-forecast", get(routes::arima_forecast))
        .route("/sarima-forecast", get(routes::sarima_forecast))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

async fn liveness(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "alive",
        "version": env!("CARGO_PKG_VERSION"),
        "dataset_loaded": state.store.is_loaded()
    }))
}

/// Bind and serve until Ctrl-C.
pub async fn serve(server: &ServerConfig, dataset: DatasetConfig) -> Result<(), AppError> {
    let addr = server.socket_addr()?;
    let app = router(AppState::new(dataset));

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| AppError::failed(format!("Failed to bind {addr}: {e}")))?;
    tracing::info!("power-ts v{} listening on {}", env!("CARGO_PKG_VERSION"), addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| AppError::failed(format!("Server error: {e}")))?;

    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
}
