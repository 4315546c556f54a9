//! Endpoint handlers.
//!
//! Failures map to `{"detail": ...}` bodies: a missing precondition (dataset
//! not loaded, file absent) is a 400 carrying its own message; anything else
//! is a 500 with a fixed per-endpoint message and the cause goes to the log.

use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;

use super::AppState;
use crate::app::pipeline;
use crate::domain::{
    ArimaOutput, DataInfo, DatasetConfig, DatasetPreview, DecompositionOutput, SarimaOutput, Series,
    Table,
};
use crate::error::{AppError, ErrorKind};

const FETCH_FAILED: &str = "Failed to load dataset.";
const INFO_FAILED: &str = "Failed to fetch data information.";
const PLOT_FAILED: &str = "Failed to fetch energy data.";
const DECOMPOSITION_FAILED: &str = "Failed to perform seasonal decomposition.";
const ARIMA_FAILED: &str = "Failed to perform ARIMA forecasting.";
const SARIMA_FAILED: &str = "Failed to perform SARIMA forecasting.";

/// JSON error response.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    detail: String,
}

impl ApiError {
    fn bad_request(detail: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            detail: detail.into(),
        }
    }

    fn new(err: AppError, failure: &'static str) -> Self {
        match err.kind() {
            ErrorKind::Precondition => Self {
                status: StatusCode::BAD_REQUEST,
                detail: err.message().to_string(),
            },
            _ => {
                tracing::error!(error = %err, "{failure}");
                Self {
                    status: StatusCode::INTERNAL_SERVER_ERROR,
                    detail: failure.to_string(),
                }
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(serde_json::json!({ "detail": self.detail }))).into_response()
    }
}

/// `row_limit` follows head semantics: a negative value drops rows from the end.
#[derive(Debug, Deserialize)]
pub struct FetchQuery {
    row_limit: Option<i64>,
}

pub async fn fetch_dataset(
    State(state): State<AppState>,
    query: Result<Query<FetchQuery>, QueryRejection>,
) -> Result<Json<DatasetPreview>, ApiError> {
    let Query(query) = query.map_err(|e| ApiError::bad_request(e.body_text()))?;
    let table = state
        .store
        .load()
        .await
        .map_err(|e| ApiError::new(e, FETCH_FAILED))?;
    let preview = pipeline::preview(&table, query.row_limit);
    tracing::info!(rows = preview.rows_in_preview, "Returning dataset preview.");
    Ok(Json(preview))
}

pub async fn data_info(State(state): State<AppState>) -> Result<Json<DataInfo>, ApiError> {
    analyse(&state, INFO_FAILED, |table, _| Ok(pipeline::data_info(table))).await
}

pub async fn plot_energy(State(state): State<AppState>) -> Result<Json<Series>, ApiError> {
    analyse(&state, PLOT_FAILED, pipeline::plot_energy).await
}

pub async fn seasonal_decomposition(
    State(state): State<AppState>,
) -> Result<Json<DecompositionOutput>, ApiError> {
    analyse(&state, DECOMPOSITION_FAILED, pipeline::seasonal_decomposition).await
}

pub async fn arima_forecast(State(state): State<AppState>) -> Result<Json<ArimaOutput>, ApiError> {
    analyse(&state, ARIMA_FAILED, pipeline::arima_forecast).await
}

pub async fn sarima_forecast(State(state): State<AppState>) -> Result<Json<SarimaOutput>, ApiError> {
    analyse(&state, SARIMA_FAILED, pipeline::sarima_forecast).await
}

/// Run `f` on the loaded table off the async runtime.
async fn analyse<T, F>(state: &AppState, failure: &'static str, f: F) -> Result<Json<T>, ApiError>
where
    T: Send + 'static,
    F: FnOnce(&Table, &DatasetConfig) -> Result<T, AppError> + Send + 'static,
{
    let table = state.store.get().map_err(|e| ApiError::new(e, failure))?;
    let config = state.store.config().clone();

    tokio::task::spawn_blocking(move || f(&table, &config))
        .await
        .map_err(|e| AppError::failed(format!("Analysis task failed: {e}")))
        .and_then(|r| r)
        .map(Json)
        .map_err(|e| ApiError::new(e, failure))
}
