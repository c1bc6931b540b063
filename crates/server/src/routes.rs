use std::sync::Arc;

use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use stockwatch_core::errors::CheckError;
use stockwatch_core::monitor::StockMonitor;
use stockwatch_core::responses::{CheckResponse, ErrorResponse, IndexResponse, StatusResponse};
use tower_http::cors::CorsLayer;
use tracing::error;

#[derive(Clone)]
pub struct AppState {
    monitor: Arc<StockMonitor>,
}

pub fn router(monitor: Arc<StockMonitor>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/check", get(check))
        .route("/status", get(status))
        .layer(CorsLayer::permissive())
        .with_state(AppState { monitor })
}

pub async fn index(State(state): State<AppState>) -> Json<IndexResponse> {
    Json(IndexResponse::from(state.monitor.summary()))
}

pub async fn check(
    State(state): State<AppState>,
) -> Result<Json<CheckResponse>, (StatusCode, Json<ErrorResponse>)> {
    // Detached so a dropped client connection cannot cancel a check between
    // notifying and recording the new status.
    let monitor = state.monitor.clone();
    let outcome = tokio::spawn(async move { monitor.check().await })
        .await
        .unwrap_or_else(|join_error| Err(CheckError::Aborted(join_error.to_string())));

    match outcome {
        Ok(report) => Ok(Json(CheckResponse::from(report))),
        Err(check_error) => {
            error!(
                event_name = "http.check.failed",
                error_class = check_error.error_class(),
                error = %check_error,
                "check request failed"
            );
            Err((StatusCode::INTERNAL_SERVER_ERROR, Json(ErrorResponse::from(&check_error))))
        }
    }
}

pub async fn status(State(state): State<AppState>) -> Json<StatusResponse> {
    Json(StatusResponse::new(state.monitor.last_status().await))
}
