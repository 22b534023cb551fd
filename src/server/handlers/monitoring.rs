//! Monitoring lifecycle API handlers.

use axum::{Json, extract::State};
use std::sync::Arc;

use crate::lifecycle::MonitoringState;

use super::super::state::AppState;
use super::ApiError;

/// GET /api/monitoring - current persisted flag.
pub async fn status(State(state): State<Arc<AppState>>) -> Result<Json<MonitoringState>, ApiError> {
    let result = tokio::task::spawn_blocking(move || state.lifecycle.state()).await?;
    Ok(Json(result?))
}

/// POST /api/monitoring/start
pub async fn start(State(state): State<Arc<AppState>>) -> Result<Json<MonitoringState>, ApiError> {
    let result = tokio::task::spawn_blocking(move || state.lifecycle.start()).await?;
    Ok(Json(result?))
}

/// POST /api/monitoring/stop
pub async fn stop(State(state): State<Arc<AppState>>) -> Result<Json<MonitoringState>, ApiError> {
    let result = tokio::task::spawn_blocking(move || state.lifecycle.stop()).await?;
    Ok(Json(result?))
}
