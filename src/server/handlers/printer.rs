//! Printer availability.

use axum::{Json, extract::State};
use serde::Serialize;
use std::sync::Arc;

use super::super::state::AppState;

#[derive(Debug, Serialize)]
pub struct AvailabilityResponse {
    pub available: bool,
}

/// GET /api/printer/available
pub async fn available(State(state): State<Arc<AppState>>) -> Json<AvailabilityResponse> {
    Json(AvailabilityResponse {
        available: state.printer.is_printer_available(),
    })
}
