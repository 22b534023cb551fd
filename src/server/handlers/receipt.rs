//! Receipt printing handlers.

use axum::{
    Json,
    extract::{Multipart, State},
    http::header,
    response::IntoResponse,
};
use serde::Serialize;
use std::sync::Arc;

use crate::dispatch::ChannelResult;

use super::super::state::AppState;
use super::ApiError;

/// Fields read from the multipart form.
#[derive(Debug, Default)]
pub struct ReceiptForm {
    /// Receipt body (required)
    pub content: Option<String>,
    /// Encoded logo image
    pub logo: Option<Vec<u8>>,
}

/// Response from the print endpoint.
#[derive(Debug, Serialize)]
pub struct PrintResponse {
    pub printed: bool,
    pub channels: Vec<ChannelResult>,
}

/// Read `content` and `logo` from a multipart form. Unknown fields are
/// ignored; an empty logo part counts as no logo. Blank content is rejected
/// here; a missing field is left for the service to reject.
async fn read_form(mut multipart: Multipart) -> Result<ReceiptForm, ApiError> {
    let mut form = ReceiptForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(format!("Multipart error: {}", e)))?
    {
        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "content" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| ApiError::bad_request(format!("Failed to read content: {}", e)))?;
                form.content = Some(text);
            }
            "logo" => {
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::bad_request(format!("Failed to read logo: {}", e)))?;
                if !bytes.is_empty() {
                    form.logo = Some(bytes.to_vec());
                }
            }
            _ => {}
        }
    }

    if let Some(content) = &form.content
        && content.trim().is_empty()
    {
        return Err(ApiError::bad_request("Content is empty"));
    }

    Ok(form)
}

/// POST /api/receipt/print - send the receipt down every channel.
pub async fn print(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<Json<PrintResponse>, ApiError> {
    let form = read_form(multipart).await?;

    // Channel I/O blocks (device writes, spooler checks)
    let report = tokio::task::spawn_blocking(move || {
        state.printer.print(form.content.as_deref(), form.logo)
    })
    .await??;

    Ok(Json(PrintResponse {
        printed: report.completed,
        channels: report.results,
    }))
}

/// POST /api/receipt/encode - the raw-device byte stream, no I/O.
pub async fn encode(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    let form = read_form(multipart).await?;

    let command = tokio::task::spawn_blocking(move || {
        state.printer.encode(form.content.as_deref(), form.logo)
    })
    .await??;

    Ok((
        [(header::CONTENT_TYPE, "application/octet-stream")],
        command.into_bytes(),
    ))
}
