//! # HTTP Server for Receipt Printing
//!
//! Exposes the printer service and the monitoring lifecycle over HTTP so the
//! conductor app (or anything on the device) can print without linking the
//! library.
//!
//! ## Usage
//!
//! ```bash
//! boleta serve --listen 127.0.0.1:8080
//! curl -F content=@receipt.txt -F logo=@logo.png http://127.0.0.1:8080/api/receipt/print
//! ```
//!
//! | Method | Path | Body | Response |
//! |--------|------|------|----------|
//! | GET | `/api/printer/available` | | `{"available": true}` |
//! | POST | `/api/receipt/print` | multipart `content`, `logo` | `{"printed", "channels"}` |
//! | POST | `/api/receipt/encode` | multipart `content`, `logo` | ESC/POS bytes |
//! | GET | `/api/monitoring` | | `{"is_monitoring", "updated_at"}` |
//! | POST | `/api/monitoring/start` | | same |
//! | POST | `/api/monitoring/stop` | | same |

mod handlers;
mod state;

pub use state::{AppState, ServerConfig};

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::error::BoletaError;

/// Logo uploads are small bitmaps; leave room for an uncompressed one.
const RECEIPT_BODY_LIMIT: usize = 10 * 1024 * 1024;

/// Build the application router.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/printer/available", get(handlers::printer::available))
        .route(
            "/api/receipt/print",
            post(handlers::receipt::print).layer(DefaultBodyLimit::max(RECEIPT_BODY_LIMIT)),
        )
        .route(
            "/api/receipt/encode",
            post(handlers::receipt::encode).layer(DefaultBodyLimit::max(RECEIPT_BODY_LIMIT)),
        )
        .route("/api/monitoring", get(handlers::monitoring::status))
        .route("/api/monitoring/start", post(handlers::monitoring::start))
        .route("/api/monitoring/stop", post(handlers::monitoring::stop))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the HTTP server.
///
/// ## Example
///
/// ```no_run
/// use std::sync::Arc;
/// use boleta::dispatch::Platform;
/// use boleta::lifecycle::{Lifecycle, LoggingService};
/// use boleta::printer::{DispatchConfig, PrinterConfig};
/// use boleta::server::{serve, AppState, ServerConfig};
/// use boleta::service::PrinterService;
///
/// # async fn example() -> Result<(), boleta::BoletaError> {
/// let config = DispatchConfig::default();
/// let printer = PrinterService::new(
///     &config,
///     PrinterConfig::default(),
///     Platform::system("255.255.255.255:9450".parse().unwrap()),
/// );
/// let lifecycle = Lifecycle::new(Arc::new(LoggingService), "/var/lib/boleta/state.json");
///
/// serve(
///     ServerConfig { listen_addr: "127.0.0.1:8080".to_string() },
///     AppState::new(printer, lifecycle),
/// )
/// .await?;
/// # Ok(())
/// # }
/// ```
pub async fn serve(config: ServerConfig, state: AppState) -> Result<(), BoletaError> {
    let app = router(Arc::new(state));

    let listener = tokio::net::TcpListener::bind(&config.listen_addr)
        .await
        .map_err(|e| {
            BoletaError::Transport(format!("Failed to bind to {}: {}", config.listen_addr, e))
        })?;

    info!(listen = %config.listen_addr, "boleta HTTP server listening");

    axum::serve(listener, app)
        .await
        .map_err(|e| BoletaError::Transport(format!("Server error: {}", e)))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::{Channel, ChannelDispatcher};
    use crate::lifecycle::{Lifecycle, LoggingService};
    use crate::printer::PrinterConfig;
    use crate::receipt::ReceiptJob;
    use crate::service::PrinterService;
    use axum::body::Body;
    use axum::http::{Request, StatusCode, header};
    use tower::ServiceExt;

    const BOUNDARY: &str = "boleta-test-boundary";

    struct Offline;

    impl Channel for Offline {
        fn name(&self) -> &'static str {
            "offline"
        }

        fn attempt(&self, _job: &ReceiptJob) -> Result<(), BoletaError> {
            Err(BoletaError::Transport("no printer".into()))
        }
    }

    fn app(dir: &tempfile::TempDir) -> Router {
        let printer = PrinterService::with_dispatcher(
            ChannelDispatcher::new(vec![Box::new(Offline)]),
            PrinterConfig::default(),
        );
        let lifecycle = Lifecycle::new(Arc::new(LoggingService), dir.path().join("state.json"));
        router(Arc::new(AppState::new(printer, lifecycle)))
    }

    fn multipart(fields: &[(&str, &str)]) -> Request<Body> {
        let mut body = Vec::new();
        for (name, value) in fields {
            body.extend(format!("--{BOUNDARY}\r\n").as_bytes());
            body.extend(
                format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n").as_bytes(),
            );
            body.extend(value.as_bytes());
            body.extend(b"\r\n");
        }
        body.extend(format!("--{BOUNDARY}--\r\n").as_bytes());

        Request::builder()
            .method("POST")
            .uri("/api/receipt/print")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    async fn json_body(response: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_printer_available() {
        let dir = tempfile::tempdir().unwrap();
        let response = app(&dir)
            .oneshot(
                Request::builder()
                    .uri("/api/printer/available")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["available"], true);
    }

    #[tokio::test]
    async fn test_print_reports_channels() {
        let dir = tempfile::tempdir().unwrap();
        let response = app(&dir)
            .oneshot(multipart(&[("content", "TOTAL: 50.00\n")]))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["printed"], true);
        assert_eq!(body["channels"][0]["channel"], "offline");
        assert_eq!(body["channels"][0]["succeeded"], false);
    }

    #[tokio::test]
    async fn test_print_without_content_is_invalid_argument() {
        let dir = tempfile::tempdir().unwrap();
        let response = app(&dir)
            .oneshot(multipart(&[("logo", "not really a png")]))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert_eq!(body["error"]["code"], "INVALID_ARGUMENT");
        assert_eq!(body["error"]["message"], "Content is null");
    }

    #[tokio::test]
    async fn test_print_with_blank_content_is_invalid_argument() {
        let dir = tempfile::tempdir().unwrap();
        for blank in ["", " \n\t"] {
            let response = app(&dir)
                .oneshot(multipart(&[("content", blank)]))
                .await
                .unwrap();

            assert_eq!(response.status(), StatusCode::BAD_REQUEST);
            let body = json_body(response).await;
            assert_eq!(body["error"]["code"], "INVALID_ARGUMENT");
            assert_eq!(body["error"]["message"], "Content is empty");
        }
    }

    #[tokio::test]
    async fn test_encode_returns_command_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let mut request = multipart(&[("content", "hi")]);
        *request.uri_mut() = "/api/receipt/encode".parse().unwrap();

        let response = app(&dir).oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "application/octet-stream"
        );
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&bytes[..], &[0x1B, 0x40, b'h', b'i', 0x1D, 0x56, 0x00]);
    }

    #[tokio::test]
    async fn test_monitoring_start_stop() {
        let dir = tempfile::tempdir().unwrap();
        let app = app(&dir);

        let post = |uri: &str| {
            Request::builder()
                .method("POST")
                .uri(uri)
                .body(Body::empty())
                .unwrap()
        };

        let started = app
            .clone()
            .oneshot(post("/api/monitoring/start"))
            .await
            .unwrap();
        assert_eq!(json_body(started).await["is_monitoring"], true);

        let status = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/api/monitoring")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(json_body(status).await["is_monitoring"], true);

        let stopped = app.oneshot(post("/api/monitoring/stop")).await.unwrap();
        assert_eq!(json_body(stopped).await["is_monitoring"], false);
    }
}
