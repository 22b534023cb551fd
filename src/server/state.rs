//! Server state and configuration.

use crate::lifecycle::Lifecycle;
use crate::service::PrinterService;

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to listen on (e.g., "0.0.0.0:8080")
    pub listen_addr: String,
}

/// Application state shared across handlers.
pub struct AppState {
    pub printer: PrinterService,
    pub lifecycle: Lifecycle,
}

impl AppState {
    pub fn new(printer: PrinterService, lifecycle: Lifecycle) -> Self {
        Self { printer, lifecycle }
    }
}
