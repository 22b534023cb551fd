//! # Monitoring Lifecycle
//!
//! The conductor device runs a location-tracking foreground service while a
//! trip is being monitored. The service itself is owned by the platform; this
//! module only drives it and remembers whether it should be running, so that
//! it can be brought back after a reboot.
//!
//! State is a small JSON file:
//!
//! ```json
//! {"is_monitoring": true, "updated_at": "2026-03-01T08:15:00Z"}
//! ```
//!
//! A missing state file means "not monitoring". Receipt printing never reads
//! this state.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::BoletaError;

/// Notification shown while the foreground service runs.
pub const NOTIFICATION_TITLE: &str = "B-Go Conductor Active";
pub const NOTIFICATION_TEXT: &str = "Tracking location for passenger drop-off detection";

/// Platform hooks for the location foreground service.
pub trait ForegroundService: Send + Sync {
    fn start_foreground_service(&self) -> Result<(), BoletaError>;
    fn stop_foreground_service(&self) -> Result<(), BoletaError>;
    fn request_background_location_permission(&self) -> Result<(), BoletaError>;
}

/// A service that only records transitions in the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingService;

impl ForegroundService for LoggingService {
    fn start_foreground_service(&self) -> Result<(), BoletaError> {
        info!(title = NOTIFICATION_TITLE, text = NOTIFICATION_TEXT, "foreground service started");
        Ok(())
    }

    fn stop_foreground_service(&self) -> Result<(), BoletaError> {
        info!("foreground service stopped");
        Ok(())
    }

    fn request_background_location_permission(&self) -> Result<(), BoletaError> {
        info!("background location permission requested");
        Ok(())
    }
}

/// Persisted monitoring flag.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonitoringState {
    pub is_monitoring: bool,
    pub updated_at: Option<DateTime<Utc>>,
}

impl MonitoringState {
    /// Load from `path`. A missing file yields the default (not monitoring).
    pub fn load(path: &Path) -> Result<Self, BoletaError> {
        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => return Err(e.into()),
        };
        serde_json::from_str(&contents).map_err(|e| {
            BoletaError::Config(format!("Invalid state file {}: {}", path.display(), e))
        })
    }

    pub fn save(&self, path: &Path) -> Result<(), BoletaError> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| BoletaError::Config(format!("Failed to encode state: {}", e)))?;
        fs::write(path, json)?;
        Ok(())
    }
}

/// Drives a [`ForegroundService`] and keeps the monitoring flag in sync.
pub struct Lifecycle {
    service: Arc<dyn ForegroundService>,
    state_file: PathBuf,
}

impl Lifecycle {
    pub fn new(service: Arc<dyn ForegroundService>, state_file: impl Into<PathBuf>) -> Self {
        Self {
            service,
            state_file: state_file.into(),
        }
    }

    pub fn state_file(&self) -> &Path {
        &self.state_file
    }

    pub fn state(&self) -> Result<MonitoringState, BoletaError> {
        MonitoringState::load(&self.state_file)
    }

    /// Request permission, start the service, then persist the flag.
    pub fn start(&self) -> Result<MonitoringState, BoletaError> {
        self.service.request_background_location_permission()?;
        self.service.start_foreground_service()?;
        self.persist(true)
    }

    /// Stop the service and clear the flag.
    pub fn stop(&self) -> Result<MonitoringState, BoletaError> {
        self.service.stop_foreground_service()?;
        self.persist(false)
    }

    /// Restart the service after a reboot iff monitoring was on.
    ///
    /// Returns whether the service was restarted.
    pub fn on_boot(&self) -> Result<bool, BoletaError> {
        let state = self.state()?;
        debug!(is_monitoring = state.is_monitoring, "checking monitoring state at boot");
        if !state.is_monitoring {
            return Ok(false);
        }
        info!("restarting monitoring after boot");
        self.service.start_foreground_service()?;
        Ok(true)
    }

    fn persist(&self, is_monitoring: bool) -> Result<MonitoringState, BoletaError> {
        let state = MonitoringState {
            is_monitoring,
            updated_at: Some(Utc::now()),
        };
        state.save(&self.state_file)?;
        Ok(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorded(Mutex<Vec<&'static str>>);

    impl Recorded {
        fn calls(&self) -> Vec<&'static str> {
            self.0.lock().unwrap().clone()
        }
    }

    impl ForegroundService for Recorded {
        fn start_foreground_service(&self) -> Result<(), BoletaError> {
            self.0.lock().unwrap().push("start");
            Ok(())
        }

        fn stop_foreground_service(&self) -> Result<(), BoletaError> {
            self.0.lock().unwrap().push("stop");
            Ok(())
        }

        fn request_background_location_permission(&self) -> Result<(), BoletaError> {
            self.0.lock().unwrap().push("permission");
            Ok(())
        }
    }

    #[test]
    fn test_missing_state_file_is_not_monitoring() {
        let dir = tempfile::tempdir().unwrap();
        let state = MonitoringState::load(&dir.path().join("state.json")).unwrap();
        assert!(!state.is_monitoring);
    }

    #[test]
    fn test_start_then_boot_restarts() {
        let dir = tempfile::tempdir().unwrap();
        let service = Arc::new(Recorded::default());
        let lifecycle = Lifecycle::new(service.clone(), dir.path().join("state.json"));

        assert!(lifecycle.start().unwrap().is_monitoring);
        assert!(lifecycle.on_boot().unwrap());
        assert_eq!(service.calls(), vec!["permission", "start", "start"]);
    }

    #[test]
    fn test_stop_then_boot_stays_stopped() {
        let dir = tempfile::tempdir().unwrap();
        let service = Arc::new(Recorded::default());
        let lifecycle = Lifecycle::new(service.clone(), dir.path().join("nested/state.json"));

        lifecycle.start().unwrap();
        lifecycle.stop().unwrap();
        assert!(!lifecycle.on_boot().unwrap());
        assert!(!lifecycle.state().unwrap().is_monitoring);
        assert_eq!(service.calls(), vec!["permission", "start", "stop"]);
    }

    #[test]
    fn test_boot_without_state_does_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let service = Arc::new(Recorded::default());
        let lifecycle = Lifecycle::new(service.clone(), dir.path().join("state.json"));

        assert!(!lifecycle.on_boot().unwrap());
        assert!(service.calls().is_empty());
    }

    #[test]
    fn test_corrupt_state_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        fs::write(&path, "not json").unwrap();
        assert!(matches!(
            MonitoringState::load(&path),
            Err(BoletaError::Config(_))
        ));
    }
}
