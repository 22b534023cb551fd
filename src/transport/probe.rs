//! # Device Probe
//!
//! Locates an attached serial or USB thermal printer by checking a fixed,
//! ordered list of character-device paths. The first path that exists wins;
//! order encodes priority (most common hardware first).
//!
//! The probe only checks existence. It never opens or writes, and it keeps
//! no cache: printers get hot-plugged between receipts, so every raw-device
//! attempt probes again.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::debug;

/// Filesystem access needed by the probe.
pub trait DeviceFs: Send + Sync {
    fn exists(&self, path: &Path) -> bool;
}

/// The real filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemFs;

impl DeviceFs for SystemFs {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }
}

/// Return the first candidate for which `exists` is true.
///
/// ```
/// use std::path::{Path, PathBuf};
/// use boleta::transport::probe::first_existing;
///
/// let candidates = vec![PathBuf::from("/dev/a"), PathBuf::from("/dev/b"), PathBuf::from("/dev/c")];
/// let found = first_existing(&candidates, |p| p != Path::new("/dev/a"));
/// assert_eq!(found, Some(Path::new("/dev/b")));
/// ```
pub fn first_existing<F>(candidates: &[PathBuf], exists: F) -> Option<&Path>
where
    F: Fn(&Path) -> bool,
{
    candidates
        .iter()
        .map(PathBuf::as_path)
        .find(|&path| exists(path))
}

/// Ordered probe over a fixed candidate list.
#[derive(Clone)]
pub struct DeviceProbe {
    candidates: Vec<PathBuf>,
    fs: Arc<dyn DeviceFs>,
}

impl DeviceProbe {
    /// Probe the real filesystem.
    pub fn new(candidates: Vec<PathBuf>) -> Self {
        Self::with_fs(candidates, Arc::new(SystemFs))
    }

    /// Probe through a custom filesystem view.
    pub fn with_fs(candidates: Vec<PathBuf>, fs: Arc<dyn DeviceFs>) -> Self {
        Self { candidates, fs }
    }

    pub fn candidates(&self) -> &[PathBuf] {
        &self.candidates
    }

    /// First existing candidate, or `None` if no printer is attached.
    pub fn find_device(&self) -> Option<PathBuf> {
        let found = first_existing(&self.candidates, |path| self.fs.exists(path));
        debug!(
            candidates = self.candidates.len(),
            found = ?found,
            "probed printer devices"
        );
        found.map(Path::to_path_buf)
    }
}

impl std::fmt::Debug for DeviceProbe {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeviceProbe")
            .field("candidates", &self.candidates)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// TESTS
// ============================================================================
