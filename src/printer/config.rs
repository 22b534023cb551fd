//! # Printer Configuration
//!
//! This module defines the hardware profile of the receipt printer and the
//! static settings of the three delivery channels.
//!
//! ## Supported Printers
//!
//! | Model | Width (dots) | Resolution | Logo raster |
//! |-------|--------------|------------|-------------|
//! | Generic 58mm ESC/POS | 384 | 203 DPI | 384 × 384 |
//!
//! ## Usage
//!
//! ```
//! use boleta::printer::PrinterConfig;
//!
//! let config = PrinterConfig::GENERIC_58MM;
//! assert_eq!(config.width_bytes, 48);
//! ```

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// # Printer Configuration
///
/// Hardware characteristics of a thermal printer. The logo raster size is
/// fixed to the printer's dot width so encoded output never needs runtime
/// negotiation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrinterConfig {
    /// Printer model name
    pub name: &'static str,

    /// Maximum print width in dots (pixels)
    pub width_dots: u16,

    /// Print width in bytes (width_dots / 8)
    pub width_bytes: u16,

    /// Resolution in dots per inch
    pub dpi: u16,

    /// Height the logo is resized to for the raw-device raster block
    pub logo_height: u16,

    /// Square size of the logo embedded in the print-service document
    pub preview_size: u32,
}

impl PrinterConfig {
    /// # Generic 58mm ESC/POS Configuration
    ///
    /// The common handheld and kiosk receipt printer found on conductor
    /// devices.
    ///
    /// ```text
    /// ├─ 5mm ─┼──── 48mm printable ────┼─ 5mm ─┤
    /// │margin │       384 dots         │margin │
    /// ```
    pub const GENERIC_58MM: Self = Self {
        name: "Generic 58mm ESC/POS",
        width_dots: 384,
        width_bytes: 48,
        dpi: 203,
        logo_height: 384,
        preview_size: 200,
    };

    /// Calculate dots per millimeter
    #[inline]
    pub fn dots_per_mm(&self) -> f32 {
        self.dpi as f32 / 25.4
    }

    /// Calculate print width in millimeters
    ///
    /// ```
    /// use boleta::printer::PrinterConfig;
    ///
    /// let width = PrinterConfig::GENERIC_58MM.width_mm();
    /// assert!((width - 48.0).abs() < 1.0);
    /// ```
    #[inline]
    pub fn width_mm(&self) -> f32 {
        self.width_dots as f32 / self.dots_per_mm()
    }
}

impl Default for PrinterConfig {
    fn default() -> Self {
        Self::GENERIC_58MM
    }
}

// ============================================================================
// CHANNEL SETTINGS
// ============================================================================

/// Candidate device nodes, most common hardware first.
pub const DEFAULT_DEVICE_CANDIDATES: &[&str] =
    &["/dev/ttyS1", "/dev/ttyS0", "/dev/ttyUSB0", "/dev/usb/lp0"];

/// Title under which print-service jobs are submitted.
pub const DEFAULT_JOB_TITLE: &str = "BATRASCO Receipt";

/// Action carried by the broadcast channel.
pub const DEFAULT_BROADCAST_ACTION: &str = "android.intent.action.PRINT";

/// Keys the receipt text is published under. Two keys because different
/// receivers look for different names.
pub const DEFAULT_BROADCAST_KEYS: [&str; 2] = ["text", "PRINT_TEXT"];

/// Settings for the three delivery channels.
///
/// `Default` reproduces the constants the conductor app ships with; the CLI
/// overrides individual fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DispatchConfig {
    /// Ordered device paths probed by the raw-device channel
    pub device_candidates: Vec<PathBuf>,
    /// Print-service job title
    pub job_title: String,
    /// Broadcast action name
    pub broadcast_action: String,
    /// Keys the broadcast text is stored under
    pub broadcast_keys: Vec<String>,
    /// External spooler commands
    pub spool: SpoolSettings,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            device_candidates: DEFAULT_DEVICE_CANDIDATES
                .iter()
                .map(PathBuf::from)
                .collect(),
            job_title: DEFAULT_JOB_TITLE.to_string(),
            broadcast_action: DEFAULT_BROADCAST_ACTION.to_string(),
            broadcast_keys: DEFAULT_BROADCAST_KEYS
                .iter()
                .map(|k| k.to_string())
                .collect(),
            spool: SpoolSettings::default(),
        }
    }
}

/// Commands used by the CUPS-backed print spooler.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpoolSettings {
    /// HTML to PDF renderer, invoked as `<cmd> <input.html> <output.pdf>`
    pub render_command: String,
    /// Spooler submission, invoked as `<cmd> -t <title> <output.pdf>`
    pub submit_command: String,
    /// Maximum time the renderer may run
    #[serde(with = "duration_secs")]
    pub render_timeout: Duration,
}

impl Default for SpoolSettings {
    fn default() -> Self {
        Self {
            render_command: "wkhtmltopdf".to_string(),
            submit_command: "lp".to_string(),
            render_timeout: Duration::from_secs(10),
        }
    }
}

mod duration_secs {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_secs())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        Ok(Duration::from_secs(u64::deserialize(deserializer)?))
    }
}

// ============================================================================
// TESTS
// ============================================================================
