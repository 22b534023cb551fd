//! # Receipt Jobs and Command Building
//!
//! A [`ReceiptJob`] is the caller's print request: preformatted text plus an
//! optional logo. [`CommandBuilder`] turns it into the byte stream written to
//! a raw printer device:
//!
//! ```text
//! ┌───────┬──────────────────────────────────┬────────────┬──────────┐
//! │ 1B 40 │ 1D 76 30 00 wL wH hL hH bits… \n\n│ UTF-8 text │ 1D 56 00 │
//! │ init  │ raster block (logo only)          │            │ cut      │
//! └───────┴──────────────────────────────────┴────────────┴──────────┘
//! ```
//!
//! A logo that cannot be decoded is dropped silently (logged), so the output
//! is then identical to a job without a logo.
//!
//! ## Control Bytes in Text
//!
//! Text is written verbatim. A receipt containing ESC (0x1B) or GS (0x1D)
//! will be interpreted by the printer as a command. This is a known
//! limitation; [`control_bytes_in`] reports the offending offsets and the
//! builder logs a warning, but the bytes are not altered.

use tracing::{debug, warn};

use crate::printer::PrinterConfig;
use crate::protocol::{commands, graphics};
use crate::render::raster;

// ============================================================================
// RECEIPT JOB
// ============================================================================

/// One print request. Immutable once built.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReceiptJob {
    text: String,
    logo: Option<Vec<u8>>,
}

impl ReceiptJob {
    /// A text-only job.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            logo: None,
        }
    }

    /// Attach an encoded logo image (PNG, JPEG, ...).
    pub fn with_logo(mut self, logo: impl Into<Vec<u8>>) -> Self {
        self.logo = Some(logo.into());
        self
    }

    /// Attach a logo if one is present.
    pub fn with_optional_logo(mut self, logo: Option<Vec<u8>>) -> Self {
        self.logo = logo;
        self
    }

    /// Receipt body, already formatted by the caller.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Encoded logo bytes, if any.
    pub fn logo(&self) -> Option<&[u8]> {
        self.logo.as_deref()
    }
}

// ============================================================================
// PRINT COMMAND
// ============================================================================

/// The complete byte stream for one raw-device print.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrintCommand(Vec<u8>);

impl PrintCommand {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Whether the stream carries a raster logo block.
    pub fn has_raster(&self) -> bool {
        graphics::find_raster_opcode(&self.0).is_some()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }
}

impl AsRef<[u8]> for PrintCommand {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

// ============================================================================
// COMMAND BUILDER
// ============================================================================

/// Assembles [`PrintCommand`]s for a fixed printer profile.
///
/// ## Example
///
/// ```
/// use boleta::receipt::{CommandBuilder, ReceiptJob};
///
/// let builder = CommandBuilder::default();
/// let command = builder.build(&ReceiptJob::new("TOTAL: 50.00\n"));
///
/// let mut expected = vec![0x1B, 0x40];
/// expected.extend(b"TOTAL: 50.00\n");
/// expected.extend([0x1D, 0x56, 0x00]);
/// assert_eq!(command.as_ref(), expected.as_slice());
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct CommandBuilder {
    config: PrinterConfig,
}

impl CommandBuilder {
    pub fn new(config: PrinterConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PrinterConfig {
        &self.config
    }

    /// Build the byte stream for a job. Never fails: an unusable logo is
    /// left out.
    pub fn build(&self, job: &ReceiptJob) -> PrintCommand {
        let logo_block = job.logo().and_then(|logo| self.logo_block(logo));

        let control = control_bytes_in(job.text());
        if !control.is_empty() {
            warn!(
                offsets = ?control,
                "receipt text contains ESC/GS bytes; they will be sent unescaped"
            );
        }

        let mut data = commands::init();
        if let Some(block) = logo_block {
            data.extend(block);
        }
        data.extend_from_slice(job.text().as_bytes());
        data.extend(commands::cut());

        debug!(bytes = data.len(), "built print command");
        PrintCommand(data)
    }

    /// Raster header, packed rows and the two separating line feeds, or
    /// `None` if the logo cannot be encoded.
    fn logo_block(&self, logo: &[u8]) -> Option<Vec<u8>> {
        let encoded = raster::encode_bytes(logo, self.config.width_dots, self.config.logo_height);

        match encoded {
            Ok(raster) => {
                let mut block = graphics::raster(
                    raster.width_bytes(),
                    raster.height_px(),
                    raster.as_bytes(),
                );
                block.extend(commands::blank_lines());
                Some(block)
            }
            Err(e) => {
                warn!(error = %e, "dropping logo from receipt");
                None
            }
        }
    }
}

/// Byte offsets of ESC and GS in the receipt text.
///
/// ```
/// use boleta::receipt::control_bytes_in;
///
/// assert_eq!(control_bytes_in("ok"), Vec::<usize>::new());
/// assert_eq!(control_bytes_in("a\x1Bb\x1D"), vec![1, 3]);
/// ```
pub fn control_bytes_in(text: &str) -> Vec<usize> {
    text.bytes()
        .enumerate()
        .filter(|&(_, b)| b == commands::ESC || b == commands::GS)
        .map(|(i, _)| i)
        .collect()
}

// ============================================================================
// TESTS
// ============================================================================
