//! Print-service channel.
//!
//! Renders the receipt as a small HTML page (logo on top, text in a
//! monospace block) and hands it to the operating system's print spooler
//! under a fixed job title.
//!
//! Submission is fire-and-forget: [`PrintSpooler::submit`] checks that the
//! spooler can take the job and returns; rendering and the actual spooler
//! call run afterwards as one background task ("render, then submit").
//! Failures inside that task are logged, never reported to the dispatcher.
//!
//! ## CUPS Spooler
//!
//! [`CupsSpooler`] renders with an HTML-to-PDF command (`wkhtmltopdf` by
//! default) into a temporary directory, then submits with `lp -t <title>`.

use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use image::{ImageFormat, imageops::FilterType};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use super::Channel;
use crate::error::BoletaError;
use crate::printer::{PrinterConfig, SpoolSettings};
use crate::receipt::ReceiptJob;
use crate::render::decode::decode_logo;

/// A rendered-on-demand document for the spooler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpoolDocument {
    pub title: String,
    pub html: String,
}

/// The platform print spooler.
pub trait PrintSpooler: Send + Sync {
    /// Accept a document for printing. Must not block on rendering or on
    /// the physical print.
    fn submit(&self, document: SpoolDocument) -> Result<(), BoletaError>;
}

// ============================================================================
// HTML DOCUMENT
// ============================================================================

/// Resize the logo to a `size × size` square and return it as base64 PNG.
///
/// ## Errors
///
/// Returns [`BoletaError::Encoding`] if the logo cannot be decoded or
/// re-encoded.
pub fn preview_logo(logo: &[u8], size: u32) -> Result<String, BoletaError> {
    let image = decode_logo(logo)?;
    let resized = image.resize_exact(size, size, FilterType::Triangle);

    let mut png = Vec::new();
    resized
        .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
        .map_err(|e| BoletaError::Encoding(format!("Failed to encode preview PNG: {}", e)))?;

    Ok(STANDARD.encode(&png))
}

/// Minimal escaping for text placed inside `<pre>`.
fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

/// Build the HTML page for a job. The logo is included only when it can be
/// decoded; otherwise the page is text only.
pub fn render_html(job: &ReceiptJob, printer: &PrinterConfig) -> String {
    let logo = job
        .logo()
        .and_then(|bytes| match preview_logo(bytes, printer.preview_size) {
            Ok(encoded) => Some(encoded),
            Err(e) => {
                warn!(error = %e, "dropping logo from print-service document");
                None
            }
        });

    let page_width = printer.width_mm().round() as u32;
    let text = escape_html(job.text());

    match logo {
        Some(encoded) => format!(
            r#"<html>
<head>
<meta charset="utf-8">
<style>
@page {{ size: {page_width}mm auto; margin: 0; }}
body {{ font-family: monospace; font-size: 12px; margin: 10px; text-align: center; }}
img {{ max-width: {size}px; margin: 10px auto; display: block; }}
pre {{ white-space: pre-wrap; text-align: left; }}
</style>
</head>
<body>
<img src="data:image/png;base64,{encoded}" />
<pre>{text}</pre>
</body>
</html>
"#,
            size = printer.preview_size,
        ),
        None => format!(
            r#"<html>
<head>
<meta charset="utf-8">
<style>
@page {{ size: {page_width}mm auto; margin: 0; }}
body {{ font-family: monospace; font-size: 12px; margin: 10px; }}
pre {{ white-space: pre-wrap; }}
</style>
</head>
<body>
<pre>{text}</pre>
</body>
</html>
"#
        ),
    }
}

// ============================================================================
// CHANNEL
// ============================================================================

/// Channel 2: submit an HTML rendering to the OS print spooler.
pub struct PrintServiceChannel {
    title: String,
    printer: PrinterConfig,
    spooler: Arc<dyn PrintSpooler>,
}

impl PrintServiceChannel {
    pub fn new(title: String, printer: PrinterConfig, spooler: Arc<dyn PrintSpooler>) -> Self {
        Self {
            title,
            printer,
            spooler,
        }
    }
}

impl Channel for PrintServiceChannel {
    fn name(&self) -> &'static str {
        "print-service"
    }

    fn attempt(&self, job: &ReceiptJob) -> Result<(), BoletaError> {
        let document = SpoolDocument {
            title: self.title.clone(),
            html: render_html(job, &self.printer),
        };
        self.spooler.submit(document)
    }
}

// ============================================================================
// CUPS SPOOLER
// ============================================================================

/// Spools through an HTML-to-PDF renderer and the CUPS `lp` command.
#[derive(Debug, Clone)]
pub struct CupsSpooler {
    settings: SpoolSettings,
}

impl CupsSpooler {
    pub fn new(settings: SpoolSettings) -> Self {
        Self { settings }
    }
}

impl PrintSpooler for CupsSpooler {
    fn submit(&self, document: SpoolDocument) -> Result<(), BoletaError> {
        let renderer = find_in_path(&self.settings.render_command).ok_or_else(|| {
            BoletaError::Spooler(format!(
                "renderer '{}' not found",
                self.settings.render_command
            ))
        })?;
        let submitter = find_in_path(&self.settings.submit_command).ok_or_else(|| {
            BoletaError::Spooler(format!(
                "spooler '{}' not found",
                self.settings.submit_command
            ))
        })?;

        let job_id = Uuid::new_v4();
        let timeout = self.settings.render_timeout;

        thread::Builder::new()
            .name(format!("spool-{}", job_id))
            .spawn(move || {
                match render_then_submit(&renderer, &submitter, timeout, &document) {
                    Ok(()) => info!(%job_id, title = %document.title, "spooled receipt"),
                    Err(e) => error!(%job_id, error = %e, "spooling failed"),
                }
            })
            .map_err(|e| BoletaError::Spooler(format!("Failed to start spool task: {}", e)))?;

        debug!(%job_id, "spool task started");
        Ok(())
    }
}

/// The background task: render the page to PDF, then submit the PDF.
fn render_then_submit(
    renderer: &Path,
    submitter: &Path,
    timeout: Duration,
    document: &SpoolDocument,
) -> Result<(), BoletaError> {
    let temp = tempfile::tempdir()?;
    let input_path = temp.path().join("receipt.html");
    let output_path = temp.path().join("receipt.pdf");

    std::fs::write(&input_path, &document.html)?;

    let mut child = Command::new(renderer)
        .arg(&input_path)
        .arg(&output_path)
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()?;
    let status = wait_with_timeout(&mut child, timeout)?;
    if !status.success() {
        return Err(BoletaError::Spooler(format!("renderer exited with {}", status)));
    }

    let output = Command::new(submitter)
        .arg("-t")
        .arg(&document.title)
        .arg(&output_path)
        .output()?;
    if !output.status.success() {
        return Err(BoletaError::Spooler(format!(
            "spooler rejected job: {}",
            String::from_utf8_lossy(&output.stderr).trim()
        )));
    }

    Ok(())
}

fn wait_with_timeout(
    child: &mut std::process::Child,
    timeout: Duration,
) -> Result<std::process::ExitStatus, BoletaError> {
    let deadline = Instant::now() + timeout;
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(status);
        }
        if Instant::now() >= deadline {
            child.kill().ok();
            child.wait().ok();
            return Err(BoletaError::Spooler(format!(
                "renderer timed out after {}s",
                timeout.as_secs()
            )));
        }
        thread::sleep(Duration::from_millis(50));
    }
}

/// Resolve a command name against `PATH`. Names containing a path
/// separator are checked as given.
fn find_in_path(command: &str) -> Option<PathBuf> {
    let candidate = Path::new(command);
    if candidate.components().count() > 1 {
        return candidate.is_file().then(|| candidate.to_path_buf());
    }

    let path = std::env::var_os("PATH")?;
    std::env::split_paths(&path)
        .map(|dir| dir.join(command))
        .find(|full| full.is_file())
}

// ============================================================================
// TESTS
// ============================================================================
