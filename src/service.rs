//! # Printer Service
//!
//! The inbound command surface used by the conductor app, the HTTP server
//! and the CLI: `print_receipt(content, logo)` and `is_printer_available()`.

use tracing::info;

use crate::dispatch::{ChannelDispatcher, DispatchReport, Platform};
use crate::error::BoletaError;
use crate::printer::{DispatchConfig, PrinterConfig};
use crate::receipt::{CommandBuilder, PrintCommand, ReceiptJob};

/// Receipt printing entry point.
pub struct PrinterService {
    dispatcher: ChannelDispatcher,
    builder: CommandBuilder,
}

impl PrinterService {
    pub fn new(config: &DispatchConfig, printer: PrinterConfig, platform: Platform) -> Self {
        Self {
            dispatcher: ChannelDispatcher::standard(config, printer, platform),
            builder: CommandBuilder::new(printer),
        }
    }

    /// Use a custom dispatcher (tests, alternative channel sets).
    pub fn with_dispatcher(dispatcher: ChannelDispatcher, printer: PrinterConfig) -> Self {
        Self {
            dispatcher,
            builder: CommandBuilder::new(printer),
        }
    }

    /// Always true: availability cannot be detected ahead of a print, so
    /// every print is attempted.
    pub fn is_printer_available(&self) -> bool {
        true
    }

    /// Print a receipt over every channel and return the full report.
    ///
    /// ## Errors
    ///
    /// Returns [`BoletaError::InvalidArgument`] when `content` is absent.
    pub fn print(
        &self,
        content: Option<&str>,
        logo: Option<Vec<u8>>,
    ) -> Result<DispatchReport, BoletaError> {
        let job = job_from(content, logo)?;
        info!(
            text_bytes = job.text().len(),
            has_logo = job.logo().is_some(),
            "print requested"
        );
        Ok(self.dispatcher.print(&job))
    }

    /// Print a receipt; true when the dispatch sweep completed.
    pub fn print_receipt(
        &self,
        content: Option<&str>,
        logo: Option<Vec<u8>>,
    ) -> Result<bool, BoletaError> {
        Ok(self.print(content, logo)?.completed)
    }

    /// The raw-device byte stream for a receipt, without any I/O.
    pub fn encode(
        &self,
        content: Option<&str>,
        logo: Option<Vec<u8>>,
    ) -> Result<PrintCommand, BoletaError> {
        Ok(self.builder.build(&job_from(content, logo)?))
    }
}

fn job_from(content: Option<&str>, logo: Option<Vec<u8>>) -> Result<ReceiptJob, BoletaError> {
    let content =
        content.ok_or_else(|| BoletaError::InvalidArgument("Content is null".to_string()))?;
    Ok(ReceiptJob::new(content).with_optional_logo(logo))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::Channel;

    struct Failing;

    impl Channel for Failing {
        fn name(&self) -> &'static str {
            "failing"
        }

        fn attempt(&self, _job: &ReceiptJob) -> Result<(), BoletaError> {
            Err(BoletaError::Transport("offline".into()))
        }
    }

    fn service() -> PrinterService {
        PrinterService::with_dispatcher(
            ChannelDispatcher::new(vec![Box::new(Failing)]),
            PrinterConfig::default(),
        )
    }

    #[test]
    fn test_always_available() {
        assert!(service().is_printer_available());
    }

    #[test]
    fn test_missing_content_is_rejected() {
        let err = service().print_receipt(None, None).unwrap_err();
        assert!(matches!(err, BoletaError::InvalidArgument(_)));
        assert_eq!(err.to_string(), "Invalid argument: Content is null");
    }

    #[test]
    fn test_channel_failure_still_prints_true() {
        assert!(service().print_receipt(Some("TOTAL: 50.00\n"), None).unwrap());
    }

    #[test]
    fn test_encode_matches_builder() {
        let command = service().encode(Some("hi"), None).unwrap();
        assert_eq!(command.as_ref(), &[0x1B, 0x40, b'h', b'i', 0x1D, 0x56, 0x00]);
    }
}
