//! # Boleta - Receipt Printing for Conductor Devices
//!
//! Boleta prints fare receipts on whatever printer a conductor's handheld
//! happens to have. The hardware is unknown ahead of time, so every receipt
//! is sent down three independent channels:
//!
//! - **Broadcast**: the text, for companion print apps
//! - **Print service**: an HTML rendering, for the OS print spooler
//! - **Raw device**: ESC/POS bytes written to a serial/USB printer node
//!
//! ## Quick Start
//!
//! ```no_run
//! use boleta::{
//!     dispatch::{ChannelDispatcher, Platform},
//!     printer::{DispatchConfig, PrinterConfig},
//!     receipt::ReceiptJob,
//! };
//!
//! let dispatcher = ChannelDispatcher::standard(
//!     &DispatchConfig::default(),
//!     PrinterConfig::GENERIC_58MM,
//!     Platform::system("255.255.255.255:9450".parse().unwrap()),
//! );
//!
//! let logo = std::fs::read("logo.png")?;
//! let job = ReceiptJob::new("Route 12\nFare: 25.00\n").with_logo(logo);
//!
//! // true means every channel was attempted, not that paper came out
//! assert!(dispatcher.print_receipt(&job));
//! # Ok::<(), boleta::BoletaError>(())
//! ```
//!
//! ## Module Overview
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`protocol`] | ESC/POS command bytes |
//! | [`render`] | Logo decoding and 1-bit raster encoding |
//! | [`receipt`] | Receipt jobs and the raw-device command builder |
//! | [`transport`] | Device probing and raw device writes |
//! | [`dispatch`] | The three delivery channels and the dispatcher |
//! | [`service`] | `print_receipt` / `is_printer_available` entry point |
//! | [`lifecycle`] | Monitoring foreground-service state |
//! | [`server`] | HTTP API |
//! | [`printer`] | Printer and dispatch configuration |
//! | [`error`] | Error types |

pub mod dispatch;
pub mod error;
pub mod lifecycle;
pub mod logging;
pub mod printer;
pub mod protocol;
pub mod receipt;
pub mod render;
pub mod server;
pub mod service;
pub mod transport;

// Re-exports for convenience
pub use dispatch::ChannelDispatcher;
pub use error::BoletaError;
pub use printer::PrinterConfig;
pub use receipt::ReceiptJob;
