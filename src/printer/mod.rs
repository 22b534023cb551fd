//! # Printer Module
//!
//! This module provides printer-specific configurations and channel settings.
//!
//! ## Modules
//!
//! - [`config`]: Printer hardware specifications and dispatch settings

pub mod config;

pub use config::{DispatchConfig, PrinterConfig, SpoolSettings};
