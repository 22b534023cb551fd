//! # Printer Transport Layer
//!
//! This module locates attached printers and carries bytes to them.
//!
//! ## Modules
//!
//! - [`probe`]: Ordered existence check over candidate device paths
//! - [`device`]: Raw character-device writes with scoped acquisition

pub mod device;
pub mod probe;

pub use device::{DeviceOpener, DeviceTransport, SinkGuard, SystemOpener};
pub use probe::{DeviceFs, DeviceProbe, SystemFs};
