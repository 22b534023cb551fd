//! # ESC/POS Protocol Implementation
//!
//! This module provides low-level command builders for the ESC/POS-style
//! byte protocol spoken by generic serial and USB thermal receipt printers.
//!
//! ## Module Structure
//!
//! - [`commands`]: Basic printer commands (init, feed-and-cut)
//! - [`graphics`]: Raster bit image command (`GS v 0`)
//!
//! ## Usage Example
//!
//! ```
//! use boleta::protocol::{commands, graphics};
//!
//! let mut data = Vec::new();
//!
//! // Initialize printer
//! data.extend(commands::init());
//!
//! // Print an 8-row, 48-byte wide black bar
//! data.extend(graphics::raster(48, 8, &vec![0xFF; 48 * 8]));
//! data.extend(b"\n\n");
//!
//! data.extend("TOTAL: 50.00\n".as_bytes());
//!
//! // Feed and cut
//! data.extend(commands::cut());
//! ```

pub mod commands;
pub mod graphics;
