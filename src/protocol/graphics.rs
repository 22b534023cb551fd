//! # ESC/POS Raster Graphics
//!
//! This module implements the raster bit image command used to print a logo
//! above the receipt text.
//!
//! ## Bit Packing
//!
//! Graphics data is packed as bytes where each bit represents one dot:
//! - Bit 7 (MSB) = leftmost dot
//! - Bit 0 (LSB) = rightmost dot
//! - 1 = black (print), 0 = white (no print)
//!
//! ```text
//! Byte value 0xF0 = 11110000 = ████░░░░
//! Byte value 0x0F = 00001111 = ░░░░████
//! ```
//!
//! ## 58mm Printer Geometry
//!
//! | Property | Value |
//! |----------|-------|
//! | Print width | 384 dots (48 bytes) |
//! | Resolution | 203 DPI (~8 dots/mm) |

use super::commands::{GS, u16_le};

/// The four opcode bytes that open a raster block: `GS v 0 m` with `m = 0`
/// (normal density).
pub const RASTER_OPCODE: [u8; 4] = [GS, b'v', b'0', 0];

/// Length of the raster header: opcode plus four dimension bytes.
pub const RASTER_HEADER_LEN: usize = RASTER_OPCODE.len() + 4;

/// # Print Raster Bit Image (GS v 0 m xL xH yL yH d1...dk)
///
/// ## Protocol Details
///
/// | Format  | Bytes |
/// |---------|-------|
/// | ASCII   | GS v 0 m xL xH yL yH d1...dk |
/// | Hex     | 1D 76 30 00 xL xH yL yH d1...dk |
///
/// ## Parameters
///
/// - `width_bytes`: Row width in bytes, little-endian (`xL + xH × 256`)
/// - `height`: Height in dots, little-endian (`yL + yH × 256`)
/// - `data`: Row-major image data, `width_bytes × height` bytes
///
/// ## Example
///
/// ```
/// use boleta::protocol::graphics;
///
/// let data = vec![0xAA; 48 * 300];
/// let cmd = graphics::raster(48, 300, &data);
///
/// assert_eq!(&cmd[0..4], &[0x1D, 0x76, 0x30, 0x00]);
/// assert_eq!(&cmd[4..6], &[48, 0]);
/// assert_eq!(&cmd[6..8], &[0x2C, 0x01]); // 300 = 0x012C
/// assert_eq!(cmd.len(), 8 + 48 * 300);
/// ```
pub fn raster(width_bytes: u16, height: u16, data: &[u8]) -> Vec<u8> {
    debug_assert!(
        data.len() == width_bytes as usize * height as usize,
        "Raster data length mismatch. Expected {} ({} bytes × {} rows), got {}",
        width_bytes as usize * height as usize,
        width_bytes,
        height,
        data.len()
    );

    let [xl, xh] = u16_le(width_bytes);
    let [yl, yh] = u16_le(height);

    let mut cmd = Vec::with_capacity(RASTER_HEADER_LEN + data.len());
    cmd.extend_from_slice(&RASTER_OPCODE);
    cmd.push(xl);
    cmd.push(xh);
    cmd.push(yl);
    cmd.push(yh);
    cmd.extend_from_slice(data);
    cmd
}

/// Find the first occurrence of the raster opcode in a byte stream.
pub fn find_raster_opcode(data: &[u8]) -> Option<usize> {
    data.windows(RASTER_OPCODE.len())
        .position(|window| window == RASTER_OPCODE)
}

// ============================================================================
// TESTS
// ============================================================================
