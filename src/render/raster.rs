//! # Threshold Raster Encoder
//!
//! Converts an arbitrary bitmap into the packed monochrome rows consumed by
//! the `GS v 0` raster command.
//!
//! ## Algorithm
//!
//! 1. Resize the source to exactly `width × height` (bilinear / Triangle).
//! 2. For every pixel compute perceptual luminance:
//!
//! ```text
//! L = 0.299·R + 0.587·G + 0.114·B
//! ```
//!
//! 3. A pixel is dark (bit = 1) iff `L < 128`. There is no dithering: the
//!    same bitmap always produces the same bits.
//!
//! Luminance is evaluated in integer thousandths (`299·R + 587·G + 114·B`
//! against `128_000`) so a mid-gray of exactly 128 never lands on the dark
//! side through floating-point rounding.
//!
//! ## Bit Packing
//!
//! Same layout as the graphics command: MSB = leftmost pixel, rows padded
//! with white bits up to a whole byte.
//!
//! ```
//! use boleta::render::raster::pack_row;
//!
//! let row = vec![true, true, false, false, true, false, true, false];
//! assert_eq!(pack_row(&row), vec![0b11001010]);
//! ```

use image::{DynamicImage, imageops::FilterType};

use super::decode::decode_logo;
use crate::error::BoletaError;

/// Luminance threshold, scaled by 1000 to match the integer weights.
const DARK_THRESHOLD_MILLI: u32 = 128_000;

/// Returns true when an RGB pixel prints as a black dot.
///
/// ```
/// use boleta::render::raster::is_dark;
///
/// assert!(is_dark(127, 127, 127));
/// assert!(!is_dark(128, 128, 128));
/// ```
#[inline]
pub fn is_dark(r: u8, g: u8, b: u8) -> bool {
    let luminance_milli = 299 * r as u32 + 587 * g as u32 + 114 * b as u32;
    luminance_milli < DARK_THRESHOLD_MILLI
}

/// Pack a row of boolean pixel values into bytes.
///
/// If the row length is not a multiple of 8, the last byte is padded with
/// zeros (white) on the right.
pub fn pack_row(pixels: &[bool]) -> Vec<u8> {
    let num_bytes = pixels.len().div_ceil(8);
    let mut bytes = vec![0u8; num_bytes];

    for (i, &pixel) in pixels.iter().enumerate() {
        if pixel {
            bytes[i / 8] |= 1 << (7 - (i % 8));
        }
    }

    bytes
}

/// A packed 1-bit image, one bit per printer dot.
///
/// Rows are stored back to back; every row is exactly
/// [`width_bytes`](Self::width_bytes) long and there are exactly
/// [`height_px`](Self::height_px) of them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonochromeRaster {
    width_px: u16,
    height_px: u16,
    data: Vec<u8>,
}

impl MonochromeRaster {
    /// Build a raster by asking `is_dark(x, y)` for every pixel.
    ///
    /// ```
    /// use boleta::render::raster::MonochromeRaster;
    ///
    /// // Left half black
    /// let raster = MonochromeRaster::from_fn(16, 2, |x, _y| x < 8)?;
    /// assert_eq!(raster.as_bytes(), &[0xFF, 0x00, 0xFF, 0x00]);
    /// # Ok::<(), boleta::BoletaError>(())
    /// ```
    ///
    /// ## Errors
    ///
    /// Returns [`BoletaError::Encoding`] if either dimension is zero.
    pub fn from_fn<F>(width_px: u16, height_px: u16, is_dark: F) -> Result<Self, BoletaError>
    where
        F: Fn(u32, u32) -> bool,
    {
        check_size(width_px, height_px)?;

        let width_bytes = (width_px as usize).div_ceil(8);
        let mut data = Vec::with_capacity(width_bytes * height_px as usize);
        let mut row = Vec::with_capacity(width_px as usize);

        for y in 0..height_px as u32 {
            row.clear();
            row.extend((0..width_px as u32).map(|x| is_dark(x, y)));
            data.extend(pack_row(&row));
        }

        Ok(Self {
            width_px,
            height_px,
            data,
        })
    }

    /// Width in pixels (dots).
    pub fn width_px(&self) -> u16 {
        self.width_px
    }

    /// Height in pixels (rows).
    pub fn height_px(&self) -> u16 {
        self.height_px
    }

    /// Bytes per row, `ceil(width_px / 8)`.
    pub fn width_bytes(&self) -> u16 {
        self.width_px.div_ceil(8)
    }

    /// Rows in top-to-bottom order; always exactly `height_px` of them.
    pub fn rows(&self) -> impl ExactSizeIterator<Item = &[u8]> + '_ {
        self.data.chunks_exact(self.width_bytes() as usize)
    }

    /// All rows, concatenated in row-major order.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Consume the raster and return its packed bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }
}

/// Encode a decoded bitmap at the given target size.
///
/// ## Errors
///
/// Returns [`BoletaError::Encoding`] if either target dimension is zero. The
/// pixel content never causes an error.
pub fn encode(
    image: &DynamicImage,
    width_px: u16,
    height_px: u16,
) -> Result<MonochromeRaster, BoletaError> {
    check_size(width_px, height_px)?;
    if image.width() == 0 || image.height() == 0 {
        return Err(BoletaError::Encoding("Source image is empty".to_string()));
    }

    let resized = image.resize_exact(width_px as u32, height_px as u32, FilterType::Triangle);
    let rgb = resized.to_rgb8();

    MonochromeRaster::from_fn(width_px, height_px, |x, y| {
        let [r, g, b] = rgb.get_pixel(x, y).0;
        is_dark(r, g, b)
    })
}

/// Every raster has at least one dot and one row.
fn check_size(width_px: u16, height_px: u16) -> Result<(), BoletaError> {
    if width_px == 0 || height_px == 0 {
        return Err(BoletaError::Encoding(format!(
            "Invalid raster size {}x{}",
            width_px, height_px
        )));
    }
    Ok(())
}

/// Decode encoded image bytes (PNG, JPEG, ...) and encode them.
///
/// ## Errors
///
/// Returns [`BoletaError::Encoding`] if the bytes are not a decodable image.
pub fn encode_bytes(
    bytes: &[u8],
    width_px: u16,
    height_px: u16,
) -> Result<MonochromeRaster, BoletaError> {
    let image = decode_logo(bytes)?;
    encode(&image, width_px, height_px)
}

// ============================================================================
// TESTS
// ============================================================================
