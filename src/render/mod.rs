//! # Rendering Module
//!
//! Turns logo images into printable output.
//!
//! ## Modules
//!
//! - [`decode`]: Logo decoding (PNG, JPEG, optional HEIC)
//! - [`raster`]: Luminance-threshold encoding into packed 1-bit rows
//!
//! ## Usage Example
//!
//! ```
//! use boleta::render::raster::{self, MonochromeRaster};
//! use image::{DynamicImage, Rgb, RgbImage};
//!
//! let logo = DynamicImage::ImageRgb8(RgbImage::from_pixel(64, 64, Rgb([0, 0, 0])));
//! let raster: MonochromeRaster = raster::encode(&logo, 384, 384)?;
//!
//! assert_eq!(raster.rows().len(), 384);
//! # Ok::<(), boleta::BoletaError>(())
//! ```

pub mod decode;
pub mod raster;

pub use raster::MonochromeRaster;
