//! Logo decoding.
//!
//! Logos arrive as whatever the booking backend stored: PNG and JPEG most of
//! the time, HEIC when a conductor uploaded a phone photo. With the `heif`
//! feature enabled HEIC/HEIF is decoded through libheif; everything else goes
//! through the `image` crate's format sniffing.

use image::DynamicImage;

use crate::error::BoletaError;

/// Decode encoded image bytes into a bitmap.
///
/// ## Errors
///
/// Returns [`BoletaError::Encoding`] if the data is empty, truncated, or in a
/// format no decoder recognizes.
pub fn decode_logo(data: &[u8]) -> Result<DynamicImage, BoletaError> {
    if data.is_empty() {
        return Err(BoletaError::Encoding("Logo is empty".to_string()));
    }

    #[cfg(feature = "heif")]
    {
        if is_heic(data) {
            return heif::decode_heic(data).map_err(BoletaError::Encoding);
        }
    }

    image::load_from_memory(data)
        .map_err(|e| BoletaError::Encoding(format!("Failed to decode logo: {}", e)))
}

/// Detect the ISO-BMFF `ftyp` brands used by HEIC/HEIF/AVIF files.
pub fn is_heic(data: &[u8]) -> bool {
    if data.len() < 12 || &data[4..8] != b"ftyp" {
        return false;
    }

    matches!(
        &data[8..12],
        b"heic"
            | b"heix"
            | b"hevc"
            | b"hevx"
            | b"heim"
            | b"heis"
            | b"hevm"
            | b"hevs"
            | b"mif1"
            | b"msf1"
            | b"avif"
    )
}

#[cfg(feature = "heif")]
mod heif {
    use image::{DynamicImage, Rgb, RgbImage};
    use libheif_rs::{ColorSpace, HeifContext, LibHeif, RgbChroma};

    pub fn decode_heic(data: &[u8]) -> Result<DynamicImage, String> {
        let lib_heif = LibHeif::new();
        let ctx =
            HeifContext::read_from_bytes(data).map_err(|e| format!("Failed to read HEIC: {}", e))?;
        let handle = ctx
            .primary_image_handle()
            .map_err(|e| format!("Failed to get primary image: {}", e))?;
        let image = lib_heif
            .decode(&handle, ColorSpace::Rgb(RgbChroma::Rgb), None)
            .map_err(|e| format!("Failed to decode HEIC image: {}", e))?;

        let planes = image.planes();
        let interleaved = planes
            .interleaved
            .ok_or("No interleaved RGB data in HEIC")?;
        let stride = interleaved.stride;
        let pixels = interleaved.data;

        let rgb = RgbImage::from_fn(image.width(), image.height(), |x, y| {
            let offset = y as usize * stride + x as usize * 3;
            match pixels.get(offset..offset + 3) {
                Some(&[r, g, b]) => Rgb([r, g, b]),
                _ => Rgb([255, 255, 255]),
            }
        });

        Ok(DynamicImage::ImageRgb8(rgb))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgb, RgbImage};
    use std::io::Cursor;

    #[test]
    fn test_decode_png() {
        let source = DynamicImage::ImageRgb8(RgbImage::from_pixel(5, 3, Rgb([10, 20, 30])));
        let mut png = Vec::new();
        source
            .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
            .unwrap();

        let decoded = decode_logo(&png).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (5, 3));
    }

    #[test]
    fn test_decode_empty_is_error() {
        assert!(matches!(decode_logo(&[]), Err(BoletaError::Encoding(_))));
    }

    #[test]
    fn test_decode_truncated_png_is_error() {
        let source = DynamicImage::ImageRgb8(RgbImage::new(16, 16));
        let mut png = Vec::new();
        source
            .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
            .unwrap();
        png.truncate(png.len() / 2);

        assert!(decode_logo(&png).is_err());
    }

    #[test]
    fn test_is_heic() {
        assert!(is_heic(b"\x00\x00\x00\x18ftypheic\x00\x00"));
        assert!(is_heic(b"\x00\x00\x00\x1cftypavif\x00\x00"));
        assert!(!is_heic(b"\x00\x00\x00\x18ftypisom\x00\x00"));
        assert!(!is_heic(b"\x89PNG\r\n\x1a\n\x00\x00\x00\x0d"));
        assert!(!is_heic(b"short"));
    }
}
