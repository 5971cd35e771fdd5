//! Image decoding: uploaded JPEG/PNG bytes into a pixel grid.

use crate::error::AnalyzerError;
use image::DynamicImage;
use tracing::debug;

/// Decode uploaded image bytes into a `DynamicImage`.
///
/// Format detection goes by content, not by the declared media type, so a
/// PNG uploaded as `image/jpeg` still decodes. Truncated or corrupt data
/// maps to [`AnalyzerError::ImageDecode`].
pub fn decode_image(bytes: &[u8]) -> Result<DynamicImage, AnalyzerError> {
    let img = image::load_from_memory(bytes).map_err(|e| AnalyzerError::ImageDecode {
        detail: e.to_string(),
    })?;
    debug!("Decoded image: {}x{} px", img.width(), img.height());
    Ok(img)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};
    use std::io::Cursor;

    fn png_bytes() -> Vec<u8> {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(4, 4, Rgb([0, 0, 0])));
        let mut buf = Vec::new();
        img.write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
            .unwrap();
        buf
    }

    #[test]
    fn decodes_valid_png() {
        let img = decode_image(&png_bytes()).unwrap();
        assert_eq!((img.width(), img.height()), (4, 4));
    }

    #[test]
    fn corrupt_bytes_are_a_decode_error() {
        let err = decode_image(b"not an image at all").unwrap_err();
        assert!(matches!(err, AnalyzerError::ImageDecode { .. }));
    }

    #[test]
    fn truncated_png_is_a_decode_error() {
        let bytes = png_bytes();
        let err = decode_image(&bytes[..bytes.len() / 2]).unwrap_err();
        assert!(matches!(err, AnalyzerError::ImageDecode { .. }));
    }
}
