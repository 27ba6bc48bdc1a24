//! Cover thumbnail generation

use crate::error::{ArtworkError, Result};
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{ExtendedColorType, GenericImageView};

/// Default thumbnail box width
pub const THUMBNAIL_WIDTH: u32 = 200;

/// Default thumbnail box height
pub const THUMBNAIL_HEIGHT: u32 = 280;

const JPEG_QUALITY: u8 = 85;

/// Output size for a `width`x`height` image scaled into the box, keeping
/// the aspect ratio. Each side is at least one pixel.
pub fn fit_dimensions(width: u32, height: u32, max_width: u32, max_height: u32) -> (u32, u32) {
    let scale = f64::min(
        f64::from(max_width) / f64::from(width),
        f64::from(max_height) / f64::from(height),
    );
    let scaled = |side: u32| ((f64::from(side) * scale).round() as u32).max(1);
    (scaled(width), scaled(height))
}

/// Decode an image, scale it into the box with nearest-neighbour sampling,
/// and re-encode it as JPEG
pub fn thumbnail(data: &[u8], max_width: u32, max_height: u32) -> Result<Vec<u8>> {
    if max_width == 0 || max_height == 0 {
        return Err(ArtworkError::InvalidDimensions(max_width, max_height));
    }

    let source = image::load_from_memory(data)?;
    let (width, height) = source.dimensions();
    let (out_width, out_height) = fit_dimensions(width, height, max_width, max_height);

    let rgb = source
        .resize_exact(out_width, out_height, FilterType::Nearest)
        .to_rgb8();

    let mut jpeg = Vec::new();
    JpegEncoder::new_with_quality(&mut jpeg, JPEG_QUALITY).encode(
        rgb.as_raw(),
        out_width,
        out_height,
        ExtendedColorType::Rgb8,
    )?;
    Ok(jpeg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgb, RgbImage};
    use std::io::Cursor;

    fn png(width: u32, height: u32) -> Vec<u8> {
        let img = RgbImage::from_pixel(width, height, Rgb([200, 40, 40]));
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, ImageFormat::Png).unwrap();
        out.into_inner()
    }

    #[test]
    fn fit_uses_tighter_scale() {
        assert_eq!(fit_dimensions(400, 400, 200, 280), (200, 200));
        assert_eq!(fit_dimensions(100, 700, 200, 280), (40, 280));
        assert_eq!(fit_dimensions(2000, 10, 200, 280), (200, 1));
    }

    #[test]
    fn thumbnail_is_jpeg_within_box() {
        let thumb = thumbnail(&png(600, 900), THUMBNAIL_WIDTH, THUMBNAIL_HEIGHT).unwrap();

        assert_eq!(image::guess_format(&thumb).unwrap(), ImageFormat::Jpeg);
        let decoded = image::load_from_memory(&thumb).unwrap();
        assert_eq!(decoded.dimensions(), (187, 280));
    }

    #[test]
    fn thumbnail_rejects_garbage() {
        assert!(matches!(
            thumbnail(b"not an image", 200, 280),
            Err(ArtworkError::Image(_))
        ));
    }

    #[test]
    fn thumbnail_rejects_empty_box() {
        assert!(matches!(
            thumbnail(&png(10, 10), 0, 280),
            Err(ArtworkError::InvalidDimensions(0, 280))
        ));
    }
}
