use std::io::Cursor;

use image::{imageops::FilterType, DynamicImage, ImageFormat};

use crate::error::AppError;

/// Decodes an image, scales it down to `target_width` (aspect ratio
/// preserved), and re-encodes it as JPEG.
///
/// CPU-bound; callers on the async runtime wrap this in `spawn_blocking`.
pub fn render_preview(data: &[u8], target_width: u32) -> Result<Vec<u8>, AppError> {
    let img = image::load_from_memory(data)
        .map_err(|e| AppError::Validation(format!("failed to decode image: {}", e)))?;

    let img = if img.width() > target_width {
        img.resize(target_width, u32::MAX, FilterType::Lanczos3)
    } else {
        img
    };

    // JPEG has no alpha channel; flatten before encoding.
    let img = DynamicImage::ImageRgb8(img.to_rgb8());

    let mut buffer = Cursor::new(Vec::new());
    img.write_to(&mut buffer, ImageFormat::Jpeg)
        .map_err(|e| AppError::Dependency(format!("failed to encode preview: {}", e)))?;

    Ok(buffer.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, Rgba};

    fn png_fixture(width: u32, height: u32) -> Vec<u8> {
        let img = ImageBuffer::from_pixel(width, height, Rgba::<u8>([180, 40, 40, 255]));
        let mut buffer = Cursor::new(Vec::new());
        DynamicImage::ImageRgba8(img)
            .write_to(&mut buffer, ImageFormat::Png)
            .unwrap();
        buffer.into_inner()
    }

    #[test]
    fn scales_to_target_width_and_encodes_jpeg() {
        let preview = render_preview(&png_fixture(500, 250), 200).unwrap();

        let decoded = image::load_from_memory(&preview).unwrap();
        assert_eq!(image::guess_format(&preview).unwrap(), ImageFormat::Jpeg);
        assert_eq!(decoded.width(), 200);
        assert_eq!(decoded.height(), 100);
    }

    #[test]
    fn keeps_images_already_below_target_width() {
        let preview = render_preview(&png_fixture(120, 80), 200).unwrap();

        let decoded = image::load_from_memory(&preview).unwrap();
        assert_eq!(decoded.width(), 120);
        assert_eq!(decoded.height(), 80);
    }

    #[test]
    fn flattens_alpha_before_jpeg_encode() {
        // RGBA input must not fail the JPEG encoder.
        assert!(render_preview(&png_fixture(32, 32), 16).is_ok());
    }

    #[test]
    fn rejects_garbage_bytes() {
        let err = render_preview(b"definitely not an image", 200).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }
}
