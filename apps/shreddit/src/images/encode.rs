use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ImageError};

/// Encodes as baseline JPEG. Alpha is dropped; JPEG has no transparency.
pub fn encode_jpeg(image: &DynamicImage, quality: u8) -> Result<Vec<u8>, ImageError> {
    let rgb = image.to_rgb8();
    let mut out = Vec::new();
    JpegEncoder::new_with_quality(&mut out, quality).encode_image(&rgb)?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    #[test]
    fn test_encode_jpeg_from_rgba() {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(8, 8, Rgba([10, 20, 30, 0])));
        let bytes = encode_jpeg(&img, 95).unwrap();
        assert_eq!(&bytes[..2], &[0xFF, 0xD8], "JPEG must start with SOI marker");

        let decoded = image::load_from_memory(&bytes).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (8, 8));
    }
}
