use image::{imageops, DynamicImage, Rgb, RgbImage};

/// Share of the height at the top and at the bottom where meme captions live.
pub const CAPTION_BAND_FRACTION: f32 = 0.15;

/// Removes the caption bands from an existing meme.
///
/// The top and bottom `CAPTION_BAND_FRACTION` of the image are blanked to
/// white; the middle keeps its position so the canvas size is unchanged.
pub fn strip_caption_bands(meme: &DynamicImage) -> DynamicImage {
    let (width, height) = (meme.width(), meme.height());
    let crop_top = (height as f32 * CAPTION_BAND_FRACTION) as u32;
    let middle_height = height.saturating_sub(crop_top * 2);

    let mut canvas = RgbImage::from_pixel(width, height, Rgb([255, 255, 255]));
    if middle_height > 0 {
        let middle = meme.crop_imm(0, crop_top, width, middle_height).to_rgb8();
        imageops::replace(&mut canvas, &middle, 0, crop_top as i64);
    }
    DynamicImage::ImageRgb8(canvas)
}
