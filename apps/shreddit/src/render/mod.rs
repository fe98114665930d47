// Caption painting: turns LayoutResults into pixels.

pub mod font;
pub mod painter;

use image::RgbaImage;
use serde::{Deserialize, Serialize};

use crate::layout::LayoutResult;

pub use font::{load_font, resolve_font_path};
pub use painter::OutlinedTextPainter;

/// Colours and outline of caption text. Loaded from `caption_style` in settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptionStyle {
    pub fill: [u8; 3],
    pub outline: [u8; 3],
    /// Outline radius; 0 disables the outline.
    pub outline_px: u32,
    /// Meme convention: captions are drawn in capitals.
    pub uppercase: bool,
}

impl Default for CaptionStyle {
    fn default() -> Self {
        Self {
            fill: [255, 255, 255],
            outline: [0, 0, 0],
            outline_px: 2,
            uppercase: true,
        }
    }
}

impl CaptionStyle {
    /// Applies text transforms that must happen before layout.
    pub fn prepare(&self, text: &str) -> String {
        let text = text.trim();
        if self.uppercase {
            text.to_uppercase()
        } else {
            text.to_string()
        }
    }
}

/// Draws a laid-out caption band onto a canvas.
pub trait CaptionPainter: Send + Sync {
    fn paint(&self, canvas: &mut RgbaImage, layout: &LayoutResult);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_style_is_white_on_black_outline() {
        let s = CaptionStyle::default();
        assert_eq!(s.fill, [255, 255, 255]);
        assert_eq!(s.outline, [0, 0, 0]);
        assert_eq!(s.outline_px, 2);
    }

    #[test]
    fn test_prepare_uppercases_and_trims() {
        let s = CaptionStyle::default();
        assert_eq!(s.prepare("  one does not simply "), "ONE DOES NOT SIMPLY");

        let plain = CaptionStyle {
            uppercase: false,
            ..CaptionStyle::default()
        };
        assert_eq!(plain.prepare("keep Case"), "keep Case");
    }

    #[test]
    fn test_style_deserialises_partial_json() {
        let s: CaptionStyle = serde_json::from_str(r#"{"outline_px": 3}"#).unwrap();
        assert_eq!(s.outline_px, 3);
        assert!(s.uppercase, "missing fields take defaults");
    }
}
