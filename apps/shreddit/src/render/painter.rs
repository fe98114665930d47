use std::sync::Arc;

use ab_glyph::{FontArc, PxScale};
use image::{Rgba, RgbaImage};
use imageproc::drawing::draw_text_mut;

use crate::layout::{GlyphMetrics, LayoutResult, MetricsProvider};
use crate::render::{CaptionPainter, CaptionStyle};

/// Classic meme text: the outline colour stamped at every offset within
/// `outline_px`, then the fill on top.
#[derive(Clone)]
pub struct OutlinedTextPainter {
    font: FontArc,
    style: CaptionStyle,
}

impl OutlinedTextPainter {
    pub fn new(font: FontArc, style: CaptionStyle) -> Self {
        Self { font, style }
    }

    /// Metrics for the same font, so layout measures what gets painted.
    pub fn metrics(&self) -> Arc<dyn MetricsProvider> {
        Arc::new(GlyphMetrics::new(self.font.clone()))
    }
}

impl CaptionPainter for OutlinedTextPainter {
    fn paint(&self, canvas: &mut RgbaImage, layout: &LayoutResult) {
        let scale = PxScale::from(layout.font_size_px as f32);
        let [r, g, b] = self.style.outline;
        let outline = Rgba([r, g, b, 255]);
        let [r, g, b] = self.style.fill;
        let fill = Rgba([r, g, b, 255]);
        let radius = self.style.outline_px as i32;

        for line in &layout.lines {
            for (dx, dy) in outline_offsets(radius) {
                draw_text_mut(
                    canvas,
                    outline,
                    line.x + dx,
                    line.y + dy,
                    scale,
                    &self.font,
                    &line.text,
                );
            }
            draw_text_mut(canvas, fill, line.x, line.y, scale, &self.font, &line.text);
        }
    }
}

/// Every offset in `[-radius, radius]²` except the centre.
fn outline_offsets(radius: i32) -> impl Iterator<Item = (i32, i32)> {
    (-radius..=radius)
        .flat_map(move |dx| (-radius..=radius).map(move |dy| (dx, dy)))
        .filter(|&(dx, dy)| dx != 0 || dy != 0)
}
