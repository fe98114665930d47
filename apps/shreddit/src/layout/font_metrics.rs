//! Font metrics for caption layout.
//!
//! The layout engine never touches a font directly. It measures through the
//! [`MetricsProvider`] capability, which has two backends:
//!
//! - [`TableMetrics`]: static em-width tables for the usual meme typefaces.
//!   Approximate, but deterministic and available without any font file, which
//!   makes it the provider for `shreddit layout` previews and for tests.
//! - [`GlyphMetrics`]: advances and kerning read from a loaded font via
//!   `ab_glyph`. Used whenever the same font is going to be painted.
//!
//! Tables cover ASCII 0x20..=0x7E (95 printable characters).
//! Index = (char as usize) - 32.

use ab_glyph::{Font, FontArc, GlyphId, PxScale, ScaleFont};
use serde::{Deserialize, Serialize};

/// Measurement capability consumed by the layout engine.
///
/// Implementations must be pure lookups: the same `(text, font_px)` always
/// measures the same, and concurrent callers never observe mutation.
pub trait MetricsProvider: Send + Sync {
    /// Rendered width of `text` in pixels at `font_px`.
    fn measure_width(&self, text: &str, font_px: u32) -> f32;

    /// Distance between consecutive baselines in pixels at `font_px`.
    fn line_height(&self, font_px: u32) -> f32;
}

// ────────────────────────────────────────────────────────────────────────────
// Font family enum
// ────────────────────────────────────────────────────────────────────────────

/// Typefaces with a built-in width table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FontFamily {
    /// The classic meme face, a heavy condensed grotesque.
    #[default]
    Impact,
    /// Open-licence Impact look-alike; slightly narrower capitals.
    Anton,
    /// Wide humanist sans, the usual Linux fallback.
    #[serde(rename = "dejavu_sans")]
    DejaVuSans,
}

impl std::str::FromStr for FontFamily {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace(['-', ' '], "_").as_str() {
            "impact" => Ok(FontFamily::Impact),
            "anton" => Ok(FontFamily::Anton),
            "dejavu_sans" | "dejavu" => Ok(FontFamily::DejaVuSans),
            other => Err(format!(
                "unknown font family '{other}' (expected impact, anton or dejavu_sans)"
            )),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Static table metrics
// ────────────────────────────────────────────────────────────────────────────

/// Static character-width table for a font family.
///
/// All widths are in em units; multiply by the pixel size to get pixels.
/// `widths[i]` = width of ASCII character `(i + 32)`.
///
/// Width array slot layout:
/// ```text
/// [0]=sp  [1]=!   [2]="   [3]=#   [4]=$   [5]=%   [6]=&   [7]='
/// [8]=(   [9]=)   [10]=*  [11]=+  [12]=,  [13]=-  [14]=.  [15]=/
/// [16..25]=0-9
/// [26]=:  [27]=;  [28]=<  [29]==  [30]=>  [31]=?  [32]=@
/// [33..58]=A-Z
/// [59]=[  [60]=\  [61]=]  [62]=^  [63]=_  [64]=`
/// [65..90]=a-z
/// [91]={  [92]=|  [93]=}  [94]=~
/// ```
#[derive(Debug)]
pub struct FontMetricTable {
    widths: [f32; 95],
    /// Fallback width for non-ASCII characters (codepoints > 0x7E).
    pub average_char_width: f32,
    /// Baseline-to-baseline distance in em units.
    pub line_height_em: f32,
}

impl FontMetricTable {
    /// Measures the width of a string in em units.
    ///
    /// Non-ASCII characters fall back to `average_char_width`.
    pub fn measure_em(&self, s: &str) -> f32 {
        s.chars()
            .map(|c| {
                let code = c as usize;
                if (32..=126).contains(&code) {
                    self.widths[code - 32]
                } else {
                    self.average_char_width
                }
            })
            .sum()
    }
}

/// Impact: condensed heavy grotesque.
static IMPACT_TABLE: FontMetricTable = FontMetricTable {
    #[rustfmt::skip]
    widths: [
        // sp    !     "     #     $     %     &     '     (     )     *     +     ,     -     .     /
        0.18, 0.26, 0.38, 0.58, 0.50, 0.72, 0.61, 0.20, 0.30, 0.30, 0.41, 0.58, 0.22, 0.28, 0.22, 0.37,
        // 0     1     2     3     4     5     6     7     8     9
        0.50, 0.38, 0.50, 0.50, 0.50, 0.50, 0.50, 0.43, 0.50, 0.50,
        // :     ;     <     =     >     ?     @
        0.22, 0.22, 0.58, 0.58, 0.58, 0.49, 0.83,
        // A     B     C     D     E     F     G     H     I     J     K     L     M
        0.55, 0.55, 0.53, 0.55, 0.44, 0.42, 0.55, 0.56, 0.28, 0.31, 0.55, 0.41, 0.70,
        // N     O     P     Q     R     S     T     U     V     W     X     Y     Z
        0.56, 0.55, 0.52, 0.55, 0.54, 0.50, 0.44, 0.56, 0.52, 0.78, 0.49, 0.48, 0.41,
        // [     \     ]     ^     _     `
        0.30, 0.37, 0.30, 0.58, 0.41, 0.50,
        // a     b     c     d     e     f     g     h     i     j     k     l     m
        0.49, 0.50, 0.48, 0.50, 0.49, 0.30, 0.50, 0.50, 0.27, 0.27, 0.47, 0.27, 0.76,
        // n     o     p     q     r     s     t     u     v     w     x     y     z
        0.50, 0.49, 0.50, 0.50, 0.36, 0.44, 0.32, 0.50, 0.45, 0.69, 0.44, 0.45, 0.38,
        // {     |     }     ~
        0.37, 0.29, 0.37, 0.58,
    ],
    average_char_width: 0.48,
    line_height_em: 1.22,
};

/// Anton: roughly 92% of Impact's capitals.
static ANTON_TABLE: FontMetricTable = FontMetricTable {
    #[rustfmt::skip]
    widths: [
        // sp    !     "     #     $     %     &     '     (     )     *     +     ,     -     .     /
        0.17, 0.24, 0.35, 0.53, 0.46, 0.66, 0.56, 0.18, 0.28, 0.28, 0.38, 0.53, 0.20, 0.26, 0.20, 0.34,
        // 0     1     2     3     4     5     6     7     8     9
        0.46, 0.35, 0.46, 0.46, 0.46, 0.46, 0.46, 0.40, 0.46, 0.46,
        // :     ;     <     =     >     ?     @
        0.20, 0.20, 0.53, 0.53, 0.53, 0.45, 0.76,
        // A     B     C     D     E     F     G     H     I     J     K     L     M
        0.51, 0.51, 0.49, 0.51, 0.40, 0.39, 0.51, 0.52, 0.26, 0.29, 0.51, 0.38, 0.64,
        // N     O     P     Q     R     S     T     U     V     W     X     Y     Z
        0.52, 0.51, 0.48, 0.51, 0.50, 0.46, 0.40, 0.52, 0.48, 0.72, 0.45, 0.44, 0.38,
        // [     \     ]     ^     _     `
        0.28, 0.34, 0.28, 0.53, 0.38, 0.46,
        // a     b     c     d     e     f     g     h     i     j     k     l     m
        0.45, 0.46, 0.44, 0.46, 0.45, 0.28, 0.46, 0.46, 0.25, 0.25, 0.43, 0.25, 0.70,
        // n     o     p     q     r     s     t     u     v     w     x     y     z
        0.46, 0.45, 0.46, 0.46, 0.33, 0.40, 0.29, 0.46, 0.41, 0.63, 0.40, 0.41, 0.35,
        // {     |     }     ~
        0.34, 0.27, 0.34, 0.53,
    ],
    average_char_width: 0.44,
    line_height_em: 1.25,
};

/// DejaVu Sans: wide humanist sans.
static DEJAVU_SANS_TABLE: FontMetricTable = FontMetricTable {
    #[rustfmt::skip]
    widths: [
        // sp    !     "     #     $     %     &     '     (     )     *     +     ,     -     .     /
        0.32, 0.40, 0.46, 0.84, 0.64, 0.95, 0.78, 0.28, 0.39, 0.39, 0.50, 0.84, 0.32, 0.36, 0.32, 0.34,
        // 0     1     2     3     4     5     6     7     8     9
        0.64, 0.64, 0.64, 0.64, 0.64, 0.64, 0.64, 0.64, 0.64, 0.64,
        // :     ;     <     =     >     ?     @
        0.34, 0.34, 0.84, 0.84, 0.84, 0.53, 1.00,
        // A     B     C     D     E     F     G     H     I     J     K     L     M
        0.68, 0.69, 0.70, 0.77, 0.63, 0.58, 0.78, 0.75, 0.29, 0.29, 0.66, 0.56, 0.86,
        // N     O     P     Q     R     S     T     U     V     W     X     Y     Z
        0.75, 0.79, 0.60, 0.79, 0.69, 0.63, 0.61, 0.73, 0.68, 0.99, 0.69, 0.61, 0.69,
        // [     \     ]     ^     _     `
        0.39, 0.34, 0.39, 0.84, 0.50, 0.50,
        // a     b     c     d     e     f     g     h     i     j     k     l     m
        0.61, 0.63, 0.55, 0.63, 0.62, 0.35, 0.63, 0.63, 0.28, 0.28, 0.58, 0.28, 0.97,
        // n     o     p     q     r     s     t     u     v     w     x     y     z
        0.63, 0.61, 0.63, 0.63, 0.41, 0.52, 0.39, 0.63, 0.59, 0.82, 0.59, 0.59, 0.53,
        // {     |     }     ~
        0.64, 0.34, 0.64, 0.84,
    ],
    average_char_width: 0.60,
    line_height_em: 1.16,
};

/// Returns the static metric table for a given font family.
pub fn get_metrics(font: &FontFamily) -> &'static FontMetricTable {
    match font {
        FontFamily::Impact => &IMPACT_TABLE,
        FontFamily::Anton => &ANTON_TABLE,
        FontFamily::DejaVuSans => &DEJAVU_SANS_TABLE,
    }
}

/// [`MetricsProvider`] over a static width table.
#[derive(Debug, Clone, Copy)]
pub struct TableMetrics {
    table: &'static FontMetricTable,
}

impl TableMetrics {
    pub fn new(font: FontFamily) -> Self {
        Self {
            table: get_metrics(&font),
        }
    }
}

impl MetricsProvider for TableMetrics {
    fn measure_width(&self, text: &str, font_px: u32) -> f32 {
        self.table.measure_em(text) * font_px as f32
    }

    fn line_height(&self, font_px: u32) -> f32 {
        self.table.line_height_em * font_px as f32
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Glyph metrics (real font)
// ────────────────────────────────────────────────────────────────────────────

/// [`MetricsProvider`] backed by a loaded font. Widths include kerning so they
/// agree with what `imageproc` paints.
#[derive(Clone)]
pub struct GlyphMetrics {
    font: FontArc,
}

impl GlyphMetrics {
    pub fn new(font: FontArc) -> Self {
        Self { font }
    }
}

impl MetricsProvider for GlyphMetrics {
    fn measure_width(&self, text: &str, font_px: u32) -> f32 {
        let scaled = self.font.as_scaled(PxScale::from(font_px as f32));
        let mut width = 0.0_f32;
        let mut previous: Option<GlyphId> = None;
        for c in text.chars() {
            let id = scaled.glyph_id(c);
            if let Some(prev) = previous {
                width += scaled.kern(prev, id);
            }
            width += scaled.h_advance(id);
            previous = Some(id);
        }
        width
    }

    fn line_height(&self, font_px: u32) -> f32 {
        let scaled = self.font.as_scaled(PxScale::from(font_px as f32));
        scaled.ascent() - scaled.descent() + scaled.line_gap()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
