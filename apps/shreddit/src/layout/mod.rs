// Caption layout: font-size search, greedy word wrap, band positioning.
// Pure and synchronous; the painter in `render` consumes the results.

pub mod engine;
pub mod font_metrics;
pub mod wrap;

// Re-export the public API consumed by the pipeline, renderer and CLI.
pub use engine::{Band, CaptionLayoutEngine, LayoutConfig, LayoutError, LayoutResult};
pub use font_metrics::{FontFamily, GlyphMetrics, MetricsProvider, TableMetrics};
