//! Caption layout engine. Picks a font size, wraps, and positions one caption band.
//!
//! # Algorithm
//! 1. Font-size search: candidates from `max_font_px` down to `min_font_px` in
//!    `font_step_px` decrements. The first candidate whose wrapped block fits the
//!    band height budget and whose widest line fits the width limit wins. If
//!    none fits, the minimum size is used and the overflow is reported, not
//!    rejected.
//! 2. Greedy word wrap at that size (see [`wrap_words`]).
//! 3. Positioning: the block is centred horizontally (clamped to the margin);
//!    TOP hangs from the top margin, BOTTOM sits on the bottom margin and grows
//!    upward.
//!
//! The engine is a pure computation. It holds no mutable state and can be
//! shared across threads freely.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::layout::font_metrics::MetricsProvider;
use crate::layout::wrap::{widest, wrap_words, WrappedLine};

// ────────────────────────────────────────────────────────────────────────────
// Inputs
// ────────────────────────────────────────────────────────────────────────────

/// Which caption region of the image a block occupies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Band {
    Top,
    Bottom,
}

impl std::str::FromStr for Band {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "top" => Ok(Band::Top),
            "bottom" => Ok(Band::Bottom),
            other => Err(format!("unknown band '{other}' (expected top or bottom)")),
        }
    }
}

/// Engine tunables. Loaded from the `layout` section of the settings file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Largest font size tried, in pixels.
    pub max_font_px: u32,
    /// Smallest font size tried; used with overflow when nothing fits.
    pub min_font_px: u32,
    /// Decrement between candidates.
    pub font_step_px: u32,
    /// Fraction of the canvas width a line may occupy.
    pub max_width_fraction: f32,
    /// Fraction of the canvas height a band's block may occupy.
    pub band_height_fraction: f32,
    /// Gap kept between the text block and the canvas edges.
    pub margin_px: u32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            max_font_px: 96,
            min_font_px: 16,
            font_step_px: 4,
            max_width_fraction: 0.9,
            band_height_fraction: 0.30,
            margin_px: 10,
        }
    }
}

impl LayoutConfig {
    /// Candidate sizes, largest first. Always ends with `min_font_px`.
    pub fn candidate_sizes(&self) -> Vec<u32> {
        let min = self.min_font_px.max(1);
        let max = self.max_font_px.max(min);
        let step = self.font_step_px.max(1) as usize;

        let mut sizes: Vec<u32> = (min..=max).rev().step_by(step).collect();
        if sizes.last() != Some(&min) {
            sizes.push(min);
        }
        sizes
    }
}

/// Validated canvas dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Canvas {
    pub width: u32,
    pub height: u32,
}

impl Canvas {
    pub fn new(width: i64, height: i64) -> Result<Self, LayoutError> {
        match (u32::try_from(width), u32::try_from(height)) {
            (Ok(w), Ok(h)) if w > 0 && h > 0 => Ok(Self {
                width: w,
                height: h,
            }),
            _ => Err(LayoutError::InvalidCanvas { width, height }),
        }
    }
}

/// One caption to lay out. `max_width_fraction` and `margin_px` default to the
/// engine config but can be overridden per block.
#[derive(Debug, Clone, PartialEq)]
pub struct CaptionBlock {
    pub text: String,
    pub band: Band,
    pub max_width_fraction: f32,
    pub margin_px: u32,
}

impl CaptionBlock {
    pub fn new(text: impl Into<String>, band: Band, config: &LayoutConfig) -> Self {
        Self {
            text: text.into(),
            band,
            max_width_fraction: config.max_width_fraction,
            margin_px: config.margin_px,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Output
// ────────────────────────────────────────────────────────────────────────────

/// A wrapped line with its draw position (top-left of the line box).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionedLine {
    pub text: String,
    pub width_px: f32,
    pub x: i32,
    pub y: i32,
}

/// Layout of one caption band. Built fresh per render and consumed by the painter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutResult {
    pub band: Band,
    pub lines: Vec<PositionedLine>,
    pub font_size_px: u32,
    pub line_height_px: u32,
    /// Left edge of the block (centred on the widest line, clamped to the margin).
    pub origin_x: i32,
    /// Top edge of the block.
    pub origin_y: i32,
    pub block_width_px: u32,
    pub block_height_px: u32,
    /// The width limit the lines were wrapped against.
    pub max_line_width_px: f32,
    /// True if no candidate satisfied the budgets and the minimum size was used.
    pub overflow: bool,
}

impl LayoutResult {
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn line_texts(&self) -> Vec<&str> {
        self.lines.iter().map(|l| l.text.as_str()).collect()
    }

    /// Bottom edge of the block.
    pub fn bottom_y(&self) -> i32 {
        self.origin_y + self.block_height_px as i32
    }
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum LayoutError {
    #[error("invalid canvas {width}x{height}: dimensions must be positive")]
    InvalidCanvas { width: i64, height: i64 },

    #[error("no font metrics provider configured")]
    MissingFontMetrics,
}

// ────────────────────────────────────────────────────────────────────────────
// Engine
// ────────────────────────────────────────────────────────────────────────────

/// Result of the font-size search before positioning.
#[derive(Debug, Clone)]
pub(crate) struct SizedWrap {
    pub font_size_px: u32,
    pub line_height_px: u32,
    pub lines: Vec<WrappedLine>,
    pub overflow: bool,
}

#[derive(Clone)]
pub struct CaptionLayoutEngine {
    config: LayoutConfig,
    metrics: Option<Arc<dyn MetricsProvider>>,
}

impl CaptionLayoutEngine {
    /// An engine with no metrics provider. Every `layout` call fails with
    /// `MissingFontMetrics` until one is attached with [`with_metrics`](Self::with_metrics).
    pub fn new(config: LayoutConfig) -> Self {
        Self {
            config,
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, metrics: Arc<dyn MetricsProvider>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    #[cfg(test)]
    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    /// Lays out `text` in `band` using the configured width fraction and margin.
    pub fn layout(
        &self,
        canvas_width: i64,
        canvas_height: i64,
        text: &str,
        band: Band,
    ) -> Result<LayoutResult, LayoutError> {
        let canvas = Canvas::new(canvas_width, canvas_height)?;
        let block = CaptionBlock::new(text, band, &self.config);
        self.layout_block(canvas, &block)
    }

    /// Lays out a block with its own width fraction and margin.
    pub fn layout_block(
        &self,
        canvas: Canvas,
        block: &CaptionBlock,
    ) -> Result<LayoutResult, LayoutError> {
        let metrics = self
            .metrics
            .as_deref()
            .ok_or(LayoutError::MissingFontMetrics)?;

        let max_line_width = canvas.width as f32 * block.max_width_fraction;
        let sized = self.search_font_size(canvas, block, max_line_width, metrics);
        Ok(position(canvas, block, max_line_width, sized))
    }

    /// Step 1: largest candidate whose wrap fits both budgets, else the minimum.
    pub(crate) fn search_font_size(
        &self,
        canvas: Canvas,
        block: &CaptionBlock,
        max_line_width: f32,
        metrics: &dyn MetricsProvider,
    ) -> SizedWrap {
        let height_budget = canvas.height as f32 * self.config.band_height_fraction;
        let candidates = self.config.candidate_sizes();

        for &size in &candidates {
            let attempt = wrap_at(block, size, max_line_width, metrics);
            if fits(&attempt, max_line_width, height_budget) {
                return attempt;
            }
        }

        // candidate_sizes() is never empty; it always ends at the minimum.
        let min = candidates.last().copied().unwrap_or(1);
        SizedWrap {
            overflow: !block.text.trim().is_empty(),
            ..wrap_at(block, min, max_line_width, metrics)
        }
    }
}

fn wrap_at(
    block: &CaptionBlock,
    size: u32,
    max_line_width: f32,
    metrics: &dyn MetricsProvider,
) -> SizedWrap {
    SizedWrap {
        font_size_px: size,
        line_height_px: metrics.line_height(size).ceil().max(1.0) as u32,
        lines: wrap_words(&block.text, size, max_line_width, metrics),
        overflow: false,
    }
}

fn fits(attempt: &SizedWrap, max_line_width: f32, height_budget: f32) -> bool {
    let block_height = attempt.lines.len() as f32 * attempt.line_height_px as f32;
    block_height <= height_budget && widest(&attempt.lines) <= max_line_width
}

/// Step 3: horizontal centring and band anchoring.
fn position(
    canvas: Canvas,
    block: &CaptionBlock,
    max_line_width: f32,
    sized: SizedWrap,
) -> LayoutResult {
    let margin = block.margin_px as i32;
    let canvas_w = canvas.width as i32;
    let canvas_h = canvas.height as i32;

    let widest_line = widest(&sized.lines);
    let block_width = widest_line.ceil() as u32;
    let block_height = sized.lines.len() as u32 * sized.line_height_px;

    let centred_x = |width: f32| ((canvas_w as f32 - width) / 2.0).floor() as i32;
    let origin_x = centred_x(widest_line).max(margin);
    let origin_y = match block.band {
        Band::Top => margin,
        Band::Bottom => canvas_h - margin - block_height as i32,
    };

    let lines = sized
        .lines
        .into_iter()
        .enumerate()
        .map(|(i, line)| PositionedLine {
            x: centred_x(line.width_px).max(margin),
            y: origin_y + (i as u32 * sized.line_height_px) as i32,
            text: line.text,
            width_px: line.width_px,
        })
        .collect();

    LayoutResult {
        band: block.band,
        lines,
        font_size_px: sized.font_size_px,
        line_height_px: sized.line_height_px,
        origin_x,
        origin_y,
        block_width_px: block_width,
        block_height_px: block_height,
        max_line_width_px: max_line_width,
        overflow: sized.overflow,
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
