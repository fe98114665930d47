//! Meme pipeline: load picture, write captions, lay out, paint, save.
//!
//! Stages are independent and pass plain data. Network stages are async;
//! layout, painting and encoding run on the blocking pool.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use image::{DynamicImage, RgbaImage};
use serde::Serialize;
use tracing::{info, warn};

use crate::captions::{CaptionContext, CaptionTextSource, Captions};
use crate::errors::AppError;
use crate::images::{strip_caption_bands, ImageLoader, ImageSource};
use crate::layout::{Band, CaptionLayoutEngine, LayoutError, LayoutResult};
use crate::render::{CaptionPainter, CaptionStyle};
use crate::store::MemeStore;

/// File name prefix for memes whose captions were rewritten by AI.
pub const REGENERATED_PREFIX: &str = "ai_meme_";

// ────────────────────────────────────────────────────────────────────────────
// Data models
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct MakeRequest {
    pub source: ImageSource,
    pub context: CaptionContext,
    /// Output file name; `None` picks a fresh `meme_<id>.jpg`.
    pub output_name: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MemeOutcome {
    pub path: PathBuf,
    pub top: String,
    pub bottom: String,
    /// One entry per non-empty band, TOP first.
    pub layouts: Vec<LayoutResult>,
}

// ────────────────────────────────────────────────────────────────────────────
// Pipeline
// ────────────────────────────────────────────────────────────────────────────

pub struct MemePipeline {
    loader: Arc<dyn ImageLoader>,
    engine: CaptionLayoutEngine,
    painter: Arc<dyn CaptionPainter>,
    style: CaptionStyle,
    store: MemeStore,
    /// Where regeneration keeps the caption-free picture, if anywhere.
    scratch: Option<MemeStore>,
}

impl MemePipeline {
    pub fn new(
        loader: Arc<dyn ImageLoader>,
        engine: CaptionLayoutEngine,
        painter: Arc<dyn CaptionPainter>,
        style: CaptionStyle,
        store: MemeStore,
    ) -> Self {
        Self {
            loader,
            engine,
            painter,
            style,
            store,
            scratch: None,
        }
    }

    pub fn with_scratch_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.scratch = Some(MemeStore::new(dir));
        self
    }

    pub async fn create(
        &self,
        request: &MakeRequest,
        captions: &dyn CaptionTextSource,
    ) -> Result<MemeOutcome, AppError> {
        info!("Creating meme from {} ({})", request.source, request.context.label());

        let image = self.loader.load(&request.source).await?;
        let text = captions.captions(&image, &request.context).await?;

        self.render_and_save(image.image, text, request.output_name.clone())
            .await
    }

    /// Strips the caption bands from an existing meme, asks `ai` for new
    /// captions and saves the result as `ai_meme_<original name>`.
    pub async fn regenerate(
        &self,
        meme_path: &Path,
        context: &CaptionContext,
        ai: &dyn CaptionTextSource,
    ) -> Result<MemeOutcome, AppError> {
        let file_name = meme_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| {
                AppError::Validation(format!("not a file path: {}", meme_path.display()))
            })?;

        info!("Regenerating {} ({})", meme_path.display(), context.label());

        let mut original = self
            .loader
            .load(&ImageSource::Local(meme_path.to_path_buf()))
            .await?;

        let scratch = self.scratch.clone();
        let scratch_name = format!("extracted_{file_name}");
        let meme = original.image;
        original.image = tokio::task::spawn_blocking(move || -> Result<DynamicImage, AppError> {
            let extracted = strip_caption_bands(&meme);
            if let Some(scratch) = scratch {
                scratch.save(&extracted, Some(&scratch_name))?;
            }
            Ok(extracted)
        })
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("spawn_blocking failed in extraction: {e}")))??;

        let text = ai.captions(&original, context).await?;
        if text.is_empty() {
            return Err(AppError::Validation(
                "caption source returned no text for either band".to_string(),
            ));
        }

        self.render_and_save(original.image, text, Some(format!("{REGENERATED_PREFIX}{file_name}")))
            .await
    }

    async fn render_and_save(
        &self,
        image: DynamicImage,
        text: Captions,
        output_name: Option<String>,
    ) -> Result<MemeOutcome, AppError> {
        let engine = self.engine.clone();
        let painter = Arc::clone(&self.painter);
        let style = self.style.clone();
        let store = self.store.clone();

        // CPU-bound: layout, painting and JPEG encoding.
        tokio::task::spawn_blocking(move || -> Result<MemeOutcome, AppError> {
            let (canvas, layouts) = compose(&engine, painter.as_ref(), &style, image, &text)?;
            let path = store.save(&DynamicImage::ImageRgba8(canvas), output_name.as_deref())?;
            Ok(MemeOutcome {
                path,
                top: text.top,
                bottom: text.bottom,
                layouts,
            })
        })
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("spawn_blocking failed in render: {e}")))?
    }
}

/// Lays out and paints both bands. Empty bands are skipped.
pub fn compose(
    engine: &CaptionLayoutEngine,
    painter: &dyn CaptionPainter,
    style: &CaptionStyle,
    image: DynamicImage,
    captions: &Captions,
) -> Result<(RgbaImage, Vec<LayoutResult>), LayoutError> {
    let mut canvas = image.into_rgba8();
    let (width, height) = (i64::from(canvas.width()), i64::from(canvas.height()));
    let mut layouts = Vec::with_capacity(2);

    for (text, band) in [(&captions.top, Band::Top), (&captions.bottom, Band::Bottom)] {
        let prepared = style.prepare(text);
        let layout = engine.layout(width, height, &prepared, band)?;
        if layout.is_empty() {
            continue;
        }
        if layout.overflow {
            warn!(
                "Caption {:?} overflows the {:?} band at the minimum size ({}px)",
                prepared, band, layout.font_size_px
            );
        }
        painter.paint(&mut canvas, &layout);
        layouts.push(layout);
    }

    Ok((canvas, layouts))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use image::{Rgb, RgbImage};

    use crate::captions::FixedCaptions;
    use crate::images::{HttpImageLoader, SourceImage};
    use crate::layout::{FontFamily, LayoutConfig, TableMetrics};

    struct SolidLoader;

    #[async_trait]
    impl ImageLoader for SolidLoader {
        async fn load(&self, source: &ImageSource) -> Result<SourceImage, AppError> {
            Ok(SourceImage {
                image: DynamicImage::ImageRgb8(RgbImage::from_pixel(800, 600, Rgb([90, 90, 90]))),
                origin: source.to_string(),
            })
        }
    }

    /// Records the bands it was asked to paint.
    #[derive(Default)]
    struct RecordingPainter {
        painted: Mutex<Vec<Band>>,
    }

    impl CaptionPainter for RecordingPainter {
        fn paint(&self, _canvas: &mut RgbaImage, layout: &LayoutResult) {
            self.painted.lock().unwrap().push(layout.band);
        }
    }

    fn engine() -> CaptionLayoutEngine {
        CaptionLayoutEngine::new(LayoutConfig::default())
            .with_metrics(Arc::new(TableMetrics::new(FontFamily::Impact)))
    }

    fn pipeline(loader: Arc<dyn ImageLoader>, dir: &Path) -> (MemePipeline, Arc<RecordingPainter>) {
        let painter = Arc::new(RecordingPainter::default());
        let p = MemePipeline::new(
            loader,
            engine(),
            painter.clone(),
            CaptionStyle::default(),
            MemeStore::new(dir),
        );
        (p, painter)
    }

    fn request(name: Option<&str>) -> MakeRequest {
        MakeRequest {
            source: ImageSource::Remote("https://i.redd.it/x.jpg".to_string()),
            context: CaptionContext::Generic,
            output_name: name.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn test_create_lays_out_and_saves_both_bands() {
        let dir = tempfile::tempdir().unwrap();
        let (p, painter) = pipeline(Arc::new(SolidLoader), dir.path());
        let source = FixedCaptions::new(Captions::new(
            "when the code compiles on the first try",
            "suspicious",
        ));

        let outcome = p.create(&request(Some("first")), &source).await.unwrap();

        assert_eq!(outcome.path, dir.path().join("first.jpg"));
        assert!(outcome.path.exists(), "meme file should be written");
        assert_eq!(outcome.layouts.len(), 2);
        assert_eq!(outcome.layouts[0].band, Band::Top);
        assert_eq!(outcome.layouts[1].band, Band::Bottom);
        assert_eq!(
            outcome.layouts[0].lines[0].text.chars().next(),
            Some('W'),
            "captions are upper-cased before layout"
        );
        assert_eq!(*painter.painted.lock().unwrap(), vec![Band::Top, Band::Bottom]);
    }

    #[tokio::test]
    async fn test_create_skips_empty_band() {
        let dir = tempfile::tempdir().unwrap();
        let (p, painter) = pipeline(Arc::new(SolidLoader), dir.path());
        let source = FixedCaptions::new(Captions::new("", "bottom only"));

        let outcome = p.create(&request(None), &source).await.unwrap();

        assert_eq!(outcome.layouts.len(), 1);
        assert_eq!(outcome.layouts[0].band, Band::Bottom);
        assert_eq!(*painter.painted.lock().unwrap(), vec![Band::Bottom]);
    }

    #[tokio::test]
    async fn test_regenerate_writes_ai_prefixed_copy() {
        let dir = tempfile::tempdir().unwrap();
        let original = dir.path().join("meme_1234abcd.jpg");
        DynamicImage::ImageRgb8(RgbImage::from_pixel(300, 200, Rgb([10, 200, 10])))
            .save(&original)
            .unwrap();

        let scratch = dir.path().join("scratch");
        let (p, _painter) = pipeline(
            Arc::new(HttpImageLoader::new(reqwest::Client::new())),
            dir.path(),
        );
        let p = p.with_scratch_dir(&scratch);
        let ai = FixedCaptions::new(Captions::new("new top", "new bottom"));

        let outcome = p
            .regenerate(&original, &CaptionContext::Generic, &ai)
            .await
            .unwrap();

        assert_eq!(outcome.path, dir.path().join("ai_meme_meme_1234abcd.jpg"));
        assert_eq!(outcome.top, "new top");
        assert!(scratch.join("extracted_meme_1234abcd.jpg").exists());
    }

    #[tokio::test]
    async fn test_regenerate_rejects_empty_captions() {
        let dir = tempfile::tempdir().unwrap();
        let (p, _painter) = pipeline(Arc::new(SolidLoader), dir.path());
        let ai = FixedCaptions::new(Captions::new(" ", ""));

        let err = p
            .regenerate(Path::new("old.jpg"), &CaptionContext::Generic, &ai)
            .await
            .unwrap_err();
        assert_eq!(err.code(), "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_regenerate_missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let (p, _painter) = pipeline(
            Arc::new(HttpImageLoader::new(reqwest::Client::new())),
            dir.path(),
        );
        let ai = FixedCaptions::new(Captions::new("a", "b"));

        let err = p
            .regenerate(&dir.path().join("gone.jpg"), &CaptionContext::Generic, &ai)
            .await
            .unwrap_err();
        assert_eq!(err.code(), "NOT_FOUND");
    }

    #[test]
    fn test_compose_without_metrics_fails() {
        let engine = CaptionLayoutEngine::new(LayoutConfig::default());
        let painter = RecordingPainter::default();
        let image = DynamicImage::ImageRgb8(RgbImage::new(100, 100));
        let err = compose(
            &engine,
            &painter,
            &CaptionStyle::default(),
            image,
            &Captions::new("x", ""),
        )
        .unwrap_err();
        assert_eq!(err, LayoutError::MissingFontMetrics);
    }
}
