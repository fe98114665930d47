//! Where a meme's base picture comes from: a URL or a local file.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use async_trait::async_trait;
use bytes::Bytes;
use image::DynamicImage;
use reqwest::Client;
use tracing::info;

use crate::errors::AppError;
use crate::reddit::{download_image, is_image_url, is_video_url};

/// Extensions accepted for local uploads.
pub const ALLOWED_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageSource {
    Remote(String),
    Local(PathBuf),
}

impl ImageSource {
    /// `http://` / `https://` means remote, anything else is a local path.
    pub fn parse(raw: &str) -> Result<Self, AppError> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(AppError::Validation("image source is empty".to_string()));
        }

        let lower = raw.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            if is_video_url(raw) {
                return Err(AppError::Validation(format!(
                    "videos are not supported: {raw}"
                )));
            }
            if !is_image_url(raw) {
                return Err(AppError::Validation(format!(
                    "URL does not point to an image: {raw}"
                )));
            }
            return Ok(ImageSource::Remote(raw.to_string()));
        }

        let path = PathBuf::from(raw);
        if !has_allowed_extension(&path) {
            return Err(AppError::Validation(format!(
                "unsupported file type: {} (allowed: {})",
                path.display(),
                ALLOWED_EXTENSIONS.join(", ")
            )));
        }
        Ok(ImageSource::Local(path))
    }
}

impl FromStr for ImageSource {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ImageSource::parse(s)
    }
}

impl fmt::Display for ImageSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImageSource::Remote(url) => f.write_str(url),
            ImageSource::Local(path) => write!(f, "{}", path.display()),
        }
    }
}

pub fn has_allowed_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| {
            ALLOWED_EXTENSIONS
                .iter()
                .any(|allowed| e.eq_ignore_ascii_case(allowed))
        })
        .unwrap_or(false)
}

/// A decoded picture plus a description of where it came from.
#[derive(Debug, Clone)]
pub struct SourceImage {
    pub image: DynamicImage,
    pub origin: String,
}

impl SourceImage {
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }
}

#[async_trait]
pub trait ImageLoader: Send + Sync {
    async fn load(&self, source: &ImageSource) -> Result<SourceImage, AppError>;
}

/// Downloads remote images and reads local ones; decoding runs on the blocking pool.
#[derive(Clone)]
pub struct HttpImageLoader {
    client: Client,
}

impl HttpImageLoader {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ImageLoader for HttpImageLoader {
    async fn load(&self, source: &ImageSource) -> Result<SourceImage, AppError> {
        let bytes = match source {
            ImageSource::Remote(url) => download_image(&self.client, url).await?,
            ImageSource::Local(path) => read_local(path).await?,
        };
        let loaded = SourceImage {
            image: decode(bytes).await?,
            origin: source.to_string(),
        };
        info!(
            "Loaded image {} ({}x{})",
            loaded.origin,
            loaded.width(),
            loaded.height()
        );
        Ok(loaded)
    }
}

async fn read_local(path: &Path) -> Result<Bytes, AppError> {
    match tokio::fs::read(path).await {
        Ok(data) => Ok(Bytes::from(data)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(AppError::NotFound(format!(
            "image file {}",
            path.display()
        ))),
        Err(e) => Err(e.into()),
    }
}

pub async fn decode(bytes: Bytes) -> Result<DynamicImage, AppError> {
    let image = tokio::task::spawn_blocking(move || image::load_from_memory(&bytes))
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Decode task panicked: {e}")))??;
    Ok(image)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_remote_image_url() {
        let s = ImageSource::parse("https://i.redd.it/abc123.jpg").unwrap();
        assert_eq!(s, ImageSource::Remote("https://i.redd.it/abc123.jpg".to_string()));
    }

    #[test]
    fn test_parse_remote_non_image_rejected() {
        let err = ImageSource::parse("https://v.redd.it/abc123").unwrap_err();
        assert_eq!(err.code(), "VALIDATION_ERROR");
    }

    #[test]
    fn test_parse_video_url_rejected() {
        let err = ImageSource::parse("https://i.imgur.com/clip.gifv").unwrap_err();
        assert!(err.to_string().contains("videos are not supported"), "got: {err}");
    }

    #[test]
    fn test_parse_local_allowed_extensions() {
        for name in ["cat.png", "cat.JPG", "cat.jpeg", "cat.gif"] {
            let s = ImageSource::parse(name).unwrap();
            assert_eq!(s, ImageSource::Local(PathBuf::from(name)), "{name} should be local");
        }
    }

    #[test]
    fn test_parse_local_rejects_other_extensions() {
        assert!(ImageSource::parse("notes.txt").is_err());
        assert!(ImageSource::parse("picture").is_err());
        assert!(ImageSource::parse("   ").is_err());
    }

    #[tokio::test]
    async fn test_load_missing_local_file_is_not_found() {
        let loader = HttpImageLoader::new(Client::new());
        let source = ImageSource::Local(PathBuf::from("/definitely/not/here.png"));
        let err = loader.load(&source).await.unwrap_err();
        assert_eq!(err.code(), "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_load_local_png() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tiny.png");
        image::RgbImage::new(6, 3).save(&path).unwrap();

        let loader = HttpImageLoader::new(Client::new());
        let loaded = loader.load(&ImageSource::Local(path)).await.unwrap();
        assert_eq!((loaded.width(), loaded.height()), (6, 3));
    }
}
