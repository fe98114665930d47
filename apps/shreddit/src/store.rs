//! Generated meme files on disk.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use image::{DynamicImage, ImageFormat};
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::images::encode_jpeg;

pub const JPEG_QUALITY: u8 = 95;
pub const DEFAULT_GALLERY_SIZE: usize = 20;
const OUTPUT_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif"];

#[derive(Debug, Clone, Serialize)]
pub struct StoredMeme {
    pub path: PathBuf,
    pub file_name: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct MemeStore {
    output_dir: PathBuf,
}

impl MemeStore {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Writes `image` under `name` (or a fresh `meme_<id>.jpg`). JPEG output
    /// drops alpha and uses quality 95; PNG and GIF keep RGBA.
    pub fn save(&self, image: &DynamicImage, name: Option<&str>) -> Result<PathBuf, AppError> {
        fs::create_dir_all(&self.output_dir)?;
        let file_name = output_file_name(name);
        let path = self.output_dir.join(&file_name);

        match output_format(&file_name) {
            ImageFormat::Jpeg => fs::write(&path, encode_jpeg(image, JPEG_QUALITY)?)?,
            format => image.save_with_format(&path, format)?,
        }

        info!("Meme saved to: {}", path.display());
        Ok(path)
    }

    /// Generated memes, newest first.
    pub fn recent(&self, limit: usize) -> Result<Vec<StoredMeme>, AppError> {
        let entries = match fs::read_dir(&self.output_dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut memes = Vec::new();
        for entry in entries {
            let entry = entry?;
            let path = entry.path();
            if !path.is_file() || !has_output_extension(&path) {
                continue;
            }
            let metadata = entry.metadata()?;
            let timestamp = metadata.created().or_else(|_| metadata.modified())?;
            memes.push(StoredMeme {
                file_name: entry.file_name().to_string_lossy().into_owned(),
                path,
                created_at: DateTime::<Utc>::from(timestamp),
            });
        }

        memes.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| a.file_name.cmp(&b.file_name))
        });
        memes.truncate(limit);
        Ok(memes)
    }
}

/// Final file name: the last path component of `name`, `.jpg` appended when
/// it lacks an image extension; `meme_<8 hex>.jpg` when no name is given.
pub fn output_file_name(name: Option<&str>) -> String {
    let base = name
        .map(str::trim)
        .and_then(|n| Path::new(n).file_name())
        .map(|n| n.to_string_lossy().into_owned())
        .filter(|n| !n.is_empty());

    match base {
        Some(n) if has_output_extension(Path::new(&n)) => n,
        Some(n) => format!("{n}.jpg"),
        None => {
            let id = Uuid::new_v4().simple().to_string();
            format!("meme_{}.jpg", &id[..8])
        }
    }
}

fn has_output_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| OUTPUT_EXTENSIONS.iter().any(|x| e.eq_ignore_ascii_case(x)))
        .unwrap_or(false)
}

fn output_format(file_name: &str) -> ImageFormat {
    match Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .as_deref()
    {
        Some("png") => ImageFormat::Png,
        Some("gif") => ImageFormat::Gif,
        _ => ImageFormat::Jpeg,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    fn sample() -> DynamicImage {
        DynamicImage::ImageRgba8(RgbaImage::from_pixel(10, 10, Rgba([0, 128, 255, 200])))
    }

    #[test]
    fn test_default_name_shape() {
        let name = output_file_name(None);
        assert!(name.starts_with("meme_"), "got {name}");
        assert!(name.ends_with(".jpg"));
        assert_eq!(name.len(), "meme_".len() + 8 + ".jpg".len());
    }

    #[test]
    fn test_name_without_extension_gets_jpg() {
        assert_eq!(output_file_name(Some("funny")), "funny.jpg");
        assert_eq!(output_file_name(Some("funny.txt")), "funny.txt.jpg");
        assert_eq!(output_file_name(Some("keep.PNG")), "keep.PNG");
    }

    #[test]
    fn test_name_is_confined_to_output_dir() {
        assert_eq!(output_file_name(Some("../../etc/evil.png")), "evil.png");
        assert!(output_file_name(Some("   ")).starts_with("meme_"));
    }

    #[test]
    fn test_save_jpeg_and_png() {
        let dir = tempfile::tempdir().unwrap();
        let store = MemeStore::new(dir.path().join("out"));

        let jpg = store.save(&sample(), Some("a.jpg")).unwrap();
        let bytes = std::fs::read(&jpg).unwrap();
        assert_eq!(&bytes[..2], &[0xFF, 0xD8]);

        let png = store.save(&sample(), Some("b.png")).unwrap();
        let reloaded = image::open(&png).unwrap();
        assert!(reloaded.color().has_alpha(), "PNG output keeps alpha");
    }

    #[test]
    fn test_recent_lists_images_newest_first() {
        let dir = tempfile::tempdir().unwrap();
        let store = MemeStore::new(dir.path());
        store.save(&sample(), Some("one.jpg")).unwrap();
        store.save(&sample(), Some("two.png")).unwrap();
        std::fs::write(dir.path().join("notes.txt"), b"ignore me").unwrap();

        let recent = store.recent(DEFAULT_GALLERY_SIZE).unwrap();
        assert_eq!(recent.len(), 2, "non-image files are not memes");
        assert!(recent[0].created_at >= recent[1].created_at);

        let limited = store.recent(1).unwrap();
        assert_eq!(limited.len(), 1);
    }

    #[test]
    fn test_recent_on_missing_dir_is_empty() {
        let store = MemeStore::new("/definitely/not/a/dir");
        assert!(store.recent(5).unwrap().is_empty());
    }
}
