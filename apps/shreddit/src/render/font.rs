use std::path::{Path, PathBuf};

use ab_glyph::FontArc;
use tracing::{info, warn};

use crate::errors::AppError;

/// Well-known font locations, tried in order when no font is configured.
pub const FONT_CANDIDATES: &[&str] = &[
    "/Library/Fonts/Impact.ttf",
    "/System/Library/Fonts/Supplemental/Impact.ttf",
    "/Library/Fonts/Arial.ttf",
    "/Library/Fonts/Arial Bold.ttf",
    "/usr/share/fonts/truetype/msttcorefonts/Impact.ttf",
    "/usr/share/fonts/TTF/impact.ttf",
    "/usr/share/fonts/truetype/dejavu/DejaVuSans-Bold.ttf",
    "/usr/share/fonts/TTF/DejaVuSans-Bold.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Bold.ttf",
    "/usr/share/fonts/liberation/LiberationSans-Bold.ttf",
];

/// The configured font if it exists, otherwise the first candidate on disk.
pub fn resolve_font_path(configured: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = configured {
        if path.is_file() {
            return Some(path.to_path_buf());
        }
        warn!("Configured font {} not found, searching system fonts", path.display());
    }
    first_existing(FONT_CANDIDATES.iter().map(Path::new))
}

fn first_existing<'a>(candidates: impl Iterator<Item = &'a Path>) -> Option<PathBuf> {
    candidates.into_iter().find(|p| p.is_file()).map(Path::to_path_buf)
}

pub fn load_font(path: &Path) -> Result<FontArc, AppError> {
    let data = std::fs::read(path)
        .map_err(|e| AppError::Font(format!("cannot read {}: {e}", path.display())))?;
    let font = FontArc::try_from_vec(data)
        .map_err(|e| AppError::Font(format!("invalid font {}: {e}", path.display())))?;
    info!("Loaded font {}", path.display());
    Ok(font)
}
