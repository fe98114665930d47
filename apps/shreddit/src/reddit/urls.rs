//! URL classification for Reddit post links.

const IMAGE_EXTENSIONS: &[&str] = &[
    ".jpg", ".jpeg", ".png", ".gif", ".bmp", ".webp", ".tiff", ".svg",
];

const VIDEO_EXTENSIONS: &[&str] = &[".mp4", ".webm", ".mov", ".avi", ".mkv", ".gifv"];

const VIDEO_HOST_PATTERNS: &[&str] = &["v.redd.it", "youtube.com/watch", "youtu.be", "vimeo.com"];

/// True if the URL path ends in a known image extension.
pub fn is_image_url(url: &str) -> bool {
    let path = strip_query(url).to_ascii_lowercase();
    IMAGE_EXTENSIONS.iter().any(|ext| path.ends_with(ext))
}

/// True for video files and known video hosts. `.gifv` counts as video.
pub fn is_video_url(url: &str) -> bool {
    let lower = url.to_ascii_lowercase();
    let path = strip_query(&lower);
    VIDEO_EXTENSIONS.iter().any(|ext| path.ends_with(ext))
        || VIDEO_HOST_PATTERNS.iter().any(|p| lower.contains(p))
}

fn strip_query(url: &str) -> &str {
    url.split(['?', '#']).next().unwrap_or(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_extensions() {
        assert!(is_image_url("https://i.redd.it/abc.jpg"));
        assert!(is_image_url("https://i.imgur.com/abc.PNG"));
        assert!(is_image_url("https://example.com/a.webp?width=640"));
        assert!(!is_image_url("https://imgur.com/gallery/abc"));
        assert!(!is_image_url("https://i.imgur.com/abc.gifv"), "gifv is a video");
    }

    #[test]
    fn test_video_urls() {
        assert!(is_video_url("https://v.redd.it/xyz"));
        assert!(is_video_url("https://www.youtube.com/watch?v=abc"));
        assert!(is_video_url("https://youtu.be/abc"));
        assert!(is_video_url("https://vimeo.com/123"));
        assert!(is_video_url("https://i.imgur.com/abc.gifv"));
        assert!(is_video_url("https://example.com/clip.MP4"));
        assert!(!is_video_url("https://i.redd.it/abc.jpg"));
    }
}
