// Reddit: finding meme pictures by subreddit, keyword, band or genre.

pub mod client;
pub mod models;
pub mod urls;

use std::time::Duration;

use bytes::Bytes;
use reqwest::Client;
use thiserror::Error;
use tracing::info;

pub use client::RedditClient;
pub use models::{Category, RedditPost};
pub use urls::{is_image_url, is_video_url};

const DOWNLOAD_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Error)]
pub enum RedditError {
    #[error(
        "Reddit API credentials are not configured \
         (set REDDIT_CLIENT_ID/REDDIT_CLIENT_SECRET or run `shreddit config reddit`)"
    )]
    NotConfigured,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Reddit authentication failed: {0}")]
    Auth(String),

    #[error("Reddit API returned status {status} for {url}")]
    Api { status: u16, url: String },

    #[error("URL does not point to an image: {0}")]
    NotAnImage(String),

    #[error("download failed with status {status}: {url}")]
    Download { status: u16, url: String },
}

/// Downloads an image body. The URL must carry an image extension.
pub async fn download_image(client: &Client, url: &str) -> Result<Bytes, RedditError> {
    if !is_image_url(url) {
        return Err(RedditError::NotAnImage(url.to_string()));
    }

    let response = client
        .get(url)
        .timeout(Duration::from_secs(DOWNLOAD_TIMEOUT_SECS))
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        return Err(RedditError::Download {
            status: status.as_u16(),
            url: url.to_string(),
        });
    }

    let body = response.bytes().await?;
    info!("Downloaded {} bytes from {}", body.len(), url);
    Ok(body)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_download_rejects_non_image_url_without_network() {
        let err = download_image(&Client::new(), "https://v.redd.it/abc")
            .await
            .unwrap_err();
        assert!(matches!(err, RedditError::NotAnImage(_)));
    }
}
