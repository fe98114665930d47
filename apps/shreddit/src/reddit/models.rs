use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Subreddit listing sort.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    #[default]
    Hot,
    New,
    Top,
    Rising,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Hot => "hot",
            Category::New => "new",
            Category::Top => "top",
            Category::Rising => "rising",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "hot" => Ok(Category::Hot),
            "new" => Ok(Category::New),
            "top" => Ok(Category::Top),
            "rising" => Ok(Category::Rising),
            other => Err(format!(
                "invalid category '{other}' (expected hot, new, top or rising)"
            )),
        }
    }
}

/// An image post found on Reddit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RedditPost {
    pub title: String,
    pub url: String,
    pub score: i64,
    pub subreddit: String,
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubredditInfo {
    pub name: String,
    pub description: String,
    pub subscribers: u64,
}

// ────────────────────────────────────────────────────────────────────────────
// Wire types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub(crate) struct Listing<T> {
    pub data: ListingData<T>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ListingData<T> {
    #[serde(default = "Vec::new")]
    pub children: Vec<Thing<T>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Thing<T> {
    pub data: T,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct PostData {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub score: i64,
    #[serde(default)]
    pub subreddit: String,
    #[serde(default)]
    pub stickied: bool,
}

impl PostData {
    pub fn into_post(self) -> Option<RedditPost> {
        let url = self.url?;
        Some(RedditPost {
            title: self.title,
            url,
            score: self.score,
            subreddit: self.subreddit,
            id: self.id,
        })
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct SubredditData {
    pub display_name: String,
    #[serde(default)]
    pub public_description: String,
    #[serde(default)]
    pub subscribers: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AboutSubreddit {
    pub kind: String,
    pub data: SubredditData,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TokenResponse {
    pub access_token: String,
    pub expires_in: i64,
}
