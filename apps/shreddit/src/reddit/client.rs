//! Reddit API client: application-only OAuth plus the listing and search
//! endpoints used to find meme pictures.
//!
//! Every search strategy funnels posts through [`absorb_posts`]: keep image
//! links only, skip stickied posts, de-duplicate by post id, stop at the limit.

use std::collections::HashSet;
use std::time::Duration;

use chrono::{DateTime, Utc};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::captions::Genre;
use crate::config::RedditSettings;
use crate::reddit::models::{
    AboutSubreddit, Category, Listing, PostData, RedditPost, SubredditData, SubredditInfo,
    TokenResponse,
};
use crate::reddit::urls::is_image_url;
use crate::reddit::RedditError;

const AUTH_URL: &str = "https://www.reddit.com/api/v1/access_token";
const API_URL: &str = "https://oauth.reddit.com";
/// Reddit caps listing and search pages at 100 items.
const MAX_PAGE: u32 = 100;
/// Refresh the token this long before Reddit says it expires.
const TOKEN_EXPIRY_SLACK_SECS: i64 = 60;
const REQUEST_TIMEOUT_SECS: u64 = 15;
const HEAD_TIMEOUT_SECS: u64 = 5;

const IMAGE_HOSTS_QUERY: &str = "site:i.redd.it OR site:imgur.com";

const MUSIC_SUBREDDITS: &[&str] = &[
    "Music",
    "listentothis",
    "IndieFolk",
    "Metal",
    "Rock",
    "AlternativeRock",
    "ClassicRock",
    "HipHopImages",
    "FolkPunk",
    "Punk",
    "Jazz",
    "Emo",
    "PostRock",
    "Blues",
    "ElectronicMusic",
    "Rap",
    "IndieHeads",
    "country",
];

/// Extra subreddits searched for every genre after its own.
const GENERAL_MUSIC_SUBREDDITS: &[&str] = &["Music", "pics", "OldSchoolCool"];

/// Terms tried across r/all when the guitar subreddits come up short.
const GUITAR_BROADER_TERMS: &[&str] = &[
    "fender",
    "gibson",
    "stratocaster",
    "les paul",
    "amp",
    "pedal",
    "musician",
    "band",
    "rock",
];

#[derive(Debug, Clone)]
struct AccessToken {
    value: String,
    expires_at: DateTime<Utc>,
}

impl AccessToken {
    fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        now + chrono::Duration::seconds(TOKEN_EXPIRY_SLACK_SECS) < self.expires_at
    }
}

pub struct RedditClient {
    http: Client,
    credentials: RedditSettings,
    token: Mutex<Option<AccessToken>>,
    meme_subreddits: Vec<String>,
    guitar_subreddits: Vec<String>,
    validate_urls: bool,
}

impl RedditClient {
    /// Fails with `NotConfigured` when the client id or secret is missing, so
    /// no network call is attempted without credentials.
    pub fn new(
        credentials: RedditSettings,
        meme_subreddits: Vec<String>,
        guitar_subreddits: Vec<String>,
    ) -> Result<Self, RedditError> {
        if !credentials.is_configured() {
            return Err(RedditError::NotConfigured);
        }
        let http = Client::builder()
            .user_agent(credentials.user_agent.clone())
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;
        Ok(Self {
            http,
            credentials,
            token: Mutex::new(None),
            meme_subreddits,
            guitar_subreddits,
            validate_urls: true,
        })
    }

    /// Toggles the HEAD request that checks each listing image is reachable.
    pub fn with_url_validation(mut self, enabled: bool) -> Self {
        self.validate_urls = enabled;
        self
    }

    // ── auth ────────────────────────────────────────────────────────────────

    async fn access_token(&self) -> Result<String, RedditError> {
        let mut guard = self.token.lock().await;
        if let Some(token) = guard.as_ref() {
            if token.is_fresh(Utc::now()) {
                return Ok(token.value.clone());
            }
        }

        debug!("Requesting Reddit application token");
        let response = self
            .http
            .post(AUTH_URL)
            .basic_auth(
                &self.credentials.client_id,
                Some(&self.credentials.client_secret),
            )
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RedditError::Auth(format!("status {status}: {body}")));
        }

        let token: TokenResponse = response.json().await?;
        let fresh = AccessToken {
            value: token.access_token,
            expires_at: Utc::now() + chrono::Duration::seconds(token.expires_in),
        };
        let value = fresh.value.clone();
        *guard = Some(fresh);
        Ok(value)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, RedditError> {
        let token = self.access_token().await?;
        let url = format!("{API_URL}{path}");
        let response = self
            .http
            .get(&url)
            .bearer_auth(token)
            .query(query)
            .query(&[("raw_json", "1")])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(RedditError::Api {
                status: status.as_u16(),
                url,
            });
        }
        Ok(response.json().await?)
    }

    async fn search(
        &self,
        subreddits: &str,
        query: &str,
        sort: &str,
        time_filter: &str,
        limit: u32,
    ) -> Result<Vec<PostData>, RedditError> {
        let params = [
            ("q", query.to_string()),
            ("restrict_sr", "1".to_string()),
            ("sort", sort.to_string()),
            ("t", time_filter.to_string()),
            ("limit", limit.clamp(1, MAX_PAGE).to_string()),
        ];
        let listing: Listing<PostData> = self
            .get_json(&format!("/r/{subreddits}/search"), &params)
            .await?;
        Ok(listing.data.children.into_iter().map(|t| t.data).collect())
    }

    async fn url_is_reachable(&self, url: &str) -> bool {
        match self
            .http
            .head(url)
            .timeout(Duration::from_secs(HEAD_TIMEOUT_SECS))
            .send()
            .await
        {
            Ok(r) => r.status() == StatusCode::OK,
            Err(_) => false,
        }
    }

    // ── listings ───────────────────────────────────────────────────────────

    /// Image posts from one subreddit listing. Over-fetches ×2 to make up for
    /// stickied posts and non-image links.
    pub async fn fetch_memes(
        &self,
        subreddit: &str,
        category: Category,
        limit: usize,
    ) -> Result<Vec<RedditPost>, RedditError> {
        info!("Fetching up to {} memes from r/{} ({})", limit, subreddit, category);

        let fetch = page_size(limit, 2);
        let listing: Listing<PostData> = self
            .get_json(
                &format!("/r/{subreddit}/{}", category.as_str()),
                &[("limit", fetch.to_string())],
            )
            .await?;

        let mut results = Vec::new();
        for post in listing.data.children.into_iter().map(|t| t.data) {
            if results.len() >= limit {
                break;
            }
            if post.stickied {
                continue;
            }
            let Some(post) = post.into_post().filter(|p| is_image_url(&p.url)) else {
                continue;
            };
            if self.validate_urls && !self.url_is_reachable(&post.url).await {
                debug!("Skipping unreachable image {}", post.url);
                continue;
            }
            results.push(post);
        }

        info!("Found {} memes in r/{}", results.len(), subreddit);
        Ok(results)
    }

    /// Keyword search across the configured meme subreddits.
    pub async fn search_memes(
        &self,
        keyword: &str,
        limit: usize,
    ) -> Result<Vec<RedditPost>, RedditError> {
        info!("Searching for '{}' in meme subreddits", keyword);
        let subreddits = self.meme_subreddits.join("+");
        let posts = self
            .search(
                &subreddits,
                &format!("{keyword} {IMAGE_HOSTS_QUERY}"),
                "relevance",
                "month",
                page_size(limit, 2),
            )
            .await?;

        let mut results = Vec::new();
        absorb_posts(posts, &mut results, &mut HashSet::new(), limit);
        info!("Found {} memes for keyword '{}'", results.len(), keyword);
        Ok(results)
    }

    /// Meme subreddits ordered by subscriber count. Falls back to the
    /// configured list when the search endpoint fails.
    pub async fn trending_meme_subreddits(
        &self,
        limit: usize,
    ) -> Result<Vec<SubredditInfo>, RedditError> {
        let fetched: Result<Listing<SubredditData>, RedditError> = self
            .get_json(
                "/subreddits/search",
                &[
                    ("q", "memes".to_string()),
                    ("limit", page_size(limit, 1).to_string()),
                ],
            )
            .await;

        let listing = match fetched {
            Ok(listing) => listing,
            Err(RedditError::Api { status, .. }) => {
                warn!("Subreddit search failed with status {}, using defaults", status);
                return Ok(self
                    .meme_subreddits
                    .iter()
                    .take(limit)
                    .map(|name| SubredditInfo {
                        name: name.clone(),
                        description: String::new(),
                        subscribers: 0,
                    })
                    .collect());
            }
            Err(e) => return Err(e),
        };

        let mut subs: Vec<SubredditInfo> = listing
            .data
            .children
            .into_iter()
            .map(|t| SubredditInfo {
                name: t.data.display_name,
                description: truncate_description(&t.data.public_description),
                subscribers: t.data.subscribers.unwrap_or(0),
            })
            .collect();
        subs.sort_by(|a, b| b.subscribers.cmp(&a.subscribers));
        subs.truncate(limit);
        Ok(subs)
    }

    // ── themed searches ────────────────────────────────────────────────────

    /// Band pictures: the band's own subreddit, then music subreddits, then
    /// r/all. Falls back to guitar memes when every strategy comes up empty.
    pub async fn search_band_images(
        &self,
        band: &str,
        limit: usize,
    ) -> Result<Vec<RedditPost>, RedditError> {
        let mut results = Vec::new();
        let mut seen = HashSet::new();
        let quoted = format!("\"{band}\" {IMAGE_HOSTS_QUERY}");
        let mut music: Vec<String> = MUSIC_SUBREDDITS.iter().map(|s| s.to_string()).collect();

        if let Some(own) = self.band_subreddit(band).await {
            info!("Found dedicated subreddit for {}: r/{}", band, own);
            let posts = self
                .search(&own, IMAGE_HOSTS_QUERY, "hot", "all", page_size(limit, 2))
                .await?;
            absorb_posts(posts, &mut results, &mut seen, limit);
            music.insert(0, own);
        }

        if results.len() < limit {
            let posts = self
                .search(&music.join("+"), &quoted, "relevance", "all", page_size(limit, 3))
                .await?;
            absorb_posts(posts, &mut results, &mut seen, limit);
        }

        if results.len() < limit {
            let want = page_size(limit - results.len(), 3);
            let posts = self.search("all", &quoted, "relevance", "all", want).await?;
            absorb_posts(posts, &mut results, &mut seen, limit);
        }

        if results.is_empty() {
            info!("No band-specific images found for {}, falling back to guitar images", band);
            return self.search_guitar_memes("guitar", limit).await;
        }

        info!("Found {} images for band '{}'", results.len(), band);
        Ok(results)
    }

    /// Genre pictures: the genre's subreddits with its search terms, then
    /// r/all, then general music memes. Guitar memes if all of that is empty.
    pub async fn search_genre_images(
        &self,
        genre: Genre,
        limit: usize,
    ) -> Result<Vec<RedditPost>, RedditError> {
        let personality = genre.personality();
        let name = genre.display_name();
        let mut results = Vec::new();
        let mut seen = HashSet::new();

        let subreddits: Vec<&str> = personality
            .subreddits
            .iter()
            .chain(GENERAL_MUSIC_SUBREDDITS)
            .copied()
            .collect();
        let subreddits = subreddits.join("+");

        for term in &personality.search_terms {
            if results.len() >= limit {
                break;
            }
            let query = format!("{term} {IMAGE_HOSTS_QUERY}");
            let posts = self
                .search(&subreddits, &query, "relevance", "all", page_size(limit, 2))
                .await?;
            absorb_posts(posts, &mut results, &mut seen, limit);
        }

        if results.len() < limit {
            let want = page_size(limit - results.len(), 3);
            let query = format!("{name} music {IMAGE_HOSTS_QUERY}");
            let posts = self.search("all", &query, "relevance", "all", want).await?;
            absorb_posts(posts, &mut results, &mut seen, limit);
        }

        if results.len() < limit {
            info!(
                "Found only {} images for genre '{}', adding general music memes",
                results.len(),
                name
            );
            let want = page_size(limit - results.len(), 2);
            let query = format!("music meme {IMAGE_HOSTS_QUERY}");
            let posts = self.search("all", &query, "relevance", "all", want).await?;
            absorb_posts(posts, &mut results, &mut seen, limit);
        }

        if results.is_empty() {
            return self.search_guitar_memes("guitar", limit).await;
        }

        info!("Found {} images for genre '{}'", results.len(), name);
        Ok(results)
    }

    /// Guitar memes from the configured guitar subreddits, topped up with
    /// gear-related searches across r/all.
    pub async fn search_guitar_memes(
        &self,
        keyword: &str,
        limit: usize,
    ) -> Result<Vec<RedditPost>, RedditError> {
        let mut results = Vec::new();
        let mut seen = HashSet::new();
        let query = format!("{keyword} {IMAGE_HOSTS_QUERY}");

        if !self.guitar_subreddits.is_empty() {
            let posts = self
                .search(
                    &self.guitar_subreddits.join("+"),
                    &query,
                    "relevance",
                    "year",
                    page_size(limit, 3),
                )
                .await?;
            absorb_posts(posts, &mut results, &mut seen, limit);
        }

        for term in GUITAR_BROADER_TERMS {
            if results.len() >= limit {
                break;
            }
            let want = page_size(limit - results.len(), 2);
            let query = format!("{term} {keyword} {IMAGE_HOSTS_QUERY}");
            let posts = self.search("all", &query, "relevance", "year", want).await?;
            absorb_posts(posts, &mut results, &mut seen, limit);
        }

        info!("Found {} guitar memes for keyword '{}'", results.len(), keyword);
        Ok(results)
    }

    /// Checks whether r/<band name without spaces> exists.
    async fn band_subreddit(&self, band: &str) -> Option<String> {
        let candidate = subreddit_name_for(band)?;
        match self
            .get_json::<AboutSubreddit>(&format!("/r/{candidate}/about"), &[])
            .await
        {
            Ok(about) if about.kind == "t5" => Some(about.data.display_name),
            Ok(_) => None,
            Err(e) => {
                debug!("No dedicated subreddit for {}: {}", band, e);
                None
            }
        }
    }
}

/// Appends image posts not yet seen, stopping once `results` reaches `limit`.
/// Listing size for `wanted` results over-fetched by `factor`, within what
/// Reddit serves in one page.
fn page_size(wanted: usize, factor: u32) -> u32 {
    u32::try_from(wanted)
        .unwrap_or(u32::MAX)
        .saturating_mul(factor)
        .clamp(1, MAX_PAGE)
}

pub(crate) fn absorb_posts(
    posts: Vec<PostData>,
    results: &mut Vec<RedditPost>,
    seen: &mut HashSet<String>,
    limit: usize,
) {
    for post in posts {
        if results.len() >= limit {
            return;
        }
        if post.stickied || seen.contains(&post.id) {
            continue;
        }
        if let Some(post) = post.into_post().filter(|p| is_image_url(&p.url)) {
            seen.insert(post.id.clone());
            results.push(post);
        }
    }
}

/// Subreddit names are 3–21 characters of letters, digits and underscores.
fn subreddit_name_for(band: &str) -> Option<String> {
    let name: String = band.chars().filter(|c| !c.is_whitespace()).collect();
    let valid = (3..=21).contains(&name.len())
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
    valid.then(|| name.to_ascii_lowercase())
}

fn truncate_description(description: &str) -> String {
    const MAX: usize = 100;
    if description.chars().count() > MAX {
        let head: String = description.chars().take(MAX).collect();
        format!("{head}...")
    } else {
        description.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn post(id: &str, url: Option<&str>, stickied: bool) -> PostData {
        PostData {
            id: id.to_string(),
            title: format!("post {id}"),
            url: url.map(str::to_string),
            score: 1,
            subreddit: "memes".to_string(),
            stickied,
        }
    }

    #[test]
    fn test_absorb_keeps_images_only() {
        let posts = vec![
            post("a", Some("https://i.redd.it/a.jpg"), false),
            post("b", Some("https://v.redd.it/b"), false),
            post("c", None, false),
            post("d", Some("https://i.imgur.com/d.png"), false),
        ];
        let mut results = Vec::new();
        absorb_posts(posts, &mut results, &mut HashSet::new(), 10);
        let ids: Vec<&str> = results.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "d"]);
    }

    #[test]
    fn test_absorb_skips_stickied_and_duplicates() {
        let mut results = Vec::new();
        let mut seen = HashSet::new();
        absorb_posts(
            vec![post("a", Some("https://i.redd.it/a.jpg"), false)],
            &mut results,
            &mut seen,
            10,
        );
        absorb_posts(
            vec![
                post("a", Some("https://i.redd.it/a.jpg"), false),
                post("s", Some("https://i.redd.it/s.jpg"), true),
                post("b", Some("https://i.redd.it/b.gif"), false),
            ],
            &mut results,
            &mut seen,
            10,
        );
        let ids: Vec<&str> = results.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"], "duplicates and stickied posts must be skipped");
    }

    #[test]
    fn test_absorb_stops_at_limit() {
        let posts = (0..5)
            .map(|i| post(&i.to_string(), Some("https://i.redd.it/x.jpg"), false))
            .collect();
        let mut results = Vec::new();
        absorb_posts(posts, &mut results, &mut HashSet::new(), 3);
        assert_eq!(results.len(), 3);
    }

    #[test]
    fn test_page_size_saturates_and_clamps() {
        assert_eq!(page_size(0, 2), 1);
        assert_eq!(page_size(10, 3), 30);
        assert_eq!(page_size(40, 3), MAX_PAGE);
        assert_eq!(page_size(usize::MAX, 3), MAX_PAGE);
        assert_eq!(page_size((u32::MAX as usize).saturating_add(5), 2), MAX_PAGE, "must not wrap to a small page");
    }

    #[test]
    fn test_subreddit_name_for_band() {
        assert_eq!(subreddit_name_for("Iron Maiden").as_deref(), Some("ironmaiden"));
        assert_eq!(subreddit_name_for("AC/DC"), None);
        assert_eq!(subreddit_name_for("U2"), None, "too short for a subreddit");
    }

    #[test]
    fn test_truncate_description() {
        assert_eq!(truncate_description("short"), "short");
        let long = "x".repeat(150);
        let t = truncate_description(&long);
        assert_eq!(t.len(), 103);
        assert!(t.ends_with("..."));
    }

    #[test]
    fn test_token_freshness_respects_slack() {
        let now = Utc::now();
        let token = AccessToken {
            value: "t".to_string(),
            expires_at: now + chrono::Duration::seconds(30),
        };
        assert!(!token.is_fresh(now), "token inside the slack window must refresh");
        let token = AccessToken {
            value: "t".to_string(),
            expires_at: now + chrono::Duration::seconds(3600),
        };
        assert!(token.is_fresh(now));
    }

    #[test]
    fn test_new_without_credentials_is_not_configured() {
        let creds = RedditSettings {
            client_id: String::new(),
            client_secret: String::new(),
            user_agent: "test".to_string(),
        };
        let err = RedditClient::new(creds, vec![], vec![]).err().unwrap();
        assert!(matches!(err, RedditError::NotConfigured));
    }
}
