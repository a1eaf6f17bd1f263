// src/services/image_scraper.rs
// DOCUMENTATION: Key-less image search on public social media endpoints
// PURPOSE: Find candidate gallery images for a location (Reddit, Pinterest, Flickr)

use crate::errors::TravelError;
use chrono::{TimeZone, Utc};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::time::Duration;

const USER_AGENT: &str = "Mozilla/5.0 (compatible; TravelBlogr/1.0)";

/// Photography subreddits searched for images
const SUBREDDITS: [&str; 6] = [
    "itookapicture",
    "travelphotography",
    "earthporn",
    "cityporn",
    "villageporn",
    "architectureporn",
];

const IMAGE_EXTENSIONS: [&str; 5] = [".jpg", ".jpeg", ".png", ".gif", ".webp"];

/// Title words that mark posts which are not landscape photos
const EXCLUDED_TITLE_WORDS: [&str; 5] = ["meme", "funny", "joke", "selfie", "my face"];

pub const DEFAULT_MAX_IMAGES: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Reddit,
    Pinterest,
    Flickr,
}

impl Platform {
    pub const ALL: [Platform; 3] = [Platform::Reddit, Platform::Pinterest, Platform::Flickr];

    pub fn display_name(&self) -> &'static str {
        match self {
            Platform::Reddit => "Reddit",
            Platform::Pinterest => "Pinterest",
            Platform::Flickr => "Flickr",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// One image found on a platform
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScrapedImage {
    pub url: String,
    pub title: Option<String>,
    pub author: Option<String>,
    pub author_url: Option<String>,
    pub platform: Platform,
    #[serde(default)]
    pub score: i64,
    pub timestamp: Option<String>,
    pub source_url: Option<String>,
}

impl ScrapedImage {
    /// Caption with attribution, used when importing into a gallery
    pub fn caption(&self) -> String {
        let title = self.title.as_deref().unwrap_or("").trim();
        let credit = match &self.author {
            Some(author) => format!("Foto: {} via {}", author, self.platform),
            None => format!("via {}", self.platform),
        };

        if title.is_empty() {
            credit
        } else {
            format!("{} ({})", title, credit)
        }
    }
}

/// Merged result of a search
#[derive(Debug, Serialize, Deserialize)]
pub struct ScrapeResult {
    pub query: String,
    pub total_images: usize,
    pub images: Vec<ScrapedImage>,
}

// --- Reddit listing ---

#[derive(Debug, Deserialize)]
struct RedditListing {
    data: RedditListingData,
}

#[derive(Debug, Deserialize)]
struct RedditListingData {
    #[serde(default)]
    children: Vec<RedditChild>,
}

#[derive(Debug, Deserialize)]
struct RedditChild {
    data: RedditPost,
}

#[derive(Debug, Deserialize)]
struct RedditPost {
    #[serde(default)]
    url: String,
    title: Option<String>,
    author: Option<String>,
    #[serde(default)]
    score: i64,
    created_utc: Option<f64>,
    permalink: Option<String>,
}

// --- Flickr public feed ---

#[derive(Debug, Deserialize)]
struct FlickrFeed {
    #[serde(default)]
    items: Vec<FlickrItem>,
}

#[derive(Debug, Deserialize)]
struct FlickrItem {
    title: Option<String>,
    link: Option<String>,
    media: Option<FlickrMedia>,
    published: Option<String>,
    author: Option<String>,
    author_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FlickrMedia {
    m: Option<String>,
}

/// Client for the public search endpoints
/// DOCUMENTATION: No API keys; every platform is queried independently and
/// failures of one platform do not affect the others
pub struct ImageScraper {
    client: Client,
    reddit_base: String,
    pinterest_base: String,
    flickr_base: String,
}

impl ImageScraper {
    pub fn new() -> Result<Self, TravelError> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| TravelError::ExternalApiError(format!("HTTP client: {}", e)))?;

        Ok(Self {
            client,
            reddit_base: "https://www.reddit.com".to_string(),
            pinterest_base: "https://www.pinterest.com".to_string(),
            flickr_base: "https://www.flickr.com".to_string(),
        })
    }

    /// Client against other hosts serving the same endpoints
    pub fn with_base_urls(
        reddit: impl Into<String>,
        pinterest: impl Into<String>,
        flickr: impl Into<String>,
    ) -> Result<Self, TravelError> {
        let mut scraper = Self::new()?;
        scraper.reddit_base = reddit.into();
        scraper.pinterest_base = pinterest.into();
        scraper.flickr_base = flickr.into();
        Ok(scraper)
    }

    /// Search all requested platforms and merge by score (highest first)
    pub async fn scrape(&self, query: &str, max_images: usize, platforms: &[Platform]) -> ScrapeResult {
        let mut images = Vec::new();

        for platform in platforms {
            let result = match platform {
                Platform::Reddit => self.scrape_reddit(query, max_images).await,
                Platform::Pinterest => self.scrape_pinterest(query, max_images).await,
                Platform::Flickr => self.scrape_flickr(query, max_images).await,
            };

            match result {
                Ok(found) => {
                    log::info!("{}: found {} images for '{}'", platform, found.len(), query);
                    images.extend(found);
                }
                Err(e) => log::warn!("{}: search failed for '{}': {}", platform, query, e),
            }
        }

        sort_by_score(&mut images);

        ScrapeResult {
            query: query.to_string(),
            total_images: images.len(),
            images,
        }
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        params: &[(&str, String)],
    ) -> Result<T, TravelError> {
        let response = self
            .client
            .get(url)
            .header("Accept", "application/json")
            .query(params)
            .send()
            .await
            .map_err(|e| {
                log::error!("Request to {} failed: {}", url, e);
                TravelError::ExternalApiError(format!("Request failed: {}", e))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            log::warn!("{} answered with HTTP {}", url, status);
            return Err(TravelError::ExternalApiError(format!("HTTP {}", status)));
        }

        response.json::<T>().await.map_err(|e| {
            log::error!("Failed to parse response from {}: {}", url, e);
            TravelError::ExternalApiError(format!("Parse error: {}", e))
        })
    }

    async fn scrape_reddit(&self, query: &str, max_images: usize) -> Result<Vec<ScrapedImage>, TravelError> {
        let mut images = Vec::new();
        let mut last_error = None;

        for subreddit in SUBREDDITS {
            if images.len() >= max_images {
                break;
            }

            let url = format!("{}/r/{}/search.json", self.reddit_base, subreddit);
            let params = [
                ("q", query.to_string()),
                ("restrict_sr", "1".to_string()),
                ("sort", "top".to_string()),
                ("limit", "25".to_string()),
            ];

            log::debug!("Searching r/{} for '{}'", subreddit, query);

            match self.get_json::<RedditListing>(&url, &params).await {
                Ok(listing) => {
                    let remaining = max_images - images.len();
                    images.extend(parse_reddit_listing(listing).into_iter().take(remaining));
                }
                Err(e) => {
                    log::warn!("r/{}: {}", subreddit, e);
                    last_error = Some(e);
                }
            }
        }

        match (images.is_empty(), last_error) {
            (true, Some(e)) => Err(e),
            _ => Ok(images),
        }
    }

    async fn scrape_pinterest(&self, query: &str, max_images: usize) -> Result<Vec<ScrapedImage>, TravelError> {
        let url = format!("{}/resource/BaseSearchResource/get/", self.pinterest_base);
        let data = serde_json::json!({
            "options": { "query": query, "scope": "pins" },
            "context": {}
        });
        let params = [
            ("source_url", format!("/search/pins/?q={}", query)),
            ("data", data.to_string()),
        ];

        let body: Value = self.get_json(&url, &params).await?;
        Ok(parse_pinterest_response(&body, max_images))
    }

    async fn scrape_flickr(&self, query: &str, max_images: usize) -> Result<Vec<ScrapedImage>, TravelError> {
        let url = format!("{}/services/feeds/photos_public.gne", self.flickr_base);
        let params = [
            ("tags", query.to_string()),
            ("format", "json".to_string()),
            ("nojsoncallback", "1".to_string()),
        ];

        let feed: FlickrFeed = self.get_json(&url, &params).await?;
        Ok(parse_flickr_feed(feed, max_images))
    }
}

/// Stable sort, highest score first
fn sort_by_score(images: &mut [ScrapedImage]) {
    images.sort_by(|a, b| b.score.cmp(&a.score));
}

fn is_image_url(url: &str) -> bool {
    let lower = url.to_ascii_lowercase();
    IMAGE_EXTENSIONS.iter().any(|ext| lower.ends_with(ext))
        || lower.contains("i.redd.it")
        || lower.contains("i.imgur.com")
}

fn has_excluded_title(title: &str) -> bool {
    let lower = title.to_lowercase();
    EXCLUDED_TITLE_WORDS.iter().any(|word| lower.contains(word))
}

fn parse_reddit_listing(listing: RedditListing) -> Vec<ScrapedImage> {
    listing
        .data
        .children
        .into_iter()
        .map(|child| child.data)
        .filter(|post| is_image_url(&post.url))
        .filter(|post| !post.title.as_deref().map(has_excluded_title).unwrap_or(false))
        .map(|post| ScrapedImage {
            author_url: post.author.as_ref().map(|a| format!("https://reddit.com/u/{}", a)),
            timestamp: post
                .created_utc
                .and_then(|secs| Utc.timestamp_opt(secs as i64, 0).single())
                .map(|t| t.to_rfc3339()),
            source_url: post.permalink.as_ref().map(|p| format!("https://reddit.com{}", p)),
            url: post.url,
            title: post.title,
            author: post.author,
            platform: Platform::Reddit,
            score: post.score,
        })
        .collect()
}

fn parse_pinterest_response(body: &Value, max_images: usize) -> Vec<ScrapedImage> {
    let pins = body
        .pointer("/resource_response/data/results")
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default();

    pins.iter()
        .take(max_images)
        .filter_map(|pin| {
            let image_url = ["orig", "736x", "564x"]
                .iter()
                .find_map(|size| pin.pointer(&format!("/images/{}/url", size)).and_then(Value::as_str))?;

            let title = pin
                .get("title")
                .and_then(Value::as_str)
                .filter(|t| !t.is_empty())
                .or_else(|| pin.get("grid_title").and_then(Value::as_str))
                .map(str::to_string);

            let id = pin
                .get("id")
                .map(|id| id.as_str().map(str::to_string).unwrap_or_else(|| id.to_string()));

            Some(ScrapedImage {
                url: image_url.to_string(),
                title,
                author: pin.pointer("/pinner/username").and_then(Value::as_str).map(str::to_string),
                author_url: pin.pointer("/pinner/profile_url").and_then(Value::as_str).map(str::to_string),
                platform: Platform::Pinterest,
                score: pin
                    .pointer("/aggregated_pin_data/aggregated_stats/saves")
                    .and_then(Value::as_i64)
                    .unwrap_or(0),
                timestamp: None,
                source_url: id.map(|id| format!("https://www.pinterest.com/pin/{}/", id)),
            })
        })
        .collect()
}

/// Extract "name" from Flickr's "nobody@flickr.com (name)" author field
fn flickr_author(raw: &str) -> String {
    raw.split_once('(')
        .and_then(|(_, rest)| rest.split_once(')'))
        .map(|(name, _)| name.trim_matches('"').to_string())
        .unwrap_or_else(|| raw.to_string())
}

fn parse_flickr_feed(feed: FlickrFeed, max_images: usize) -> Vec<ScrapedImage> {
    feed.items
        .into_iter()
        .take(max_images)
        .filter_map(|item| {
            // _m is the small rendition, _b the large one
            let url = item.media?.m?.replace("_m.jpg", "_b.jpg");
            if url.is_empty() {
                return None;
            }

            Some(ScrapedImage {
                url,
                title: item.title.filter(|t| !t.trim().is_empty()),
                author: item.author.as_deref().map(flickr_author),
                author_url: item
                    .author_id
                    .map(|id| format!("https://www.flickr.com/people/{}/", id)),
                platform: Platform::Flickr,
                score: 0,
                timestamp: item.published,
                source_url: item.link,
            })
        })
        .collect()
}
