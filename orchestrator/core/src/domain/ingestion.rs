// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Ingestion
//!
//! Content acquired from the outside world (web pages, videos) before it is
//! fed to the processing pipeline as plain input text.
//!
//! # Architecture
//!
//! - **Layer:** Domain Layer
//! - **Purpose:** Source contracts, content value objects and video formatting rules

use async_trait::async_trait;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use thiserror::Error;

static VIDEO_ID_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?:youtube\.com/watch\?v=|youtu\.be/|youtube\.com/embed/)([^&\n?#]+)",
        r"youtube\.com/watch\?.*v=([^&\n?#]+)",
    ]
    .iter()
    .filter_map(|pattern| Regex::new(pattern).ok())
    .collect()
});

const MAX_TAGS: usize = 10;

/// Where scraped page text came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentSource {
    /// Jina reader proxy
    Jina,
    /// Direct fetch with local HTML extraction
    Html,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScrapedContent {
    pub url: String,
    pub title: String,
    pub content: String,
    /// Character count of `content`
    pub length: usize,
    pub source: ContentSource,
}

#[derive(Debug, Clone, Default)]
pub struct ScrapeOptions {
    pub jina_api_key: Option<String>,
}

/// Where video metadata came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VideoSourceKind {
    #[serde(rename = "youtube-api")]
    YoutubeApi,
    #[serde(rename = "yt-dlp")]
    YtDlp,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoMetadata {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub uploader: String,
    pub upload_date: String,
    #[serde(default)]
    pub view_count: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub like_count: Option<u64>,
    /// ISO-8601 duration from the Data API, seconds from yt-dlp
    #[serde(default)]
    pub duration: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoContent {
    pub url: String,
    pub video_id: String,
    pub title: String,
    pub content: String,
    pub length: usize,
    pub metadata: VideoMetadata,
    pub source: VideoSourceKind,
}

#[derive(Debug, Clone)]
pub struct VideoOptions {
    pub include_description: bool,
    pub include_transcript: bool,
    pub youtube_api_key: Option<String>,
}

impl Default for VideoOptions {
    fn default() -> Self {
        Self {
            include_description: true,
            include_transcript: true,
            youtube_api_key: None,
        }
    }
}

#[derive(Debug, Error)]
pub enum IngestionError {
    #[error("Invalid YouTube URL")]
    InvalidVideoUrl,

    #[error("Failed to scrape URL: {0}")]
    Scrape(String),

    #[error("Failed to process YouTube video: {0}")]
    Video(String),
}

/// Fetches a web page and reduces it to text
#[async_trait]
pub trait ContentScraper: Send + Sync {
    async fn scrape(&self, url: &str, options: &ScrapeOptions) -> Result<ScrapedContent, IngestionError>;
}

/// Resolves a video URL to metadata and transcript text
#[async_trait]
pub trait VideoSource: Send + Sync {
    async fn process_video(&self, url: &str, options: &VideoOptions) -> Result<VideoContent, IngestionError>;
}

/// Accepts watch pages and short links only
pub fn is_youtube_url(url: &str) -> bool {
    url.contains("youtube.com/watch") || url.contains("youtu.be/")
}

pub fn extract_video_id(url: &str) -> Result<String, IngestionError> {
    VIDEO_ID_PATTERNS
        .iter()
        .find_map(|pattern| pattern.captures(url))
        .and_then(|captures| captures.get(1))
        .map(|m| m.as_str().to_string())
        .ok_or(IngestionError::InvalidVideoUrl)
}

/// `1234567` -> `1,234,567`
pub fn format_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// Render video metadata and transcript into pipeline input text
pub fn format_video_content(metadata: &VideoMetadata, transcript: Option<&str>, options: &VideoOptions) -> String {
    let mut content = format!(
        "Title: {}\nChannel: {}\nUpload Date: {}\nViews: {}\n",
        metadata.title,
        metadata.uploader,
        metadata.upload_date,
        format_thousands(metadata.view_count)
    );

    if let Some(likes) = metadata.like_count.filter(|likes| *likes > 0) {
        content.push_str(&format!("Likes: {}\n", format_thousands(likes)));
    }
    if !metadata.duration.is_empty() && metadata.duration != "0" {
        content.push_str(&format!("Duration: {}\n", metadata.duration));
    }
    if !metadata.tags.is_empty() {
        let tags: Vec<&str> = metadata.tags.iter().take(MAX_TAGS).map(String::as_str).collect();
        content.push_str(&format!("Tags: {}\n", tags.join(", ")));
    }

    content.push('\n');

    if options.include_description && !metadata.description.is_empty() {
        content.push_str(&format!("Description:\n{}\n\n", metadata.description));
    }

    match transcript.map(str::trim).filter(|t| !t.is_empty()) {
        Some(transcript) => content.push_str(&format!("Transcript:\n{}", transcript)),
        None if options.include_transcript => {
            content.push_str("Transcript: Not available for this video\n")
        }
        None => {}
    }

    content
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_video_id() {
        assert_eq!(extract_video_id("https://www.youtube.com/watch?v=dQw4w9WgXcQ").unwrap(), "dQw4w9WgXcQ");
        assert_eq!(extract_video_id("https://youtu.be/dQw4w9WgXcQ?t=42").unwrap(), "dQw4w9WgXcQ");
        assert_eq!(extract_video_id("https://www.youtube.com/embed/abc123").unwrap(), "abc123");
        assert_eq!(
            extract_video_id("https://www.youtube.com/watch?feature=share&v=xyz789&t=1").unwrap(),
            "xyz789"
        );
        assert!(extract_video_id("https://vimeo.com/12345").is_err());
    }

    #[test]
    fn test_is_youtube_url() {
        assert!(is_youtube_url("https://www.youtube.com/watch?v=abc"));
        assert!(is_youtube_url("https://youtu.be/abc"));
        assert!(!is_youtube_url("https://www.youtube.com/embed/abc"));
        assert!(!is_youtube_url("https://example.com"));
    }

    #[test]
    fn test_format_thousands() {
        assert_eq!(format_thousands(0), "0");
        assert_eq!(format_thousands(999), "999");
        assert_eq!(format_thousands(1000), "1,000");
        assert_eq!(format_thousands(1234567), "1,234,567");
    }

    #[test]
    fn test_format_video_content() {
        let metadata = VideoMetadata {
            title: "Rust in 100 Seconds".to_string(),
            description: "A quick tour".to_string(),
            uploader: "Fireship".to_string(),
            upload_date: "2021-09-13".to_string(),
            view_count: 2500000,
            like_count: Some(90000),
            duration: "PT2M25S".to_string(),
            tags: (0..12).map(|i| format!("t{i}")).collect(),
        };

        let content = format_video_content(&metadata, None, &VideoOptions::default());
        assert!(content.starts_with("Title: Rust in 100 Seconds\nChannel: Fireship\n"));
        assert!(content.contains("Views: 2,500,000\n"));
        assert!(content.contains("Likes: 90,000\n"));
        assert!(content.contains("Duration: PT2M25S\n"));
        assert!(content.contains("Tags: t0, t1, t2, t3, t4, t5, t6, t7, t8, t9\n"));
        assert!(content.contains("Description:\nA quick tour\n\n"));
        assert!(content.ends_with("Transcript: Not available for this video\n"));

        let options = VideoOptions {
            include_description: false,
            ..VideoOptions::default()
        };
        let content = format_video_content(&metadata, Some("hello world"), &options);
        assert!(!content.contains("Description:"));
        assert!(content.ends_with("Transcript:\nhello world"));
    }

    #[test]
    fn test_format_video_content_minimal() {
        let metadata = VideoMetadata {
            title: "t".to_string(),
            uploader: "u".to_string(),
            upload_date: "Unknown".to_string(),
            ..VideoMetadata::default()
        };
        let options = VideoOptions {
            include_transcript: false,
            ..VideoOptions::default()
        };
        let content = format_video_content(&metadata, None, &options);
        assert_eq!(content, "Title: t\nChannel: u\nUpload Date: Unknown\nViews: 0\n\n");
    }
}
