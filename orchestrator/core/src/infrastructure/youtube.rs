// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

// YouTube Video Source
//
// Metadata comes from the YouTube Data API v3 when a key is available and
// from the `yt-dlp` executable otherwise (or when the API call fails).

use crate::domain::ingestion::{
    extract_video_id, format_video_content, IngestionError, VideoContent, VideoMetadata, VideoOptions, VideoSource,
    VideoSourceKind,
};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use tokio::process::Command;
use tracing::{debug, info, warn};

pub const DEFAULT_YOUTUBE_API_ENDPOINT: &str = "https://www.googleapis.com/youtube/v3";

const CAPTIONS_NOTE: &str = "Captions available via YouTube API (requires OAuth for download)";

#[derive(Deserialize)]
struct VideoListResponse {
    #[serde(default)]
    items: Vec<Value>,
}

/// Map one Data API `videos` item to metadata
pub fn parse_api_video(item: &Value) -> Option<VideoMetadata> {
    let snippet = item.get("snippet")?;
    let text = |v: &Value, key: &str| v.get(key).and_then(Value::as_str).unwrap_or_default().to_string();
    let count = |key: &str| {
        item.get("statistics")
            .and_then(|s| s.get(key))
            .and_then(Value::as_str)
            .and_then(|s| s.parse::<u64>().ok())
    };

    Some(VideoMetadata {
        title: text(snippet, "title"),
        description: text(snippet, "description"),
        uploader: text(snippet, "channelTitle"),
        upload_date: text(snippet, "publishedAt"),
        view_count: count("viewCount").unwrap_or(0),
        like_count: count("likeCount"),
        duration: item
            .get("contentDetails")
            .map(|c| text(c, "duration"))
            .unwrap_or_default(),
        tags: snippet
            .get("tags")
            .and_then(Value::as_array)
            .map(|tags| tags.iter().filter_map(Value::as_str).map(String::from).collect())
            .unwrap_or_default(),
    })
}

/// Map `yt-dlp --dump-json` output to metadata
pub fn parse_ytdlp_info(info: &Value) -> VideoMetadata {
    let text = |key: &str, default: &str| {
        info.get(key)
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .unwrap_or(default)
            .to_string()
    };
    let duration = info
        .get("duration")
        .and_then(Value::as_f64)
        .filter(|d| *d > 0.0)
        .map(|d| format!("{}", d.round() as u64))
        .unwrap_or_default();

    VideoMetadata {
        title: text("title", "Unknown title"),
        description: text("description", ""),
        uploader: text("uploader", "Unknown"),
        upload_date: text("upload_date", "Unknown"),
        view_count: info.get("view_count").and_then(Value::as_u64).unwrap_or(0),
        like_count: info.get("like_count").and_then(Value::as_u64),
        duration,
        tags: info
            .get("tags")
            .and_then(Value::as_array)
            .map(|tags| tags.iter().filter_map(Value::as_str).map(String::from).collect())
            .unwrap_or_default(),
    }
}

/// yt-dlp prints `NA` or an empty map when no subtitles exist
fn meaningful_subtitles(output: &str) -> Option<String> {
    let trimmed = output.trim();
    match trimmed {
        "" | "NA" | "{}" | "None" => None,
        _ => Some(trimmed.to_string()),
    }
}

pub struct YoutubeVideoSource {
    client: reqwest::Client,
    api_endpoint: String,
    ytdlp_path: String,
}

impl YoutubeVideoSource {
    pub fn new(client: reqwest::Client, ytdlp_path: impl Into<String>) -> Self {
        Self {
            client,
            api_endpoint: DEFAULT_YOUTUBE_API_ENDPOINT.to_string(),
            ytdlp_path: ytdlp_path.into(),
        }
    }

    pub fn with_api_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.api_endpoint = endpoint.into();
        self
    }

    async fn fetch_from_api(&self, video_id: &str, api_key: &str) -> Result<(VideoMetadata, Option<String>), String> {
        let base = self.api_endpoint.trim_end_matches('/');
        let videos: VideoListResponse = self
            .client
            .get(format!("{}/videos", base))
            .query(&[("part", "snippet,statistics,contentDetails"), ("id", video_id), ("key", api_key)])
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| e.to_string())?
            .json()
            .await
            .map_err(|e| e.to_string())?;

        let metadata = videos
            .items
            .first()
            .and_then(parse_api_video)
            .ok_or_else(|| format!("video '{}' not found", video_id))?;

        // Caption download needs OAuth; only availability is reported
        let captions = match self
            .client
            .get(format!("{}/captions", base))
            .query(&[("part", "snippet"), ("videoId", video_id), ("key", api_key)])
            .send()
            .await
            .and_then(|r| r.error_for_status())
        {
            Ok(response) => match response.json::<VideoListResponse>().await {
                Ok(list) if !list.items.is_empty() => Some(CAPTIONS_NOTE.to_string()),
                Ok(_) => None,
                Err(e) => {
                    warn!("Failed to decode captions listing: {}", e);
                    None
                }
            },
            Err(e) => {
                warn!("Failed to get captions from YouTube API: {}", e);
                None
            }
        };

        Ok((metadata, captions))
    }

    async fn run_ytdlp(&self, args: &[&str]) -> Result<String, String> {
        let output = Command::new(&self.ytdlp_path)
            .args(args)
            .output()
            .await
            .map_err(|e| format!("failed to run {}: {}", self.ytdlp_path, e))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(format!("{} exited with {}: {}", self.ytdlp_path, output.status, stderr.trim()));
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    async fn fetch_from_ytdlp(&self, url: &str) -> Result<(VideoMetadata, Option<String>), String> {
        let raw = self
            .run_ytdlp(&["--dump-json", "--no-warnings", "--skip-download", url])
            .await?;
        let info: Value = serde_json::from_str(&raw).map_err(|e| format!("invalid yt-dlp output: {}", e))?;
        let metadata = parse_ytdlp_info(&info);

        let transcript = match self
            .run_ytdlp(&[
                url,
                "--write-auto-sub",
                "--write-sub",
                "--sub-lang",
                "en",
                "--sub-format",
                "vtt",
                "--skip-download",
                "--print",
                "%(subtitles)s",
            ])
            .await
        {
            Ok(output) => meaningful_subtitles(&output),
            Err(e) => {
                debug!("yt-dlp subtitle pass failed: {}", e);
                None
            }
        };

        Ok((metadata, transcript))
    }
}

#[async_trait]
impl VideoSource for YoutubeVideoSource {
    async fn process_video(&self, url: &str, options: &VideoOptions) -> Result<VideoContent, IngestionError> {
        let video_id = extract_video_id(url)?;
        info!("Processing YouTube video {}", video_id);

        let mut fetched = None;
        if let Some(key) = options.youtube_api_key.as_deref().filter(|k| !k.trim().is_empty()) {
            match self.fetch_from_api(&video_id, key.trim()).await {
                Ok(result) => fetched = Some((result, VideoSourceKind::YoutubeApi)),
                Err(e) => warn!("YouTube API failed, falling back to yt-dlp: {}", e),
            }
        }

        let ((metadata, transcript), source) = match fetched {
            Some(fetched) => fetched,
            None => {
                let result = self
                    .fetch_from_ytdlp(url)
                    .await
                    .map_err(|e| IngestionError::Video(format!("Both YouTube API and yt-dlp failed: {}", e)))?;
                (result, VideoSourceKind::YtDlp)
            }
        };

        let content = format_video_content(&metadata, transcript.as_deref(), options);

        Ok(VideoContent {
            url: url.to_string(),
            video_id,
            title: metadata.title.clone(),
            length: content.chars().count(),
            content,
            metadata,
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_api_video() {
        let item = json!({
            "snippet": {
                "title": "Talk",
                "description": "About things",
                "channelTitle": "Conf",
                "publishedAt": "2024-01-02T03:04:05Z",
                "tags": ["rust", "async"]
            },
            "statistics": {"viewCount": "12345", "likeCount": "67"},
            "contentDetails": {"duration": "PT1H2M3S"}
        });
        let metadata = parse_api_video(&item).unwrap();
        assert_eq!(metadata.title, "Talk");
        assert_eq!(metadata.uploader, "Conf");
        assert_eq!(metadata.view_count, 12345);
        assert_eq!(metadata.like_count, Some(67));
        assert_eq!(metadata.duration, "PT1H2M3S");
        assert_eq!(metadata.tags, vec!["rust", "async"]);

        assert!(parse_api_video(&json!({"id": "x"})).is_none());
    }

    #[test]
    fn test_parse_ytdlp_info_defaults() {
        let metadata = parse_ytdlp_info(&json!({"title": "Clip", "duration": 212.6, "view_count": 10}));
        assert_eq!(metadata.title, "Clip");
        assert_eq!(metadata.uploader, "Unknown");
        assert_eq!(metadata.upload_date, "Unknown");
        assert_eq!(metadata.duration, "213");
        assert_eq!(metadata.view_count, 10);
        assert_eq!(metadata.like_count, None);

        let metadata = parse_ytdlp_info(&json!({}));
        assert_eq!(metadata.title, "Unknown title");
        assert!(metadata.duration.is_empty());
    }

    #[test]
    fn test_meaningful_subtitles() {
        assert_eq!(meaningful_subtitles("NA\n"), None);
        assert_eq!(meaningful_subtitles("{}"), None);
        assert_eq!(meaningful_subtitles(" WEBVTT\n\nhello ").as_deref(), Some("WEBVTT\n\nhello"));
    }
}
