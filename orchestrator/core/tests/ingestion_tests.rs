// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Web scraper and YouTube source against mock HTTP backends.

use mockito::{Matcher, Server};
use serde_json::json;
use std::time::Duration;
use unravel_core::domain::ingestion::{
    ContentScraper, ContentSource, IngestionError, ScrapeOptions, VideoOptions, VideoSource, VideoSourceKind,
};
use unravel_core::infrastructure::{WebScraper, YoutubeVideoSource};

const PAGE: &str = "<html><head><title>Release Notes</title></head>\
<body><script>track()</script><h2>Changes</h2><p>Faster   startup.</p></body></html>";

fn client() -> reqwest::Client {
    reqwest::Client::builder().no_proxy().build().unwrap()
}

fn scraper(jina_endpoint: &str) -> WebScraper {
    WebScraper::new(client(), Duration::from_secs(5), Duration::from_secs(5)).with_jina_endpoint(jina_endpoint)
}

#[tokio::test]
async fn test_direct_fetch_extracts_title_and_text() {
    let mut server = Server::new_async().await;
    let page = server
        .mock("GET", "/notes")
        .match_header("user-agent", "Mozilla/5.0 (compatible; Unravel/1.0)")
        .with_status(200)
        .with_header("content-type", "text/html")
        .with_body(PAGE)
        .create_async()
        .await;

    let url = format!("{}/notes", server.url());
    let scraped = scraper("http://127.0.0.1:1")
        .scrape(&url, &ScrapeOptions::default())
        .await
        .unwrap();

    assert_eq!(scraped.title, "Release Notes");
    assert_eq!(scraped.source, ContentSource::Html);
    assert!(scraped.content.contains("Faster startup."));
    assert!(!scraped.content.contains("track()"));
    assert_eq!(scraped.length, scraped.content.chars().count());
    page.assert_async().await;
}

#[tokio::test]
async fn test_jina_reader_used_with_key() {
    let mut server = Server::new_async().await;
    let target = "https://example.com/article";
    let jina = server
        .mock("GET", format!("/{}", target).as_str())
        .match_header("authorization", "Bearer jina-key")
        .with_status(200)
        .with_body("# Article\n\nClean markdown")
        .create_async()
        .await;

    let scraped = scraper(&server.url())
        .scrape(
            target,
            &ScrapeOptions {
                jina_api_key: Some("jina-key".to_string()),
            },
        )
        .await
        .unwrap();

    assert_eq!(scraped.source, ContentSource::Jina);
    assert_eq!(scraped.title, "Jina processed content");
    assert_eq!(scraped.content, "# Article\n\nClean markdown");
    assert_eq!(scraped.url, target);
    jina.assert_async().await;
}

#[tokio::test]
async fn test_jina_failure_falls_back_to_direct_fetch() {
    let mut server = Server::new_async().await;
    let _jina = server
        .mock("GET", Matcher::Regex(r"^/http".to_string()))
        .with_status(500)
        .create_async()
        .await;
    let _page = server
        .mock("GET", "/page")
        .with_status(200)
        .with_body(PAGE)
        .create_async()
        .await;

    let url = format!("{}/page", server.url());
    let scraped = scraper(&server.url())
        .scrape(
            &url,
            &ScrapeOptions {
                jina_api_key: Some("jina-key".to_string()),
            },
        )
        .await
        .unwrap();

    assert_eq!(scraped.source, ContentSource::Html);
    assert_eq!(scraped.title, "Release Notes");
}

#[tokio::test]
async fn test_scrape_errors() {
    let mut server = Server::new_async().await;
    let _missing = server.mock("GET", "/gone").with_status(404).create_async().await;

    let s = scraper("http://127.0.0.1:1");
    let err = s
        .scrape(&format!("{}/gone", server.url()), &ScrapeOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(err, IngestionError::Scrape(_)));

    let err = s.scrape("not a url", &ScrapeOptions::default()).await.unwrap_err();
    assert!(err.to_string().starts_with("Failed to scrape URL"));
}

#[tokio::test]
async fn test_youtube_api_path() {
    let mut server = Server::new_async().await;
    let videos = server
        .mock("GET", "/videos")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("id".into(), "dQw4w9WgXcQ".into()),
            Matcher::UrlEncoded("key".into(), "yt-key".into()),
            Matcher::UrlEncoded("part".into(), "snippet,statistics,contentDetails".into()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({"items": [{
                "snippet": {
                    "title": "Never Gonna",
                    "description": "Classic",
                    "channelTitle": "Rick",
                    "publishedAt": "2009-10-25T06:57:33Z",
                    "tags": ["music"]
                },
                "statistics": {"viewCount": "1500000000", "likeCount": "17000000"},
                "contentDetails": {"duration": "PT3M33S"}
            }]})
            .to_string(),
        )
        .create_async()
        .await;
    let _captions = server
        .mock("GET", "/captions")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(json!({"items": [{"id": "cap1"}]}).to_string())
        .create_async()
        .await;

    let source = YoutubeVideoSource::new(client(), "/nonexistent/yt-dlp").with_api_endpoint(server.url());
    let options = VideoOptions {
        youtube_api_key: Some("yt-key".to_string()),
        ..VideoOptions::default()
    };
    let video = source
        .process_video("https://youtu.be/dQw4w9WgXcQ", &options)
        .await
        .unwrap();

    assert_eq!(video.video_id, "dQw4w9WgXcQ");
    assert_eq!(video.title, "Never Gonna");
    assert_eq!(video.source, VideoSourceKind::YoutubeApi);
    assert_eq!(video.metadata.like_count, Some(17_000_000));
    assert!(video.content.contains("Channel: Rick"));
    assert!(video.content.contains("Views: 1,500,000,000"));
    assert!(video.content.contains("Description:"));
    assert!(video.content.contains("Captions available via YouTube API"));
    videos.assert_async().await;
}

#[tokio::test]
async fn test_youtube_both_paths_failing() {
    let mut server = Server::new_async().await;
    let _videos = server
        .mock("GET", "/videos")
        .match_query(Matcher::Any)
        .with_status(403)
        .create_async()
        .await;

    let source = YoutubeVideoSource::new(client(), "/nonexistent/yt-dlp").with_api_endpoint(server.url());
    let options = VideoOptions {
        youtube_api_key: Some("yt-key".to_string()),
        ..VideoOptions::default()
    };
    let err = source
        .process_video("https://www.youtube.com/watch?v=dQw4w9WgXcQ", &options)
        .await
        .unwrap_err();

    assert!(matches!(err, IngestionError::Video(_)));
    assert!(err.to_string().contains("Both YouTube API and yt-dlp failed"));
}

#[tokio::test]
async fn test_youtube_rejects_url_without_id() {
    let source = YoutubeVideoSource::new(client(), "/nonexistent/yt-dlp");
    let err = source
        .process_video("https://www.youtube.com/feed/trending", &VideoOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(err, IngestionError::InvalidVideoUrl));
}
