// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

// Web Scraper
//
// Turns a URL into LLM-ready text. With a Jina key the Jina reader proxy is
// tried first; otherwise (or on failure) the page is fetched directly and
// reduced to text locally.

use crate::domain::ingestion::{ContentScraper, ContentSource, IngestionError, ScrapeOptions, ScrapedContent};
use async_trait::async_trait;
use regex::Regex;
use std::sync::LazyLock;
use std::time::Duration;
use tracing::{info, warn};

pub const DEFAULT_JINA_ENDPOINT: &str = "https://r.jina.ai";

const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (compatible; Unravel/1.0)";
const JINA_USER_AGENT: &str = "Unravel/1.0";
const JINA_TITLE: &str = "Jina processed content";
const UNTITLED: &str = "No title";

static NON_CONTENT: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(?is)<script\b.*?</script\s*>|<style\b.*?</style\s*>|<head\b.*?</head\s*>").ok());
static TITLE: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"(?is)<title[^>]*>(.*?)</title\s*>").ok());
static WHITESPACE: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"\s+").ok());

/// Text of the first `<title>` element, if non-empty
pub fn extract_title(html: &str) -> Option<String> {
    TITLE
        .as_ref()?
        .captures(html)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|t| !t.is_empty())
}

/// Drop head/script/style, convert to markdown and collapse whitespace
pub fn extract_text(html: &str) -> String {
    let stripped = match NON_CONTENT.as_ref() {
        Some(re) => re.replace_all(html, " ").into_owned(),
        None => html.to_string(),
    };
    let markdown = html2md::parse_html(&stripped);
    match WHITESPACE.as_ref() {
        Some(re) => re.replace_all(&markdown, " ").trim().to_string(),
        None => markdown.trim().to_string(),
    }
}

pub struct WebScraper {
    client: reqwest::Client,
    jina_endpoint: String,
    fetch_timeout: Duration,
    jina_timeout: Duration,
}

impl WebScraper {
    pub fn new(client: reqwest::Client, fetch_timeout: Duration, jina_timeout: Duration) -> Self {
        Self {
            client,
            jina_endpoint: DEFAULT_JINA_ENDPOINT.to_string(),
            fetch_timeout,
            jina_timeout,
        }
    }

    pub fn with_jina_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.jina_endpoint = endpoint.into();
        self
    }

    async fn scrape_with_jina(&self, url: &str, api_key: &str) -> Result<ScrapedContent, IngestionError> {
        let reader_url = format!("{}/{}", self.jina_endpoint.trim_end_matches('/'), url);
        let response = self
            .client
            .get(&reader_url)
            .bearer_auth(api_key)
            .header(reqwest::header::USER_AGENT, JINA_USER_AGENT)
            .timeout(self.jina_timeout)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| IngestionError::Scrape(e.to_string()))?;

        let content = response
            .text()
            .await
            .map_err(|e| IngestionError::Scrape(e.to_string()))?;

        Ok(ScrapedContent {
            url: url.to_string(),
            title: JINA_TITLE.to_string(),
            length: content.chars().count(),
            content,
            source: ContentSource::Jina,
        })
    }

    async fn scrape_html(&self, url: &str) -> Result<ScrapedContent, IngestionError> {
        let response = self
            .client
            .get(url)
            .header(reqwest::header::USER_AGENT, BROWSER_USER_AGENT)
            .timeout(self.fetch_timeout)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| IngestionError::Scrape(e.to_string()))?;

        let html = response
            .text()
            .await
            .map_err(|e| IngestionError::Scrape(e.to_string()))?;

        let title = extract_title(&html).unwrap_or_else(|| UNTITLED.to_string());
        let content = extract_text(&html);

        Ok(ScrapedContent {
            url: url.to_string(),
            title,
            length: content.chars().count(),
            content,
            source: ContentSource::Html,
        })
    }
}

#[async_trait]
impl ContentScraper for WebScraper {
    async fn scrape(&self, url: &str, options: &ScrapeOptions) -> Result<ScrapedContent, IngestionError> {
        url::Url::parse(url).map_err(|e| IngestionError::Scrape(format!("invalid URL '{}': {}", url, e)))?;
        info!("Scraping {}", url);

        if let Some(key) = options.jina_api_key.as_deref().filter(|k| !k.trim().is_empty()) {
            match self.scrape_with_jina(url, key.trim()).await {
                Ok(content) => return Ok(content),
                Err(e) => warn!("Jina scraping failed, falling back to direct fetch: {}", e),
            }
        }

        self.scrape_html(url).await
    }
}
