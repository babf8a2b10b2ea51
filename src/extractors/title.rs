use anyhow::Context;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use super::watch_url;
use crate::config::Config;
use crate::Result;

const TITLE_SUFFIX: &str = " - YouTube";

/// Best-effort lookup of a video's display title
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TitleLookup: Send + Sync {
    /// Resolve the title, or `None` on any failure
    async fn resolve(&self, video_id: &str) -> Option<String>;
}

#[derive(Debug, Deserialize)]
struct OEmbed {
    title: Option<String>,
}

/// Title resolver backed by the oEmbed endpoint with a `<title>` scrape fallback
pub struct TitleResolver {
    client: Client,
    base_url: String,
}

impl TitleResolver {
    pub fn new(timeout: Duration, user_agent: &str, accept_language: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .default_headers(super::youtube::language_headers(accept_language)?)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            base_url: "https://www.youtube.com".to_string(),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(
            config.http_timeout(),
            &config.http.user_agent,
            &config.http.accept_language,
        )
    }

    async fn from_oembed(&self, video_id: &str) -> Result<Option<String>> {
        let url = format!(
            "{}/oembed?url={}&format=json",
            self.base_url,
            urlencoding::encode(&watch_url(video_id))
        );
        let response = self.client.get(&url).send().await?;
        if !response.status().is_success() {
            anyhow::bail!("oEmbed returned HTTP {}", response.status());
        }

        let body: OEmbed = response.json().await.context("Invalid oEmbed response")?;
        Ok(body.title)
    }

    async fn from_watch_page(&self, video_id: &str) -> Result<Option<String>> {
        let url = format!("{}/watch?v={}", self.base_url, video_id);
        let response = self.client.get(&url).send().await?;
        if !response.status().is_success() {
            anyhow::bail!("Watch page returned HTTP {}", response.status());
        }

        let html = response.text().await?;
        Ok(title_from_html(&html))
    }
}

#[async_trait]
impl TitleLookup for TitleResolver {
    async fn resolve(&self, video_id: &str) -> Option<String> {
        if video_id.is_empty() {
            return None;
        }

        match self.from_oembed(video_id).await {
            Ok(Some(title)) => return Some(title),
            Ok(None) => tracing::debug!("oEmbed response for {} has no title", video_id),
            Err(e) => tracing::debug!("oEmbed lookup failed for {}: {:#}", video_id, e),
        }

        match self.from_watch_page(video_id).await {
            Ok(title) => title,
            Err(e) => {
                tracing::debug!("Fallback title scraping failed for {}: {:#}", video_id, e);
                None
            }
        }
    }
}

/// Read the page `<title>`, dropping the site suffix
pub fn title_from_html(html: &str) -> Option<String> {
    let document = scraper::Html::parse_document(html);
    let selector = scraper::Selector::parse("title").ok()?;
    let element = document.select(&selector).next()?;

    let title = element.text().collect::<String>();
    let title = title.trim();
    Some(title.strip_suffix(TITLE_SUFFIX).unwrap_or(title).to_string())
}
