use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::cli::{Backend, RenderMode};
use crate::config::Config;
use crate::extractors::title::{TitleLookup, TitleResolver};
use crate::extractors::{self, extract_video_id, TranscriptProvider};
use crate::output::markdown;
use crate::{Result, TranscriptError, FALLBACK_TITLE};

pub mod normalize;
pub mod selection;

use normalize::normalize_segment;
use selection::select_track;

/// Individual transcript segment with timing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptSegment {
    start: f64,
    duration: f64,
    text: String,
}

impl TranscriptSegment {
    /// Negative or non-finite timings are stored as zero.
    pub fn new(start: f64, duration: f64, text: impl Into<String>) -> Self {
        Self {
            start: non_negative(start),
            duration: non_negative(duration),
            text: text.into(),
        }
    }

    /// Offset from the start of the video, in seconds
    pub fn start(&self) -> f64 {
        self.start
    }

    /// Length of the caption, in seconds
    pub fn duration(&self) -> f64 {
        self.duration
    }

    /// Raw caption text, possibly spanning several lines
    pub fn text(&self) -> &str {
        &self.text
    }
}

fn non_negative(seconds: f64) -> f64 {
    if seconds.is_finite() && seconds > 0.0 {
        seconds
    } else {
        0.0
    }
}

/// A fetched transcript with its metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptData {
    /// 11-character YouTube video ID
    pub video_id: String,

    /// URL exactly as the user gave it
    pub url: String,

    /// Video title, or the fallback title when lookup failed
    pub title: String,

    /// Language code of the fetched track
    pub language: String,

    /// Segments in the order the provider returned them
    pub segments: Vec<TranscriptSegment>,

    /// Every language the video offers, deduplicated and sorted
    pub available_languages: Vec<String>,

    /// Whether the fetched track was machine-produced, when known
    pub is_generated: Option<bool>,
}

/// Language codes available for a video, split by origin
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LanguageListing {
    pub manual: Vec<String>,
    pub generated: Vec<String>,
}

impl LanguageListing {
    pub fn is_empty(&self) -> bool {
        self.manual.is_empty() && self.generated.is_empty()
    }

    /// Manual codes first, then generated codes not already listed
    pub fn all(&self) -> Vec<String> {
        let mut all = self.manual.clone();
        for code in &self.generated {
            if !all.contains(code) {
                all.push(code.clone());
            }
        }
        all
    }
}

/// Coordinates URL parsing, track selection, title lookup and rendering
pub struct TranscriptPipeline {
    provider: Box<dyn TranscriptProvider>,
    titles: Box<dyn TitleLookup>,
}

impl TranscriptPipeline {
    pub fn new(provider: Box<dyn TranscriptProvider>, titles: Box<dyn TitleLookup>) -> Self {
        Self { provider, titles }
    }

    /// Create a pipeline wired to the given backend
    pub fn from_config(config: &Config, backend: Backend) -> Result<Self> {
        let provider = extractors::provider_for(backend, config)?;
        let titles = TitleResolver::from_config(config).context("Failed to build title resolver")?;
        Ok(Self::new(provider, Box::new(titles)))
    }

    /// Extract the video ID or fail with [`TranscriptError::InvalidUrl`]
    pub fn validate_and_extract_video_id(&self, url: &str) -> std::result::Result<String, TranscriptError> {
        extract_video_id(url).ok_or(TranscriptError::InvalidUrl)
    }

    /// Fetch the transcript for a video URL.
    ///
    /// `language` forces an exact track; without it a manual track is preferred over
    /// a generated one.
    pub async fn fetch_transcript(&self, url: &str, language: Option<&str>) -> Result<TranscriptData> {
        let video_id = self.validate_and_extract_video_id(url)?;

        tracing::info!("Listing transcripts for video {}", video_id);
        let catalog = self.provider.list_transcripts(&video_id).await?;
        if catalog.is_empty() {
            return Err(TranscriptError::TranscriptsUnavailable.into());
        }

        let available_languages = catalog.available_languages();
        let selection = select_track(&catalog, &available_languages, language)?;
        let track = selection.track;
        tracing::info!(
            "Selected {} track '{}' ({:?})",
            if track.is_generated { "generated" } else { "manual" },
            track.language_code,
            selection.step
        );

        let raw_segments = match self.provider.fetch_segments(track).await {
            Ok(segments) => segments,
            Err(e) => {
                tracing::error!("Failed to fetch transcript for video {}: {:#}", video_id, e);
                return Err(TranscriptError::FetchFailed(e).into());
            }
        };
        let segments: Vec<TranscriptSegment> = raw_segments.iter().map(normalize_segment).collect();
        tracing::info!("Fetched {} segments", segments.len());

        let title = self
            .titles
            .resolve(&video_id)
            .await
            .filter(|title| !title.trim().is_empty())
            .unwrap_or_else(|| FALLBACK_TITLE.to_string());

        Ok(TranscriptData {
            video_id,
            url: url.to_string(),
            title,
            language: track.language_code.clone(),
            segments,
            available_languages,
            is_generated: Some(track.is_generated),
        })
    }

    /// Fetch a transcript and render it in one go
    pub async fn fetch_and_render(
        &self,
        url: &str,
        language: Option<&str>,
        mode: RenderMode,
    ) -> Result<(TranscriptData, String)> {
        let transcript = self.fetch_transcript(url, language).await?;
        let document = markdown::render(&transcript, mode);
        Ok((transcript, document))
    }

    /// List manual and generated language codes for a video URL
    pub async fn list_languages(&self, url: &str) -> Result<LanguageListing> {
        let video_id = self.validate_and_extract_video_id(url)?;
        let catalog = self.provider.list_transcripts(&video_id).await?;

        Ok(LanguageListing {
            manual: catalog.manual_languages(),
            generated: catalog.generated_languages(),
        })
    }
}
