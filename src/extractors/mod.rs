use async_trait::async_trait;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::OnceLock;

pub mod timedtext;
pub mod title;
pub mod youtube;
pub mod ytdlp;

use crate::cli::Backend;
use crate::config::Config;
use crate::transcript::normalize::RawSegment;
use crate::Result;

/// One selectable transcript variant of a video
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscriptTrack {
    /// Short language code, e.g. "en" or "pt-BR"
    pub language_code: String,

    /// Display name of the language, empty when the provider gives none
    pub language: String,

    /// True when the track was machine-produced
    pub is_generated: bool,

    /// Where the provider fetches the caption payload from
    pub base_url: String,
}

impl TranscriptTrack {
    pub fn new(language_code: impl Into<String>, is_generated: bool) -> Self {
        Self {
            language_code: language_code.into(),
            language: String::new(),
            is_generated,
            base_url: String::new(),
        }
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

/// Every track a provider reports for one video, in provider order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscriptCatalog {
    pub video_id: String,
    tracks: Vec<TranscriptTrack>,
}

impl TranscriptCatalog {
    pub fn new(video_id: impl Into<String>, tracks: Vec<TranscriptTrack>) -> Self {
        Self {
            video_id: video_id.into(),
            tracks,
        }
    }

    pub fn tracks(&self) -> &[TranscriptTrack] {
        &self.tracks
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    /// Deduplicated, sorted language codes regardless of manual/generated status
    pub fn available_languages(&self) -> Vec<String> {
        Self::sorted_codes(self.tracks.iter())
    }

    /// Sorted codes of human-authored tracks
    pub fn manual_languages(&self) -> Vec<String> {
        Self::sorted_codes(self.tracks.iter().filter(|t| !t.is_generated))
    }

    /// Sorted codes of machine-produced tracks
    pub fn generated_languages(&self) -> Vec<String> {
        Self::sorted_codes(self.tracks.iter().filter(|t| t.is_generated))
    }

    /// Find a track for the first code that has one.
    ///
    /// For each code a manual track wins over a generated one.
    pub fn find(&self, codes: &[String]) -> Option<&TranscriptTrack> {
        codes.iter().find_map(|code| {
            let matching: Vec<&TranscriptTrack> = self
                .tracks
                .iter()
                .filter(|t| &t.language_code == code)
                .collect();
            matching
                .iter()
                .find(|t| !t.is_generated)
                .or_else(|| matching.first())
                .copied()
        })
    }

    fn sorted_codes<'a>(tracks: impl Iterator<Item = &'a TranscriptTrack>) -> Vec<String> {
        tracks
            .map(|t| t.language_code.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}

/// Source of transcript catalogs and caption payloads
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TranscriptProvider: Send + Sync {
    /// List the transcript tracks available for a video.
    ///
    /// Fails with [`crate::TranscriptError::TranscriptsUnavailable`] when captions are
    /// disabled or the video has none.
    async fn list_transcripts(&self, video_id: &str) -> Result<TranscriptCatalog>;

    /// Fetch the raw caption records of one track, in chronological order
    async fn fetch_segments(&self, track: &TranscriptTrack) -> Result<Vec<RawSegment>>;

    /// Get the name of this backend
    fn backend_name(&self) -> &'static str;
}

/// Build the provider for the configured backend
pub fn provider_for(backend: Backend, config: &Config) -> Result<Box<dyn TranscriptProvider>> {
    let provider: Box<dyn TranscriptProvider> = match backend {
        Backend::Web => Box::new(youtube::YoutubeTranscriptProvider::from_config(config)?),
        Backend::YtDlp => Box::new(ytdlp::YtDlpTranscriptProvider::from_config(config)?),
    };
    tracing::debug!("Using {} transcript backend", provider.backend_name());
    Ok(provider)
}

fn video_id_patterns() -> &'static [Regex; 3] {
    static PATTERNS: OnceLock<[Regex; 3]> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        [
            Regex::new(r"(?:v=|/)([0-9A-Za-z_-]{11})(?:[\?&].*)?").expect("valid regex"),
            Regex::new(r"youtu\.be/([0-9A-Za-z_-]{11})").expect("valid regex"),
            Regex::new(r"youtube\.com/embed/([0-9A-Za-z_-]{11})").expect("valid regex"),
        ]
    })
}

/// Extract the 11-character video ID from a YouTube URL.
///
/// Patterns are tried in a fixed order (`v=` or a path segment, then `youtu.be/`,
/// then `/embed/`) and the first match wins.
pub fn extract_video_id(url: &str) -> Option<String> {
    if url.is_empty() {
        return None;
    }

    video_id_patterns().iter().find_map(|pattern| {
        pattern
            .captures(url)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str())
            .filter(|id| id.len() == 11)
            .map(str::to_string)
    })
}

/// Canonical watch page for a video ID
pub fn watch_url(video_id: &str) -> String {
    format!("https://www.youtube.com/watch?v={}", video_id)
}
