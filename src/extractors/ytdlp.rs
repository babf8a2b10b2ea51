use anyhow::Context;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::process::Stdio;
use tokio::process::Command;

use super::{timedtext, watch_url, TranscriptCatalog, TranscriptProvider, TranscriptTrack};
use crate::config::Config;
use crate::transcript::normalize::RawSegment;
use crate::utils::check_command_available;
use crate::{Result, TranscriptError};

/// Caption format requested from YouTube through the URLs yt-dlp reports
const CAPTION_FORMAT: &str = "json3";

/// YouTube transcript provider using yt-dlp for track discovery
pub struct YtDlpTranscriptProvider {
    yt_dlp_path: String,
    client: Client,
}

#[derive(Debug, Deserialize)]
struct VideoInfo {
    #[serde(default)]
    subtitles: BTreeMap<String, Vec<CaptionFormat>>,
    #[serde(default)]
    automatic_captions: BTreeMap<String, Vec<CaptionFormat>>,
}

#[derive(Debug, Deserialize)]
struct CaptionFormat {
    ext: String,
    url: String,
    name: Option<String>,
}

/// Build tracks from yt-dlp's `subtitles` (manual) and `automatic_captions` maps.
///
/// Machine translations (`tlang=` URLs) and live chat replays are not transcripts
/// of the video and are left out.
fn tracks_from_info(info: VideoInfo) -> Vec<TranscriptTrack> {
    let manual = info.subtitles.into_iter().map(|entry| (entry, false));
    let generated = info.automatic_captions.into_iter().map(|entry| (entry, true));

    manual
        .chain(generated)
        .filter(|((code, _), _)| code != "live_chat")
        .filter_map(|((code, formats), is_generated)| {
            let format = formats
                .into_iter()
                .find(|f| f.ext == CAPTION_FORMAT && !f.url.contains("tlang="))?;
            Some(
                TranscriptTrack::new(code, is_generated)
                    .with_language(format.name.unwrap_or_default())
                    .with_base_url(format.url),
            )
        })
        .collect()
}

impl YtDlpTranscriptProvider {
    pub fn new(yt_dlp_path: impl Into<String>, client: Client) -> Self {
        Self {
            yt_dlp_path: yt_dlp_path.into(),
            client,
        }
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.http_timeout())
            .user_agent(config.http.user_agent.as_str())
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self::new(config.provider.yt_dlp_path.clone(), client))
    }

    /// Check if yt-dlp is available
    pub async fn check_availability(&self) -> bool {
        check_command_available(&self.yt_dlp_path).await
    }

    /// Get video information using yt-dlp
    async fn get_video_info(&self, video_id: &str) -> Result<VideoInfo> {
        let url = watch_url(video_id);
        tracing::debug!("Extracting caption info for: {}", url);

        let output = Command::new(&self.yt_dlp_path)
            .args(["--dump-json", "--skip-download", "--no-playlist", "--no-warnings", url.as_str()])
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .with_context(|| format!("Failed to run {}", self.yt_dlp_path))?;

        if !output.status.success() {
            let error = String::from_utf8_lossy(&output.stderr);
            anyhow::bail!("yt-dlp failed: {}", error.trim());
        }

        serde_json::from_slice(&output.stdout).context("Failed to parse yt-dlp output")
    }
}

#[async_trait]
impl TranscriptProvider for YtDlpTranscriptProvider {
    async fn list_transcripts(&self, video_id: &str) -> Result<TranscriptCatalog> {
        if !self.check_availability().await {
            anyhow::bail!("yt-dlp is not available. Please install it: https://github.com/yt-dlp/yt-dlp");
        }

        let info = self.get_video_info(video_id).await?;
        let tracks = tracks_from_info(info);
        if tracks.is_empty() {
            return Err(TranscriptError::TranscriptsUnavailable.into());
        }

        Ok(TranscriptCatalog::new(video_id, tracks))
    }

    async fn fetch_segments(&self, track: &TranscriptTrack) -> Result<Vec<RawSegment>> {
        let response = self.client.get(&track.base_url).send().await?;
        if !response.status().is_success() {
            anyhow::bail!("Failed to download captions: HTTP {}", response.status());
        }

        let body = response.text().await?;
        timedtext::parse_json3(&body)
    }

    fn backend_name(&self) -> &'static str {
        "yt-dlp"
    }
}
