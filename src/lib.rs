//! ytscribe - Download YouTube transcripts as Markdown documents
//!
//! This library fetches the caption catalog of a video, picks a track (an explicit
//! language, else a human-authored one, else anything available), normalizes the
//! caption segments and renders them as Markdown. The CLI and the interactive
//! [`session::FetchSession`] are thin front ends over [`TranscriptPipeline`].

pub mod cli;
pub mod config;
pub mod extractors;
pub mod output;
pub mod session;
pub mod transcript;
pub mod utils;

pub use cli::{Cli, RenderMode};
pub use config::Config;
pub use extractors::{extract_video_id, TranscriptCatalog, TranscriptProvider, TranscriptTrack};
pub use transcript::{TranscriptData, TranscriptPipeline, TranscriptSegment};

/// Result type used throughout the library
pub type Result<T> = anyhow::Result<T>;

/// Title used whenever the real video title cannot be resolved
pub const FALLBACK_TITLE: &str = "Video Transcript";

/// User-facing failures raised by the transcript core.
///
/// Front ends render these as plain messages; anything else reaching them is an
/// unexpected failure.
#[derive(thiserror::Error, Debug)]
pub enum TranscriptError {
    #[error("Could not extract video ID from the provided URL.")]
    InvalidUrl,

    #[error("No transcripts could be found for this video. They may be disabled.")]
    TranscriptsUnavailable,

    #[error("Language '{language}' not found. Available languages: {}", .available.join(", "))]
    LanguageNotAvailable {
        language: String,
        available: Vec<String>,
    },

    #[error("No transcripts available for this video.")]
    NoTranscriptsAvailable,

    /// The detail stays in `source` and the logs, never in the message.
    #[error("An unexpected error occurred while fetching the transcript.")]
    FetchFailed(#[source] anyhow::Error),
}
