//! Interactive fetch session.
//!
//! [`FetchSession`] holds the state an interactive front end displays: the
//! inputs, the preview of the last transcript, the status line and the language
//! selector options. Network work runs on spawned tokio tasks and the outcome
//! comes back as a [`SessionEvent`] that the owning loop hands to
//! [`FetchSession::apply`], so state is only ever mutated by the owner.

use anyhow::Result;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::mpsc;

use crate::cli::RenderMode;
use crate::output;
use crate::transcript::{LanguageListing, TranscriptData, TranscriptPipeline};
use crate::utils::{ensure_md_extension, sanitize_filename, word_count};
use crate::TranscriptError;

/// Language selector entry meaning "let the selection policy decide"
pub const AUTO_LANGUAGE_LABEL: &str = "Auto";

/// Filename offered before the user types one
pub const DEFAULT_FILENAME: &str = "youtube_transcript";

const READY: &str = "Ready";

#[derive(thiserror::Error, Debug)]
pub enum SessionError {
    #[error("Another request is still running")]
    Busy,

    #[error("Please enter a YouTube URL")]
    EmptyUrl,

    #[error("Please specify a filename")]
    EmptyFilename,

    #[error("No transcript available. Please fetch transcript first.")]
    NoTranscript,

    #[error(transparent)]
    Transcript(#[from] TranscriptError),
}

/// Outcome of background work, delivered back to the session owner
#[derive(Debug)]
pub enum SessionEvent {
    Fetched {
        generation: u64,
        outcome: std::result::Result<(TranscriptData, String), String>,
    },
    Languages {
        generation: u64,
        url: String,
        notify: bool,
        outcome: std::result::Result<LanguageListing, String>,
    },
}

/// Turn a core failure into the message shown to the user
fn failure_message(err: &anyhow::Error, action: &str) -> String {
    match err.downcast_ref::<TranscriptError>() {
        Some(e) => e.to_string(),
        None => {
            tracing::error!("Unexpected error while {}: {:#}", action, err);
            format!("An unexpected error occurred: {}", err)
        }
    }
}

pub struct FetchSession {
    pipeline: Arc<TranscriptPipeline>,
    mode: RenderMode,
    events_tx: mpsc::UnboundedSender<SessionEvent>,
    events_rx: mpsc::UnboundedReceiver<SessionEvent>,

    url: String,
    filename: String,
    language: String,

    status: String,
    busy: bool,
    generation: u64,
    transcript: Option<TranscriptData>,
    markdown: Option<String>,
    words: Option<usize>,
    language_options: Vec<String>,
    last_language_url: Option<String>,
    last_error: Option<String>,
}

impl FetchSession {
    pub fn new(pipeline: Arc<TranscriptPipeline>, mode: RenderMode) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        Self {
            pipeline,
            mode,
            events_tx,
            events_rx,
            url: String::new(),
            filename: DEFAULT_FILENAME.to_string(),
            language: AUTO_LANGUAGE_LABEL.to_string(),
            status: READY.to_string(),
            busy: false,
            generation: 0,
            transcript: None,
            markdown: None,
            words: None,
            language_options: Vec::new(),
            last_language_url: None,
            last_error: None,
        }
    }

    pub fn set_url(&mut self, url: impl Into<String>) {
        self.url = url.into();
    }

    pub fn set_filename(&mut self, filename: impl Into<String>) {
        self.filename = filename.into();
    }

    pub fn set_language(&mut self, language: impl Into<String>) {
        self.language = language.into();
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    /// True while a fetch or language refresh is outstanding
    pub fn is_busy(&self) -> bool {
        self.busy
    }

    pub fn can_save(&self) -> bool {
        !self.busy && self.markdown.is_some()
    }

    pub fn transcript(&self) -> Option<&TranscriptData> {
        self.transcript.as_ref()
    }

    /// Rendered Markdown of the last successful fetch
    pub fn preview(&self) -> Option<&str> {
        self.markdown.as_deref()
    }

    /// `"{n} words"` for the preview, empty when there is none
    pub fn preview_info(&self) -> String {
        self.words.map(|n| format!("{} words", n)).unwrap_or_default()
    }

    /// Message of the last failed operation, until the next one starts
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Selector entries: the Auto sentinel followed by the known language codes
    pub fn language_options(&self) -> Vec<String> {
        std::iter::once(AUTO_LANGUAGE_LABEL.to_string())
            .chain(self.language_options.iter().cloned())
            .collect()
    }

    /// Language to request, `None` when the selector is on Auto
    pub fn requested_language(&self) -> Option<String> {
        let language = self.language.trim();
        if language.is_empty() || language == AUTO_LANGUAGE_LABEL {
            None
        } else {
            Some(language.to_string())
        }
    }

    fn set_language_options(&mut self, languages: &[String]) {
        let mut unique = languages.to_vec();
        unique.sort();
        unique.dedup();
        self.language_options = unique;

        if self.requested_language().is_some() && !self.language_options.contains(&self.language) {
            self.language = AUTO_LANGUAGE_LABEL.to_string();
        }
    }

    fn begin(&mut self, status: &str) {
        self.busy = true;
        self.last_error = None;
        self.status = status.to_string();
    }

    fn fail(&mut self, message: String) {
        self.status = "Error".to_string();
        self.last_error = Some(message);
    }

    /// Validate the inputs and fetch the transcript on a background task.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start_fetch(&mut self) -> std::result::Result<(), SessionError> {
        if self.busy {
            return Err(SessionError::Busy);
        }
        let url = self.url.trim().to_string();
        if url.is_empty() {
            return Err(SessionError::EmptyUrl);
        }
        self.pipeline.validate_and_extract_video_id(&url)?;

        let language = self.requested_language();
        self.begin("Fetching transcript...");

        let pipeline = Arc::clone(&self.pipeline);
        let events = self.events_tx.clone();
        let generation = self.generation;
        let mode = self.mode;
        tokio::spawn(async move {
            let outcome = pipeline
                .fetch_and_render(&url, language.as_deref(), mode)
                .await
                .map_err(|e| failure_message(&e, "fetching transcript"));
            // The receiver lives as long as the session; a send error means it is gone.
            let _ = events.send(SessionEvent::Fetched { generation, outcome });
        });

        Ok(())
    }

    /// Reload the language selector for the current URL.
    ///
    /// `force` refreshes even when the URL has not changed and reports the result on
    /// the status line. Returns whether a lookup was started.
    pub fn refresh_languages(&mut self, force: bool) -> std::result::Result<bool, SessionError> {
        if self.busy {
            return Err(SessionError::Busy);
        }

        let url = self.url.trim().to_string();
        if url.is_empty() {
            self.set_language_options(&[]);
            self.last_language_url = None;
            if force {
                self.status = READY.to_string();
            }
            return Ok(false);
        }
        if self.pipeline.validate_and_extract_video_id(&url).is_err() {
            self.set_language_options(&[]);
            self.last_language_url = None;
            if force {
                self.status = "Please provide a valid YouTube URL".to_string();
            }
            return Ok(false);
        }
        if !force && self.last_language_url.as_deref() == Some(url.as_str()) {
            return Ok(false);
        }

        self.busy = true;
        if force {
            self.last_error = None;
            self.status = "Checking languages...".to_string();
        }

        let pipeline = Arc::clone(&self.pipeline);
        let events = self.events_tx.clone();
        let generation = self.generation;
        tokio::spawn(async move {
            let outcome = pipeline
                .list_languages(&url)
                .await
                .map_err(|e| failure_message(&e, "listing languages"));
            let _ = events.send(SessionEvent::Languages {
                generation,
                url,
                notify: force,
                outcome,
            });
        });

        Ok(true)
    }

    /// Wait for the next background outcome
    pub async fn next_event(&mut self) -> Option<SessionEvent> {
        self.events_rx.recv().await
    }

    /// Take a background outcome if one is ready, for polling event loops
    pub fn try_next_event(&mut self) -> Option<SessionEvent> {
        self.events_rx.try_recv().ok()
    }

    /// Apply a background outcome to the session state.
    ///
    /// Outcomes of work started before the last [`clear`](Self::clear) only release
    /// the busy flag.
    pub fn apply(&mut self, event: SessionEvent) {
        self.busy = false;

        match event {
            SessionEvent::Fetched { generation, .. } | SessionEvent::Languages { generation, .. }
                if generation != self.generation =>
            {
                tracing::debug!("Discarding result of work started before clear");
            }
            SessionEvent::Fetched { outcome, .. } => match outcome {
                Ok((transcript, markdown)) => {
                    self.status = format!("Transcript fetched in {}", transcript.language);
                    self.words = Some(word_count(&markdown));
                    self.set_language_options(&transcript.available_languages);
                    self.last_language_url = Some(transcript.url.clone());
                    self.markdown = Some(markdown);
                    self.transcript = Some(transcript);
                }
                Err(message) => self.fail(message),
            },
            SessionEvent::Languages {
                url,
                notify,
                outcome,
                ..
            } => match outcome {
                Ok(listing) => {
                    let all = listing.all();
                    self.set_language_options(&all);
                    if self.url.trim() == url {
                        self.last_language_url = Some(url);
                    }

                    if notify {
                        self.status = refresh_summary(&listing);
                    } else if self.language_options.is_empty() {
                        self.status = "No transcripts available for this video".to_string();
                    } else {
                        self.status = format!("Detected {} transcript languages", self.language_options.len());
                    }
                }
                Err(message) if notify => self.fail(message),
                Err(message) => {
                    tracing::debug!("Automatic language lookup failed for {}: {}", url, message);
                    self.status = "Could not load transcript languages automatically".to_string();
                }
            },
        }
    }

    /// Write the last fetched document into `dir` under the current filename.
    ///
    /// `.md` is appended when the filename lacks it. Returns the written path.
    pub fn save(&mut self, dir: &Path) -> Result<PathBuf> {
        let filename = sanitize_filename(&self.filename);
        if filename.is_empty() {
            return Err(SessionError::EmptyFilename.into());
        }
        let markdown = match (&self.markdown, self.busy) {
            (Some(markdown), false) => markdown,
            _ => return Err(SessionError::NoTranscript.into()),
        };

        let target = dir.join(ensure_md_extension(Path::new(&filename)));
        match output::save_to_file(markdown, &target) {
            Ok(path) => {
                self.status = format!("Transcript saved to {}", path.display());
                Ok(path)
            }
            Err(e) => {
                tracing::error!("Failed to save transcript to disk: {:#}", e);
                self.fail(format!("Failed to save file: {}", e));
                Err(e)
            }
        }
    }

    /// Reset inputs, preview and status to their initial values
    pub fn clear(&mut self) {
        self.generation += 1;
        self.url.clear();
        self.filename = DEFAULT_FILENAME.to_string();
        self.language = AUTO_LANGUAGE_LABEL.to_string();
        self.status = READY.to_string();
        self.transcript = None;
        self.markdown = None;
        self.words = None;
        self.language_options.clear();
        self.last_language_url = None;
        self.last_error = None;
    }
}

fn refresh_summary(listing: &LanguageListing) -> String {
    let mut summary = Vec::new();
    if !listing.manual.is_empty() {
        summary.push(format!("{} manual", listing.manual.len()));
    }
    if !listing.generated.is_empty() {
        summary.push(format!("{} generated", listing.generated.len()));
    }
    if summary.is_empty() {
        summary.push("no transcripts".to_string());
    }
    format!("Languages refreshed: {}", summary.join(", "))
}
