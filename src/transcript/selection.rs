use crate::extractors::{TranscriptCatalog, TranscriptTrack};
use crate::TranscriptError;

/// Which rule of the selection policy produced the track
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionStep {
    /// The caller asked for this exact language
    Requested,
    /// A human-authored track was available
    Manual,
    /// Any listed track
    Fallback,
}

/// Outcome of [`select_track`]
#[derive(Debug, Clone, Copy)]
pub struct Selection<'a> {
    pub track: &'a TranscriptTrack,
    pub step: SelectionStep,
}

/// Pick the track to fetch.
///
/// An explicit `requested_language` must exist in the catalog. Without one, manual
/// tracks are preferred and any of `available_languages` is the last resort.
pub fn select_track<'a>(
    catalog: &'a TranscriptCatalog,
    available_languages: &[String],
    requested_language: Option<&str>,
) -> Result<Selection<'a>, TranscriptError> {
    if let Some(language) = requested_language {
        return catalog
            .find(&[language.to_string()])
            .map(|track| Selection {
                track,
                step: SelectionStep::Requested,
            })
            .ok_or_else(|| TranscriptError::LanguageNotAvailable {
                language: language.to_string(),
                available: available_languages.to_vec(),
            });
    }

    let manual: Vec<String> = catalog
        .tracks()
        .iter()
        .filter(|t| !t.is_generated)
        .map(|t| t.language_code.clone())
        .collect();
    if !manual.is_empty() {
        match catalog.find(&manual) {
            Some(track) => {
                return Ok(Selection {
                    track,
                    step: SelectionStep::Manual,
                })
            }
            None => tracing::debug!(
                "Manual tracks {:?} listed but not found, falling back to any track",
                manual
            ),
        }
    }

    catalog
        .find(available_languages)
        .map(|track| Selection {
            track,
            step: SelectionStep::Fallback,
        })
        .ok_or(TranscriptError::NoTranscriptsAvailable)
}
