use crate::cli::RenderMode;
use crate::transcript::{TranscriptData, TranscriptSegment};
use crate::FALLBACK_TITLE;

/// Line emitted when every segment of a detailed transcript was blank
pub const NO_SEGMENTS_PLACEHOLDER: &str = "_Transcript returned no readable segments._";

/// Render a transcript as Markdown in the requested layout
pub fn render(transcript: &TranscriptData, mode: RenderMode) -> String {
    match mode {
        RenderMode::Detailed => render_detailed(transcript),
        RenderMode::Condensed => render_condensed(transcript),
    }
}

fn heading(transcript: &TranscriptData) -> String {
    let title = if transcript.title.is_empty() {
        FALLBACK_TITLE
    } else {
        &transcript.title
    };
    format!("# {}", title)
}

/// Metadata header followed by one timestamped bullet per non-blank segment
pub fn render_detailed(transcript: &TranscriptData) -> String {
    let mut lines = vec![
        heading(transcript),
        String::new(),
        format!("- Video URL: {}", transcript.url),
        format!("- Language: {}", transcript.language),
    ];
    if !transcript.available_languages.is_empty() {
        let mut languages = transcript.available_languages.clone();
        languages.sort();
        lines.push(format!("- Available languages: {}", languages.join(", ")));
    }
    lines.push(String::new());

    lines.extend(segment_lines(&transcript.segments));
    lines.join("\n")
}

/// Title and URL followed by every segment's text as a single paragraph.
///
/// Line breaks inside segments become spaces so the paragraph never splits.
pub fn render_condensed(transcript: &TranscriptData) -> String {
    let paragraph = transcript
        .segments
        .iter()
        .map(|segment| segment.text().replace('\n', " "))
        .collect::<Vec<_>>()
        .join(" ");

    [
        heading(transcript),
        String::new(),
        format!("- Video URL: {}", transcript.url),
        String::new(),
        paragraph,
    ]
    .join("\n")
}

fn segment_lines(segments: &[TranscriptSegment]) -> Vec<String> {
    let mut lines: Vec<String> = segments
        .iter()
        .filter_map(|segment| {
            let text = segment.text().replace('\n', " ");
            let text = text.trim();
            if text.is_empty() {
                return None;
            }
            Some(format!("- [{}] {}", format_timestamp(segment.start()), text))
        })
        .collect();

    if lines.is_empty() {
        lines.push(NO_SEGMENTS_PLACEHOLDER.to_string());
    }
    lines
}

/// Format an offset as `MM:SS`, or `HH:MM:SS` once it reaches an hour.
///
/// Fractions are dropped and negative offsets count as zero.
pub fn format_timestamp(seconds: f64) -> String {
    let total_seconds = if seconds.is_finite() && seconds > 0.0 {
        seconds.floor() as u64
    } else {
        0
    };
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let secs = total_seconds % 60;

    if hours > 0 {
        format!("{:02}:{:02}:{:02}", hours, minutes, secs)
    } else {
        format!("{:02}:{:02}", minutes, secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transcript(segments: Vec<TranscriptSegment>) -> TranscriptData {
        TranscriptData {
            video_id: "dQw4w9WgXcQ".to_string(),
            url: "https://www.youtube.com/watch?v=dQw4w9WgXcQ".to_string(),
            title: "Never Gonna Give You Up".to_string(),
            language: "en".to_string(),
            segments,
            available_languages: vec!["en".to_string(), "es".to_string()],
            is_generated: Some(false),
        }
    }

    fn rick() -> TranscriptData {
        transcript(vec![
            TranscriptSegment::new(0.0, 4.0, "Never gonna give you up"),
            TranscriptSegment::new(4.2, 4.0, "Never gonna let you down"),
        ])
    }

    #[test]
    fn test_detailed_layout() {
        let expected = "\
# Never Gonna Give You Up

- Video URL: https://www.youtube.com/watch?v=dQw4w9WgXcQ
- Language: en
- Available languages: en, es

- [00:00] Never gonna give you up
- [00:04] Never gonna let you down";
        assert_eq!(render(&rick(), RenderMode::Detailed), expected);
    }

    #[test]
    fn test_condensed_layout() {
        let expected = "\
# Never Gonna Give You Up

- Video URL: https://www.youtube.com/watch?v=dQw4w9WgXcQ

Never gonna give you up Never gonna let you down";
        assert_eq!(render(&rick(), RenderMode::Condensed), expected);
    }

    #[test]
    fn test_empty_title_and_languages() {
        let mut data = rick();
        data.title = String::new();
        data.available_languages.clear();

        let markdown = render_detailed(&data);
        assert!(markdown.starts_with("# Video Transcript\n"));
        assert!(!markdown.contains("Available languages"));
    }

    #[test]
    fn test_blank_segments_are_skipped() {
        let data = transcript(vec![
            TranscriptSegment::new(1.0, 1.0, "   "),
            TranscriptSegment::new(2.0, 1.0, "line one\nline two "),
            TranscriptSegment::new(3.0, 1.0, "\n"),
        ]);
        let markdown = render_detailed(&data);

        assert!(markdown.ends_with("\n- [00:02] line one line two"));
        assert_eq!(markdown.matches("- [").count(), 1);
        assert!(!markdown.contains(NO_SEGMENTS_PLACEHOLDER));
    }

    #[test]
    fn test_placeholder_when_nothing_readable() {
        let data = transcript(vec![
            TranscriptSegment::new(0.0, 1.0, " "),
            TranscriptSegment::new(1.0, 1.0, ""),
        ]);
        let markdown = render_detailed(&data);

        assert_eq!(markdown.matches(NO_SEGMENTS_PLACEHOLDER).count(), 1);
        assert!(markdown.ends_with(NO_SEGMENTS_PLACEHOLDER));
    }

    #[test]
    fn test_condensed_keeps_every_segment() {
        let data = transcript(vec![
            TranscriptSegment::new(0.0, 1.0, "a"),
            TranscriptSegment::new(1.0, 1.0, ""),
            TranscriptSegment::new(2.0, 1.0, "b"),
        ]);
        assert!(render_condensed(&data).ends_with("\n\na  b"));
    }

    #[test]
    fn test_condensed_paragraph_has_no_line_breaks() {
        let data = transcript(vec![
            TranscriptSegment::new(0.0, 1.0, "line one\nline two"),
            TranscriptSegment::new(1.0, 1.0, "\n\n"),
            TranscriptSegment::new(2.0, 1.0, "after"),
        ]);
        let markdown = render_condensed(&data);
        let paragraph = markdown.rsplit("\n\n").next().unwrap();

        assert_eq!(paragraph, "line one line two    after");
        assert_eq!(markdown.lines().count(), 5);
    }

    #[test]
    fn test_format_timestamp_boundaries() {
        assert_eq!(format_timestamp(0.0), "00:00");
        assert_eq!(format_timestamp(4.2), "00:04");
        assert_eq!(format_timestamp(59.99), "00:59");
        assert_eq!(format_timestamp(3599.9), "59:59");
        assert_eq!(format_timestamp(3600.0), "01:00:00");
        assert_eq!(format_timestamp(36_000.0 + 61.0), "10:01:01");
        assert_eq!(format_timestamp(-5.0), "00:00");
        assert_eq!(format_timestamp(f64::NAN), "00:00");
    }
}
