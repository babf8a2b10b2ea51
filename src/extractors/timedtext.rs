//! Caption payload parsers.
//!
//! YouTube serves the same captions in several formats. The timedtext XML format
//! (`<text start="…" dur="…">`) comes back from the InnerTube caption URLs and the
//! `json3` format (`events[].segs[].utf8`) is what yt-dlp points at. Both are turned
//! into [`RawSegment`]s and left to the normalizer.

use anyhow::Context;
use quick_xml::events::Event;
use regex::Regex;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::borrow::Cow;
use std::sync::OnceLock;

use crate::transcript::normalize::{RawSegment, SegmentObject};
use crate::Result;

fn markup_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"<[^>]*>").expect("valid regex"))
}

/// Caption text is HTML inside XML: decode the second level of entities and drop
/// formatting tags such as `<i>` or `<font>`.
fn clean_caption_text(text: &str) -> String {
    let decoded = quick_xml::escape::unescape(text).unwrap_or(Cow::Borrowed(text));
    markup_pattern().replace_all(&decoded, "").into_owned()
}

#[derive(Default)]
struct PendingCue {
    start: Option<String>,
    duration: Option<String>,
    text: String,
}

impl PendingCue {
    fn into_segment(self) -> RawSegment {
        let mut object = SegmentObject::new().with_attribute("text", clean_caption_text(&self.text));
        if let Some(start) = self.start {
            object = object.with_attribute("start", start);
        }
        if let Some(duration) = self.duration {
            object = object.with_attribute("duration", duration);
        }
        object.into()
    }
}

fn read_cue(start: &quick_xml::events::BytesStart<'_>) -> PendingCue {
    let mut cue = PendingCue::default();
    for attr in start.attributes().flatten() {
        let value = attr
            .unescape_value()
            .map(|v| v.to_string())
            .unwrap_or_default();
        match attr.key.as_ref() {
            b"start" => cue.start = Some(value),
            b"dur" => cue.duration = Some(value),
            _ => {}
        }
    }
    cue
}

/// Parse a timedtext XML document into segments, in document order
pub fn parse_xml(xml: &str) -> Result<Vec<RawSegment>> {
    let mut reader = quick_xml::Reader::from_str(xml);
    reader.config_mut().trim_text(false);

    let mut segments = Vec::new();
    let mut current: Option<PendingCue> = None;

    loop {
        match reader.read_event().context("Malformed timedtext XML")? {
            Event::Eof => break,
            Event::Start(e) if e.name().as_ref() == b"text" => {
                current = Some(read_cue(&e));
            }
            Event::Empty(e) if e.name().as_ref() == b"text" => {
                segments.push(read_cue(&e).into_segment());
            }
            Event::Text(t) => {
                if let Some(cue) = current.as_mut() {
                    let text = t.unescape().context("Invalid entity in caption text")?;
                    cue.text.push_str(&text);
                }
            }
            Event::CData(t) => {
                if let Some(cue) = current.as_mut() {
                    cue.text.push_str(&String::from_utf8_lossy(&t));
                }
            }
            Event::End(e) if e.name().as_ref() == b"text" => {
                if let Some(cue) = current.take() {
                    segments.push(cue.into_segment());
                }
            }
            _ => {}
        }
    }

    Ok(segments)
}

#[derive(Debug, Deserialize)]
struct Json3 {
    #[serde(default)]
    events: Vec<Json3Event>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Json3Event {
    #[serde(default)]
    t_start_ms: f64,
    #[serde(default)]
    d_duration_ms: f64,
    #[serde(default)]
    a_append: Option<u8>,
    segs: Option<Vec<Json3Seg>>,
}

#[derive(Debug, Deserialize)]
struct Json3Seg {
    #[serde(default)]
    utf8: String,
}

/// Parse a `json3` caption document into segments.
///
/// Window and style events carry no `segs` and are skipped, as are the
/// newline-only events appended between auto-generated caption lines.
pub fn parse_json3(body: &str) -> Result<Vec<RawSegment>> {
    let doc: Json3 = serde_json::from_str(body).context("Malformed json3 captions")?;

    let segments = doc
        .events
        .into_iter()
        .filter_map(|event| {
            let text: String = event.segs?.into_iter().map(|s| s.utf8).collect();
            if event.a_append.is_some() && text.trim().is_empty() {
                return None;
            }

            let mut map = Map::new();
            map.insert("start".to_string(), Value::from(event.t_start_ms / 1000.0));
            map.insert("duration".to_string(), Value::from(event.d_duration_ms / 1000.0));
            map.insert("text".to_string(), Value::from(text));
            Some(RawSegment::Mapping(map))
        })
        .collect();

    Ok(segments)
}
