use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;

use super::TranscriptSegment;

type MappingFn = dyn Fn() -> anyhow::Result<Map<String, Value>> + Send + Sync;

/// A caption record as a provider hands it over.
///
/// Providers do not agree on one shape, so every field is resolved through
/// [`normalize_field`] instead of being read directly.
#[derive(Debug)]
pub enum RawSegment {
    /// Key-value record, e.g. one decoded JSON caption event
    Mapping(Map<String, Value>),
    /// Record with named attributes and an optional mapping conversion
    Object(SegmentObject),
}

/// Attribute-bearing caption record.
///
/// An attribute holding `Value::Null` is present but unset and never wins a lookup.
#[derive(Default)]
pub struct SegmentObject {
    attributes: BTreeMap<String, Value>,
    to_mapping: Option<Box<MappingFn>>,
}

impl SegmentObject {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    /// Attach a conversion used when the attributes themselves do not answer
    pub fn with_mapping<F>(mut self, to_mapping: F) -> Self
    where
        F: Fn() -> anyhow::Result<Map<String, Value>> + Send + Sync + 'static,
    {
        self.to_mapping = Some(Box::new(to_mapping));
        self
    }

    fn attribute(&self, name: &str) -> Option<&Value> {
        self.attributes.get(name).filter(|v| !v.is_null())
    }

    fn convert(&self) -> Option<Map<String, Value>> {
        let to_mapping = self.to_mapping.as_ref()?;
        match to_mapping() {
            Ok(map) => Some(map),
            Err(e) => {
                tracing::debug!("Failed to convert transcript segment to a mapping: {:#}", e);
                None
            }
        }
    }
}

impl fmt::Debug for SegmentObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SegmentObject")
            .field("attributes", &self.attributes)
            .field("to_mapping", &self.to_mapping.is_some())
            .finish()
    }
}

impl From<Map<String, Value>> for RawSegment {
    fn from(map: Map<String, Value>) -> Self {
        RawSegment::Mapping(map)
    }
}

impl From<SegmentObject> for RawSegment {
    fn from(object: SegmentObject) -> Self {
        RawSegment::Object(object)
    }
}

fn aliases(field: &str) -> &'static [&'static str] {
    match field {
        "start" => &["offset", "time"],
        "duration" => &["length"],
        "text" => &["snippet"],
        _ => &[],
    }
}

fn direct_lookup(segment: &RawSegment, name: &str) -> Option<Value> {
    match segment {
        RawSegment::Mapping(map) => map.get(name).cloned(),
        RawSegment::Object(object) => object.attribute(name).cloned(),
    }
}

/// Resolve one field of a raw segment.
///
/// Order: mapping key, non-null attribute, the object's mapping conversion, then the
/// field's aliases (`start`: `offset`, `time`; `duration`: `length`; `text`:
/// `snippet`), and finally `default`.
pub fn normalize_field(segment: &RawSegment, field: &str, default: Value) -> Value {
    if let Some(value) = direct_lookup(segment, field) {
        return value;
    }

    if let RawSegment::Object(object) = segment {
        if let Some(value) = object.convert().and_then(|mut map| map.remove(field)) {
            return value;
        }
    }

    aliases(field)
        .iter()
        .find_map(|alias| direct_lookup(segment, alias))
        .unwrap_or(default)
}

fn as_seconds(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

fn as_text(value: Value) -> String {
    match value {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Normalize a raw segment into a [`TranscriptSegment`].
///
/// Each field is resolved independently; a value that is not numeric for
/// `start`/`duration` falls back to 0.0.
pub fn normalize_segment(segment: &RawSegment) -> TranscriptSegment {
    let start = as_seconds(&normalize_field(segment, "start", Value::from(0.0))).unwrap_or(0.0);
    let duration =
        as_seconds(&normalize_field(segment, "duration", Value::from(0.0))).unwrap_or(0.0);
    let text = as_text(normalize_field(segment, "text", Value::from("")));

    TranscriptSegment::new(start, duration, text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn mapping(value: Value) -> RawSegment {
        match value {
            Value::Object(map) => RawSegment::Mapping(map),
            _ => panic!("fixture must be a JSON object"),
        }
    }

    #[test]
    fn test_mapping_segment() {
        let segment = mapping(json!({"start": 0, "duration": 1, "text": "hello"}));
        let normalized = normalize_segment(&segment);
        assert_eq!(normalized.start(), 0.0);
        assert_eq!(normalized.duration(), 1.0);
        assert_eq!(normalized.text(), "hello");
    }

    #[test]
    fn test_object_attributes() {
        let segment = RawSegment::from(
            SegmentObject::new()
                .with_attribute("start", 1.5)
                .with_attribute("duration", 3.2)
                .with_attribute("text", "sample"),
        );
        assert_eq!(normalize_field(&segment, "start", json!(0.0)), json!(1.5));
        assert_eq!(normalize_field(&segment, "duration", json!(0.0)), json!(3.2));
        assert_eq!(normalize_field(&segment, "text", json!("")), json!("sample"));
    }

    #[test]
    fn test_offset_alias_fills_start() {
        let segment = RawSegment::from(
            SegmentObject::new()
                .with_attribute("offset", 12.25)
                .with_attribute("text", "aliased"),
        );
        let normalized = normalize_segment(&segment);
        assert_eq!(normalized.start(), 12.25);
        assert_eq!(normalized.duration(), 0.0);
    }

    #[test]
    fn test_null_attribute_is_skipped() {
        let segment = RawSegment::from(
            SegmentObject::new()
                .with_attribute("start", Value::Null)
                .with_attribute("time", 7.0),
        );
        assert_eq!(normalize_segment(&segment).start(), 7.0);
    }

    #[test]
    fn test_mapping_conversion_is_used_before_aliases() {
        let segment = RawSegment::from(
            SegmentObject::new()
                .with_attribute("offset", 99.0)
                .with_mapping(|| {
                    let mut map = Map::new();
                    map.insert("start".to_string(), json!(3.0));
                    Ok(map)
                }),
        );
        assert_eq!(normalize_segment(&segment).start(), 3.0);
    }

    #[test]
    fn test_failed_conversion_falls_through() {
        let segment = RawSegment::from(
            SegmentObject::new()
                .with_attribute("snippet", "from alias")
                .with_mapping(|| anyhow::bail!("broken record")),
        );
        assert_eq!(normalize_segment(&segment).text(), "from alias");
    }

    #[test]
    fn test_fields_resolve_independently() {
        let segment = mapping(json!({"time": "4.5", "length": 2, "text": "mixed"}));
        let normalized = normalize_segment(&segment);
        assert_eq!(normalized.start(), 4.5);
        assert_eq!(normalized.duration(), 2.0);
        assert_eq!(normalized.text(), "mixed");
    }

    #[test]
    fn test_defaults_when_nothing_matches() {
        let normalized = normalize_segment(&mapping(json!({"unrelated": true})));
        assert_eq!(normalized.start(), 0.0);
        assert_eq!(normalized.duration(), 0.0);
        assert_eq!(normalized.text(), "");
    }
}
