//! Serde model of the transcript JSON document.
//!
//! ```json
//! {
//!   "text": {"id": 1, "t": "...", "l": 42},
//!   "textContent": "...",
//!   "names": {"0": ["http://www.tei-c.org/ns/1.0", "line"]},
//!   "annotations": [{"n": "0", "d": {"xml:node": "1/2"}, "t": [[0, 12, 1]], "id": 5}]
//! }
//! ```

use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::Value;

use super::range::Range;

#[derive(Debug, Clone, Deserialize)]
pub struct TranscriptSource {
    pub text: TextHeader,
    #[serde(rename = "textRange", default)]
    pub text_range: Option<Range>,
    #[serde(rename = "textContent", default)]
    pub text_content: String,
    #[serde(default)]
    pub names: BTreeMap<String, (Option<String>, String)>,
    #[serde(default)]
    pub annotations: Vec<AnnotationSource>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TextHeader {
    #[serde(default)]
    pub id: Value,
    #[serde(rename = "type", alias = "t", default)]
    pub kind: Option<String>,
    #[serde(alias = "l", default)]
    pub length: Option<usize>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AnnotationSource {
    /// Key into [`TranscriptSource::names`].
    pub n: String,
    #[serde(default)]
    pub d: BTreeMap<String, Value>,
    /// Targets as `[start, end, textId]`.
    #[serde(default)]
    pub t: Vec<(usize, usize, Value)>,
    #[serde(default)]
    pub id: Value,
}

impl TranscriptSource {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// Renders a JSON scalar the way it would appear as an attribute value.
pub fn value_to_string(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn accepts_short_and_long_header_keys() {
        let short: TextHeader = serde_json::from_value(json!({"id": 3, "t": "doc", "l": 9})).unwrap();
        let long: TextHeader =
            serde_json::from_value(json!({"id": "3", "type": "doc", "length": 9})).unwrap();
        assert_eq!(short.kind.as_deref(), Some("doc"));
        assert_eq!(long.length, Some(9));
        assert_eq!(value_to_string(&short.id), value_to_string(&long.id));
    }

    #[test]
    fn parses_annotation_tuples() {
        let src = TranscriptSource::from_json(
            r#"{
                "text": {"id": 1},
                "textContent": "ab",
                "names": {"5": [null, "line"]},
                "annotations": [{"n": "5", "d": {"n": 2, "rend": "x"}, "t": [[0, 2, 1]], "id": 11}]
            }"#,
        )
        .unwrap();
        assert_eq!(src.names["5"], (None, "line".to_string()));
        let a = &src.annotations[0];
        assert_eq!(a.t, vec![(0, 2, json!(1))]);
        assert_eq!(value_to_string(&a.d["n"]), "2");
        assert_eq!(value_to_string(&a.d["rend"]), "x");
        assert!(src.text_range.is_none());
    }
}
