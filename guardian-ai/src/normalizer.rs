//! Turns free-form model text into a `NormalizedPayload`.
//!
//! Candidates are tried in a fixed order and the first one that parses as a
//! JSON object matching the expected shape wins:
//!
//! 1. the body of a ```` ```json ```` fenced block,
//! 2. balanced `{ ... }` substrings, in order of their opening brace,
//! 3. the whole text with stray fence markers removed.
//!
//! When nothing matches, the raw text is kept as `NormalizedPayload::Fallback`.
//! `parse` never fails and never panics.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::{Map, Value};
use tracing::debug;

use guardian_common::models::{ExpectedShape, NormalizedPayload};

static JSON_FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)```[ \t]*json[ \t]*\r?\n?(.*?)```").expect("fence pattern is valid"));

static FENCE_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)```(json)?").expect("marker pattern is valid"));

#[derive(Debug, Clone, Copy, Default)]
pub struct ResponseNormalizer;

impl ResponseNormalizer {
    pub fn new() -> Self {
        Self
    }

    pub fn parse(&self, raw_text: &str, shape: ExpectedShape) -> NormalizedPayload {
        if let Some(map) = Self::from_fenced_block(raw_text, shape) {
            debug!("normalized {} from fenced block", shape.name());
            return NormalizedPayload::Structured(map);
        }
        if let Some(map) = Self::from_braces(raw_text, shape) {
            debug!("normalized {} from brace-delimited text", shape.name());
            return NormalizedPayload::Structured(map);
        }
        if let Some(map) = Self::from_whole_text(raw_text, shape) {
            debug!("normalized {} from whole text", shape.name());
            return NormalizedPayload::Structured(map);
        }

        debug!("falling back to raw text for {}", shape.name());
        NormalizedPayload::Fallback {
            raw_text: raw_text.to_string(),
            shape,
        }
    }

    fn from_fenced_block(raw: &str, shape: ExpectedShape) -> Option<Map<String, Value>> {
        JSON_FENCE
            .captures_iter(raw)
            .filter_map(|caps| caps.get(1))
            .find_map(|body| validate(body.as_str(), shape))
    }

    fn from_braces(raw: &str, shape: ExpectedShape) -> Option<Map<String, Value>> {
        object_spans(raw)
            .into_iter()
            .find_map(|(start, end)| validate(&raw[start..end], shape))
    }

    fn from_whole_text(raw: &str, shape: ExpectedShape) -> Option<Map<String, Value>> {
        let stripped = FENCE_MARKER.replace_all(raw, "");
        validate(stripped.trim(), shape)
    }
}

fn validate(candidate: &str, shape: ExpectedShape) -> Option<Map<String, Value>> {
    match serde_json::from_str::<Value>(candidate.trim()) {
        Ok(Value::Object(map)) if shape.matches(&map) => Some(map),
        _ => None,
    }
}

/// Every balanced `{ ... }` span as `(start, end)` byte ranges, ordered by
/// opening brace. One pass with a stack of open braces; quotes only start a
/// string inside an open object, so prose around the JSON cannot desync it.
fn object_spans(text: &str) -> Vec<(usize, usize)> {
    let mut open: Vec<usize> = Vec::new();
    let mut spans = Vec::new();
    let mut in_string = false;
    let mut escaped = false;

    for (i, c) in text.char_indices() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match c {
            '"' if !open.is_empty() => in_string = true,
            '{' => open.push(i),
            '}' => {
                if let Some(start) = open.pop() {
                    spans.push((start, i + c.len_utf8()));
                }
            }
            _ => {}
        }
    }

    spans.sort_by_key(|&(start, _)| start);
    spans
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(raw: &str, shape: ExpectedShape) -> NormalizedPayload {
        ResponseNormalizer::new().parse(raw, shape)
    }

    #[test]
    fn fenced_json_block_wins() {
        let raw = "Here you go:\n```json\n{\"sentiment\": \"hopeful\", \"theme\": \"New job\"}\n```\nTake care!";
        let payload = parse(raw, ExpectedShape::MoodSentiment);
        assert_eq!(payload.text("sentiment").as_deref(), Some("hopeful"));
        assert_eq!(payload.text("theme").as_deref(), Some("New job"));
    }

    #[test]
    fn fenced_block_failing_shape_falls_through_to_braces() {
        let raw = "```json\n{\"unrelated\": true}\n```\nActually: {\"sentiment\": \"tired\", \"theme\": \"Sleep\"}";
        let payload = parse(raw, ExpectedShape::MoodSentiment);
        assert_eq!(payload.text("sentiment").as_deref(), Some("tired"));
    }

    #[test]
    fn prose_wrapped_object_is_extracted() {
        let raw = "Sure! {\"findings\": [\"no fracture\"], \"observations\": [\"normal density\"], \"recommendations\": []} This is AI analysis, not a diagnosis.";
        let payload = parse(raw, ExpectedShape::XrayFindings);
        assert!(payload.is_structured());
        assert_eq!(payload.list("findings").map(|l| l.len()), Some(1));
    }

    #[test]
    fn braces_inside_strings_do_not_break_balance() {
        let raw = r#"{"sentiment": "odd } brace", "theme": "Quoting \"{\" in text"}"#;
        let payload = parse(raw, ExpectedShape::MoodSentiment);
        assert_eq!(payload.text("sentiment").as_deref(), Some("odd } brace"));
    }

    #[test]
    fn nested_candidate_is_found_when_outer_object_does_not_match() {
        let raw = r#"{"result": {"sentiment": "calm", "theme": "Rest"}}"#;
        let payload = parse(raw, ExpectedShape::MoodSentiment);
        assert_eq!(payload.text("theme").as_deref(), Some("Rest"));
    }

    #[test]
    fn unlabelled_fence_is_handled_by_later_steps() {
        let raw = "```\n{\"exercises\": [{\"name\": \"Squats\"}]}\n```";
        let payload = parse(raw, ExpectedShape::WorkoutPlan);
        assert!(payload.is_structured());
    }

    #[test]
    fn unparseable_text_becomes_fallback_with_declared_shape() {
        let raw = "I could not read this image clearly.";
        match parse(raw, ExpectedShape::PrescriptionDetails) {
            NormalizedPayload::Fallback { raw_text, shape } => {
                assert_eq!(raw_text, raw);
                assert_eq!(shape, ExpectedShape::PrescriptionDetails);
            }
            other => panic!("expected fallback, got {:?}", other),
        }
    }

    #[test]
    fn wrong_field_kinds_become_fallback() {
        let raw = r#"{"findings": "one string", "observations": [], "recommendations": []}"#;
        assert!(!parse(raw, ExpectedShape::XrayFindings).is_structured());
    }

    #[test]
    fn never_panics_on_hostile_input() {
        let inputs = [
            "",
            "{",
            "}",
            "{{{{{{{{",
            "}}}}{{{{",
            "```json",
            "```json\n```",
            "\"unterminated {",
            "{\"a\": \"\\",
            "ÿ{é}ü",
            "{\"sentiment\": \"😀\", \"theme\": \"日本語\"}",
            "[1, 2, 3]",
            "null",
        ];
        for input in inputs {
            let _ = parse(input, ExpectedShape::MoodSentiment);
            let _ = parse(input, ExpectedShape::WorkoutPlan);
        }

        let long_open = "{".repeat(10_000);
        assert!(!parse(&long_open, ExpectedShape::MoodSentiment).is_structured());

        let unicode = parse("{\"sentiment\": \"😀\", \"theme\": \"日本語\"}", ExpectedShape::MoodSentiment);
        assert_eq!(unicode.text("theme").as_deref(), Some("日本語"));
    }

    #[test]
    fn spans_are_ordered_by_opening_brace() {
        let text = "ab{\"x\": {\"y\": 1}}cd";
        let spans = object_spans(text);
        assert_eq!(spans.len(), 2);
        assert_eq!(&text[spans[0].0..spans[0].1], "{\"x\": {\"y\": 1}}");
        assert_eq!(&text[spans[1].0..spans[1].1], "{\"y\": 1}");
        assert!(object_spans("{\"x\": 1").is_empty());
    }

    #[test]
    fn object_after_many_code_blocks_is_found() {
        let mut raw = "fn f() { }\n".repeat(70);
        raw.push_str(r#"{"sentiment": "focused", "theme": "Coding"}"#);
        let payload = parse(&raw, ExpectedShape::MoodSentiment);
        assert_eq!(payload.text("theme").as_deref(), Some("Coding"));
    }
}
