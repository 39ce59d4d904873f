use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// How a required key of an expected shape must look.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// A string, number or boolean.
    Text,
    /// Any JSON array.
    List,
}

impl FieldKind {
    pub fn accepts(&self, value: &Value) -> bool {
        match self {
            FieldKind::Text => matches!(value, Value::String(_) | Value::Number(_) | Value::Bool(_)),
            FieldKind::List => value.is_array(),
        }
    }
}

/// The structure a prompt asks the model to answer with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpectedShape {
    XrayFindings,
    PrescriptionDetails,
    MoodSentiment,
    WorkoutPlan,
}

impl ExpectedShape {
    pub fn name(&self) -> &'static str {
        match self {
            ExpectedShape::XrayFindings => "xray_findings",
            ExpectedShape::PrescriptionDetails => "prescription_details",
            ExpectedShape::MoodSentiment => "mood_sentiment",
            ExpectedShape::WorkoutPlan => "workout_plan",
        }
    }

    pub fn required_fields(&self) -> &'static [(&'static str, FieldKind)] {
        match self {
            ExpectedShape::XrayFindings => &[
                ("findings", FieldKind::List),
                ("observations", FieldKind::List),
                ("recommendations", FieldKind::List),
            ],
            ExpectedShape::PrescriptionDetails => &[
                ("medications", FieldKind::List),
                ("dosages", FieldKind::List),
                ("instructions", FieldKind::List),
            ],
            ExpectedShape::MoodSentiment => &[
                ("sentiment", FieldKind::Text),
                ("theme", FieldKind::Text),
            ],
            ExpectedShape::WorkoutPlan => &[("exercises", FieldKind::List)],
        }
    }

    /// Shallow check: every required key is present with the right kind.
    /// Nested values are not inspected.
    pub fn matches(&self, object: &Map<String, Value>) -> bool {
        self.required_fields().iter().all(|(key, kind)| {
            object.get(*key).map(|v| kind.accepts(v)).unwrap_or(false)
        })
    }
}

/// Model output after normalization. Unparseable text is carried as a
/// `Fallback` so it can still be stored and shown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum NormalizedPayload {
    Structured(Map<String, Value>),
    Fallback { raw_text: String, shape: ExpectedShape },
}

impl NormalizedPayload {
    pub fn is_structured(&self) -> bool {
        matches!(self, NormalizedPayload::Structured(_))
    }

    /// A text field of a structured payload, trimmed. Empty strings count as absent.
    pub fn text(&self, key: &str) -> Option<String> {
        match self {
            NormalizedPayload::Structured(map) => match map.get(key)? {
                Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
                Value::Number(n) => Some(n.to_string()),
                Value::Bool(b) => Some(b.to_string()),
                _ => None,
            },
            NormalizedPayload::Fallback { .. } => None,
        }
    }

    pub fn list(&self, key: &str) -> Option<&Vec<Value>> {
        match self {
            NormalizedPayload::Structured(map) => map.get(key)?.as_array(),
            NormalizedPayload::Fallback { .. } => None,
        }
    }
}
