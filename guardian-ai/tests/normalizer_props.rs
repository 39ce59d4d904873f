// File: guardian-ai/tests/normalizer_props.rs

use proptest::prelude::*;

use guardian_ai::ResponseNormalizer;
use guardian_common::models::{ExpectedShape, NormalizedPayload};

const SHAPES: [ExpectedShape; 4] = [
    ExpectedShape::XrayFindings,
    ExpectedShape::PrescriptionDetails,
    ExpectedShape::MoodSentiment,
    ExpectedShape::WorkoutPlan,
];

/// Text assembled from the pieces model output is usually made of, so the
/// brace, string and fence handling gets exercised far more than by
/// uniformly random strings.
fn json_like_text() -> impl Strategy<Value = String> {
    let tokens = vec![
        "{", "}", "[", "]", "\"", "\\", "```", "```json\n", "json", ":", ",", " ", "\n",
        "\"sentiment\"", "\"theme\"", "\"findings\"", "\"exercises\"", "\"x\"", "1", "null",
        "é", "😀", "prose",
    ];
    prop::collection::vec(prop::sample::select(tokens), 0..80).prop_map(|parts| parts.concat())
}

fn assert_total(input: &str) -> Result<(), TestCaseError> {
    let normalizer = ResponseNormalizer::new();
    for shape in SHAPES {
        match normalizer.parse(input, shape) {
            NormalizedPayload::Structured(map) => prop_assert!(shape.matches(&map)),
            NormalizedPayload::Fallback { raw_text, shape: kept } => {
                prop_assert_eq!(raw_text.as_str(), input);
                prop_assert_eq!(kept, shape);
            }
        }
    }
    Ok(())
}

proptest! {
    #[test]
    fn prop_parse_is_total_on_arbitrary_text(input in any::<String>()) {
        assert_total(&input)?;
    }

    #[test]
    fn prop_parse_is_total_on_json_like_text(input in json_like_text()) {
        assert_total(&input)?;
    }

    #[test]
    fn prop_embedded_mood_object_is_recovered(
        prefix in "[a-zA-Z ,.!]{0,40}",
        suffix in "[a-zA-Z ,.!]{0,40}",
        sentiment in "[a-z]{1,12}",
    ) {
        let raw = format!(
            "{}{{\"sentiment\": \"{}\", \"theme\": \"Rest\"}}{}",
            prefix, sentiment, suffix
        );
        let payload = ResponseNormalizer::new().parse(&raw, ExpectedShape::MoodSentiment);
        prop_assert_eq!(payload.text("sentiment"), Some(sentiment));
    }
}
