//! Prompt templates and the shape each one asks the model to answer with.

use guardian_common::models::{ExpectedShape, ImageType, WorkoutType};

pub const MEDICAL_MAX_TOKENS: u32 = 1024;
pub const MOOD_MAX_TOKENS: u32 = 200;
pub const WORKOUT_MAX_TOKENS: u32 = 1024;

const XRAY_PROMPT: &str = r#"Analyze this X-ray image. Provide:
1) Key findings (as an array)
2) Observations about bone/tissue structure (as an array)
3) Recommendations (as an array)

Format your response as JSON with these exact fields:
{
  "findings": ["finding1", "finding2"],
  "observations": ["observation1", "observation2"],
  "recommendations": ["recommendation1", "recommendation2"]
}

IMPORTANT: Add a disclaimer that this is AI analysis and not a medical diagnosis."#;

const PRESCRIPTION_PROMPT: &str = r#"Analyze this prescription image. Extract:
1) Medication names (as an array)
2) Dosages (as an array)
3) Instructions (as an array)

Format your response as JSON with these exact fields:
{
  "medications": ["med1", "med2"],
  "dosages": ["dosage1", "dosage2"],
  "instructions": ["instruction1", "instruction2"]
}"#;

/// Reports are read with the prescription extraction prompt.
pub fn medical_prompt(image_type: ImageType) -> (&'static str, ExpectedShape) {
    match image_type {
        ImageType::Xray => (XRAY_PROMPT, ExpectedShape::XrayFindings),
        ImageType::Prescription | ImageType::Report => {
            (PRESCRIPTION_PROMPT, ExpectedShape::PrescriptionDetails)
        }
    }
}

pub fn mood_prompt(mood_text: &str) -> (String, ExpectedShape) {
    let prompt = format!(
        "Analyze this mood entry and respond with ONLY a JSON object (no markdown):\n\
         {{\"sentiment\": \"one word sentiment\", \"theme\": \"brief theme description\"}}\n\n\
         Mood entry: \"{}\"",
        mood_text.replace('"', "'")
    );
    (prompt, ExpectedShape::MoodSentiment)
}

pub fn workout_prompt(
    workout_type: WorkoutType,
    duration_minutes: Option<u32>,
    fitness_level: Option<&str>,
) -> (String, ExpectedShape) {
    let duration = duration_minutes
        .map(|m| format!("about {} minutes", m))
        .unwrap_or_else(|| "about 25 minutes".to_string());
    let level = fitness_level.unwrap_or("intermediate");

    let prompt = format!(
        "Create a {} workout lasting {} for a {} fitness level.\n\
         Respond with ONLY a JSON object (no markdown) in this format:\n\
         {{\"exercises\": [{{\"name\": \"Push-ups\", \"sets\": 3, \"reps\": 12, \"duration\": 5, \"focusTip\": \"one short form cue\"}}]}}\n\
         Use 4 to 6 exercises. duration is in minutes.",
        workout_type, duration, level
    );
    (prompt, ExpectedShape::WorkoutPlan)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_uses_prescription_extraction() {
        assert_eq!(medical_prompt(ImageType::Report).1, ExpectedShape::PrescriptionDetails);
        assert_eq!(medical_prompt(ImageType::Xray).1, ExpectedShape::XrayFindings);
    }

    #[test]
    fn mood_prompt_quotes_entry_safely() {
        let (prompt, shape) = mood_prompt("I said \"fine\" today");
        assert!(prompt.contains("Mood entry: \"I said 'fine' today\""));
        assert_eq!(shape, ExpectedShape::MoodSentiment);
    }
}
