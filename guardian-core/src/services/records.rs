//! Validation of caller input and assembly of `AnalysisRecord`s.
//!
//! This is the only place the core rejects input. Discriminants (image and
//! workout types) come from the caller, so an unknown value is an error
//! rather than something to degrade around.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use guardian_ai::ImageAttachment;
use guardian_common::models::{
    ActivityEntry, AnalysisRecord, Exercise, ImageType, MedicalAnalysis, MoodLog,
    NormalizedPayload, PersonalityTraits, WorkoutSession, WorkoutType,
};
use guardian_common::models::user::{MAX_TRAIT_SCORE, NEUTRAL_TRAIT_SCORE};
use guardian_common::Error;

use crate::services::rewards;

pub const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;
pub const DEFAULT_SENTIMENT: &str = "neutral";
pub const DEFAULT_THEME: &str = "General wellbeing";
pub const QUIZ_TRAIT_COUNT: usize = 4;

/// Sentiment and theme attached to a mood log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoodEnrichment {
    pub sentiment: String,
    pub theme: String,
}

impl Default for MoodEnrichment {
    fn default() -> Self {
        Self {
            sentiment: DEFAULT_SENTIMENT.to_string(),
            theme: DEFAULT_THEME.to_string(),
        }
    }
}

impl MoodEnrichment {
    /// Fields missing from the payload keep their defaults.
    pub fn from_payload(payload: &NormalizedPayload) -> Self {
        let defaults = Self::default();
        Self {
            sentiment: payload.text("sentiment").unwrap_or(defaults.sentiment),
            theme: payload.text("theme").unwrap_or(defaults.theme),
        }
    }
}

/// Everything needed to assemble one record, still unvalidated.
#[derive(Debug, Clone)]
pub enum RecordInput {
    Medical {
        image_type: String,
        payload: NormalizedPayload,
        coins_earned: i64,
    },
    Mood {
        mood: String,
        mood_text: String,
        enrichment: MoodEnrichment,
    },
    Workout {
        workout_type: String,
        exercises: Vec<Exercise>,
    },
    Activity {
        steps: i64,
        date: Option<DateTime<Utc>>,
    },
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RecordFactory;

impl RecordFactory {
    pub fn new() -> Self {
        Self
    }

    pub fn build(&self, user_id: Uuid, input: RecordInput) -> Result<AnalysisRecord, Error> {
        let now = Utc::now();
        let record = match input {
            RecordInput::Medical { image_type, payload, coins_earned } => {
                AnalysisRecord::MedicalAnalysis(MedicalAnalysis {
                    user_id,
                    image_type: image_type.parse()?,
                    payload,
                    coins_earned,
                    timestamp: now,
                })
            }
            RecordInput::Mood { mood, mood_text, enrichment } => {
                let (mood, mood_text) = self.validate_mood(&mood, &mood_text)?;
                AnalysisRecord::MoodLog(MoodLog {
                    user_id,
                    mood,
                    mood_text,
                    sentiment: enrichment.sentiment,
                    theme: enrichment.theme,
                    timestamp: now,
                })
            }
            RecordInput::Workout { workout_type, exercises } => {
                AnalysisRecord::WorkoutSession(WorkoutSession {
                    user_id,
                    workout_type: workout_type.parse()?,
                    exercises,
                    completed: false,
                    created_at: now,
                })
            }
            RecordInput::Activity { steps, date } => {
                let steps = self.validate_steps(steps)?;
                AnalysisRecord::ActivityEntry(ActivityEntry {
                    user_id,
                    steps,
                    distance_km: rewards::distance_km(steps),
                    calories: rewards::calories(steps),
                    date: date.unwrap_or(now),
                })
            }
        };
        Ok(record)
    }

    pub fn image_type(&self, raw: &str) -> Result<ImageType, Error> {
        raw.trim().parse()
    }

    pub fn workout_type(&self, raw: &str) -> Result<WorkoutType, Error> {
        raw.trim().parse()
    }

    pub fn validate_image(&self, image: &ImageAttachment) -> Result<(), Error> {
        if image.is_empty() {
            return Err(Error::validation("Uploaded image is empty"));
        }
        if image.len() > MAX_IMAGE_BYTES {
            return Err(Error::validation(format!(
                "Image is {} bytes; the limit is {} bytes",
                image.len(),
                MAX_IMAGE_BYTES
            )));
        }
        if !image.media_type.starts_with("image/") {
            return Err(Error::validation(format!(
                "Unsupported media type '{}'",
                image.media_type
            )));
        }
        Ok(())
    }

    pub fn validate_mood(&self, mood: &str, mood_text: &str) -> Result<(String, String), Error> {
        let mood = mood.trim();
        let mood_text = mood_text.trim();
        if mood.is_empty() || mood_text.is_empty() {
            return Err(Error::validation("Please provide mood and moodText"));
        }
        Ok((mood.to_string(), mood_text.to_string()))
    }

    pub fn validate_steps(&self, steps: i64) -> Result<u64, Error> {
        u64::try_from(steps)
            .map_err(|_| Error::validation(format!("steps must be >= 0, got {}", steps)))
    }

    /// Maps the first four quiz answers to energy, social, planning and
    /// thinking. A zero answer counts as unanswered and scores neutral.
    pub fn traits_from_answers(&self, answers: &[i32]) -> Result<PersonalityTraits, Error> {
        if answers.len() < QUIZ_TRAIT_COUNT {
            return Err(Error::validation(format!(
                "Invalid quiz answers: expected at least {} scores, got {}",
                QUIZ_TRAIT_COUNT,
                answers.len()
            )));
        }

        let mut scores = [NEUTRAL_TRAIT_SCORE; QUIZ_TRAIT_COUNT];
        for (slot, answer) in scores.iter_mut().zip(answers) {
            if !(0..=MAX_TRAIT_SCORE as i32).contains(answer) {
                return Err(Error::validation(format!(
                    "Quiz scores must be between 0 and {}, got {}",
                    MAX_TRAIT_SCORE, answer
                )));
            }
            if *answer != 0 {
                *slot = *answer as u8;
            }
        }

        Ok(PersonalityTraits::new(scores[0], scores[1], scores[2], scores[3]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use guardian_common::models::ExpectedShape;
    use serde_json::json;

    fn factory() -> RecordFactory {
        RecordFactory::new()
    }

    #[test]
    fn unknown_image_type_is_rejected() {
        let user_id = Uuid::new_v4();
        let result = factory().build(
            user_id,
            RecordInput::Medical {
                image_type: "ultrasound".into(),
                payload: NormalizedPayload::Fallback {
                    raw_text: String::new(),
                    shape: ExpectedShape::XrayFindings,
                },
                coins_earned: 25,
            },
        );
        assert!(matches!(result, Err(Error::Validation(_))));
    }

    #[test]
    fn workout_record_starts_incomplete() {
        let user_id = Uuid::new_v4();
        let record = factory()
            .build(
                user_id,
                RecordInput::Workout { workout_type: "yoga".into(), exercises: vec![] },
            )
            .unwrap();
        match record {
            AnalysisRecord::WorkoutSession(session) => {
                assert!(!session.completed);
                assert_eq!(session.workout_type, WorkoutType::Yoga);
                assert_eq!(session.user_id, user_id);
            }
            other => panic!("unexpected record {:?}", other),
        }
        assert!(factory().workout_type("pilates").is_err());
    }

    #[test]
    fn activity_derives_distance_and_calories() {
        let record = factory()
            .build(Uuid::new_v4(), RecordInput::Activity { steps: 10_000, date: None })
            .unwrap();
        let AnalysisRecord::ActivityEntry(entry) = record else {
            panic!("expected activity entry");
        };
        assert_eq!(entry.distance_km, 8.0);
        assert_eq!(entry.calories, 400);

        let negative = factory().build(Uuid::new_v4(), RecordInput::Activity { steps: -1, date: None });
        assert!(matches!(negative, Err(Error::Validation(_))));
    }

    #[test]
    fn mood_requires_both_fields() {
        assert!(factory().validate_mood("happy", "   ").is_err());
        assert!(factory().validate_mood("", "long day").is_err());
        assert_eq!(
            factory().validate_mood(" happy ", "good day").unwrap(),
            ("happy".to_string(), "good day".to_string())
        );
    }

    #[test]
    fn image_validation() {
        let f = factory();
        assert!(f.validate_image(&ImageAttachment::new("image/png", vec![])).is_err());
        assert!(f.validate_image(&ImageAttachment::new("text/plain", vec![1])).is_err());
        assert!(f
            .validate_image(&ImageAttachment::new("image/png", vec![0; MAX_IMAGE_BYTES + 1]))
            .is_err());
        assert!(f.validate_image(&ImageAttachment::new("image/jpeg", vec![1, 2])).is_ok());
    }

    #[test]
    fn quiz_answers_map_to_traits() {
        let f = factory();
        assert_eq!(
            f.traits_from_answers(&[80, 0, 60, 90, 10]).unwrap(),
            PersonalityTraits::new(80, NEUTRAL_TRAIT_SCORE, 60, 90)
        );
        assert!(f.traits_from_answers(&[80, 80, 80]).is_err());
        assert!(f.traits_from_answers(&[80, 80, 80, 101]).is_err());
        assert!(f.traits_from_answers(&[-5, 80, 80, 80]).is_err());
    }

    #[test]
    fn enrichment_keeps_defaults_for_missing_fields() {
        let payload = NormalizedPayload::Structured(
            json!({"sentiment": "anxious", "theme": ""}).as_object().unwrap().clone(),
        );
        let enrichment = MoodEnrichment::from_payload(&payload);
        assert_eq!(enrichment.sentiment, "anxious");
        assert_eq!(enrichment.theme, DEFAULT_THEME);
    }
}
