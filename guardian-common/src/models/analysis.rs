use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::Error;
use crate::models::payload::NormalizedPayload;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageType {
    Xray,
    Prescription,
    Report,
}

impl ImageType {
    pub const ALL: [ImageType; 3] = [ImageType::Xray, ImageType::Prescription, ImageType::Report];

    pub fn as_str(&self) -> &'static str {
        match self {
            ImageType::Xray => "xray",
            ImageType::Prescription => "prescription",
            ImageType::Report => "report",
        }
    }
}

impl FromStr for ImageType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "xray" => Ok(ImageType::Xray),
            "prescription" => Ok(ImageType::Prescription),
            "report" => Ok(ImageType::Report),
            other => Err(Error::Validation(format!(
                "Invalid image type '{}'. Use: xray, prescription, or report",
                other
            ))),
        }
    }
}

impl fmt::Display for ImageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkoutType {
    Strength,
    Cardio,
    Yoga,
    Flexibility,
    Custom,
}

impl WorkoutType {
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkoutType::Strength => "strength",
            WorkoutType::Cardio => "cardio",
            WorkoutType::Yoga => "yoga",
            WorkoutType::Flexibility => "flexibility",
            WorkoutType::Custom => "custom",
        }
    }
}

impl FromStr for WorkoutType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "strength" => Ok(WorkoutType::Strength),
            "cardio" => Ok(WorkoutType::Cardio),
            "yoga" => Ok(WorkoutType::Yoga),
            "flexibility" => Ok(WorkoutType::Flexibility),
            "custom" => Ok(WorkoutType::Custom),
            other => Err(Error::Validation(format!(
                "Invalid workout type '{}'. Use: strength, cardio, yoga, flexibility, or custom",
                other
            ))),
        }
    }
}

impl fmt::Display for WorkoutType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One exercise in a workout. `duration` is in minutes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Exercise {
    pub name: String,
    pub sets: u32,
    pub reps: u32,
    pub duration: u32,
    #[serde(default)]
    pub focus_tip: String,
}

impl Exercise {
    pub fn new(name: &str, sets: u32, reps: u32, duration: u32, focus_tip: &str) -> Self {
        Self {
            name: name.to_string(),
            sets,
            reps,
            duration,
            focus_tip: focus_tip.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MedicalAnalysis {
    pub user_id: Uuid,
    pub image_type: ImageType,
    pub payload: NormalizedPayload,
    pub coins_earned: i64,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoodLog {
    pub user_id: Uuid,
    pub mood: String,
    pub mood_text: String,
    pub sentiment: String,
    pub theme: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkoutSession {
    pub user_id: Uuid,
    pub workout_type: WorkoutType,
    pub exercises: Vec<Exercise>,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityEntry {
    pub user_id: Uuid,
    pub steps: u64,
    pub distance_km: f64,
    pub calories: i64,
    pub date: DateTime<Utc>,
}

/// The record kinds the repository stores. Used to scope history queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    MedicalAnalysis,
    MoodLog,
    WorkoutSession,
    ActivityEntry,
}

impl RecordKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordKind::MedicalAnalysis => "medical_analysis",
            RecordKind::MoodLog => "mood_log",
            RecordKind::WorkoutSession => "workout_session",
            RecordKind::ActivityEntry => "activity_entry",
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "record_type", rename_all = "snake_case")]
pub enum AnalysisRecord {
    MedicalAnalysis(MedicalAnalysis),
    MoodLog(MoodLog),
    WorkoutSession(WorkoutSession),
    ActivityEntry(ActivityEntry),
}

impl AnalysisRecord {
    pub fn kind(&self) -> RecordKind {
        match self {
            AnalysisRecord::MedicalAnalysis(_) => RecordKind::MedicalAnalysis,
            AnalysisRecord::MoodLog(_) => RecordKind::MoodLog,
            AnalysisRecord::WorkoutSession(_) => RecordKind::WorkoutSession,
            AnalysisRecord::ActivityEntry(_) => RecordKind::ActivityEntry,
        }
    }

    pub fn user_id(&self) -> Uuid {
        match self {
            AnalysisRecord::MedicalAnalysis(r) => r.user_id,
            AnalysisRecord::MoodLog(r) => r.user_id,
            AnalysisRecord::WorkoutSession(r) => r.user_id,
            AnalysisRecord::ActivityEntry(r) => r.user_id,
        }
    }

    /// Creation time, used for newest-first ordering.
    pub fn recorded_at(&self) -> DateTime<Utc> {
        match self {
            AnalysisRecord::MedicalAnalysis(r) => r.timestamp,
            AnalysisRecord::MoodLog(r) => r.timestamp,
            AnalysisRecord::WorkoutSession(r) => r.created_at,
            AnalysisRecord::ActivityEntry(r) => r.date,
        }
    }
}

/// A record together with the id the repository assigned to it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredRecord {
    pub id: Uuid,
    pub record: AnalysisRecord,
}

/// Result of flipping `WorkoutSession.completed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionTransition {
    Completed,
    AlreadyCompleted,
    NotFound,
}
