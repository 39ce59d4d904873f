use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Why coins were credited. Carried into logs; not persisted on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RewardReason {
    MedicalAnalysis,
    MoodLog,
    WorkoutGenerated,
    WorkoutCompleted,
    QuizCompleted,
    StepActivity,
    /// Manual or test credits.
    Adjustment,
}

impl RewardReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            RewardReason::MedicalAnalysis => "medical_analysis",
            RewardReason::MoodLog => "mood_log",
            RewardReason::WorkoutGenerated => "workout_generated",
            RewardReason::WorkoutCompleted => "workout_completed",
            RewardReason::QuizCompleted => "quiz_completed",
            RewardReason::StepActivity => "step_activity",
            RewardReason::Adjustment => "adjustment",
        }
    }
}

impl fmt::Display for RewardReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardCredit {
    pub user_id: Uuid,
    pub amount: i64,
    pub reason: RewardReason,
}

impl RewardCredit {
    pub fn new(user_id: Uuid, amount: i64, reason: RewardReason) -> Self {
        Self { user_id, amount, reason }
    }
}
