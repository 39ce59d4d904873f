//! Coin amounts for each action: fixed awards plus the step tier table.

use serde::{Deserialize, Serialize};

use guardian_common::models::RewardReason;

pub const MEDICAL_ANALYSIS_REWARD: i64 = 25;
pub const MOOD_LOG_REWARD: i64 = 10;
pub const WORKOUT_GENERATED_REWARD: i64 = 20;
pub const WORKOUT_COMPLETED_REWARD: i64 = 30;
pub const QUIZ_COMPLETED_REWARD: i64 = 100;

pub const KM_PER_STEP: f64 = 0.0008;
pub const CALORIES_PER_STEP: f64 = 0.04;

/// Awards `coins` when a day's steps reach `min_steps`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepTier {
    pub min_steps: u64,
    pub coins: i64,
}

/// Ordered highest threshold first; the first tier reached wins.
pub const DEFAULT_STEP_TIERS: [StepTier; 3] = [
    StepTier { min_steps: 10_000, coins: 50 },
    StepTier { min_steps: 5_000, coins: 25 },
    StepTier { min_steps: 2_000, coins: 10 },
];

fn first_matching_tier(tiers: &[StepTier], steps: u64) -> i64 {
    tiers
        .iter()
        .find(|tier| steps >= tier.min_steps)
        .map(|tier| tier.coins)
        .unwrap_or(0)
}

pub fn reward_for_steps(steps: u64) -> i64 {
    first_matching_tier(&DEFAULT_STEP_TIERS, steps)
}

/// Kilometres walked, rounded to two decimals.
pub fn distance_km(steps: u64) -> f64 {
    (steps as f64 * KM_PER_STEP * 100.0).round() / 100.0
}

pub fn calories(steps: u64) -> i64 {
    (steps as f64 * CALORIES_PER_STEP).round() as i64
}

/// The reward economy. Defaults match the constants above; deployments may
/// override individual awards through configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardPolicy {
    pub medical_analysis: i64,
    pub mood_log: i64,
    pub workout_generated: i64,
    pub workout_completed: i64,
    pub quiz_completed: i64,
    pub step_tiers: Vec<StepTier>,
}

impl Default for RewardPolicy {
    fn default() -> Self {
        Self {
            medical_analysis: MEDICAL_ANALYSIS_REWARD,
            mood_log: MOOD_LOG_REWARD,
            workout_generated: WORKOUT_GENERATED_REWARD,
            workout_completed: WORKOUT_COMPLETED_REWARD,
            quiz_completed: QUIZ_COMPLETED_REWARD,
            step_tiers: DEFAULT_STEP_TIERS.to_vec(),
        }
    }
}

impl RewardPolicy {
    /// Fixed award for an action. Step activity is tiered, see `coins_for_steps`.
    pub fn fixed_award(&self, reason: RewardReason) -> i64 {
        match reason {
            RewardReason::MedicalAnalysis => self.medical_analysis,
            RewardReason::MoodLog => self.mood_log,
            RewardReason::WorkoutGenerated => self.workout_generated,
            RewardReason::WorkoutCompleted => self.workout_completed,
            RewardReason::QuizCompleted => self.quiz_completed,
            RewardReason::StepActivity | RewardReason::Adjustment => 0,
        }
    }

    pub fn coins_for_steps(&self, steps: u64) -> i64 {
        first_matching_tier(&self.step_tiers, steps)
    }

    /// Keep tiers ordered highest threshold first so first-match stays correct.
    pub fn with_step_tiers(mut self, mut tiers: Vec<StepTier>) -> Self {
        tiers.sort_by(|a, b| b.min_steps.cmp(&a.min_steps));
        self.step_tiers = tiers;
        self
    }
}
