// src/services/mod.rs

pub mod archetype;
pub mod ledger;
pub mod pipeline;
pub mod records;
pub mod rewards;
pub mod workouts;

pub use ledger::RewardLedger;
pub use pipeline::{
    ActionKind, ActivityInput, AiRequirement, AnalysisPipeline, CompletionOutcome,
    MedicalImageInput, MoodInput, PipelineOutcome, QuizAnswers, QuizOutcome, WorkoutRequest,
};
pub use rewards::RewardPolicy;
