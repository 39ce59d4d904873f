// File: guardian-common/src/models/mod.rs
pub mod analysis;
pub mod payload;
pub mod reward;
pub mod user;

pub use analysis::{
    ActivityEntry, AnalysisRecord, CompletionTransition, Exercise, ImageType, MedicalAnalysis,
    MoodLog, RecordKind, StoredRecord, WorkoutSession, WorkoutType,
};
pub use payload::{ExpectedShape, FieldKind, NormalizedPayload};
pub use reward::{RewardCredit, RewardReason};
pub use user::{PersonalityTraits, UserAccount};
