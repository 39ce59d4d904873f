use async_trait::async_trait;
use uuid::Uuid;

use crate::error::Error;
use crate::models::{AnalysisRecord, CompletionTransition, PersonalityTraits, RecordKind, StoredRecord};

/// Storage for analysis records. Records are keyed by user through
/// `AnalysisRecord::user_id`; nothing here updates a record except the
/// one-way workout completion flag.
#[async_trait]
pub trait RecordRepository: Send + Sync {
    /// Persist a record and return its new id.
    async fn insert(&self, record: &AnalysisRecord) -> Result<Uuid, Error>;

    /// Records of one kind for one user, newest first.
    async fn find_by_user(
        &self,
        user_id: Uuid,
        kind: RecordKind,
        limit: i64,
    ) -> Result<Vec<StoredRecord>, Error>;

    async fn get(&self, id: Uuid) -> Result<Option<StoredRecord>, Error>;

    /// Flip `completed` from false to true for a workout owned by `user_id`.
    async fn mark_workout_completed(
        &self,
        user_id: Uuid,
        workout_id: Uuid,
    ) -> Result<CompletionTransition, Error>;
}

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn get_balance(&self, user_id: Uuid) -> Result<i64, Error>;

    /// Add `amount` to the balance as a single atomic step and return the
    /// resulting balance. Implementations must not read-modify-write.
    async fn apply_credit(&self, user_id: Uuid, amount: i64) -> Result<i64, Error>;

    async fn get_archetype(&self, user_id: Uuid) -> Result<Option<String>, Error>;
    async fn set_archetype(&self, user_id: Uuid, archetype: &str) -> Result<(), Error>;

    /// Store quiz-derived traits and mark the quiz as completed.
    async fn set_traits(&self, user_id: Uuid, traits: &PersonalityTraits) -> Result<(), Error>;

    /// Store traits and archetype and mark the quiz completed, as one write.
    async fn record_quiz(
        &self,
        user_id: Uuid,
        traits: &PersonalityTraits,
        archetype: &str,
    ) -> Result<(), Error>;
}
