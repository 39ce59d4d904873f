// File: guardian-core/src/test_utils/memory.rs
//
// In-memory stand-ins for the Postgres repositories. DashMap entries give the
// same per-user atomicity the SQL `UPDATE ... RETURNING` statement gives.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use async_trait::async_trait;
use dashmap::DashMap;
use uuid::Uuid;

use guardian_common::models::{
    AnalysisRecord, CompletionTransition, PersonalityTraits, RecordKind, StoredRecord, UserAccount,
};
use guardian_common::traits::{RecordRepository, UserStore};
use guardian_common::Error;

#[derive(Default)]
pub struct InMemoryRecordRepository {
    records: DashMap<Uuid, (u64, StoredRecord)>,
    sequence: AtomicU64,
    fail_inserts: AtomicBool,
}

impl InMemoryRecordRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every later `insert` fail with a database error.
    pub fn fail_inserts(&self, fail: bool) {
        self.fail_inserts.store(fail, Ordering::SeqCst);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn count_for(&self, user_id: Uuid, kind: RecordKind) -> usize {
        self.records
            .iter()
            .filter(|e| e.value().1.record.user_id() == user_id && e.value().1.record.kind() == kind)
            .count()
    }
}

#[async_trait]
impl RecordRepository for InMemoryRecordRepository {
    async fn insert(&self, record: &AnalysisRecord) -> Result<Uuid, Error> {
        if self.fail_inserts.load(Ordering::SeqCst) {
            return Err(Error::Database(sqlx::Error::PoolTimedOut));
        }
        let id = Uuid::new_v4();
        let seq = self.sequence.fetch_add(1, Ordering::SeqCst);
        self.records.insert(id, (seq, StoredRecord { id, record: record.clone() }));
        Ok(id)
    }

    async fn find_by_user(
        &self,
        user_id: Uuid,
        kind: RecordKind,
        limit: i64,
    ) -> Result<Vec<StoredRecord>, Error> {
        let mut matching: Vec<(u64, StoredRecord)> = self
            .records
            .iter()
            .filter(|e| e.value().1.record.user_id() == user_id && e.value().1.record.kind() == kind)
            .map(|e| e.value().clone())
            .collect();

        matching.sort_by(|(seq_a, a), (seq_b, b)| {
            b.record
                .recorded_at()
                .cmp(&a.record.recorded_at())
                .then(seq_b.cmp(seq_a))
        });

        Ok(matching
            .into_iter()
            .take(limit.max(0) as usize)
            .map(|(_, stored)| stored)
            .collect())
    }

    async fn get(&self, id: Uuid) -> Result<Option<StoredRecord>, Error> {
        Ok(self.records.get(&id).map(|e| e.value().1.clone()))
    }

    async fn mark_workout_completed(
        &self,
        user_id: Uuid,
        workout_id: Uuid,
    ) -> Result<CompletionTransition, Error> {
        let Some(mut entry) = self.records.get_mut(&workout_id) else {
            return Ok(CompletionTransition::NotFound);
        };
        match &mut entry.value_mut().1.record {
            AnalysisRecord::WorkoutSession(session) if session.user_id == user_id => {
                if session.completed {
                    Ok(CompletionTransition::AlreadyCompleted)
                } else {
                    session.completed = true;
                    Ok(CompletionTransition::Completed)
                }
            }
            _ => Ok(CompletionTransition::NotFound),
        }
    }
}

#[derive(Default)]
pub struct InMemoryUserStore {
    users: DashMap<Uuid, UserAccount>,
    fail_credits: AtomicBool,
    fail_profile_writes: AtomicBool,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a fresh account and return its id.
    pub fn add_user(&self, display_name: &str) -> Uuid {
        let account = UserAccount::new(display_name);
        let id = account.user_id;
        self.users.insert(id, account);
        id
    }

    pub fn user(&self, user_id: Uuid) -> Option<UserAccount> {
        self.users.get(&user_id).map(|u| u.clone())
    }

    /// Make every later `apply_credit` fail as if storage were down.
    pub fn fail_credits(&self, fail: bool) {
        self.fail_credits.store(fail, Ordering::SeqCst);
    }

    /// Make every later quiz write fail as if storage were down.
    pub fn fail_profile_writes(&self, fail: bool) {
        self.fail_profile_writes.store(fail, Ordering::SeqCst);
    }

    fn missing(user_id: Uuid) -> Error {
        Error::NotFound(format!("user {}", user_id))
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn get_balance(&self, user_id: Uuid) -> Result<i64, Error> {
        self.users
            .get(&user_id)
            .map(|u| u.guardian_coins)
            .ok_or_else(|| Self::missing(user_id))
    }

    async fn apply_credit(&self, user_id: Uuid, amount: i64) -> Result<i64, Error> {
        if self.fail_credits.load(Ordering::SeqCst) {
            return Err(Error::Database(sqlx::Error::PoolTimedOut));
        }
        let mut user = self.users.get_mut(&user_id).ok_or_else(|| Self::missing(user_id))?;
        user.guardian_coins += amount;
        Ok(user.guardian_coins)
    }

    async fn get_archetype(&self, user_id: Uuid) -> Result<Option<String>, Error> {
        self.users
            .get(&user_id)
            .map(|u| u.archetype.clone())
            .ok_or_else(|| Self::missing(user_id))
    }

    async fn set_archetype(&self, user_id: Uuid, archetype: &str) -> Result<(), Error> {
        let mut user = self.users.get_mut(&user_id).ok_or_else(|| Self::missing(user_id))?;
        user.archetype = Some(archetype.to_string());
        Ok(())
    }

    async fn set_traits(&self, user_id: Uuid, traits: &PersonalityTraits) -> Result<(), Error> {
        let mut user = self.users.get_mut(&user_id).ok_or_else(|| Self::missing(user_id))?;
        user.personality_traits = *traits;
        user.quiz_completed = true;
        Ok(())
    }

    async fn record_quiz(
        &self,
        user_id: Uuid,
        traits: &PersonalityTraits,
        archetype: &str,
    ) -> Result<(), Error> {
        if self.fail_profile_writes.load(Ordering::SeqCst) {
            return Err(Error::Database(sqlx::Error::PoolTimedOut));
        }
        let mut user = self.users.get_mut(&user_id).ok_or_else(|| Self::missing(user_id))?;
        user.personality_traits = *traits;
        user.archetype = Some(archetype.to_string());
        user.quiz_completed = true;
        Ok(())
    }
}
