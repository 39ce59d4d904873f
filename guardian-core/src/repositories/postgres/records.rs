// src/repositories/postgres/records.rs

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::types::Json;
use sqlx::{Pool, Postgres, Row};
use uuid::Uuid;

use guardian_common::models::{
    ActivityEntry, AnalysisRecord, CompletionTransition, Exercise, MedicalAnalysis, MoodLog,
    NormalizedPayload, RecordKind, StoredRecord, WorkoutSession,
};
use guardian_common::traits::RecordRepository;

use crate::Error;

/// One table per record kind; ids are generated here, not by the database.
pub struct PostgresRecordRepository {
    pool: Pool<Postgres>,
}

impl PostgresRecordRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

fn medical_from_row(r: &PgRow) -> Result<StoredRecord, Error> {
    let image_type: String = r.try_get("image_type")?;
    let Json(payload): Json<NormalizedPayload> = r.try_get("analysis")?;
    Ok(StoredRecord {
        id: r.try_get("analysis_id")?,
        record: AnalysisRecord::MedicalAnalysis(MedicalAnalysis {
            user_id: r.try_get("user_id")?,
            image_type: image_type.parse()?,
            payload,
            coins_earned: r.try_get("coins_earned")?,
            timestamp: r.try_get::<DateTime<Utc>, _>("timestamp")?,
        }),
    })
}

fn mood_from_row(r: &PgRow) -> Result<StoredRecord, Error> {
    Ok(StoredRecord {
        id: r.try_get("mood_log_id")?,
        record: AnalysisRecord::MoodLog(MoodLog {
            user_id: r.try_get("user_id")?,
            mood: r.try_get("mood")?,
            mood_text: r.try_get("mood_text")?,
            sentiment: r.try_get("sentiment")?,
            theme: r.try_get("theme")?,
            timestamp: r.try_get::<DateTime<Utc>, _>("timestamp")?,
        }),
    })
}

fn workout_from_row(r: &PgRow) -> Result<StoredRecord, Error> {
    let workout_type: String = r.try_get("workout_type")?;
    let Json(exercises): Json<Vec<Exercise>> = r.try_get("exercises")?;
    Ok(StoredRecord {
        id: r.try_get("workout_id")?,
        record: AnalysisRecord::WorkoutSession(WorkoutSession {
            user_id: r.try_get("user_id")?,
            workout_type: workout_type.parse()?,
            exercises,
            completed: r.try_get("completed")?,
            created_at: r.try_get::<DateTime<Utc>, _>("created_at")?,
        }),
    })
}

fn activity_from_row(r: &PgRow) -> Result<StoredRecord, Error> {
    let steps: i64 = r.try_get("steps")?;
    Ok(StoredRecord {
        id: r.try_get("activity_id")?,
        record: AnalysisRecord::ActivityEntry(ActivityEntry {
            user_id: r.try_get("user_id")?,
            steps: steps.max(0) as u64,
            distance_km: r.try_get("distance_km")?,
            calories: r.try_get("calories")?,
            date: r.try_get::<DateTime<Utc>, _>("date")?,
        }),
    })
}

const SELECT_MEDICAL: &str = r#"
    SELECT analysis_id, user_id, image_type, analysis, coins_earned, "timestamp"
    FROM medical_analyses
"#;
const SELECT_MOOD: &str = r#"
    SELECT mood_log_id, user_id, mood, mood_text, sentiment, theme, "timestamp"
    FROM mood_logs
"#;
const SELECT_WORKOUT: &str = r#"
    SELECT workout_id, user_id, workout_type, exercises, completed, created_at
    FROM workouts
"#;
const SELECT_ACTIVITY: &str = r#"
    SELECT activity_id, user_id, steps, distance_km, calories, "date"
    FROM activities
"#;

fn select_for(kind: RecordKind) -> (&'static str, &'static str, &'static str, fn(&PgRow) -> Result<StoredRecord, Error>) {
    match kind {
        RecordKind::MedicalAnalysis => (SELECT_MEDICAL, "analysis_id", "\"timestamp\"", medical_from_row),
        RecordKind::MoodLog => (SELECT_MOOD, "mood_log_id", "\"timestamp\"", mood_from_row),
        RecordKind::WorkoutSession => (SELECT_WORKOUT, "workout_id", "created_at", workout_from_row),
        RecordKind::ActivityEntry => (SELECT_ACTIVITY, "activity_id", "\"date\"", activity_from_row),
    }
}

#[async_trait]
impl RecordRepository for PostgresRecordRepository {
    async fn insert(&self, record: &AnalysisRecord) -> Result<Uuid, Error> {
        let id = Uuid::new_v4();
        match record {
            AnalysisRecord::MedicalAnalysis(m) => {
                sqlx::query(
                    r#"
                    INSERT INTO medical_analyses (
                        analysis_id, user_id, image_type, analysis, coins_earned, "timestamp"
                    )
                    VALUES ($1, $2, $3, $4, $5, $6)
                    "#,
                )
                    .bind(id)
                    .bind(m.user_id)
                    .bind(m.image_type.as_str())
                    .bind(Json(&m.payload))
                    .bind(m.coins_earned)
                    .bind(m.timestamp)
                    .execute(&self.pool)
                    .await?;
            }
            AnalysisRecord::MoodLog(m) => {
                sqlx::query(
                    r#"
                    INSERT INTO mood_logs (
                        mood_log_id, user_id, mood, mood_text, sentiment, theme, "timestamp"
                    )
                    VALUES ($1, $2, $3, $4, $5, $6, $7)
                    "#,
                )
                    .bind(id)
                    .bind(m.user_id)
                    .bind(&m.mood)
                    .bind(&m.mood_text)
                    .bind(&m.sentiment)
                    .bind(&m.theme)
                    .bind(m.timestamp)
                    .execute(&self.pool)
                    .await?;
            }
            AnalysisRecord::WorkoutSession(w) => {
                sqlx::query(
                    r#"
                    INSERT INTO workouts (
                        workout_id, user_id, workout_type, exercises, completed, created_at
                    )
                    VALUES ($1, $2, $3, $4, $5, $6)
                    "#,
                )
                    .bind(id)
                    .bind(w.user_id)
                    .bind(w.workout_type.as_str())
                    .bind(Json(&w.exercises))
                    .bind(w.completed)
                    .bind(w.created_at)
                    .execute(&self.pool)
                    .await?;
            }
            AnalysisRecord::ActivityEntry(a) => {
                let steps = i64::try_from(a.steps)
                    .map_err(|_| Error::validation(format!("steps out of range: {}", a.steps)))?;
                sqlx::query(
                    r#"
                    INSERT INTO activities (
                        activity_id, user_id, steps, distance_km, calories, "date"
                    )
                    VALUES ($1, $2, $3, $4, $5, $6)
                    "#,
                )
                    .bind(id)
                    .bind(a.user_id)
                    .bind(steps)
                    .bind(a.distance_km)
                    .bind(a.calories)
                    .bind(a.date)
                    .execute(&self.pool)
                    .await?;
            }
        }
        Ok(id)
    }

    async fn find_by_user(
        &self,
        user_id: Uuid,
        kind: RecordKind,
        limit: i64,
    ) -> Result<Vec<StoredRecord>, Error> {
        let (select, _, order_column, map_row) = select_for(kind);
        let sql = format!("{} WHERE user_id = $1 ORDER BY {} DESC LIMIT $2", select, order_column);

        let rows = sqlx::query(&sql)
            .bind(user_id)
            .bind(limit.max(0))
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(map_row).collect()
    }

    async fn get(&self, id: Uuid) -> Result<Option<StoredRecord>, Error> {
        for kind in [
            RecordKind::MedicalAnalysis,
            RecordKind::MoodLog,
            RecordKind::WorkoutSession,
            RecordKind::ActivityEntry,
        ] {
            let (select, id_column, _, map_row) = select_for(kind);
            let sql = format!("{} WHERE {} = $1", select, id_column);
            if let Some(row) = sqlx::query(&sql).bind(id).fetch_optional(&self.pool).await? {
                return map_row(&row).map(Some);
            }
        }
        Ok(None)
    }

    async fn mark_workout_completed(
        &self,
        user_id: Uuid,
        workout_id: Uuid,
    ) -> Result<CompletionTransition, Error> {
        let updated = sqlx::query(
            r#"
            UPDATE workouts
            SET completed = TRUE
            WHERE workout_id = $1 AND user_id = $2 AND completed = FALSE
            "#,
        )
            .bind(workout_id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        if updated.rows_affected() == 1 {
            return Ok(CompletionTransition::Completed);
        }

        let existing = sqlx::query("SELECT completed FROM workouts WHERE workout_id = $1 AND user_id = $2")
            .bind(workout_id)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(match existing {
            Some(_) => CompletionTransition::AlreadyCompleted,
            None => CompletionTransition::NotFound,
        })
    }
}
