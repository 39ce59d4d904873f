// File: guardian-core/tests/repository_tests.rs
//
// Needs a disposable Postgres database: set TEST_DATABASE_URL and run with
// `--ignored --test-threads=1` (each test truncates the tables).

use chrono::{Duration, Utc};
use futures_util::future::join_all;
use uuid::Uuid;

use guardian_common::models::{
    ActivityEntry, AnalysisRecord, CompletionTransition, ExpectedShape, ImageType,
    MedicalAnalysis, MoodLog, NormalizedPayload, PersonalityTraits, RecordKind, UserAccount,
    WorkoutSession, WorkoutType,
};
use guardian_common::traits::{RecordRepository, UserStore};
use guardian_core::repositories::{PostgresRecordRepository, PostgresUserStore};
use guardian_core::services::workouts::default_exercises;
use guardian_core::test_utils::helpers::*;
use guardian_core::Error;

#[tokio::test]
#[ignore = "requires TEST_DATABASE_URL"]
async fn test_user_store_credit_and_profile() -> Result<(), Error> {
    let db = setup_test_database().await?;
    let store = PostgresUserStore::new(db.pool().clone());

    let account = UserAccount::new("ada");
    store.create(&account).await?;

    assert_eq!(store.get_balance(account.user_id).await?, 0);
    assert_eq!(store.apply_credit(account.user_id, 25).await?, 25);
    assert_eq!(store.apply_credit(account.user_id, 10).await?, 35);

    store.set_traits(account.user_id, &PersonalityTraits::new(80, 75, 40, 60)).await?;
    store.set_archetype(account.user_id, "Solar Athlete").await?;
    assert_eq!(store.get_archetype(account.user_id).await?.as_deref(), Some("Solar Athlete"));

    let stored = store.get(account.user_id).await?.expect("user should exist");
    assert!(stored.quiz_completed);
    assert_eq!(stored.personality_traits.social, 75);
    assert_eq!(stored.guardian_coins, 35);

    store
        .record_quiz(account.user_id, &PersonalityTraits::new(20, 30, 80, 80), "Lunar Dreamer")
        .await?;
    let retaken = store.get(account.user_id).await?.expect("user should exist");
    assert_eq!(retaken.archetype.as_deref(), Some("Lunar Dreamer"));
    assert_eq!(retaken.personality_traits.planning, 80);
    assert!(matches!(
        store.record_quiz(Uuid::new_v4(), &PersonalityTraits::new(50, 50, 50, 50), "x").await,
        Err(Error::NotFound(_))
    ));

    let missing = store.apply_credit(Uuid::new_v4(), 10).await;
    assert!(matches!(missing, Err(Error::NotFound(_))));
    Ok(())
}

#[tokio::test]
#[ignore = "requires TEST_DATABASE_URL"]
async fn test_concurrent_credits_are_atomic() -> Result<(), Error> {
    let db = setup_test_database().await?;
    let user_id = insert_test_user(db.pool(), "grace").await?;

    let tasks = (0..50).map(|_| {
        let store = PostgresUserStore::new(db.pool().clone());
        tokio::spawn(async move { store.apply_credit(user_id, 10).await })
    });
    for joined in join_all(tasks).await {
        joined.expect("credit task panicked")?;
    }

    let store = PostgresUserStore::new(db.pool().clone());
    assert_eq!(store.get_balance(user_id).await?, 500);
    Ok(())
}

#[tokio::test]
#[ignore = "requires TEST_DATABASE_URL"]
async fn test_record_round_trip_and_ordering() -> Result<(), Error> {
    let db = setup_test_database().await?;
    let user_id = insert_test_user(db.pool(), "linus").await?;
    let repo = PostgresRecordRepository::new(db.pool().clone());

    let now = Utc::now();
    let older = repo
        .insert(&AnalysisRecord::MoodLog(MoodLog {
            user_id,
            mood: "tired".into(),
            mood_text: "Long week".into(),
            sentiment: "neutral".into(),
            theme: "General wellbeing".into(),
            timestamp: now - Duration::minutes(5),
        }))
        .await?;
    let newer = repo
        .insert(&AnalysisRecord::MoodLog(MoodLog {
            user_id,
            mood: "happy".into(),
            mood_text: "Great run".into(),
            sentiment: "joyful".into(),
            theme: "Exercise".into(),
            timestamp: now,
        }))
        .await?;

    let moods = repo.find_by_user(user_id, RecordKind::MoodLog, 30).await?;
    assert_eq!(moods.iter().map(|r| r.id).collect::<Vec<_>>(), vec![newer, older]);
    assert_eq!(repo.find_by_user(user_id, RecordKind::MoodLog, 1).await?.len(), 1);

    let medical_id = repo
        .insert(&AnalysisRecord::MedicalAnalysis(MedicalAnalysis {
            user_id,
            image_type: ImageType::Report,
            payload: NormalizedPayload::Fallback {
                raw_text: "unreadable".into(),
                shape: ExpectedShape::PrescriptionDetails,
            },
            coins_earned: 25,
            timestamp: now,
        }))
        .await?;
    let stored = repo.get(medical_id).await?.expect("medical record should exist");
    match stored.record {
        AnalysisRecord::MedicalAnalysis(m) => {
            assert_eq!(m.image_type, ImageType::Report);
            assert!(!m.payload.is_structured());
        }
        other => panic!("unexpected record {:?}", other),
    }

    let activity_id = repo
        .insert(&AnalysisRecord::ActivityEntry(ActivityEntry {
            user_id,
            steps: 10_000,
            distance_km: 8.0,
            calories: 400,
            date: now,
        }))
        .await?;
    let activities = repo.find_by_user(user_id, RecordKind::ActivityEntry, 30).await?;
    assert_eq!(activities.len(), 1);
    assert_eq!(activities[0].id, activity_id);
    Ok(())
}

#[tokio::test]
#[ignore = "requires TEST_DATABASE_URL"]
async fn test_workout_completes_once_per_owner() -> Result<(), Error> {
    let db = setup_test_database().await?;
    let owner = insert_test_user(db.pool(), "barbara").await?;
    let stranger = insert_test_user(db.pool(), "mallory").await?;
    let repo = PostgresRecordRepository::new(db.pool().clone());

    let workout_id = repo
        .insert(&AnalysisRecord::WorkoutSession(WorkoutSession {
            user_id: owner,
            workout_type: WorkoutType::Flexibility,
            exercises: default_exercises(WorkoutType::Flexibility),
            completed: false,
            created_at: Utc::now(),
        }))
        .await?;

    assert_eq!(repo.mark_workout_completed(stranger, workout_id).await?, CompletionTransition::NotFound);
    assert_eq!(repo.mark_workout_completed(owner, workout_id).await?, CompletionTransition::Completed);
    assert_eq!(
        repo.mark_workout_completed(owner, workout_id).await?,
        CompletionTransition::AlreadyCompleted
    );

    let stored = repo.get(workout_id).await?.expect("workout should exist");
    match stored.record {
        AnalysisRecord::WorkoutSession(w) => {
            assert!(w.completed);
            assert_eq!(w.exercises, default_exercises(WorkoutType::Flexibility));
        }
        other => panic!("unexpected record {:?}", other),
    }
    Ok(())
}
