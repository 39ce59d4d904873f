// File: guardian-core/tests/ledger_tests.rs

use std::sync::Arc;

use futures_util::future::join_all;
use tokio_test::assert_err;
use uuid::Uuid;

use guardian_common::models::RewardReason;
use guardian_common::Error;
use guardian_core::services::ledger::RewardLedger;
use guardian_core::test_utils::InMemoryUserStore;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_credits_never_lose_updates() -> Result<(), Error> {
    let users = Arc::new(InMemoryUserStore::new());
    let user_id = users.add_user("grace");
    let ledger = RewardLedger::new(users.clone());

    const N: i64 = 200;
    let tasks = (0..N).map(|_| {
        let ledger = ledger.clone();
        tokio::spawn(async move { ledger.credit(user_id, 10, RewardReason::Adjustment).await })
    });

    for joined in join_all(tasks).await {
        joined.expect("credit task panicked")?;
    }

    assert_eq!(ledger.balance(user_id).await?, 10 * N);
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn credits_to_different_users_are_independent() -> Result<(), Error> {
    let users = Arc::new(InMemoryUserStore::new());
    let alice = users.add_user("alice");
    let bob = users.add_user("bob");
    let ledger = RewardLedger::new(users.clone());

    let tasks = (0..50).map(|i| {
        let ledger = ledger.clone();
        let (user, amount) = if i % 2 == 0 { (alice, 25) } else { (bob, 10) };
        tokio::spawn(async move { ledger.credit(user, amount, RewardReason::Adjustment).await })
    });
    for joined in join_all(tasks).await {
        joined.expect("credit task panicked")?;
    }

    assert_eq!(ledger.balance(alice).await?, 25 * 25);
    assert_eq!(ledger.balance(bob).await?, 25 * 10);
    Ok(())
}

#[tokio::test]
async fn credit_returns_new_balance() -> Result<(), Error> {
    let users = Arc::new(InMemoryUserStore::new());
    let user_id = users.add_user("linus");
    let ledger = RewardLedger::new(users.clone());

    assert_eq!(ledger.credit(user_id, 25, RewardReason::MedicalAnalysis).await?, 25);
    assert_eq!(ledger.credit(user_id, 0, RewardReason::StepActivity).await?, 25);
    assert_eq!(ledger.credit(user_id, 100, RewardReason::QuizCompleted).await?, 125);
    Ok(())
}

#[tokio::test]
async fn negative_credit_is_rejected() {
    let users = Arc::new(InMemoryUserStore::new());
    let user_id = users.add_user("ken");
    let ledger = RewardLedger::new(users.clone());

    let err = assert_err!(ledger.credit(user_id, -5, RewardReason::Adjustment).await);
    assert!(matches!(err, Error::Validation(_)));
    assert_eq!(users.user(user_id).unwrap().guardian_coins, 0);
}

#[tokio::test]
async fn storage_failures_surface_as_ledger_errors() {
    let users = Arc::new(InMemoryUserStore::new());
    let user_id = users.add_user("barbara");
    users.fail_credits(true);
    let ledger = RewardLedger::new(users.clone());

    let err = assert_err!(ledger.credit(user_id, 10, RewardReason::MoodLog).await);
    assert!(matches!(err, Error::Ledger(_)));
}

#[tokio::test]
async fn unknown_user_is_not_found() {
    let ledger = RewardLedger::new(Arc::new(InMemoryUserStore::new()));

    let err = assert_err!(ledger.credit(Uuid::new_v4(), 10, RewardReason::MoodLog).await);
    assert!(matches!(err, Error::NotFound(_)));
}
