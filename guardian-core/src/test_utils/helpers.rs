// File: guardian-core/src/test_utils/helpers.rs

use sqlx::postgres::PgPoolOptions;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use crate::db::Database;
use crate::Error;

/// Create a connection pool to the test DB.
/// Looks for `TEST_DATABASE_URL` in env,
/// else uses `postgres://guardian@localhost/guardian_test`.
pub async fn create_test_db_pool() -> Result<Pool<Postgres>, Error> {
    let url = std::env::var("TEST_DATABASE_URL")
        .unwrap_or_else(|_| "postgres://guardian@localhost/guardian_test".to_string());

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&url)
        .await?;

    Ok(pool)
}

/// Wipes out test data so each test can start fresh.
pub async fn clean_database(pool: &Pool<Postgres>) -> Result<(), Error> {
    sqlx::query(
        r#"
        TRUNCATE TABLE
            activities,
            workouts,
            mood_logs,
            medical_analyses,
            users
        CASCADE
        "#,
    )
        .execute(pool)
        .await?;
    Ok(())
}

/// Connect, migrate and truncate.
pub async fn setup_test_database() -> Result<Database, Error> {
    let pool = create_test_db_pool().await?;
    let db = Database::from_pool(pool);
    db.migrate().await?;
    clean_database(db.pool()).await?;
    Ok(db)
}

/// Insert a bare user row and return its id.
pub async fn insert_test_user(pool: &Pool<Postgres>, display_name: &str) -> Result<Uuid, Error> {
    let user_id = Uuid::new_v4();
    sqlx::query("INSERT INTO users (user_id, display_name) VALUES ($1, $2)")
        .bind(user_id)
        .bind(display_name)
        .execute(pool)
        .await?;
    Ok(user_id)
}
