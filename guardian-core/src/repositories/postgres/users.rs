// src/repositories/postgres/users.rs

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Pool, Postgres, Row};
use uuid::Uuid;

use guardian_common::models::{PersonalityTraits, UserAccount};
use guardian_common::traits::UserStore;

use crate::Error;

pub struct PostgresUserStore {
    pool: Pool<Postgres>,
}

impl PostgresUserStore {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    pub async fn create(&self, user: &UserAccount) -> Result<(), Error> {
        sqlx::query(
            r#"
            INSERT INTO users (
                user_id, display_name, guardian_coins, archetype,
                trait_energy, trait_social, trait_planning, trait_thinking,
                quiz_completed, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
            .bind(user.user_id)
            .bind(&user.display_name)
            .bind(user.guardian_coins)
            .bind(&user.archetype)
            .bind(user.personality_traits.energy as i16)
            .bind(user.personality_traits.social as i16)
            .bind(user.personality_traits.planning as i16)
            .bind(user.personality_traits.thinking as i16)
            .bind(user.quiz_completed)
            .bind(user.created_at)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn get(&self, user_id: Uuid) -> Result<Option<UserAccount>, Error> {
        let row = sqlx::query(
            r#"
            SELECT user_id,
                   display_name,
                   guardian_coins,
                   archetype,
                   trait_energy,
                   trait_social,
                   trait_planning,
                   trait_thinking,
                   quiz_completed,
                   created_at
            FROM users
            WHERE user_id = $1
            "#,
        )
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;

        let Some(r) = row else {
            return Ok(None);
        };

        let score = |column: &str| -> Result<u8, Error> {
            let value: i16 = r.try_get(column)?;
            u8::try_from(value)
                .map_err(|_| Error::validation(format!("{} out of range: {}", column, value)))
        };

        Ok(Some(UserAccount {
            user_id: r.try_get("user_id")?,
            display_name: r.try_get("display_name")?,
            guardian_coins: r.try_get("guardian_coins")?,
            archetype: r.try_get("archetype")?,
            personality_traits: PersonalityTraits::new(
                score("trait_energy")?,
                score("trait_social")?,
                score("trait_planning")?,
                score("trait_thinking")?,
            ),
            quiz_completed: r.try_get("quiz_completed")?,
            created_at: r.try_get::<DateTime<Utc>, _>("created_at")?,
        }))
    }

    fn missing(user_id: Uuid) -> Error {
        Error::NotFound(format!("user {}", user_id))
    }
}

#[async_trait]
impl UserStore for PostgresUserStore {
    async fn get_balance(&self, user_id: Uuid) -> Result<i64, Error> {
        let row = sqlx::query("SELECT guardian_coins FROM users WHERE user_id = $1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(r) => Ok(r.try_get("guardian_coins")?),
            None => Err(Self::missing(user_id)),
        }
    }

    /// Single-statement increment; concurrent credits never lose updates.
    async fn apply_credit(&self, user_id: Uuid, amount: i64) -> Result<i64, Error> {
        let row = sqlx::query(
            r#"
            UPDATE users
            SET guardian_coins = guardian_coins + $1
            WHERE user_id = $2
            RETURNING guardian_coins
            "#,
        )
            .bind(amount)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(r) => Ok(r.try_get("guardian_coins")?),
            None => Err(Self::missing(user_id)),
        }
    }

    async fn get_archetype(&self, user_id: Uuid) -> Result<Option<String>, Error> {
        let row = sqlx::query("SELECT archetype FROM users WHERE user_id = $1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(r) => Ok(r.try_get("archetype")?),
            None => Err(Self::missing(user_id)),
        }
    }

    async fn set_archetype(&self, user_id: Uuid, archetype: &str) -> Result<(), Error> {
        let result = sqlx::query("UPDATE users SET archetype = $1 WHERE user_id = $2")
            .bind(archetype)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(Self::missing(user_id));
        }
        Ok(())
    }

    async fn set_traits(&self, user_id: Uuid, traits: &PersonalityTraits) -> Result<(), Error> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET trait_energy = $1,
                trait_social = $2,
                trait_planning = $3,
                trait_thinking = $4,
                quiz_completed = TRUE
            WHERE user_id = $5
            "#,
        )
            .bind(traits.energy as i16)
            .bind(traits.social as i16)
            .bind(traits.planning as i16)
            .bind(traits.thinking as i16)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(Self::missing(user_id));
        }
        Ok(())
    }

    async fn record_quiz(
        &self,
        user_id: Uuid,
        traits: &PersonalityTraits,
        archetype: &str,
    ) -> Result<(), Error> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET trait_energy = $1,
                trait_social = $2,
                trait_planning = $3,
                trait_thinking = $4,
                archetype = $5,
                quiz_completed = TRUE
            WHERE user_id = $6
            "#,
        )
            .bind(traits.energy as i16)
            .bind(traits.social as i16)
            .bind(traits.planning as i16)
            .bind(traits.thinking as i16)
            .bind(archetype)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(Self::missing(user_id));
        }
        Ok(())
    }
}
