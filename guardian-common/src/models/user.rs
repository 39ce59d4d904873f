use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Score given to a quiz answer that was left blank.
pub const NEUTRAL_TRAIT_SCORE: u8 = 50;

pub const MAX_TRAIT_SCORE: u8 = 100;

/// Four quiz-derived scores, each in `0..=100`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonalityTraits {
    pub energy: u8,
    pub social: u8,
    pub planning: u8,
    pub thinking: u8,
}

impl Default for PersonalityTraits {
    fn default() -> Self {
        Self { energy: 0, social: 0, planning: 0, thinking: 0 }
    }
}

impl PersonalityTraits {
    pub fn new(energy: u8, social: u8, planning: u8, thinking: u8) -> Self {
        Self { energy, social, planning, thinking }
    }

    pub fn in_range(&self) -> bool {
        [self.energy, self.social, self.planning, self.thinking]
            .iter()
            .all(|score| *score <= MAX_TRAIT_SCORE)
    }
}

/// The slice of the account that the reward core reads and credits.
/// Credentials, e-mail and the like belong to the account subsystem.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserAccount {
    pub user_id: Uuid,
    pub display_name: String,
    pub guardian_coins: i64,
    pub archetype: Option<String>,
    pub personality_traits: PersonalityTraits,
    pub quiz_completed: bool,
    pub created_at: DateTime<Utc>,
}

impl UserAccount {
    pub fn new(display_name: &str) -> Self {
        Self {
            user_id: Uuid::new_v4(),
            display_name: display_name.to_string(),
            guardian_coins: 0,
            archetype: None,
            personality_traits: PersonalityTraits::default(),
            quiz_completed: false,
            created_at: Utc::now(),
        }
    }
}
