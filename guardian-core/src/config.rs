// src/config.rs

use guardian_ai::GatewayConfig;
use tracing::debug;

use crate::services::rewards::RewardPolicy;
use crate::Error;

pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;

/// Process configuration. Built from a key lookup so tests never touch the
/// real environment.
#[derive(Debug, Clone)]
pub struct GuardianConfig {
    pub database_url: Option<String>,
    pub max_connections: u32,
    pub gateway: GatewayConfig,
    pub rewards: RewardPolicy,
}

impl Default for GuardianConfig {
    fn default() -> Self {
        Self {
            database_url: None,
            max_connections: DEFAULT_MAX_CONNECTIONS,
            gateway: GatewayConfig::default(),
            rewards: RewardPolicy::default(),
        }
    }
}

impl GuardianConfig {
    pub fn from_lookup<F>(lookup: F) -> Result<Self, Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let max_connections = match get("GUARDIAN_DB_MAX_CONNECTIONS") {
            Some(raw) => match raw.trim().parse::<u32>() {
                Ok(n) if n > 0 => n,
                _ => {
                    return Err(Error::Configuration(format!(
                        "GUARDIAN_DB_MAX_CONNECTIONS must be a positive integer, got '{}'",
                        raw
                    )));
                }
            },
            None => DEFAULT_MAX_CONNECTIONS,
        };

        let mut rewards = RewardPolicy::default();
        let overrides: [(&str, &mut i64); 5] = [
            ("GUARDIAN_REWARD_MEDICAL_ANALYSIS", &mut rewards.medical_analysis),
            ("GUARDIAN_REWARD_MOOD_LOG", &mut rewards.mood_log),
            ("GUARDIAN_REWARD_WORKOUT_GENERATED", &mut rewards.workout_generated),
            ("GUARDIAN_REWARD_WORKOUT_COMPLETED", &mut rewards.workout_completed),
            ("GUARDIAN_REWARD_QUIZ_COMPLETED", &mut rewards.quiz_completed),
        ];
        for (key, slot) in overrides {
            if let Some(raw) = get(key) {
                *slot = parse_award(key, &raw)?;
                debug!("Reward override {}={}", key, slot);
            }
        }

        Ok(Self {
            database_url: get("DATABASE_URL"),
            max_connections,
            gateway: GatewayConfig::from_lookup(&lookup),
            rewards,
        })
    }

    pub fn from_env() -> Result<Self, Error> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn require_database_url(&self) -> Result<&str, Error> {
        self.database_url
            .as_deref()
            .ok_or_else(|| Error::Configuration("DATABASE_URL is not set".into()))
    }
}

fn parse_award(key: &str, raw: &str) -> Result<i64, Error> {
    match raw.trim().parse::<i64>() {
        Ok(n) if n >= 0 => Ok(n),
        _ => Err(Error::Configuration(format!(
            "{} must be a non-negative integer, got '{}'",
            key, raw
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_nothing_is_set() {
        let config = GuardianConfig::from_lookup(lookup(&[])).unwrap();
        assert!(config.database_url.is_none());
        assert_eq!(config.max_connections, DEFAULT_MAX_CONNECTIONS);
        assert!(!config.gateway.is_configured());
        assert_eq!(config.rewards, RewardPolicy::default());
        assert!(matches!(config.require_database_url(), Err(Error::Configuration(_))));
    }

    #[test]
    fn reads_database_gateway_and_reward_overrides() {
        let config = GuardianConfig::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://localhost/guardian"),
            ("GUARDIAN_DB_MAX_CONNECTIONS", "12"),
            ("ANTHROPIC_API_KEY", "sk-test"),
            ("GUARDIAN_REWARD_MOOD_LOG", "15"),
        ]))
        .unwrap();

        assert_eq!(config.require_database_url().unwrap(), "postgres://localhost/guardian");
        assert_eq!(config.max_connections, 12);
        assert!(config.gateway.is_configured());
        assert_eq!(config.rewards.mood_log, 15);
        assert_eq!(config.rewards.medical_analysis, 25);
    }

    #[test]
    fn rejects_bad_overrides() {
        let negative = GuardianConfig::from_lookup(lookup(&[("GUARDIAN_REWARD_QUIZ_COMPLETED", "-1")]));
        assert!(matches!(negative, Err(Error::Configuration(_))));

        let zero_pool = GuardianConfig::from_lookup(lookup(&[("GUARDIAN_DB_MAX_CONNECTIONS", "0")]));
        assert!(matches!(zero_pool, Err(Error::Configuration(_))));
    }
}
