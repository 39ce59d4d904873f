//! Personality archetypes derived from the four quiz traits.
//!
//! Classification walks `ARCHETYPE_RULES` top to bottom and stops at the first
//! rule that holds. Rule order is part of the contract: high energy + social
//! wins over social + thinking even when both hold.

use std::fmt;

use serde::{Deserialize, Serialize};

use guardian_common::models::PersonalityTraits;

const HIGH: u8 = 70;
const LOW: u8 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Archetype {
    SolarAthlete,
    LunarDreamer,
    StrategicSage,
    EmpathicHealer,
    BalancedGuardian,
}

impl Archetype {
    pub const ALL: [Archetype; 5] = [
        Archetype::SolarAthlete,
        Archetype::LunarDreamer,
        Archetype::StrategicSage,
        Archetype::EmpathicHealer,
        Archetype::BalancedGuardian,
    ];

    pub fn tag(&self) -> &'static str {
        match self {
            Archetype::SolarAthlete => "Solar Athlete",
            Archetype::LunarDreamer => "Lunar Dreamer",
            Archetype::StrategicSage => "Strategic Sage",
            Archetype::EmpathicHealer => "Empathic Healer",
            Archetype::BalancedGuardian => "Balanced Guardian",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Archetype::SolarAthlete => "You radiate energy and thrive in social, active environments. Your strength lies in motivation and physical vitality.",
            Archetype::LunarDreamer => "Introspective and thoughtful, you find power in quiet moments and careful planning. Your intuition guides you.",
            Archetype::StrategicSage => "Analytical and organized, you excel at problem-solving and long-term planning. Your wisdom is your strength.",
            Archetype::EmpathicHealer => "Socially aware and emotionally intelligent, you connect deeply with others and bring harmony to any situation.",
            Archetype::BalancedGuardian => "You maintain equilibrium across all aspects of life, bringing stability and adaptability to every challenge.",
        }
    }

    /// Accepts the bare tag and the older "The ..." form.
    pub fn from_tag(tag: &str) -> Option<Archetype> {
        let tag = tag.trim();
        let tag = tag.strip_prefix("The ").unwrap_or(tag);
        Archetype::ALL.into_iter().find(|a| a.tag() == tag)
    }
}

impl fmt::Display for Archetype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

pub struct ArchetypeRule {
    pub archetype: Archetype,
    pub applies: fn(&PersonalityTraits) -> bool,
}

/// Evaluated in order; `BalancedGuardian` is the default when none apply.
pub const ARCHETYPE_RULES: [ArchetypeRule; 4] = [
    ArchetypeRule {
        archetype: Archetype::SolarAthlete,
        applies: |t| t.energy > HIGH && t.social > HIGH,
    },
    ArchetypeRule {
        archetype: Archetype::LunarDreamer,
        applies: |t| t.energy < LOW && t.planning > HIGH,
    },
    ArchetypeRule {
        archetype: Archetype::StrategicSage,
        applies: |t| t.thinking > HIGH && t.planning > HIGH,
    },
    ArchetypeRule {
        archetype: Archetype::EmpathicHealer,
        applies: |t| t.social > HIGH && t.thinking > HIGH,
    },
];

pub fn classify(traits: &PersonalityTraits) -> Archetype {
    ARCHETYPE_RULES
        .iter()
        .find(|rule| (rule.applies)(traits))
        .map(|rule| rule.archetype)
        .unwrap_or(Archetype::BalancedGuardian)
}

/// Description for a stored tag; unknown tags get the Balanced Guardian text.
pub fn describe(tag: &str) -> &'static str {
    Archetype::from_tag(tag)
        .unwrap_or(Archetype::BalancedGuardian)
        .description()
}
