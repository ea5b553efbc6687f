//! Difficulty resolver: map a skill rating to a tier and its operand range

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::{GradeTag, Operation};

/// Skill rating a new player starts with
pub const INITIAL_SKILL_RATING: f64 = 1000.0;

/// Ordinal difficulty tier
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "camelCase")]
pub enum DifficultyTier {
    VeryEasy,
    #[default]
    Easy,
    Medium,
    Hard,
}

/// Inclusive operand range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NumberRange {
    pub min: i64,
    pub max: i64,
}

impl NumberRange {
    pub const fn new(min: i64, max: i64) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, value: i64) -> bool {
        (self.min..=self.max).contains(&value)
    }
}

/// Static configuration of one tier
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DifficultyConfig {
    pub tier: DifficultyTier,
    /// Inclusive lower skill bound
    pub min_skill: f64,
    /// Exclusive upper skill bound (infinite for the top tier)
    pub max_skill: f64,
    pub number_range: NumberRange,
    pub allowed_operations: &'static [Operation],
}

const ADDITION_ONLY: &[Operation] = &[Operation::Addition];
const ADD_SUB: &[Operation] = &[Operation::Addition, Operation::Subtraction];
const ALL_OPERATIONS: &[Operation] = &Operation::ALL;

impl DifficultyTier {
    pub const ALL: [DifficultyTier; 4] = [
        DifficultyTier::VeryEasy,
        DifficultyTier::Easy,
        DifficultyTier::Medium,
        DifficultyTier::Hard,
    ];

    /// Tier table lookup
    pub fn config(&self) -> DifficultyConfig {
        match self {
            Self::VeryEasy => DifficultyConfig {
                tier: *self,
                min_skill: 0.0,
                max_skill: 900.0,
                number_range: NumberRange::new(1, 10),
                allowed_operations: ADDITION_ONLY,
            },
            Self::Easy => DifficultyConfig {
                tier: *self,
                min_skill: 900.0,
                max_skill: 1100.0,
                number_range: NumberRange::new(1, 20),
                allowed_operations: ADD_SUB,
            },
            Self::Medium => DifficultyConfig {
                tier: *self,
                min_skill: 1100.0,
                max_skill: 1300.0,
                number_range: NumberRange::new(1, 50),
                allowed_operations: ALL_OPERATIONS,
            },
            Self::Hard => DifficultyConfig {
                tier: *self,
                min_skill: 1300.0,
                max_skill: f64::INFINITY,
                number_range: NumberRange::new(1, 100),
                allowed_operations: ALL_OPERATIONS,
            },
        }
    }

    pub fn number_range(&self) -> NumberRange {
        self.config().number_range
    }

    pub fn allowed_operations(&self) -> &'static [Operation] {
        self.config().allowed_operations
    }

    /// `(min, max)` skill boundaries
    pub fn skill_bounds(&self) -> (f64, f64) {
        let config = self.config();
        (config.min_skill, config.max_skill)
    }

    /// Grade used to tag questions when the caller supplies none
    pub fn default_grade(&self) -> GradeTag {
        match self {
            Self::VeryEasy => GradeTag::Grade1,
            Self::Easy => GradeTag::Grade2,
            Self::Medium => GradeTag::Grade3,
            Self::Hard => GradeTag::Grade4,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::VeryEasy => "veryEasy",
            Self::Easy => "easy",
            Self::Medium => "medium",
            Self::Hard => "hard",
        }
    }
}

impl fmt::Display for DifficultyTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DifficultyTier {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|t| t.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| CoreError::UnknownTier(s.to_string()))
    }
}

/// Resolve the tier for a skill rating.
///
/// Boundaries: `<900` very easy, `[900, 1100)` easy, `[1100, 1300)` medium,
/// `>=1300` hard. Total over every `f64`; NaN falls through to hard.
pub fn resolve_difficulty(skill_rating: f64) -> DifficultyTier {
    if skill_rating < 900.0 {
        DifficultyTier::VeryEasy
    } else if skill_rating < 1100.0 {
        DifficultyTier::Easy
    } else if skill_rating < 1300.0 {
        DifficultyTier::Medium
    } else {
        DifficultyTier::Hard
    }
}

/// Tier table lookup as a free function
pub fn tier_config(tier: DifficultyTier) -> DifficultyConfig {
    tier.config()
}
