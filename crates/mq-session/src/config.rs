//! Arcade session configuration

use serde::{Deserialize, Serialize};

use mq_core::{BASE_SCORE_PER_ANSWER, DifficultyTier, resolve_difficulty};

/// Default arcade round length
pub const DEFAULT_ARCADE_DURATION_SECS: u64 = 90;
/// Gems for each correct arcade answer
pub const DEFAULT_GEMS_PER_CORRECT: u32 = 1;

/// Crystal Pop round configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArcadeConfig {
    #[serde(default)]
    pub difficulty: DifficultyTier,
    #[serde(default = "default_duration_secs")]
    pub duration_secs: u64,
    #[serde(default = "default_base_points")]
    pub base_points: u32,
    #[serde(default = "default_gems_per_correct")]
    pub gems_per_correct: u32,
}

fn default_duration_secs() -> u64 {
    DEFAULT_ARCADE_DURATION_SECS
}

fn default_base_points() -> u32 {
    BASE_SCORE_PER_ANSWER
}

fn default_gems_per_correct() -> u32 {
    DEFAULT_GEMS_PER_CORRECT
}

impl Default for ArcadeConfig {
    fn default() -> Self {
        Self {
            difficulty: DifficultyTier::default(),
            duration_secs: DEFAULT_ARCADE_DURATION_SECS,
            base_points: BASE_SCORE_PER_ANSWER,
            gems_per_correct: DEFAULT_GEMS_PER_CORRECT,
        }
    }
}

impl ArcadeConfig {
    pub fn new(difficulty: DifficultyTier) -> Self {
        Self {
            difficulty,
            ..Self::default()
        }
    }

    /// Config whose tier follows the player's skill rating
    pub fn for_skill(skill_rating: f64) -> Self {
        Self::new(resolve_difficulty(skill_rating))
    }

    pub fn with_duration_secs(mut self, secs: u64) -> Self {
        self.duration_secs = secs;
        self
    }

    pub fn with_base_points(mut self, points: u32) -> Self {
        self.base_points = points;
        self
    }

    pub fn duration_ms(&self) -> i64 {
        i64::try_from(self.duration_secs)
            .unwrap_or(i64::MAX)
            .saturating_mul(1000)
    }

    /// Export as JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Import from JSON; missing fields take their defaults
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
