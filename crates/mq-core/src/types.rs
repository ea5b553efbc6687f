//! Operation, grade and answer-mode tokens

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::difficulty::DifficultyTier;
use crate::error::CoreError;

/// Arithmetic operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    Addition,
    Subtraction,
    Multiplication,
}

impl Operation {
    pub const ALL: [Operation; 3] = [
        Operation::Addition,
        Operation::Subtraction,
        Operation::Multiplication,
    ];

    /// Operator glyph used in prompts (subtraction is U+2212, not a hyphen)
    pub fn symbol(&self) -> char {
        match self {
            Self::Addition => '+',
            Self::Subtraction => '\u{2212}',
            Self::Multiplication => '\u{00D7}',
        }
    }

    /// Token used in fingerprints and config files
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Addition => "addition",
            Self::Subtraction => "subtraction",
            Self::Multiplication => "multiplication",
        }
    }

    /// Apply the operation
    pub fn apply(&self, lhs: i64, rhs: i64) -> i64 {
        match self {
            Self::Addition => lhs + rhs,
            Self::Subtraction => lhs - rhs,
            Self::Multiplication => lhs * rhs,
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Operation {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "addition" | "+" => Ok(Self::Addition),
            "subtraction" | "-" | "\u{2212}" => Ok(Self::Subtraction),
            "multiplication" | "*" | "x" | "\u{00D7}" => Ok(Self::Multiplication),
            other => Err(CoreError::UnknownOperation(other.to_string())),
        }
    }
}

/// School grade used to categorize questions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GradeTag {
    Grade1,
    Grade2,
    Grade3,
    Grade4,
    Grade5,
    Grade6,
}

impl GradeTag {
    pub const ALL: [GradeTag; 6] = [
        GradeTag::Grade1,
        GradeTag::Grade2,
        GradeTag::Grade3,
        GradeTag::Grade4,
        GradeTag::Grade5,
        GradeTag::Grade6,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Grade1 => "grade1",
            Self::Grade2 => "grade2",
            Self::Grade3 => "grade3",
            Self::Grade4 => "grade4",
            Self::Grade5 => "grade5",
            Self::Grade6 => "grade6",
        }
    }

    /// Difficulty tier used to generate questions for this grade.
    /// Grades 4 and above all draw from the hard tier.
    pub fn difficulty(&self) -> DifficultyTier {
        match self {
            Self::Grade1 => DifficultyTier::VeryEasy,
            Self::Grade2 => DifficultyTier::Easy,
            Self::Grade3 => DifficultyTier::Medium,
            Self::Grade4 | Self::Grade5 | Self::Grade6 => DifficultyTier::Hard,
        }
    }
}

impl fmt::Display for GradeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GradeTag {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|g| g.as_str() == s.trim())
            .ok_or_else(|| CoreError::UnknownGradeTag(s.to_string()))
    }
}

/// How the player enters answers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AnswerMode {
    /// Tap one of four options
    #[default]
    MultipleChoice,
    /// Type the number
    NumberEntry,
}

impl AnswerMode {
    pub fn is_multiple_choice(&self) -> bool {
        matches!(self, Self::MultipleChoice)
    }
}
