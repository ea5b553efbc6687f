//! Question generator
//!
//! Produces a single arithmetic question for an operation and tier. All random
//! draws go through the caller's RNG so a seeded generator yields a
//! reproducible question stream.

use std::collections::HashSet;
use std::fmt;

use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use crate::difficulty::DifficultyTier;
use crate::types::{GradeTag, Operation};

/// Number of options presented in multiple-choice format
pub const MULTIPLE_CHOICE_OPTIONS: usize = 4;

/// Largest second operand for hard-tier multiplication
pub const HARD_MULTIPLIER_CAP: i64 = 12;

/// Minimum half-width of the distractor window
const DISTRACTOR_MIN_SPREAD: f64 = 5.0;

/// A generated arithmetic question
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MathQuestion {
    pub id: String,
    pub operation: Operation,
    pub grade_tag: GradeTag,
    pub operand1: i64,
    pub operand2: i64,
    pub correct_answer: i64,
    pub prompt: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub multiple_choice_options: Option<Vec<i64>>,
    pub difficulty: DifficultyTier,
}

impl MathQuestion {
    /// Repeat-detection fingerprint
    pub fn key(&self) -> QuestionKey {
        QuestionKey {
            grade_tag: self.grade_tag,
            operation: self.operation,
            operand1: self.operand1,
            operand2: self.operand2,
            correct_answer: self.correct_answer,
        }
    }

    pub fn is_correct(&self, answer: i64) -> bool {
        answer == self.correct_answer
    }
}

/// Fingerprint identifying a question's content, independent of its id
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionKey {
    pub grade_tag: GradeTag,
    pub operation: Operation,
    pub operand1: i64,
    pub operand2: i64,
    pub correct_answer: i64,
}

impl fmt::Display for QuestionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}|{}|{}|{}|{}",
            self.grade_tag, self.operation, self.operand1, self.operand2, self.correct_answer
        )
    }
}

/// Optional generation parameters
#[derive(Debug, Clone, Copy, Default)]
pub struct GenerateOptions {
    /// Tag to stamp on the question instead of the tier's default grade
    pub grade_tag: Option<GradeTag>,
}

impl GenerateOptions {
    pub fn with_grade(grade_tag: GradeTag) -> Self {
        Self {
            grade_tag: Some(grade_tag),
        }
    }
}

/// Generate a question id from RNG bytes
pub fn generate_id<R: Rng + ?Sized>(rng: &mut R, prefix: &str) -> String {
    let uuid = uuid::Builder::from_random_bytes(rng.random()).into_uuid();
    format!("{}-{}", prefix, uuid.simple())
}

/// Render `a OP b = ?`
pub fn format_prompt(operation: Operation, operand1: i64, operand2: i64) -> String {
    format!("{} {} {} = ?", operand1, operation.symbol(), operand2)
}

/// Generate one question.
///
/// - Addition: both operands uniform in the tier range.
/// - Subtraction: `operand2` redrawn from `[min, operand1]`, so the answer is never negative.
/// - Multiplication: `operand2` capped at 12 on the hard tier.
pub fn generate_question<R: Rng + ?Sized>(
    rng: &mut R,
    operation: Operation,
    difficulty: DifficultyTier,
    multiple_choice: bool,
    options: GenerateOptions,
) -> MathQuestion {
    let range = difficulty.number_range();
    let grade_tag = options
        .grade_tag
        .unwrap_or_else(|| difficulty.default_grade());

    let operand1 = rng.random_range(range.min..=range.max);
    let operand2 = match operation {
        Operation::Addition => rng.random_range(range.min..=range.max),
        Operation::Subtraction => rng.random_range(range.min..=operand1),
        Operation::Multiplication => {
            let cap = if difficulty == DifficultyTier::Hard {
                HARD_MULTIPLIER_CAP.min(range.max)
            } else {
                range.max
            };
            rng.random_range(range.min..=cap)
        }
    };
    let correct_answer = operation.apply(operand1, operand2);

    let multiple_choice_options = if multiple_choice {
        let mut choices = generate_distractors(rng, correct_answer, MULTIPLE_CHOICE_OPTIONS - 1);
        choices.push(correct_answer);
        choices.shuffle(rng);
        Some(choices)
    } else {
        None
    };

    let question = MathQuestion {
        id: generate_id(rng, "q"),
        operation,
        grade_tag,
        operand1,
        operand2,
        correct_answer,
        prompt: format_prompt(operation, operand1, operand2),
        multiple_choice_options,
        difficulty,
    };

    log::debug!(
        "[Generator] {} ({}, {}) -> {}",
        question.prompt,
        difficulty,
        grade_tag,
        correct_answer
    );

    question
}

/// Generate `count` questions with the tier's default grade
pub fn generate_questions<R: Rng + ?Sized>(
    rng: &mut R,
    operation: Operation,
    difficulty: DifficultyTier,
    count: usize,
    multiple_choice: bool,
) -> Vec<MathQuestion> {
    (0..count)
        .map(|_| {
            generate_question(
                rng,
                operation,
                difficulty,
                multiple_choice,
                GenerateOptions::default(),
            )
        })
        .collect()
}

/// Draw `count` distinct non-negative values near `correct`, none equal to it.
///
/// The window is `correct ± max(5, |correct| / 2)`, clipped at zero. It always
/// holds at least five candidates, so the retry loop terminates.
pub fn generate_distractors<R: Rng + ?Sized>(rng: &mut R, correct: i64, count: usize) -> Vec<i64> {
    let spread = DISTRACTOR_MIN_SPREAD.max(correct.abs() as f64 * 0.5);
    let low = (correct as f64 - spread).max(0.0).ceil() as i64;
    let high = (correct as f64 + spread).ceil() as i64;

    let mut seen = HashSet::with_capacity(count);
    let mut distractors = Vec::with_capacity(count + 1);
    while distractors.len() < count {
        let candidate = rng.random_range(low..=high);
        if candidate != correct && candidate >= 0 && seen.insert(candidate) {
            distractors.push(candidate);
        }
    }
    distractors
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn rng(seed: u64) -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(seed)
    }

    #[test]
    fn test_subtraction_never_negative() {
        let mut rng = rng(7);
        for tier in DifficultyTier::ALL {
            for _ in 0..500 {
                let q = generate_question(
                    &mut rng,
                    Operation::Subtraction,
                    tier,
                    false,
                    GenerateOptions::default(),
                );
                assert!(q.operand1 >= q.operand2);
                assert!(q.correct_answer >= 0);
                assert_eq!(q.correct_answer, q.operand1 - q.operand2);
            }
        }
    }

    #[test]
    fn test_hard_multiplication_cap() {
        let mut rng = rng(11);
        for _ in 0..1000 {
            let q = generate_question(
                &mut rng,
                Operation::Multiplication,
                DifficultyTier::Hard,
                false,
                GenerateOptions::default(),
            );
            assert!(q.operand2 <= HARD_MULTIPLIER_CAP);
            assert!(q.operand1 <= 100);
            assert_eq!(q.correct_answer, q.operand1 * q.operand2);
        }
    }

    #[test]
    fn test_medium_multiplication_uses_full_range() {
        let mut rng = rng(3);
        let max_seen = (0..2000)
            .map(|_| {
                generate_question(
                    &mut rng,
                    Operation::Multiplication,
                    DifficultyTier::Medium,
                    false,
                    GenerateOptions::default(),
                )
                .operand2
            })
            .max()
            .unwrap();
        assert!(max_seen > HARD_MULTIPLIER_CAP);
        assert!(max_seen <= 50);
    }

    #[test]
    fn test_operands_within_range() {
        let mut rng = rng(5);
        for tier in DifficultyTier::ALL {
            let range = tier.number_range();
            for op in Operation::ALL {
                for _ in 0..200 {
                    let q = generate_question(&mut rng, op, tier, false, GenerateOptions::default());
                    assert!(range.contains(q.operand1));
                    assert!(range.contains(q.operand2));
                    assert_eq!(q.difficulty, tier);
                }
            }
        }
    }

    #[test]
    fn test_multiple_choice_options() {
        let mut rng = rng(99);
        for tier in DifficultyTier::ALL {
            for op in Operation::ALL {
                for _ in 0..200 {
                    let q = generate_question(&mut rng, op, tier, true, GenerateOptions::default());
                    let options = q.multiple_choice_options.as_ref().unwrap();
                    assert_eq!(options.len(), MULTIPLE_CHOICE_OPTIONS);
                    assert!(options.contains(&q.correct_answer));
                    assert!(options.iter().all(|&o| o >= 0));
                    let unique: HashSet<_> = options.iter().collect();
                    assert_eq!(unique.len(), MULTIPLE_CHOICE_OPTIONS);
                }
            }
        }
    }

    #[test]
    fn test_no_options_without_multiple_choice() {
        let mut rng = rng(1);
        let q = generate_question(
            &mut rng,
            Operation::Addition,
            DifficultyTier::Easy,
            false,
            GenerateOptions::default(),
        );
        assert!(q.multiple_choice_options.is_none());
    }

    #[test]
    fn test_distractors_near_zero() {
        let mut rng = rng(21);
        for _ in 0..100 {
            let d = generate_distractors(&mut rng, 0, 3);
            assert_eq!(d.len(), 3);
            assert!(d.iter().all(|&v| (1..=5).contains(&v)));
        }
    }

    #[test]
    fn test_distractor_window_scales() {
        let mut rng = rng(22);
        for _ in 0..100 {
            let d = generate_distractors(&mut rng, 400, 3);
            assert!(d.iter().all(|&v| (200..=600).contains(&v) && v != 400));
        }
    }

    #[test]
    fn test_prompt_format() {
        assert_eq!(format_prompt(Operation::Addition, 3, 4), "3 + 4 = ?");
        assert_eq!(format_prompt(Operation::Subtraction, 9, 2), "9 − 2 = ?");
        assert_eq!(format_prompt(Operation::Multiplication, 6, 7), "6 × 7 = ?");
    }

    #[test]
    fn test_grade_tag_default_and_override() {
        let mut rng = rng(8);
        let q = generate_question(
            &mut rng,
            Operation::Addition,
            DifficultyTier::Medium,
            false,
            GenerateOptions::default(),
        );
        assert_eq!(q.grade_tag, GradeTag::Grade3);

        let q = generate_question(
            &mut rng,
            Operation::Addition,
            DifficultyTier::Hard,
            false,
            GenerateOptions::with_grade(GradeTag::Grade6),
        );
        assert_eq!(q.grade_tag, GradeTag::Grade6);
        assert_eq!(q.difficulty, DifficultyTier::Hard);
    }

    #[test]
    fn test_ids_unique_and_reproducible() {
        let mut a = rng(42);
        let batch = generate_questions(&mut a, Operation::Addition, DifficultyTier::VeryEasy, 50, true);
        let ids: HashSet<_> = batch.iter().map(|q| q.id.clone()).collect();
        assert_eq!(ids.len(), 50);
        assert!(batch[0].id.starts_with("q-"));

        let mut b = rng(42);
        let again = generate_questions(&mut b, Operation::Addition, DifficultyTier::VeryEasy, 50, true);
        assert_eq!(batch, again);
    }

    #[test]
    fn test_question_key_display() {
        let mut rng = rng(2);
        let q = generate_question(
            &mut rng,
            Operation::Addition,
            DifficultyTier::VeryEasy,
            false,
            GenerateOptions::default(),
        );
        let expected = format!(
            "grade1|addition|{}|{}|{}",
            q.operand1, q.operand2, q.correct_answer
        );
        assert_eq!(q.key().to_string(), expected);
    }
}
