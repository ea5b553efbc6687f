//! Repeat-free question drawing for level and practice sessions

use std::collections::HashSet;

use rand::Rng;
use rand::seq::IndexedRandom;

use mq_core::{GenerateOptions, GradeTag, MathQuestion, Operation, QuestionKey, generate_question};

use crate::error::SessionError;

/// Draw attempts before the question space counts as exhausted
pub const MAX_UNIQUE_ATTEMPTS: usize = 80;

/// Grade/operation pool plus the fingerprints already served
#[derive(Debug, Clone)]
pub struct UniqueQuestionPool {
    grade_tags: Vec<GradeTag>,
    operations: Vec<Operation>,
    multiple_choice: bool,
    seen: HashSet<QuestionKey>,
}

impl UniqueQuestionPool {
    /// Fails when either list is empty
    pub fn new(
        grade_tags: &[GradeTag],
        operations: &[Operation],
        multiple_choice: bool,
    ) -> Result<Self, SessionError> {
        if grade_tags.is_empty() {
            return Err(SessionError::InvalidLevel("no grade tags".into()));
        }
        if operations.is_empty() {
            return Err(SessionError::InvalidLevel("no allowed operations".into()));
        }
        Ok(Self {
            grade_tags: grade_tags.to_vec(),
            operations: operations.to_vec(),
            multiple_choice,
            seen: HashSet::new(),
        })
    }

    /// Draw a question whose fingerprint has not been served yet
    pub fn draw<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<MathQuestion, SessionError> {
        for _ in 0..MAX_UNIQUE_ATTEMPTS {
            let (Some(&grade), Some(&operation)) =
                (self.grade_tags.choose(rng), self.operations.choose(rng))
            else {
                break;
            };
            let question = generate_question(
                rng,
                operation,
                grade.difficulty(),
                self.multiple_choice,
                GenerateOptions::with_grade(grade),
            );
            if self.seen.insert(question.key()) {
                return Ok(question);
            }
        }

        log::warn!(
            "[Questions] No unique question after {} attempts ({} served)",
            MAX_UNIQUE_ATTEMPTS,
            self.seen.len()
        );
        Err(SessionError::QuestionSpaceExhausted {
            attempts: MAX_UNIQUE_ATTEMPTS,
        })
    }

    pub fn has_seen(&self, key: &QuestionKey) -> bool {
        self.seen.contains(key)
    }

    pub fn served(&self) -> usize {
        self.seen.len()
    }
}
