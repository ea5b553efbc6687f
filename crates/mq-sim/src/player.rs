//! Simulated player

use rand::Rng;
use rand::seq::IndexedRandom;
use rand_chacha::ChaCha8Rng;

use mq_core::MathQuestion;

/// Answers correctly with a fixed probability
#[derive(Debug)]
pub struct SimPlayer {
    rng: ChaCha8Rng,
    accuracy: f64,
}

impl SimPlayer {
    pub fn new(rng: ChaCha8Rng, accuracy: f64) -> Self {
        let accuracy = if accuracy.is_nan() { 0.0 } else { accuracy.clamp(0.0, 1.0) };
        Self { rng, accuracy }
    }

    /// Pick an answer. Misses choose a wrong option when the question has
    /// options, otherwise an off-by-one value.
    pub fn answer(&mut self, question: &MathQuestion) -> i64 {
        if self.rng.random_bool(self.accuracy) {
            return question.correct_answer;
        }
        let wrong: Vec<i64> = question
            .multiple_choice_options
            .iter()
            .flatten()
            .copied()
            .filter(|&o| o != question.correct_answer)
            .collect();
        wrong
            .choose(&mut self.rng)
            .copied()
            .unwrap_or(question.correct_answer + 1)
    }
}
