//! Crystal Pop: timed arcade session with combo scoring
//!
//! A round runs for a fixed wall-clock duration. Every correct answer scores
//! `base_points × combo` using the combo held before the answer, then grows
//! the combo by one; a miss scores nothing and drops the combo back to 1.

use std::sync::Arc;

use rand::seq::IndexedRandom;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use mq_core::{
    COMBO_RESET, COMBO_START, DifficultyTier, GenerateOptions, MathQuestion, Operation,
    accuracy_pct, answer_score, generate_id, generate_question, next_combo,
};

use crate::config::ArcadeConfig;
use crate::error::SessionError;
use crate::phase::{SessionPhase, session_rng};
use crate::timing::{Clock, Countdown, system_clock};

// ═══════════════════════════════════════════════════════════════════════════════
// RECORDS
// ═══════════════════════════════════════════════════════════════════════════════

/// One submitted arcade answer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArcadeAnswer {
    pub question_id: String,
    pub user_answer: i64,
    pub correct_answer: i64,
    pub is_correct: bool,
    pub response_time_ms: u64,
    /// Multiplier applied to this answer
    pub combo_at_time: u32,
    pub points_earned: u32,
    pub timestamp: i64,
}

/// Immediate feedback for a submission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArcadeAnswerOutcome {
    pub is_correct: bool,
    pub points_earned: u32,
    pub new_combo: u32,
    pub gems_added: u32,
}

/// Frozen summary of a finished round
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArcadeResult {
    pub session_id: String,
    pub difficulty: DifficultyTier,
    pub final_score: u32,
    pub questions_answered: u32,
    pub correct_answers: u32,
    pub accuracy: u32,
    pub gems_earned: u32,
    pub max_combo: u32,
    pub duration_ms: i64,
}

/// Full state view for callers that render or persist a live round
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArcadeSnapshot {
    pub session_id: String,
    pub difficulty: DifficultyTier,
    pub phase: SessionPhase,
    pub started_at: Option<i64>,
    pub ended_at: Option<i64>,
    pub score: u32,
    pub questions_answered: u32,
    pub correct_answers: u32,
    pub combo: u32,
    pub max_combo: u32,
    pub gems: u32,
    pub current_question: Option<MathQuestion>,
    pub answers: Vec<ArcadeAnswer>,
    pub time_remaining_ms: i64,
    pub is_expired: bool,
}

/// HUD values
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArcadeDisplayStats {
    pub score: u32,
    /// Rendered as `"3x"`
    pub combo: String,
    pub answered: u32,
    pub accuracy: u32,
    pub seconds_remaining: u64,
}

// ═══════════════════════════════════════════════════════════════════════════════
// SESSION
// ═══════════════════════════════════════════════════════════════════════════════

/// Arcade round state machine
#[derive(Debug)]
pub struct ArcadeSession {
    config: ArcadeConfig,
    session_id: String,
    rng: ChaCha8Rng,
    clock: Arc<dyn Clock>,
    countdown: Countdown,
    phase: SessionPhase,
    ended_at: Option<i64>,
    score: u32,
    questions_answered: u32,
    correct_answers: u32,
    combo: u32,
    max_combo: u32,
    gems: u32,
    current_question: Option<MathQuestion>,
    answers: Vec<ArcadeAnswer>,
    result: Option<ArcadeResult>,
}

impl ArcadeSession {
    /// Session on the system clock with an OS-seeded RNG
    pub fn new(config: ArcadeConfig) -> Self {
        let mut rng = session_rng(None);
        let session_id = generate_id(&mut rng, "cp");
        Self {
            config,
            session_id,
            rng,
            clock: system_clock(),
            countdown: Countdown::new(config.duration_ms()),
            phase: SessionPhase::Uninitialized,
            ended_at: None,
            score: 0,
            questions_answered: 0,
            correct_answers: 0,
            combo: COMBO_START,
            max_combo: COMBO_START,
            gems: 0,
            current_question: None,
            answers: Vec::new(),
            result: None,
        }
    }

    /// Replace the clock
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Reseed the RNG; the session id is redrawn so it is reproducible too
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = session_rng(Some(seed));
        self.session_id = generate_id(&mut self.rng, "cp");
        self
    }

    /// Start the clock and produce the first question
    pub fn initialize(&mut self) -> Result<&MathQuestion, SessionError> {
        match self.phase {
            SessionPhase::Uninitialized => {}
            SessionPhase::Active => return Err(SessionError::AlreadyInitialized),
            SessionPhase::Finalized => return Err(SessionError::Finalized),
        }

        self.countdown.start(self.clock.now_ms());
        self.phase = SessionPhase::Active;
        log::info!(
            "[Arcade] Session {} started ({}, {}s)",
            self.session_id,
            self.config.difficulty,
            self.config.duration_secs
        );
        self.generate_next_question()
    }

    /// Replace the current question with a fresh multiple-choice one.
    /// Repeats are allowed in arcade mode.
    pub fn generate_next_question(&mut self) -> Result<&MathQuestion, SessionError> {
        if self.phase.is_finalized() {
            return Err(SessionError::Finalized);
        }

        let tier = self.config.difficulty;
        let operation = tier
            .allowed_operations()
            .choose(&mut self.rng)
            .copied()
            .unwrap_or(Operation::Addition);
        let question =
            generate_question(&mut self.rng, operation, tier, true, GenerateOptions::default());
        Ok(&*self.current_question.insert(question))
    }

    /// Score one answer against the current question.
    ///
    /// Does not advance to the next question.
    pub fn submit_answer(
        &mut self,
        user_answer: i64,
        response_time_ms: u64,
    ) -> Result<ArcadeAnswerOutcome, SessionError> {
        if self.phase.is_finalized() {
            return Err(SessionError::Finalized);
        }
        let now = self.clock.now_ms();
        let (question_id, correct_answer) = match &self.current_question {
            Some(q) => (q.id.clone(), q.correct_answer),
            None => return Err(SessionError::NoActiveQuestion),
        };
        if self.countdown.is_expired(now) {
            log::warn!("[Arcade] Rejected answer on expired session {}", self.session_id);
            return Err(SessionError::Expired);
        }

        let is_correct = user_answer == correct_answer;
        let combo_at_time = if is_correct { self.combo } else { COMBO_RESET };
        let points_earned = answer_score(self.config.base_points, self.combo, is_correct);
        let gems_added = if is_correct { self.config.gems_per_correct } else { 0 };

        self.questions_answered += 1;
        if is_correct {
            self.correct_answers += 1;
        }
        self.score = self.score.saturating_add(points_earned);
        self.gems = self.gems.saturating_add(gems_added);
        self.combo = next_combo(self.combo, is_correct);
        self.max_combo = self.max_combo.max(self.combo);

        self.answers.push(ArcadeAnswer {
            question_id,
            user_answer,
            correct_answer,
            is_correct,
            response_time_ms,
            combo_at_time,
            points_earned,
            timestamp: now,
        });

        Ok(ArcadeAnswerOutcome {
            is_correct,
            points_earned,
            new_combo: self.combo,
            gems_added,
        })
    }

    /// Stamp the end time and freeze the result; later calls return the same result
    pub fn end_session(&mut self) -> ArcadeResult {
        if let Some(result) = &self.result {
            return result.clone();
        }

        let now = self.clock.now_ms();
        self.ended_at = Some(now);
        self.phase = SessionPhase::Finalized;

        let result = ArcadeResult {
            session_id: self.session_id.clone(),
            difficulty: self.config.difficulty,
            final_score: self.score,
            questions_answered: self.questions_answered,
            correct_answers: self.correct_answers,
            accuracy: self.accuracy(),
            gems_earned: self.gems,
            max_combo: self.max_combo,
            duration_ms: self.countdown.elapsed_ms(now),
        };
        log::info!(
            "[Arcade] Session {} finished: score {}, {}/{} correct, max combo {}",
            result.session_id,
            result.final_score,
            result.correct_answers,
            result.questions_answered,
            result.max_combo
        );

        self.result = Some(result.clone());
        result
    }

    pub fn result(&self) -> Option<&ArcadeResult> {
        self.result.as_ref()
    }

    pub fn current_question(&self) -> Option<&MathQuestion> {
        self.current_question.as_ref()
    }

    pub fn time_remaining_ms(&self) -> i64 {
        self.countdown.remaining_ms(self.clock.now_ms())
    }

    pub fn time_remaining_secs(&self) -> u64 {
        self.countdown.remaining_secs(self.clock.now_ms())
    }

    pub fn is_expired(&self) -> bool {
        self.countdown.is_expired(self.clock.now_ms())
    }

    pub fn accuracy(&self) -> u32 {
        accuracy_pct(self.correct_answers, self.questions_answered)
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn config(&self) -> &ArcadeConfig {
        &self.config
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn combo(&self) -> u32 {
        self.combo
    }

    pub fn max_combo(&self) -> u32 {
        self.max_combo
    }

    pub fn answers(&self) -> &[ArcadeAnswer] {
        &self.answers
    }

    pub fn snapshot(&self) -> ArcadeSnapshot {
        let now = self.clock.now_ms();
        ArcadeSnapshot {
            session_id: self.session_id.clone(),
            difficulty: self.config.difficulty,
            phase: self.phase,
            started_at: self.countdown.started_at,
            ended_at: self.ended_at,
            score: self.score,
            questions_answered: self.questions_answered,
            correct_answers: self.correct_answers,
            combo: self.combo,
            max_combo: self.max_combo,
            gems: self.gems,
            current_question: self.current_question.clone(),
            answers: self.answers.clone(),
            time_remaining_ms: self.countdown.remaining_ms(now),
            is_expired: self.countdown.is_expired(now),
        }
    }

    pub fn display_stats(&self) -> ArcadeDisplayStats {
        ArcadeDisplayStats {
            score: self.score,
            combo: format!("{}x", self.combo),
            answered: self.questions_answered,
            accuracy: self.accuracy(),
            seconds_remaining: self.time_remaining_secs(),
        }
    }
}
