//! Practice session: untimed run toward a required-correct goal

use std::sync::Arc;

use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use mq_core::{BASE_SCORE_PER_ANSWER, LevelDefinition, MathQuestion, accuracy_pct, generate_id};

use crate::error::SessionError;
use crate::level::{LevelAnswerRecord, MIN_RESPONSE_TIME_MS};
use crate::phase::{SessionPhase, session_rng};
use crate::timing::{Clock, system_clock};
use crate::unique::UniqueQuestionPool;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PracticeStats {
    pub score: u32,
    pub accuracy: u32,
    pub correct_answers: u32,
    pub total_answered: u32,
}

/// Feedback for a practice submission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PracticeAnswerOutcome {
    pub is_correct: bool,
    pub completed: bool,
    pub stats: PracticeStats,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PracticeResult {
    pub session_id: String,
    pub level_id: String,
    pub level_number: u32,
    pub score: u32,
    pub accuracy: u32,
    pub correct_answers: u32,
    pub total_answered: u32,
    pub completed: bool,
    pub duration_ms: i64,
    pub ended_at: i64,
}

/// Practice run state machine. The level's time limit is ignored.
#[derive(Debug)]
pub struct PracticeSession {
    level: LevelDefinition,
    session_id: String,
    rng: ChaCha8Rng,
    clock: Arc<dyn Clock>,
    pool: UniqueQuestionPool,
    phase: SessionPhase,
    started_at: Option<i64>,
    completed: bool,
    current_question: Option<MathQuestion>,
    question_shown_at: i64,
    stats: PracticeStats,
    answers: Vec<LevelAnswerRecord>,
    result: Option<PracticeResult>,
}

impl PracticeSession {
    /// Practice questions are typed answers, so none carry options
    pub fn new(level: LevelDefinition) -> Result<Self, SessionError> {
        level
            .validate()
            .map_err(|e| SessionError::InvalidLevel(format!("{}: {}", level.id, e)))?;
        let pool = UniqueQuestionPool::new(&level.grade_tags, &level.allowed_operations, false)?;

        let mut rng = session_rng(None);
        let session_id = generate_id(&mut rng, "pr");
        Ok(Self {
            level,
            session_id,
            rng,
            clock: system_clock(),
            pool,
            phase: SessionPhase::Uninitialized,
            started_at: None,
            completed: false,
            current_question: None,
            question_shown_at: 0,
            stats: PracticeStats::default(),
            answers: Vec::new(),
            result: None,
        })
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = session_rng(Some(seed));
        self.session_id = generate_id(&mut self.rng, "pr");
        self
    }

    pub fn initialize(&mut self) -> Result<&MathQuestion, SessionError> {
        match self.phase {
            SessionPhase::Uninitialized => {}
            SessionPhase::Active => return Err(SessionError::AlreadyInitialized),
            SessionPhase::Finalized => return Err(SessionError::Finalized),
        }

        self.started_at = Some(self.clock.now_ms());
        self.phase = SessionPhase::Active;
        log::info!(
            "[Practice] {} started ({} to complete)",
            self.level.title,
            self.level.required_correct_answers
        );
        self.generate_next_question()
    }

    pub fn generate_next_question(&mut self) -> Result<&MathQuestion, SessionError> {
        if self.phase.is_finalized() {
            return Err(SessionError::Finalized);
        }
        let question = self.pool.draw(&mut self.rng)?;
        self.question_shown_at = self.clock.now_ms();
        Ok(&*self.current_question.insert(question))
    }

    /// Check an answer; once the goal is met the run is complete and
    /// accepts no further answers
    pub fn submit_answer(&mut self, user_answer: i64) -> Result<PracticeAnswerOutcome, SessionError> {
        if self.phase.is_finalized() {
            return Err(SessionError::Finalized);
        }
        if self.completed {
            return Err(SessionError::Completed);
        }
        let Some(question) = self.current_question.take() else {
            return Err(SessionError::NoActiveQuestion);
        };

        let now = self.clock.now_ms();
        let is_correct = question.is_correct(user_answer);
        self.stats.total_answered += 1;
        if is_correct {
            self.stats.correct_answers += 1;
            self.stats.score += BASE_SCORE_PER_ANSWER;
        }
        self.stats.accuracy = accuracy_pct(self.stats.correct_answers, self.stats.total_answered);
        self.answers.push(LevelAnswerRecord {
            key: question.key(),
            user_answer,
            is_correct,
            response_time_ms: (now - self.question_shown_at).max(MIN_RESPONSE_TIME_MS),
            answered_at: now,
            question: question.clone(),
        });
        self.current_question = Some(question);

        self.completed = self.stats.correct_answers >= self.level.required_correct_answers;
        if self.completed {
            log::info!(
                "[Practice] {} complete after {} answers",
                self.level.title,
                self.stats.total_answered
            );
        } else if let Err(e) = self.generate_next_question() {
            self.current_question = None;
            return Err(e);
        }

        Ok(PracticeAnswerOutcome {
            is_correct,
            completed: self.completed,
            stats: self.stats,
        })
    }

    /// Freeze the run; later calls return the same result
    pub fn end_session(&mut self) -> PracticeResult {
        if let Some(result) = &self.result {
            return result.clone();
        }

        let now = self.clock.now_ms();
        self.phase = SessionPhase::Finalized;
        let result = PracticeResult {
            session_id: self.session_id.clone(),
            level_id: self.level.id.clone(),
            level_number: self.level.level_number,
            score: self.stats.score,
            accuracy: self.stats.accuracy,
            correct_answers: self.stats.correct_answers,
            total_answered: self.stats.total_answered,
            completed: self.completed,
            duration_ms: self.started_at.map(|s| (now - s).max(0)).unwrap_or(0),
            ended_at: now,
        };
        self.result = Some(result.clone());
        result
    }

    pub fn result(&self) -> Option<&PracticeResult> {
        self.result.as_ref()
    }

    pub fn stats(&self) -> PracticeStats {
        self.stats
    }

    pub fn is_completed(&self) -> bool {
        self.completed
    }

    pub fn current_question(&self) -> Option<&MathQuestion> {
        self.current_question.as_ref()
    }

    pub fn answer_log(&self) -> &[LevelAnswerRecord] {
        &self.answers
    }

    pub fn level(&self) -> &LevelDefinition {
        &self.level
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }
}
