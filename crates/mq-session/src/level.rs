//! Level session: timed run with a required-correct goal
//!
//! The run passes once the goal is met and times out when the clock runs out
//! first. Questions never repeat within a run.

use std::sync::Arc;

use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use mq_core::{
    AnswerMode, BASE_SCORE_PER_ANSWER, LevelDefinition, MathQuestion, QuestionKey, accuracy_pct,
    generate_id,
};

use crate::error::SessionError;
use crate::phase::{SessionPhase, session_rng};
use crate::timing::{Clock, Countdown, system_clock};
use crate::unique::UniqueQuestionPool;

/// Smallest recorded response time
pub const MIN_RESPONSE_TIME_MS: i64 = 1;

/// One answered question in a level or practice run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelAnswerRecord {
    pub question: MathQuestion,
    pub key: QuestionKey,
    pub user_answer: i64,
    pub is_correct: bool,
    pub response_time_ms: i64,
    pub answered_at: i64,
}

/// Feedback for a level submission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelAnswerOutcome {
    pub is_correct: bool,
    pub passed: bool,
    pub score: u32,
}

/// Live counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelSessionStats {
    pub score: u32,
    pub accuracy: u32,
    pub correct_answers: u32,
    pub total_answered: u32,
    pub remaining_ms: i64,
}

/// Frozen outcome of a level attempt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelAttemptResult {
    pub level_id: String,
    pub level_number: u32,
    pub answer_mode: AnswerMode,
    pub score: u32,
    pub accuracy: u32,
    pub completion_time_ms: i64,
    pub correct_answers: u32,
    pub total_answered: u32,
    pub passed: bool,
    pub timed_out: bool,
    pub ended_at: i64,
}

/// Level run state machine
#[derive(Debug)]
pub struct LevelSession {
    level: LevelDefinition,
    answer_mode: AnswerMode,
    session_id: String,
    rng: ChaCha8Rng,
    clock: Arc<dyn Clock>,
    countdown: Countdown,
    pool: UniqueQuestionPool,
    phase: SessionPhase,
    current_question: Option<MathQuestion>,
    question_shown_at: i64,
    score: u32,
    correct_answers: u32,
    total_answered: u32,
    answers: Vec<LevelAnswerRecord>,
    result: Option<LevelAttemptResult>,
}

impl LevelSession {
    /// Fails with `InvalidLevel` when the level does not pass catalog validation
    pub fn new(level: LevelDefinition, answer_mode: AnswerMode) -> Result<Self, SessionError> {
        level
            .validate()
            .map_err(|e| SessionError::InvalidLevel(format!("{}: {}", level.id, e)))?;
        let pool = UniqueQuestionPool::new(
            &level.grade_tags,
            &level.allowed_operations,
            answer_mode.is_multiple_choice(),
        )?;

        let mut rng = session_rng(None);
        let session_id = generate_id(&mut rng, "lv");
        Ok(Self {
            countdown: Countdown::new(level.time_limit_ms()),
            level,
            answer_mode,
            session_id,
            rng,
            clock: system_clock(),
            pool,
            phase: SessionPhase::Uninitialized,
            current_question: None,
            question_shown_at: 0,
            score: 0,
            correct_answers: 0,
            total_answered: 0,
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
        self.session_id = generate_id(&mut self.rng, "lv");
        self
    }

    /// Start the timer and show the first question
    pub fn initialize(&mut self) -> Result<&MathQuestion, SessionError> {
        match self.phase {
            SessionPhase::Uninitialized => {}
            SessionPhase::Active => return Err(SessionError::AlreadyInitialized),
            SessionPhase::Finalized => return Err(SessionError::Finalized),
        }

        self.countdown.start(self.clock.now_ms());
        self.phase = SessionPhase::Active;
        log::info!(
            "[Level] {} started ({} to pass, {}s)",
            self.level.title,
            self.level.required_correct_answers,
            self.level.time_limit_seconds
        );
        self.generate_next_question()
    }

    /// Show a question not yet seen this run
    pub fn generate_next_question(&mut self) -> Result<&MathQuestion, SessionError> {
        if self.phase.is_finalized() {
            return Err(SessionError::Finalized);
        }
        let question = self.pool.draw(&mut self.rng)?;
        self.question_shown_at = self.clock.now_ms();
        Ok(&*self.current_question.insert(question))
    }

    /// Check an answer; advances to a fresh question while the run is still open
    pub fn submit_answer(&mut self, user_answer: i64) -> Result<LevelAnswerOutcome, SessionError> {
        if self.phase.is_finalized() {
            return Err(SessionError::Finalized);
        }
        let now = self.clock.now_ms();
        let Some(question) = self.current_question.take() else {
            return Err(SessionError::NoActiveQuestion);
        };
        if self.countdown.is_expired(now) {
            self.current_question = Some(question);
            log::warn!("[Level] Rejected answer after time limit on {}", self.level.id);
            return Err(SessionError::Expired);
        }

        let is_correct = question.is_correct(user_answer);
        self.total_answered += 1;
        if is_correct {
            self.correct_answers += 1;
            self.score += BASE_SCORE_PER_ANSWER;
        }
        self.answers.push(LevelAnswerRecord {
            key: question.key(),
            user_answer,
            is_correct,
            response_time_ms: (now - self.question_shown_at).max(MIN_RESPONSE_TIME_MS),
            answered_at: now,
            question: question.clone(),
        });
        self.current_question = Some(question);

        let passed = self.is_passed();
        if !passed && !self.countdown.is_expired(now) {
            if let Err(e) = self.generate_next_question() {
                // Close the answered question
                self.current_question = None;
                return Err(e);
            }
        }

        Ok(LevelAnswerOutcome {
            is_correct,
            passed,
            score: self.score,
        })
    }

    /// Freeze the attempt; later calls return the same result
    pub fn end_session(&mut self) -> LevelAttemptResult {
        if let Some(result) = &self.result {
            return result.clone();
        }

        let now = self.clock.now_ms();
        let passed = self.is_passed();
        self.phase = SessionPhase::Finalized;

        let result = LevelAttemptResult {
            level_id: self.level.id.clone(),
            level_number: self.level.level_number,
            answer_mode: self.answer_mode,
            score: self.score,
            accuracy: self.accuracy(),
            completion_time_ms: self.countdown.elapsed_ms(now),
            correct_answers: self.correct_answers,
            total_answered: self.total_answered,
            passed,
            timed_out: self.countdown.is_expired(now) && !passed,
            ended_at: now,
        };
        log::info!(
            "[Level] {} ended: passed={} timed_out={} ({}/{})",
            self.level.title,
            result.passed,
            result.timed_out,
            result.correct_answers,
            result.total_answered
        );

        self.result = Some(result.clone());
        result
    }

    pub fn result(&self) -> Option<&LevelAttemptResult> {
        self.result.as_ref()
    }

    pub fn is_passed(&self) -> bool {
        self.correct_answers >= self.level.required_correct_answers
    }

    pub fn stats(&self) -> LevelSessionStats {
        LevelSessionStats {
            score: self.score,
            accuracy: self.accuracy(),
            correct_answers: self.correct_answers,
            total_answered: self.total_answered,
            remaining_ms: self.time_remaining_ms(),
        }
    }

    pub fn accuracy(&self) -> u32 {
        accuracy_pct(self.correct_answers, self.total_answered)
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

    pub fn current_question(&self) -> Option<&MathQuestion> {
        self.current_question.as_ref()
    }

    pub fn answer_log(&self) -> &[LevelAnswerRecord] {
        &self.answers
    }

    pub fn level(&self) -> &LevelDefinition {
        &self.level
    }

    pub fn answer_mode(&self) -> AnswerMode {
        self.answer_mode
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timing::ManualClock;
    use mq_core::{GradeTag, LevelCatalog, Operation};

    fn level(required: u32, time_limit: u64) -> LevelDefinition {
        LevelDefinition::new(1, &[GradeTag::Grade1, GradeTag::Grade2], &Operation::ALL)
            .with_required_correct(required)
            .with_time_limit(time_limit)
    }

    fn session(level: LevelDefinition, mode: AnswerMode) -> (LevelSession, Arc<ManualClock>) {
        let clock = ManualClock::shared(0);
        let session = LevelSession::new(level, mode)
            .unwrap()
            .with_clock(clock.clone())
            .with_seed(9);
        (session, clock)
    }

    fn correct(session: &LevelSession) -> i64 {
        session.current_question().unwrap().correct_answer
    }

    #[test]
    fn test_pass_on_goal() {
        let (mut s, clock) = session(level(2, 30), AnswerMode::MultipleChoice);
        s.initialize().unwrap();

        clock.advance(1_200);
        let first = s.submit_answer(correct(&s)).unwrap();
        assert!(first.is_correct && !first.passed);
        assert_eq!(first.score, 10);

        let second = s.submit_answer(correct(&s)).unwrap();
        assert!(second.passed);

        let result = s.end_session();
        assert!(result.passed);
        assert!(!result.timed_out);
        assert_eq!(result.correct_answers, 2);
        assert_eq!(result.accuracy, 100);
        assert_eq!(result.completion_time_ms, 1_200);
    }

    #[test]
    fn test_no_advance_after_pass() {
        let (mut s, _) = session(level(1, 30), AnswerMode::NumberEntry);
        let id = s.initialize().unwrap().id.clone();
        assert!(s.current_question().unwrap().multiple_choice_options.is_none());
        assert!(s.submit_answer(correct(&s)).unwrap().passed);
        assert_eq!(s.current_question().unwrap().id, id);
    }

    #[test]
    fn test_wrong_answer_advances() {
        let (mut s, _) = session(level(3, 30), AnswerMode::MultipleChoice);
        let id = s.initialize().unwrap().id.clone();
        let outcome = s.submit_answer(correct(&s) + 1).unwrap();
        assert!(!outcome.is_correct);
        assert_eq!(outcome.score, 0);
        assert_ne!(s.current_question().unwrap().id, id);
        assert_eq!(s.stats().accuracy, 0);
    }

    #[test]
    fn test_timeout() {
        let (mut s, clock) = session(level(10, 1), AnswerMode::MultipleChoice);
        s.initialize().unwrap();
        clock.advance(1_500);
        assert!(s.is_expired());
        assert_eq!(s.submit_answer(correct(&s)), Err(SessionError::Expired));

        let result = s.end_session();
        assert!(result.timed_out);
        assert!(!result.passed);
        assert_eq!(result.total_answered, 0);
    }

    #[test]
    fn test_response_time_floor() {
        let (mut s, clock) = session(level(5, 30), AnswerMode::MultipleChoice);
        s.initialize().unwrap();
        s.submit_answer(correct(&s)).unwrap();
        clock.advance(750);
        s.submit_answer(correct(&s)).unwrap();

        let log = s.answer_log();
        assert_eq!(log[0].response_time_ms, 1);
        assert_eq!(log[1].response_time_ms, 750);
        assert_eq!(log[0].key, log[0].question.key());
    }

    #[test]
    fn test_end_idempotent_and_frozen() {
        let (mut s, clock) = session(level(5, 2), AnswerMode::MultipleChoice);
        s.initialize().unwrap();
        s.submit_answer(correct(&s)).unwrap();
        let first = s.end_session();
        clock.advance(10_000);
        let second = s.end_session();
        assert_eq!(first, second);
        assert!(!first.timed_out);
        assert_eq!(s.submit_answer(0), Err(SessionError::Finalized));
        assert_eq!(s.generate_next_question().unwrap_err(), SessionError::Finalized);
    }

    #[test]
    fn test_double_initialize() {
        let (mut s, _) = session(level(5, 30), AnswerMode::MultipleChoice);
        s.initialize().unwrap();
        assert_eq!(s.initialize().unwrap_err(), SessionError::AlreadyInitialized);
    }

    #[test]
    fn test_invalid_level() {
        let empty = LevelDefinition::new(3, &[], &[Operation::Addition]);
        let err = LevelSession::new(empty, AnswerMode::MultipleChoice).unwrap_err();
        assert!(matches!(err, SessionError::InvalidLevel(msg) if msg.starts_with("level-3")));
    }

    #[test]
    fn test_zero_goal_level_rejected() {
        let level = LevelDefinition::new(4, &[GradeTag::Grade1], &[Operation::Addition])
            .with_required_correct(0);
        let err = LevelSession::new(level, AnswerMode::NumberEntry).unwrap_err();
        assert!(matches!(err, SessionError::InvalidLevel(msg) if msg.starts_with("level-4")));
    }

    #[test]
    fn test_standard_level_questions_respect_level() {
        let level = LevelCatalog::standard().get(3).unwrap().clone();
        let (mut s, _) = session(level, AnswerMode::MultipleChoice);
        s.initialize().unwrap();
        for _ in 0..9 {
            let q = s.current_question().unwrap().clone();
            assert_eq!(q.grade_tag, GradeTag::Grade2);
            assert_ne!(q.operation, Operation::Multiplication);
            s.submit_answer(q.correct_answer).unwrap();
        }
        assert!(!s.is_passed());
    }
}
