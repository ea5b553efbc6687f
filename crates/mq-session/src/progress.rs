//! Player progress: long-lived state fed by session results
//!
//! Both types are plain serde values owned by the caller. How they are
//! stored between runs is up to the caller.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use mq_core::{
    AnswerMode, DifficultyTier, INITIAL_SKILL_RATING, LevelCatalog, accuracy_pct,
    apply_skill_delta, resolve_difficulty, session_skill_delta,
};

use crate::arcade::ArcadeResult;
use crate::level::LevelAttemptResult;

// ═══════════════════════════════════════════════════════════════════════════════
// PLAYER PROFILE
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerProfile {
    pub skill_rating: f64,
    pub gems: u32,
    pub stars: u32,
    #[serde(default)]
    pub answer_mode: AnswerMode,
    pub unlocked_items: Vec<String>,
    pub total_questions_answered: u32,
    pub total_correct_answers: u32,
    /// Rounded percentage of all answers that were correct
    pub success_rate: u32,
    /// Unix ms of the last recorded answer, 0 if none
    pub last_game_time: i64,
}

impl Default for PlayerProfile {
    fn default() -> Self {
        Self {
            skill_rating: INITIAL_SKILL_RATING,
            gems: 0,
            stars: 0,
            answer_mode: AnswerMode::default(),
            unlocked_items: Vec::new(),
            total_questions_answered: 0,
            total_correct_answers: 0,
            success_rate: 0,
            last_game_time: 0,
        }
    }
}

impl PlayerProfile {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shift the rating, clamped at zero
    pub fn update_skill(&mut self, delta: i32) {
        self.skill_rating = apply_skill_delta(self.skill_rating, delta);
    }

    pub fn add_gems(&mut self, amount: u32) {
        self.gems = self.gems.saturating_add(amount);
    }

    pub fn add_stars(&mut self, amount: u32) {
        self.stars = self.stars.saturating_add(amount);
    }

    /// Returns false when the item was already unlocked
    pub fn unlock(&mut self, item_id: &str) -> bool {
        if self.unlocked_items.iter().any(|i| i == item_id) {
            return false;
        }
        self.unlocked_items.push(item_id.to_string());
        true
    }

    pub fn record_answer(&mut self, correct: bool, now_ms: i64) {
        self.total_questions_answered += 1;
        if correct {
            self.total_correct_answers += 1;
        }
        self.success_rate = accuracy_pct(self.total_correct_answers, self.total_questions_answered);
        self.last_game_time = now_ms;
    }

    pub fn adaptive_difficulty(&self) -> DifficultyTier {
        resolve_difficulty(self.skill_rating)
    }

    /// Fold a finished arcade round into the profile
    pub fn apply_arcade_result(&mut self, result: &ArcadeResult, now_ms: i64) {
        let delta = session_skill_delta(result.correct_answers, result.questions_answered);
        self.update_skill(delta);
        self.add_gems(result.gems_earned);

        let wrong = result.questions_answered.saturating_sub(result.correct_answers);
        for _ in 0..result.correct_answers {
            self.record_answer(true, now_ms);
        }
        for _ in 0..wrong {
            self.record_answer(false, now_ms);
        }
        log::debug!(
            "[Profile] Arcade result applied: skill {:+} -> {}, gems {}",
            delta,
            self.skill_rating,
            self.gems
        );
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// LEVEL PROGRESS
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LevelStatus {
    Locked,
    Unlocked,
    Completed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelProgress {
    pub level_id: String,
    pub level_number: u32,
    pub status: LevelStatus,
    pub attempts_count: u32,
    pub best_score: u32,
    pub best_accuracy: u32,
    pub best_completion_time_ms: Option<i64>,
    pub completed_at: Option<i64>,
}

impl LevelProgress {
    /// Higher score wins; ties go to the faster time (a missing best time
    /// always loses), then to the higher accuracy
    pub fn is_better_attempt(&self, candidate: &LevelAttemptResult) -> bool {
        if candidate.score != self.best_score {
            return candidate.score > self.best_score;
        }
        match self.best_completion_time_ms {
            None => true,
            Some(best) if candidate.completion_time_ms != best => {
                candidate.completion_time_ms < best
            }
            Some(_) => candidate.accuracy > self.best_accuracy,
        }
    }
}

/// Per-level unlock state, personal bests and attempt history
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelProgressBook {
    selected_level: Option<u32>,
    progress: BTreeMap<u32, LevelProgress>,
    attempts: Vec<LevelAttemptResult>,
}

impl LevelProgressBook {
    /// Fresh book: the lowest-numbered level is unlocked, the rest locked
    pub fn new(catalog: &LevelCatalog) -> Self {
        let progress = catalog
            .levels()
            .iter()
            .map(|level| (level.level_number, fresh_progress(&level.id, level.level_number)))
            .collect();

        let mut book = Self {
            selected_level: None,
            progress,
            attempts: Vec::new(),
        };
        book.unlock_first();
        book
    }

    fn unlock_first(&mut self) {
        self.selected_level = self.progress.keys().next().copied();
        if let Some(first) = self.progress.values_mut().next() {
            first.status = LevelStatus::Unlocked;
        }
    }

    pub fn standard() -> Self {
        Self::new(&LevelCatalog::standard())
    }

    pub fn is_unlocked(&self, level_number: u32) -> bool {
        self.progress
            .get(&level_number)
            .is_some_and(|p| p.status != LevelStatus::Locked)
    }

    pub fn progress(&self, level_number: u32) -> Option<&LevelProgress> {
        self.progress.get(&level_number)
    }

    /// Ignored for locked or unknown levels
    pub fn select_level(&mut self, level_number: u32) -> bool {
        if !self.is_unlocked(level_number) {
            return false;
        }
        self.selected_level = Some(level_number);
        true
    }

    pub fn selected_level(&self) -> Option<u32> {
        self.selected_level
    }

    pub fn attempts(&self) -> &[LevelAttemptResult] {
        &self.attempts
    }

    /// Record an attempt; returns false for a level the book does not know
    pub fn record_attempt(&mut self, result: &LevelAttemptResult) -> bool {
        let Some(current) = self.progress.get_mut(&result.level_number) else {
            log::warn!("[Progress] Attempt for unknown level {}", result.level_number);
            return false;
        };

        current.attempts_count += 1;
        if result.passed {
            current.status = LevelStatus::Completed;
            current.completed_at = Some(result.ended_at);
            if current.is_better_attempt(result) {
                current.best_score = result.score;
                current.best_accuracy = result.accuracy;
                current.best_completion_time_ms = Some(result.completion_time_ms);
            }

            if let Some(next) = self.progress.get_mut(&(result.level_number + 1)) {
                if next.status == LevelStatus::Locked {
                    next.status = LevelStatus::Unlocked;
                    log::info!("[Progress] Level {} unlocked", next.level_number);
                }
            }
        }

        self.attempts.push(result.clone());
        true
    }

    /// Back to a fresh book over the same levels
    pub fn reset(&mut self) {
        for progress in self.progress.values_mut() {
            *progress = fresh_progress(&progress.level_id, progress.level_number);
        }
        self.attempts.clear();
        self.unlock_first();
    }
}

fn fresh_progress(level_id: &str, level_number: u32) -> LevelProgress {
    LevelProgress {
        level_id: level_id.to_string(),
        level_number,
        status: LevelStatus::Locked,
        attempts_count: 0,
        best_score: 0,
        best_accuracy: 0,
        best_completion_time_ms: None,
        completed_at: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attempt(level_number: u32, score: u32, time_ms: i64, accuracy: u32, passed: bool) -> LevelAttemptResult {
        LevelAttemptResult {
            level_id: format!("level-{}", level_number),
            level_number,
            answer_mode: AnswerMode::MultipleChoice,
            score,
            accuracy,
            completion_time_ms: time_ms,
            correct_answers: score / 10,
            total_answered: score / 10,
            passed,
            timed_out: !passed,
            ended_at: 1_000 + time_ms,
        }
    }

    #[test]
    fn test_profile_defaults_and_floor() {
        let mut profile = PlayerProfile::new();
        assert_eq!(profile.skill_rating, 1000.0);
        assert_eq!(profile.adaptive_difficulty(), DifficultyTier::Easy);
        profile.update_skill(-5000);
        assert_eq!(profile.skill_rating, 0.0);
        assert_eq!(profile.adaptive_difficulty(), DifficultyTier::VeryEasy);
    }

    #[test]
    fn test_unlock_dedup() {
        let mut profile = PlayerProfile::new();
        assert!(profile.unlock("crystal-skin"));
        assert!(!profile.unlock("crystal-skin"));
        assert_eq!(profile.unlocked_items, vec!["crystal-skin".to_string()]);
    }

    #[test]
    fn test_record_answer() {
        let mut profile = PlayerProfile::new();
        profile.record_answer(true, 10);
        profile.record_answer(false, 20);
        profile.record_answer(true, 30);
        assert_eq!(profile.total_questions_answered, 3);
        assert_eq!(profile.total_correct_answers, 2);
        assert_eq!(profile.success_rate, 67);
        assert_eq!(profile.last_game_time, 30);
    }

    #[test]
    fn test_apply_arcade_result() {
        let mut profile = PlayerProfile::new();
        profile.add_gems(3);
        let result = ArcadeResult {
            session_id: "cp-test".into(),
            difficulty: DifficultyTier::Easy,
            final_score: 120,
            questions_answered: 10,
            correct_answers: 8,
            accuracy: 80,
            gems_earned: 8,
            max_combo: 5,
            duration_ms: 90_000,
        };
        profile.apply_arcade_result(&result, 99);
        assert_eq!(profile.skill_rating, 1070.0);
        assert_eq!(profile.gems, 11);
        assert_eq!(profile.total_questions_answered, 10);
        assert_eq!(profile.success_rate, 80);

        profile.reset();
        assert_eq!(profile, PlayerProfile::default());
    }

    #[test]
    fn test_book_initial_state() {
        let book = LevelProgressBook::standard();
        assert!(book.is_unlocked(1));
        assert!(!book.is_unlocked(2));
        assert!(!book.is_unlocked(42));
        assert_eq!(book.selected_level(), Some(1));
        assert_eq!(book.progress(5).unwrap().status, LevelStatus::Locked);
    }

    #[test]
    fn test_pass_unlocks_next() {
        let mut book = LevelProgressBook::standard();
        assert!(!book.select_level(2));

        assert!(book.record_attempt(&attempt(1, 50, 60_000, 70, false)));
        assert!(!book.is_unlocked(2));
        assert_eq!(book.progress(1).unwrap().best_score, 0);

        book.record_attempt(&attempt(1, 100, 60_000, 90, true));
        let progress = book.progress(1).unwrap();
        assert_eq!(progress.status, LevelStatus::Completed);
        assert_eq!(progress.attempts_count, 2);
        assert_eq!(progress.best_completion_time_ms, Some(60_000));
        assert_eq!(progress.completed_at, Some(61_000));
        assert!(book.is_unlocked(2));
        assert!(book.select_level(2));
        assert_eq!(book.attempts().len(), 2);
    }

    #[test]
    fn test_better_attempt_ordering() {
        let mut book = LevelProgressBook::standard();
        book.record_attempt(&attempt(1, 100, 60_000, 80, true));

        // same score, slower: kept
        book.record_attempt(&attempt(1, 100, 70_000, 100, true));
        assert_eq!(book.progress(1).unwrap().best_completion_time_ms, Some(60_000));

        // same score and time, more accurate: replaced
        book.record_attempt(&attempt(1, 100, 60_000, 95, true));
        assert_eq!(book.progress(1).unwrap().best_accuracy, 95);

        // same score, faster: replaced
        book.record_attempt(&attempt(1, 100, 50_000, 85, true));
        let progress = book.progress(1).unwrap();
        assert_eq!(progress.best_completion_time_ms, Some(50_000));
        assert_eq!(progress.best_accuracy, 85);
    }

    #[test]
    fn test_unknown_level_and_reset() {
        let mut book = LevelProgressBook::standard();
        assert!(!book.record_attempt(&attempt(99, 100, 1, 100, true)));
        book.record_attempt(&attempt(1, 100, 10_000, 100, true));
        book.select_level(2);

        book.reset();
        assert_eq!(book, LevelProgressBook::standard());
    }
}
