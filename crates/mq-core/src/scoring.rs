//! Scoring rules for answers, combos, accuracy and gem rewards

/// Skill points for a correct answer
pub const CORRECT_ANSWER_SKILL: i32 = 10;
/// Skill penalty for an incorrect answer
pub const INCORRECT_ANSWER_SKILL: i32 = -5;
/// Extra skill points for answering correctly within the threshold
pub const SPEED_BONUS_SKILL: i32 = 5;
/// Response time (seconds) that still earns the speed bonus
pub const SPEED_THRESHOLD_SECS: f64 = 30.0;
/// Skill rating floor
pub const MIN_SKILL_RATING: f64 = 0.0;

/// Combo value at the start of a session and after a miss
pub const COMBO_START: u32 = 1;
pub const COMBO_INCREMENT: u32 = 1;
pub const COMBO_RESET: u32 = 1;

/// Points for a correct answer before the combo multiplier
pub const BASE_SCORE_PER_ANSWER: u32 = 10;

/// Skill delta for one answer: +10 correct (+5 more within 30 s), -5 incorrect
pub fn skill_delta(is_correct: bool, response_time_secs: f64) -> i32 {
    if !is_correct {
        return INCORRECT_ANSWER_SKILL;
    }
    if response_time_secs <= SPEED_THRESHOLD_SECS {
        CORRECT_ANSWER_SKILL + SPEED_BONUS_SKILL
    } else {
        CORRECT_ANSWER_SKILL
    }
}

/// Add a delta to a rating, clamped at the floor
pub fn apply_skill_delta(current: f64, delta: i32) -> f64 {
    (current + delta as f64).max(MIN_SKILL_RATING)
}

/// Rating after one answer
pub fn update_skill_rating(current: f64, is_correct: bool, response_time_secs: f64) -> f64 {
    apply_skill_delta(current, skill_delta(is_correct, response_time_secs))
}

/// Net skill change for a whole arcade run: +10 per correct, -5 per miss
pub fn session_skill_delta(correct: u32, answered: u32) -> i32 {
    let wrong = answered.saturating_sub(correct);
    correct as i32 * CORRECT_ANSWER_SKILL + wrong as i32 * INCORRECT_ANSWER_SKILL
}

/// Combo after an answer
pub fn next_combo(current: u32, is_correct: bool) -> u32 {
    if is_correct {
        current + COMBO_INCREMENT
    } else {
        COMBO_RESET
    }
}

/// Points awarded for one answer
pub fn answer_score(base_score: u32, combo_multiplier: u32, is_correct: bool) -> u32 {
    if is_correct {
        base_score.saturating_mul(combo_multiplier)
    } else {
        0
    }
}

/// Accuracy as a whole percentage, rounded half up; 0 when nothing was answered
pub fn accuracy_pct(correct: u32, total: u32) -> u32 {
    if total == 0 {
        return 0;
    }
    let (correct, total) = (correct as u64, total as u64);
    ((200 * correct + total) / (2 * total)) as u32
}

/// Gem reward: one per five answers plus an accuracy bonus
pub fn gems_earned(accuracy: u32, questions_answered: u32) -> u32 {
    let base = questions_answered / 5;
    let bonus = match accuracy {
        90.. => 5,
        80..=89 => 3,
        70..=79 => 1,
        _ => 0,
    };
    base + bonus
}
