//! # mq-core: Arithmetic practice rules for MathQuest
//!
//! Pure building blocks shared by every session mode. Nothing here owns state
//! or reads the clock; every random draw goes through the caller's RNG.
//!
//! ## Features
//!
//! - **Difficulty Resolver**: skill rating to tier, operand range and operations
//! - **Question Generator**: arithmetic questions with optional multiple-choice distractors
//! - **Scoring**: skill deltas, combo, per-answer score, accuracy and gem rewards
//! - **Level Catalog**: the built-in levels plus JSON/YAML loading
//!
//! ## Architecture
//!
//! ```text
//! skill rating ──> resolve_difficulty ──> DifficultyTier
//!                                              │
//!                    Operation + GradeTag ─────┤
//!                                              v
//!                                      generate_question ──> MathQuestion
//! ```

pub mod catalog;
pub mod difficulty;
pub mod error;
pub mod question;
pub mod scoring;
pub mod types;

pub use catalog::*;
pub use difficulty::*;
pub use error::*;
pub use question::*;
pub use scoring::*;
pub use types::*;
