//! # mq-session: Session engines for MathQuest
//!
//! Stateful game modes built on `mq-core`. Each session owns its RNG and
//! reads time from an injectable [`Clock`]; nothing runs in the background,
//! so expiry is computed whenever a caller asks.
//!
//! ## Modes
//!
//! - **Arcade** (Crystal Pop): fixed duration, combo-multiplied scoring, gems
//! - **Level**: time limit plus a required-correct goal, no repeated questions
//! - **Practice**: the level rules without the timer
//!
//! ## Lifecycle
//!
//! ```text
//! new ──> initialize ──> submit_answer* ──> end_session ──> Result (cached)
//!  │                          │
//!  └─ with_clock / with_seed  └─ generate_next_question
//! ```

pub mod arcade;
pub mod config;
pub mod error;
pub mod level;
pub mod phase;
pub mod practice;
pub mod progress;
pub mod timing;
pub mod unique;

pub use arcade::*;
pub use config::*;
pub use error::*;
pub use level::*;
pub use phase::SessionPhase;
pub use practice::*;
pub use progress::*;
pub use timing::*;
pub use unique::*;
