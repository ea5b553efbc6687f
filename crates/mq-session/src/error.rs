//! Session engine errors

use thiserror::Error;

/// Errors raised by the session engines
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("Session already initialized")]
    AlreadyInitialized,

    #[error("Session has been finalized")]
    Finalized,

    #[error("Practice goal already reached")]
    Completed,

    #[error("No active question")]
    NoActiveQuestion,

    #[error("Session time has expired")]
    Expired,

    #[error("No unique question found after {attempts} attempts")]
    QuestionSpaceExhausted { attempts: usize },

    #[error("Invalid level: {0}")]
    InvalidLevel(String),
}

/// Result type alias
pub type SessionResult<T> = Result<T, SessionError>;
