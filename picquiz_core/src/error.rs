//! Error types for quiz data loading, storage and speech orchestration

use thiserror::Error;

/// Errors raised while fetching quiz data or persisting progress
#[derive(Error, Debug)]
pub enum QuizError {
    #[error("fetch of '{path}' failed with HTTP status {status}")]
    HttpStatus { path: String, status: u16 },

    #[error("data source '{0}' is empty")]
    EmptySource(String),

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Result type alias for quiz operations
pub type QuizResult<T> = Result<T, QuizError>;

/// Errors surfaced by the speech controllers
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SpeechError {
    #[error("speech recognition not supported or not initialized")]
    Unsupported,

    #[error("speech synthesis error: {0}")]
    Synthesis(String),

    #[error("speech recognition error: {0}")]
    Recognition(String),

    #[error("failed to start speech recognition: {0}")]
    StartFailed(String),

    #[error("speech platform error: {0}")]
    Platform(String),
}
