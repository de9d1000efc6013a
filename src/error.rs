use std::path::PathBuf;
use thiserror::Error;

/// Main error type for cloneeval
#[derive(Error, Debug)]
pub enum CloneEvalError {
    /// File system I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Parse errors (relation rows, score files, persisted samples)
    #[error("Parse error: {0}")]
    Parse(String),

    /// An input file or directory could not be read. Callers degrade to an
    /// empty structure and keep this around as the reason.
    #[error("Input unavailable: {path}: {reason}")]
    InputUnavailable { path: PathBuf, reason: String },

    /// A filter produced more entries than the row it was given.
    #[error("Invariant violation: {0}")]
    InvariantViolation(String),

    /// Identifier without a parsable trailing `_start_end` suffix
    #[error("Malformed identifier: {0}")]
    MalformedIdentifier(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Convenient Result type using CloneEvalError
pub type Result<T> = std::result::Result<T, CloneEvalError>;

/// Whether an external input was actually read.
///
/// Unreadable ground truth, corpus directories and complexity tables do not
/// abort a run: they produce an empty structure tagged `Unavailable`, so the
/// run yields zero metrics that callers can still tell apart from a real
/// zero-recall technique.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum InputStatus {
    #[default]
    Available,
    Unavailable { path: PathBuf, reason: String },
}

impl InputStatus {
    pub fn unavailable(path: impl Into<PathBuf>, reason: impl std::fmt::Display) -> Self {
        InputStatus::Unavailable {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, InputStatus::Unavailable { .. })
    }

    /// The degradation as an error value, for callers that want to escalate it.
    pub fn to_error(&self) -> Option<CloneEvalError> {
        match self {
            InputStatus::Available => None,
            InputStatus::Unavailable { path, reason } => Some(CloneEvalError::InputUnavailable {
                path: path.clone(),
                reason: reason.clone(),
            }),
        }
    }
}
