use thiserror::Error;

use crate::store::RecordKind;

/// Failures surfaced by the rating and tournament engine
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("{kind} '{id}' not found")]
    NotFound { kind: RecordKind, id: String },

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("'{winner_id}' is not a player in match '{match_id}'")]
    InvalidWinner { match_id: String, winner_id: String },

    /// Write contention on a single commit attempt; retried by the caller
    #[error("transaction conflict")]
    Conflict,

    #[error("transaction still conflicting after {attempts} attempts")]
    RetriesExhausted { attempts: u32 },

    #[error("match '{match_id}' already has a winner")]
    AlreadyDecided { match_id: String },

    #[error("invariant violated: {0}")]
    InvariantViolation(String),

    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

pub type EngineResult<T> = Result<T, EngineError>;

impl EngineError {
    pub fn not_found(kind: RecordKind, id: impl Into<String>) -> Self {
        EngineError::NotFound { kind, id: id.into() }
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        EngineError::InvalidInput(message.into())
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, EngineError::Conflict)
    }
}

/// Add context to store read errors
pub fn read_context(kind: RecordKind, id: &str) -> String {
    format!("Failed to read {} '{}'", kind, id)
}

/// Add context to store write errors
pub fn write_context(kind: RecordKind, id: &str) -> String {
    format!("Failed to write {} '{}'", kind, id)
}

/// Add context to record (de)serialization errors
pub fn codec_context(kind: RecordKind) -> String {
    format!("Failed to encode or decode {} record", kind)
}
